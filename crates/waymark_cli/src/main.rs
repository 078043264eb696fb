//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `waymark_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

fn main() {
    println!("waymark_core ping={}", waymark_core::ping());
    println!("waymark_core version={}", waymark_core::core_version());
}
