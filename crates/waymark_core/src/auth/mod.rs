//! Authentication seam and identity caching.
//!
//! # Responsibility
//! - Define the external identity provider contract.
//! - Cache the signed-in identity and re-publish auth transitions.
//!
//! # Invariants
//! - The core never stores passwords; tokens pass through to the
//!   transport and are redacted from the event recorder.

pub mod provider;
pub mod service;

pub use provider::{AuthError, AuthEvent, AuthSession, AuthTokenProvider};
pub use service::AuthService;
