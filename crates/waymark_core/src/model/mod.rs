//! Domain model for the five waymark collections.
//!
//! # Responsibility
//! - Define canonical record shapes shared by local storage and sync.
//! - Carry the ownership envelope (`owner_id`, `shared_with`) on every
//!   record so the claim pass can operate uniformly.
//!
//! # Invariants
//! - Every record is identified by a stable UUID.
//! - `owner_id` is `None` (unclaimed, local-only) or exactly one identity.
//! - Write paths must call `validate()` before persistence.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};

pub mod extent;
pub mod media;
pub mod poi;
pub mod project;

/// The five record collections, in fixed claim order.
///
/// The claim pass walks [`Collection::CLAIM_ORDER`]; parent-before-child
/// ordering is not required because claiming only touches `owner_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Projects,
    Pois,
    Media,
    Thumbnails,
    Extents,
}

impl Collection {
    pub const CLAIM_ORDER: [Collection; 5] = [
        Collection::Projects,
        Collection::Pois,
        Collection::Media,
        Collection::Thumbnails,
        Collection::Extents,
    ];

    /// SQLite table backing this collection.
    pub fn table(self) -> &'static str {
        match self {
            Self::Projects => "projects",
            Self::Pois => "pois",
            Self::Media => "media",
            Self::Thumbnails => "thumbnails",
            Self::Extents => "extents",
        }
    }
}

impl Display for Collection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.table())
    }
}

/// Field-level validation failure raised before any write.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    EmptyField {
        record: &'static str,
        field: &'static str,
    },
    NegativeField {
        record: &'static str,
        field: &'static str,
        value: f64,
    },
    NonPositive {
        record: &'static str,
        field: &'static str,
        value: f64,
    },
    OutOfRange {
        record: &'static str,
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
    InvertedBounds {
        record: &'static str,
        low: &'static str,
        high: &'static str,
    },
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyField { record, field } => {
                write!(f, "{record}.{field} must not be empty")
            }
            Self::NegativeField {
                record,
                field,
                value,
            } => write!(f, "{record}.{field} must not be negative, got {value}"),
            Self::NonPositive {
                record,
                field,
                value,
            } => write!(f, "{record}.{field} must be positive, got {value}"),
            Self::OutOfRange {
                record,
                field,
                value,
                min,
                max,
            } => write!(
                f,
                "{record}.{field} must be within [{min}, {max}], got {value}"
            ),
            Self::InvertedBounds { record, low, high } => {
                write!(f, "{record}.{low} must not exceed {record}.{high}")
            }
        }
    }
}

impl Error for ValidationError {}

/// Current wall-clock time in Unix epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or(0)
}
