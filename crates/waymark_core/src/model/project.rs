//! Project record: a named route with transport mode and publish state.
//!
//! # Invariants
//! - `name` and `language` are never empty.
//! - `duration` (hours) is never negative.
//! - `owner_id` starts as `None` for locally created projects and is
//!   assigned at most once, by the claim pass.

use crate::model::{now_epoch_ms, ValidationError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

/// Stable identifier for a project.
pub type ProjectId = Uuid;

/// How the route is traveled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportMode {
    Walking,
    Biking,
    Driving,
    Boating,
    Flying,
}

/// Publication state of a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Draft,
    Published,
}

/// A route project. Points of interest, media, the thumbnail and the
/// map extent reference it by `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    /// `None` until the record is claimed by an authenticated identity.
    pub owner_id: Option<String>,
    /// Identities (emails) this record is shared with.
    pub shared_with: BTreeSet<String>,
    /// Unique display name.
    pub name: String,
    pub content: Option<String>,
    pub language: String,
    pub transport: TransportMode,
    pub status: ProjectStatus,
    /// Estimated duration in hours.
    pub duration: f64,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    /// Unix epoch milliseconds; maintained by the repository on update.
    pub edited_at: i64,
}

impl Project {
    /// Creates an unclaimed draft project with a generated ID.
    pub fn new(
        name: impl Into<String>,
        language: impl Into<String>,
        transport: TransportMode,
    ) -> Self {
        Self::with_id(Uuid::new_v4(), name, language, transport)
    }

    /// Creates an unclaimed draft project with a caller-provided ID.
    ///
    /// Used by import paths where identity already exists externally.
    pub fn with_id(
        id: ProjectId,
        name: impl Into<String>,
        language: impl Into<String>,
        transport: TransportMode,
    ) -> Self {
        let now = now_epoch_ms();
        Self {
            id,
            owner_id: None,
            shared_with: BTreeSet::new(),
            name: name.into(),
            content: None,
            language: language.into(),
            transport,
            status: ProjectStatus::Draft,
            duration: 0.0,
            created_at: now,
            edited_at: now,
        }
    }

    /// Returns whether this record has not been claimed yet.
    pub fn is_unowned(&self) -> bool {
        self.owner_id.is_none()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyField {
                record: "project",
                field: "name",
            });
        }
        if self.language.trim().is_empty() {
            return Err(ValidationError::EmptyField {
                record: "project",
                field: "language",
            });
        }
        if self.duration < 0.0 {
            return Err(ValidationError::NegativeField {
                record: "project",
                field: "duration",
                value: self.duration,
            });
        }
        Ok(())
    }
}
