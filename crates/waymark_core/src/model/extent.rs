//! Map extent record: the bounding box a project is displayed within.
//!
//! # Invariants
//! - Bounds stay within WGS84 ranges.
//! - `min_latitude <= max_latitude` and `min_longitude <= max_longitude`.

use crate::model::project::ProjectId;
use crate::model::{now_epoch_ms, ValidationError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

pub type ExtentId = Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub id: ExtentId,
    pub project_id: ProjectId,
    pub owner_id: Option<String>,
    pub shared_with: BTreeSet<String>,
    pub min_latitude: f64,
    pub max_latitude: f64,
    pub min_longitude: f64,
    pub max_longitude: f64,
    pub created_at: i64,
    pub edited_at: i64,
}

impl Extent {
    pub fn new(
        project_id: ProjectId,
        min_latitude: f64,
        max_latitude: f64,
        min_longitude: f64,
        max_longitude: f64,
    ) -> Self {
        let now = now_epoch_ms();
        Self {
            id: Uuid::new_v4(),
            project_id,
            owner_id: None,
            shared_with: BTreeSet::new(),
            min_latitude,
            max_latitude,
            min_longitude,
            max_longitude,
            created_at: now,
            edited_at: now,
        }
    }

    pub fn is_unowned(&self) -> bool {
        self.owner_id.is_none()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        for (field, value) in [
            ("min_latitude", self.min_latitude),
            ("max_latitude", self.max_latitude),
        ] {
            if !(-90.0..=90.0).contains(&value) {
                return Err(ValidationError::OutOfRange {
                    record: "extent",
                    field,
                    value,
                    min: -90.0,
                    max: 90.0,
                });
            }
        }
        for (field, value) in [
            ("min_longitude", self.min_longitude),
            ("max_longitude", self.max_longitude),
        ] {
            if !(-180.0..=180.0).contains(&value) {
                return Err(ValidationError::OutOfRange {
                    record: "extent",
                    field,
                    value,
                    min: -180.0,
                    max: 180.0,
                });
            }
        }
        if self.min_latitude > self.max_latitude {
            return Err(ValidationError::InvertedBounds {
                record: "extent",
                low: "min_latitude",
                high: "max_latitude",
            });
        }
        if self.min_longitude > self.max_longitude {
            return Err(ValidationError::InvertedBounds {
                record: "extent",
                low: "min_longitude",
                high: "max_longitude",
            });
        }
        Ok(())
    }
}
