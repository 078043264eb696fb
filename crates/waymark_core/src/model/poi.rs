//! Point-of-interest record: a geolocated stop along a project route.
//!
//! # Invariants
//! - `latitude`/`longitude` stay within WGS84 bounds.
//! - `radius` (meters) is strictly positive.
//! - `project_id` must reference an existing project at insert time.

use crate::model::{now_epoch_ms, ValidationError};
use crate::model::project::ProjectId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

/// Stable identifier for a point of interest.
pub type PoiId = Uuid;

/// Trigger radius in meters applied when none is given.
pub const DEFAULT_RADIUS_M: f64 = 5.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Poi {
    pub id: PoiId,
    pub project_id: ProjectId,
    /// `None` until the record is claimed by an authenticated identity.
    pub owner_id: Option<String>,
    pub shared_with: BTreeSet<String>,
    pub label: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    /// Trigger radius in meters.
    pub radius: f64,
    pub content: Option<String>,
    /// Position within the project route.
    pub sort_order: i64,
    pub created_at: i64,
    pub edited_at: i64,
}

impl Poi {
    /// Creates an unclaimed point of interest with a generated ID and
    /// the default trigger radius.
    pub fn new(project_id: ProjectId, latitude: f64, longitude: f64) -> Self {
        let now = now_epoch_ms();
        Self {
            id: Uuid::new_v4(),
            project_id,
            owner_id: None,
            shared_with: BTreeSet::new(),
            label: None,
            latitude,
            longitude,
            radius: DEFAULT_RADIUS_M,
            content: None,
            sort_order: 0,
            created_at: now,
            edited_at: now,
        }
    }

    pub fn is_unowned(&self) -> bool {
        self.owner_id.is_none()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(ValidationError::OutOfRange {
                record: "poi",
                field: "latitude",
                value: self.latitude,
                min: -90.0,
                max: 90.0,
            });
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(ValidationError::OutOfRange {
                record: "poi",
                field: "longitude",
                value: self.longitude,
                min: -180.0,
                max: 180.0,
            });
        }
        if self.radius <= 0.0 {
            return Err(ValidationError::NonPositive {
                record: "poi",
                field: "radius",
                value: self.radius,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Poi, DEFAULT_RADIUS_M};
    use crate::model::ValidationError;
    use uuid::Uuid;

    #[test]
    fn new_poi_uses_default_radius() {
        let poi = Poi::new(Uuid::new_v4(), 48.85, 2.35);
        assert_eq!(poi.radius, DEFAULT_RADIUS_M);
        assert!(poi.is_unowned());
        assert_eq!(poi.sort_order, 0);
    }

    #[test]
    fn validate_rejects_out_of_range_coordinates() {
        let mut poi = Poi::new(Uuid::new_v4(), 91.0, 0.0);
        assert!(matches!(
            poi.validate(),
            Err(ValidationError::OutOfRange {
                field: "latitude",
                ..
            })
        ));

        poi.latitude = 0.0;
        poi.longitude = -180.5;
        assert!(matches!(
            poi.validate(),
            Err(ValidationError::OutOfRange {
                field: "longitude",
                ..
            })
        ));
    }

    #[test]
    fn validate_rejects_zero_radius() {
        let mut poi = Poi::new(Uuid::new_v4(), 0.0, 0.0);
        poi.radius = 0.0;
        assert!(matches!(
            poi.validate(),
            Err(ValidationError::NonPositive { field: "radius", .. })
        ));
    }
}
