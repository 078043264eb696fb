//! Media attachments: per-POI media items and the per-project thumbnail.
//!
//! # Invariants
//! - `url` is never empty.
//! - A project has at most one thumbnail (enforced by the repository).
//! - Parent references (`poi_id`, `project_id`) must exist at insert time.

use crate::model::poi::PoiId;
use crate::model::project::ProjectId;
use crate::model::{now_epoch_ms, ValidationError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

pub type MediaId = Uuid;
pub type ThumbnailId = Uuid;

/// Kind of media payload behind a URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Image,
    Audio,
    Video,
}

/// Media item attached to a point of interest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Media {
    pub id: MediaId,
    pub poi_id: PoiId,
    pub owner_id: Option<String>,
    pub shared_with: BTreeSet<String>,
    pub kind: MediaKind,
    pub url: String,
    /// Position within the POI gallery.
    pub sort_order: i64,
    pub created_at: i64,
    pub edited_at: i64,
}

impl Media {
    pub fn new(poi_id: PoiId, kind: MediaKind, url: impl Into<String>) -> Self {
        let now = now_epoch_ms();
        Self {
            id: Uuid::new_v4(),
            poi_id,
            owner_id: None,
            shared_with: BTreeSet::new(),
            kind,
            url: url.into(),
            sort_order: 0,
            created_at: now,
            edited_at: now,
        }
    }

    pub fn is_unowned(&self) -> bool {
        self.owner_id.is_none()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.url.trim().is_empty() {
            return Err(ValidationError::EmptyField {
                record: "media",
                field: "url",
            });
        }
        Ok(())
    }
}

/// Cover image (or clip) shown on a project card. At most one per project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thumbnail {
    pub id: ThumbnailId,
    pub project_id: ProjectId,
    pub owner_id: Option<String>,
    pub shared_with: BTreeSet<String>,
    pub kind: MediaKind,
    pub url: String,
    pub created_at: i64,
    pub edited_at: i64,
}

impl Thumbnail {
    pub fn new(project_id: ProjectId, kind: MediaKind, url: impl Into<String>) -> Self {
        let now = now_epoch_ms();
        Self {
            id: Uuid::new_v4(),
            project_id,
            owner_id: None,
            shared_with: BTreeSet::new(),
            kind,
            url: url.into(),
            created_at: now,
            edited_at: now,
        }
    }

    pub fn is_unowned(&self) -> bool {
        self.owner_id.is_none()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.url.trim().is_empty() {
            return Err(ValidationError::EmptyField {
                record: "thumbnail",
                field: "url",
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Media, MediaKind, Thumbnail};
    use crate::model::ValidationError;
    use uuid::Uuid;

    #[test]
    fn media_requires_url() {
        let media = Media::new(Uuid::new_v4(), MediaKind::Image, "   ");
        assert!(matches!(
            media.validate(),
            Err(ValidationError::EmptyField { field: "url", .. })
        ));
    }

    #[test]
    fn thumbnail_requires_url() {
        let thumbnail = Thumbnail::new(Uuid::new_v4(), MediaKind::Video, "");
        assert!(matches!(
            thumbnail.validate(),
            Err(ValidationError::EmptyField { field: "url", .. })
        ));
    }

    #[test]
    fn valid_media_passes() {
        let media = Media::new(Uuid::new_v4(), MediaKind::Audio, "https://cdn/a.mp3");
        assert!(media.validate().is_ok());
        assert!(media.is_unowned());
    }
}
