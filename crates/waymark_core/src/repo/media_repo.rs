//! Media and thumbnail repositories.
//!
//! # Invariants
//! - Write paths call `validate()` before SQL mutations.
//! - Inserts verify the parent record exists.
//! - A project carries at most one thumbnail; violating inserts fail
//!   with a semantic error before reaching the unique index.

use crate::model::media::{Media, MediaId, MediaKind, Thumbnail, ThumbnailId};
use crate::model::poi::PoiId;
use crate::model::project::ProjectId;
use crate::model::Collection;
use crate::repo::{
    decode_shared_with, encode_shared_with, parse_uuid_text, require_parent, RepoError, RepoResult,
};
use rusqlite::{params, Connection, Row};

const MEDIA_SELECT_SQL: &str = "SELECT
    uuid,
    poi_id,
    owner_id,
    shared_with,
    type,
    url,
    sort_order,
    created_at,
    edited_at
FROM media";

const THUMBNAIL_SELECT_SQL: &str = "SELECT
    uuid,
    project_id,
    owner_id,
    shared_with,
    type,
    url,
    created_at,
    edited_at
FROM thumbnails";

/// Repository interface for per-POI media items.
pub trait MediaRepository {
    fn create_media(&self, media: &Media) -> RepoResult<MediaId>;
    fn get_media(&self, id: MediaId) -> RepoResult<Option<Media>>;
    fn list_media_for_poi(&self, poi_id: PoiId) -> RepoResult<Vec<Media>>;
    fn delete_media(&self, id: MediaId) -> RepoResult<()>;
}

/// Repository interface for project thumbnails.
pub trait ThumbnailRepository {
    fn create_thumbnail(&self, thumbnail: &Thumbnail) -> RepoResult<ThumbnailId>;
    fn get_thumbnail_for_project(&self, project_id: ProjectId) -> RepoResult<Option<Thumbnail>>;
    fn delete_thumbnail(&self, id: ThumbnailId) -> RepoResult<()>;
}

/// SQLite-backed media repository.
pub struct SqliteMediaRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteMediaRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl MediaRepository for SqliteMediaRepository<'_> {
    fn create_media(&self, media: &Media) -> RepoResult<MediaId> {
        media.validate()?;
        require_parent(self.conn, Collection::Media, Collection::Pois, media.poi_id)?;

        self.conn.execute(
            "INSERT INTO media (
                uuid,
                poi_id,
                owner_id,
                shared_with,
                type,
                url,
                sort_order,
                created_at,
                edited_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
            params![
                media.id.to_string(),
                media.poi_id.to_string(),
                media.owner_id.as_deref(),
                encode_shared_with(&media.shared_with)?,
                media_kind_to_db(media.kind),
                media.url.as_str(),
                media.sort_order,
                media.created_at,
                media.edited_at,
            ],
        )?;

        Ok(media.id)
    }

    fn get_media(&self, id: MediaId) -> RepoResult<Option<Media>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{MEDIA_SELECT_SQL} WHERE uuid = ?1;"))?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_media_row(row)?));
        }

        Ok(None)
    }

    fn list_media_for_poi(&self, poi_id: PoiId) -> RepoResult<Vec<Media>> {
        let mut stmt = self.conn.prepare(&format!(
            "{MEDIA_SELECT_SQL}
             WHERE poi_id = ?1
             ORDER BY sort_order ASC, created_at ASC;"
        ))?;

        let mut rows = stmt.query([poi_id.to_string()])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_media_row(row)?);
        }

        Ok(items)
    }

    fn delete_media(&self, id: MediaId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM media WHERE uuid = ?1;", [id.to_string()])?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                collection: Collection::Media,
                id,
            });
        }

        Ok(())
    }
}

/// SQLite-backed thumbnail repository.
pub struct SqliteThumbnailRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteThumbnailRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl ThumbnailRepository for SqliteThumbnailRepository<'_> {
    fn create_thumbnail(&self, thumbnail: &Thumbnail) -> RepoResult<ThumbnailId> {
        thumbnail.validate()?;
        require_parent(
            self.conn,
            Collection::Thumbnails,
            Collection::Projects,
            thumbnail.project_id,
        )?;

        if self.get_thumbnail_for_project(thumbnail.project_id)?.is_some() {
            return Err(RepoError::ThumbnailExists {
                project_id: thumbnail.project_id,
            });
        }

        self.conn.execute(
            "INSERT INTO thumbnails (
                uuid,
                project_id,
                owner_id,
                shared_with,
                type,
                url,
                created_at,
                edited_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
            params![
                thumbnail.id.to_string(),
                thumbnail.project_id.to_string(),
                thumbnail.owner_id.as_deref(),
                encode_shared_with(&thumbnail.shared_with)?,
                media_kind_to_db(thumbnail.kind),
                thumbnail.url.as_str(),
                thumbnail.created_at,
                thumbnail.edited_at,
            ],
        )?;

        Ok(thumbnail.id)
    }

    fn get_thumbnail_for_project(&self, project_id: ProjectId) -> RepoResult<Option<Thumbnail>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{THUMBNAIL_SELECT_SQL} WHERE project_id = ?1;"))?;

        let mut rows = stmt.query([project_id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_thumbnail_row(row)?));
        }

        Ok(None)
    }

    fn delete_thumbnail(&self, id: ThumbnailId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM thumbnails WHERE uuid = ?1;", [id.to_string()])?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                collection: Collection::Thumbnails,
                id,
            });
        }

        Ok(())
    }
}

fn parse_media_row(row: &Row<'_>) -> RepoResult<Media> {
    let uuid_text: String = row.get("uuid")?;
    let poi_text: String = row.get("poi_id")?;
    let kind_text: String = row.get("type")?;
    let shared_with_text: String = row.get("shared_with")?;

    Ok(Media {
        id: parse_uuid_text(&uuid_text, "media.uuid")?,
        poi_id: parse_uuid_text(&poi_text, "media.poi_id")?,
        owner_id: row.get("owner_id")?,
        shared_with: decode_shared_with(&shared_with_text)?,
        kind: parse_media_kind(&kind_text).ok_or_else(|| {
            RepoError::InvalidData(format!("invalid media kind `{kind_text}` in media.type"))
        })?,
        url: row.get("url")?,
        sort_order: row.get("sort_order")?,
        created_at: row.get("created_at")?,
        edited_at: row.get("edited_at")?,
    })
}

pub(crate) fn parse_thumbnail_row(row: &Row<'_>) -> RepoResult<Thumbnail> {
    let uuid_text: String = row.get("uuid")?;
    let project_text: String = row.get("project_id")?;
    let kind_text: String = row.get("type")?;
    let shared_with_text: String = row.get("shared_with")?;

    Ok(Thumbnail {
        id: parse_uuid_text(&uuid_text, "thumbnails.uuid")?,
        project_id: parse_uuid_text(&project_text, "thumbnails.project_id")?,
        owner_id: row.get("owner_id")?,
        shared_with: decode_shared_with(&shared_with_text)?,
        kind: parse_media_kind(&kind_text).ok_or_else(|| {
            RepoError::InvalidData(format!(
                "invalid media kind `{kind_text}` in thumbnails.type"
            ))
        })?,
        url: row.get("url")?,
        created_at: row.get("created_at")?,
        edited_at: row.get("edited_at")?,
    })
}

fn media_kind_to_db(kind: MediaKind) -> &'static str {
    match kind {
        MediaKind::Image => "image",
        MediaKind::Audio => "audio",
        MediaKind::Video => "video",
    }
}

fn parse_media_kind(value: &str) -> Option<MediaKind> {
    match value {
        "image" => Some(MediaKind::Image),
        "audio" => Some(MediaKind::Audio),
        "video" => Some(MediaKind::Video),
        _ => None,
    }
}
