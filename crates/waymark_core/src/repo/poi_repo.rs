//! Point-of-interest repository contracts and SQLite implementation.
//!
//! # Invariants
//! - Write paths call `Poi::validate()` before SQL mutations.
//! - Inserts verify the parent project exists.

use crate::model::poi::{Poi, PoiId};
use crate::model::project::ProjectId;
use crate::model::{now_epoch_ms, Collection};
use crate::repo::{
    decode_shared_with, encode_shared_with, parse_uuid_text, require_parent, RepoError, RepoResult,
};
use rusqlite::{params, Connection, Row};

const POI_SELECT_SQL: &str = "SELECT
    uuid,
    project_id,
    owner_id,
    shared_with,
    label,
    latitude,
    longitude,
    radius,
    content,
    sort_order,
    created_at,
    edited_at
FROM pois";

/// Repository interface for POI CRUD operations.
pub trait PoiRepository {
    fn create_poi(&self, poi: &Poi) -> RepoResult<PoiId>;
    fn update_poi(&self, poi: &Poi) -> RepoResult<()>;
    fn get_poi(&self, id: PoiId) -> RepoResult<Option<Poi>>;
    fn list_pois_for_project(&self, project_id: ProjectId) -> RepoResult<Vec<Poi>>;
    fn delete_poi(&self, id: PoiId) -> RepoResult<()>;
}

/// SQLite-backed POI repository.
pub struct SqlitePoiRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePoiRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl PoiRepository for SqlitePoiRepository<'_> {
    fn create_poi(&self, poi: &Poi) -> RepoResult<PoiId> {
        poi.validate()?;
        require_parent(
            self.conn,
            Collection::Pois,
            Collection::Projects,
            poi.project_id,
        )?;

        self.conn.execute(
            "INSERT INTO pois (
                uuid,
                project_id,
                owner_id,
                shared_with,
                label,
                latitude,
                longitude,
                radius,
                content,
                sort_order,
                created_at,
                edited_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12);",
            params![
                poi.id.to_string(),
                poi.project_id.to_string(),
                poi.owner_id.as_deref(),
                encode_shared_with(&poi.shared_with)?,
                poi.label.as_deref(),
                poi.latitude,
                poi.longitude,
                poi.radius,
                poi.content.as_deref(),
                poi.sort_order,
                poi.created_at,
                poi.edited_at,
            ],
        )?;

        Ok(poi.id)
    }

    fn update_poi(&self, poi: &Poi) -> RepoResult<()> {
        poi.validate()?;

        let changed = self.conn.execute(
            "UPDATE pois
             SET
                owner_id = ?1,
                shared_with = ?2,
                label = ?3,
                latitude = ?4,
                longitude = ?5,
                radius = ?6,
                content = ?7,
                sort_order = ?8,
                edited_at = ?9
             WHERE uuid = ?10;",
            params![
                poi.owner_id.as_deref(),
                encode_shared_with(&poi.shared_with)?,
                poi.label.as_deref(),
                poi.latitude,
                poi.longitude,
                poi.radius,
                poi.content.as_deref(),
                poi.sort_order,
                now_epoch_ms(),
                poi.id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                collection: Collection::Pois,
                id: poi.id,
            });
        }

        Ok(())
    }

    fn get_poi(&self, id: PoiId) -> RepoResult<Option<Poi>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{POI_SELECT_SQL} WHERE uuid = ?1;"))?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_poi_row(row)?));
        }

        Ok(None)
    }

    fn list_pois_for_project(&self, project_id: ProjectId) -> RepoResult<Vec<Poi>> {
        let mut stmt = self.conn.prepare(&format!(
            "{POI_SELECT_SQL}
             WHERE project_id = ?1
             ORDER BY sort_order ASC, created_at ASC;"
        ))?;

        let mut rows = stmt.query([project_id.to_string()])?;
        let mut pois = Vec::new();
        while let Some(row) = rows.next()? {
            pois.push(parse_poi_row(row)?);
        }

        Ok(pois)
    }

    fn delete_poi(&self, id: PoiId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM pois WHERE uuid = ?1;", [id.to_string()])?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                collection: Collection::Pois,
                id,
            });
        }

        Ok(())
    }
}

pub(crate) fn parse_poi_row(row: &Row<'_>) -> RepoResult<Poi> {
    let uuid_text: String = row.get("uuid")?;
    let project_text: String = row.get("project_id")?;
    let shared_with_text: String = row.get("shared_with")?;

    Ok(Poi {
        id: parse_uuid_text(&uuid_text, "pois.uuid")?,
        project_id: parse_uuid_text(&project_text, "pois.project_id")?,
        owner_id: row.get("owner_id")?,
        shared_with: decode_shared_with(&shared_with_text)?,
        label: row.get("label")?,
        latitude: row.get("latitude")?,
        longitude: row.get("longitude")?,
        radius: row.get("radius")?,
        content: row.get("content")?,
        sort_order: row.get("sort_order")?,
        created_at: row.get("created_at")?,
        edited_at: row.get("edited_at")?,
    })
}
