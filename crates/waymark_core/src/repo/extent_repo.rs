//! Map extent repository.
//!
//! # Invariants
//! - Write paths call `Extent::validate()` before SQL mutations.
//! - Inserts verify the parent project exists.

use crate::model::extent::{Extent, ExtentId};
use crate::model::project::ProjectId;
use crate::model::Collection;
use crate::repo::{
    decode_shared_with, encode_shared_with, parse_uuid_text, require_parent, RepoError, RepoResult,
};
use rusqlite::{params, Connection, Row};

const EXTENT_SELECT_SQL: &str = "SELECT
    uuid,
    project_id,
    owner_id,
    shared_with,
    min_latitude,
    max_latitude,
    min_longitude,
    max_longitude,
    created_at,
    edited_at
FROM extents";

/// Repository interface for map extents.
pub trait ExtentRepository {
    fn create_extent(&self, extent: &Extent) -> RepoResult<ExtentId>;
    fn get_extent(&self, id: ExtentId) -> RepoResult<Option<Extent>>;
    fn list_extents_for_project(&self, project_id: ProjectId) -> RepoResult<Vec<Extent>>;
    fn delete_extent(&self, id: ExtentId) -> RepoResult<()>;
}

/// SQLite-backed extent repository.
pub struct SqliteExtentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteExtentRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl ExtentRepository for SqliteExtentRepository<'_> {
    fn create_extent(&self, extent: &Extent) -> RepoResult<ExtentId> {
        extent.validate()?;
        require_parent(
            self.conn,
            Collection::Extents,
            Collection::Projects,
            extent.project_id,
        )?;

        self.conn.execute(
            "INSERT INTO extents (
                uuid,
                project_id,
                owner_id,
                shared_with,
                min_latitude,
                max_latitude,
                min_longitude,
                max_longitude,
                created_at,
                edited_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10);",
            params![
                extent.id.to_string(),
                extent.project_id.to_string(),
                extent.owner_id.as_deref(),
                encode_shared_with(&extent.shared_with)?,
                extent.min_latitude,
                extent.max_latitude,
                extent.min_longitude,
                extent.max_longitude,
                extent.created_at,
                extent.edited_at,
            ],
        )?;

        Ok(extent.id)
    }

    fn get_extent(&self, id: ExtentId) -> RepoResult<Option<Extent>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{EXTENT_SELECT_SQL} WHERE uuid = ?1;"))?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_extent_row(row)?));
        }

        Ok(None)
    }

    fn list_extents_for_project(&self, project_id: ProjectId) -> RepoResult<Vec<Extent>> {
        let mut stmt = self.conn.prepare(&format!(
            "{EXTENT_SELECT_SQL}
             WHERE project_id = ?1
             ORDER BY created_at ASC;"
        ))?;

        let mut rows = stmt.query([project_id.to_string()])?;
        let mut extents = Vec::new();
        while let Some(row) = rows.next()? {
            extents.push(parse_extent_row(row)?);
        }

        Ok(extents)
    }

    fn delete_extent(&self, id: ExtentId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM extents WHERE uuid = ?1;", [id.to_string()])?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                collection: Collection::Extents,
                id,
            });
        }

        Ok(())
    }
}

fn parse_extent_row(row: &Row<'_>) -> RepoResult<Extent> {
    let uuid_text: String = row.get("uuid")?;
    let project_text: String = row.get("project_id")?;
    let shared_with_text: String = row.get("shared_with")?;

    Ok(Extent {
        id: parse_uuid_text(&uuid_text, "extents.uuid")?,
        project_id: parse_uuid_text(&project_text, "extents.project_id")?,
        owner_id: row.get("owner_id")?,
        shared_with: decode_shared_with(&shared_with_text)?,
        min_latitude: row.get("min_latitude")?,
        max_latitude: row.get("max_latitude")?,
        min_longitude: row.get("min_longitude")?,
        max_longitude: row.get("max_longitude")?,
        created_at: row.get("created_at")?,
        edited_at: row.get("edited_at")?,
    })
}
