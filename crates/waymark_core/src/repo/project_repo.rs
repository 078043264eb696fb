//! Project repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide stable CRUD and listing APIs over the `projects` table.
//! - Load the project detail shape (pois + thumbnail) in one call.
//!
//! # Invariants
//! - Write paths call `Project::validate()` before SQL mutations.
//! - Read paths reject invalid persisted state instead of masking it.
//! - Listing order is `created_at DESC` with a stable uuid tie-break.

use crate::model::media::Thumbnail;
use crate::model::poi::Poi;
use crate::model::project::{Project, ProjectId, ProjectStatus, TransportMode};
use crate::model::{now_epoch_ms, Collection};
use crate::repo::poi_repo::parse_poi_row;
use crate::repo::{
    decode_shared_with, encode_shared_with, map_project_insert_error, parse_uuid_text, RepoError,
    RepoResult,
};
use rusqlite::{params, Connection, Row};

const PROJECT_SELECT_SQL: &str = "SELECT
    uuid,
    owner_id,
    shared_with,
    name,
    content,
    language,
    transport,
    status,
    duration,
    created_at,
    edited_at
FROM projects";

/// Listing options for project queries.
///
/// `owner = None` covers pre-login local browsing (every record,
/// claimed or not); `owner = Some(identity)` covers post-login scoped
/// browsing.
#[derive(Debug, Clone, Default)]
pub struct ProjectListQuery {
    pub owner: Option<String>,
}

/// Project detail shape: the project, its pois ordered by route
/// position, and its optional thumbnail.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectWithRelations {
    pub project: Project,
    pub pois: Vec<Poi>,
    pub thumbnail: Option<Thumbnail>,
}

/// Repository interface for project CRUD and queries.
pub trait ProjectRepository {
    fn create_project(&self, project: &Project) -> RepoResult<ProjectId>;
    fn update_project(&self, project: &Project) -> RepoResult<()>;
    fn get_project(&self, id: ProjectId) -> RepoResult<Option<Project>>;
    fn list_projects(&self, query: &ProjectListQuery) -> RepoResult<Vec<Project>>;
    fn get_project_with_relations(&self, id: ProjectId)
        -> RepoResult<Option<ProjectWithRelations>>;
    fn delete_project(&self, id: ProjectId) -> RepoResult<()>;
}

/// SQLite-backed project repository.
pub struct SqliteProjectRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteProjectRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl ProjectRepository for SqliteProjectRepository<'_> {
    fn create_project(&self, project: &Project) -> RepoResult<ProjectId> {
        project.validate()?;

        self.conn
            .execute(
                "INSERT INTO projects (
                    uuid,
                    owner_id,
                    shared_with,
                    name,
                    content,
                    language,
                    transport,
                    status,
                    duration,
                    created_at,
                    edited_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11);",
                params![
                    project.id.to_string(),
                    project.owner_id.as_deref(),
                    encode_shared_with(&project.shared_with)?,
                    project.name.as_str(),
                    project.content.as_deref(),
                    project.language.as_str(),
                    transport_to_db(project.transport),
                    status_to_db(project.status),
                    project.duration,
                    project.created_at,
                    project.edited_at,
                ],
            )
            .map_err(|err| map_project_insert_error(err, &project.name))?;

        Ok(project.id)
    }

    fn update_project(&self, project: &Project) -> RepoResult<()> {
        project.validate()?;

        let changed = self.conn.execute(
            "UPDATE projects
             SET
                owner_id = ?1,
                shared_with = ?2,
                name = ?3,
                content = ?4,
                language = ?5,
                transport = ?6,
                status = ?7,
                duration = ?8,
                edited_at = ?9
             WHERE uuid = ?10;",
            params![
                project.owner_id.as_deref(),
                encode_shared_with(&project.shared_with)?,
                project.name.as_str(),
                project.content.as_deref(),
                project.language.as_str(),
                transport_to_db(project.transport),
                status_to_db(project.status),
                project.duration,
                now_epoch_ms(),
                project.id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                collection: Collection::Projects,
                id: project.id,
            });
        }

        Ok(())
    }

    fn get_project(&self, id: ProjectId) -> RepoResult<Option<Project>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PROJECT_SELECT_SQL} WHERE uuid = ?1;"))?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_project_row(row)?));
        }

        Ok(None)
    }

    fn list_projects(&self, query: &ProjectListQuery) -> RepoResult<Vec<Project>> {
        let mut sql = String::from(PROJECT_SELECT_SQL);
        if query.owner.is_some() {
            sql.push_str(" WHERE owner_id = ?1");
        }
        sql.push_str(" ORDER BY created_at DESC, uuid ASC;");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = match &query.owner {
            Some(owner) => stmt.query([owner.as_str()])?,
            None => stmt.query([])?,
        };

        let mut projects = Vec::new();
        while let Some(row) = rows.next()? {
            projects.push(parse_project_row(row)?);
        }

        Ok(projects)
    }

    fn get_project_with_relations(
        &self,
        id: ProjectId,
    ) -> RepoResult<Option<ProjectWithRelations>> {
        let Some(project) = self.get_project(id)? else {
            return Ok(None);
        };

        let mut poi_stmt = self.conn.prepare(
            "SELECT
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
             FROM pois
             WHERE project_id = ?1
             ORDER BY sort_order ASC, created_at ASC;",
        )?;
        let mut poi_rows = poi_stmt.query([id.to_string()])?;
        let mut pois = Vec::new();
        while let Some(row) = poi_rows.next()? {
            pois.push(parse_poi_row(row)?);
        }

        let mut thumb_stmt = self.conn.prepare(
            "SELECT
                uuid,
                project_id,
                owner_id,
                shared_with,
                type,
                url,
                created_at,
                edited_at
             FROM thumbnails
             WHERE project_id = ?1;",
        )?;
        let mut thumb_rows = thumb_stmt.query([id.to_string()])?;
        let thumbnail = match thumb_rows.next()? {
            Some(row) => Some(crate::repo::media_repo::parse_thumbnail_row(row)?),
            None => None,
        };

        Ok(Some(ProjectWithRelations {
            project,
            pois,
            thumbnail,
        }))
    }

    fn delete_project(&self, id: ProjectId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM projects WHERE uuid = ?1;", [id.to_string()])?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                collection: Collection::Projects,
                id,
            });
        }

        Ok(())
    }
}

fn parse_project_row(row: &Row<'_>) -> RepoResult<Project> {
    let uuid_text: String = row.get("uuid")?;
    let id = parse_uuid_text(&uuid_text, "projects.uuid")?;

    let transport_text: String = row.get("transport")?;
    let transport = parse_transport(&transport_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid transport value `{transport_text}` in projects.transport"
        ))
    })?;

    let status_text: String = row.get("status")?;
    let status = parse_status(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid status value `{status_text}` in projects.status"
        ))
    })?;

    let shared_with_text: String = row.get("shared_with")?;

    Ok(Project {
        id,
        owner_id: row.get("owner_id")?,
        shared_with: decode_shared_with(&shared_with_text)?,
        name: row.get("name")?,
        content: row.get("content")?,
        language: row.get("language")?,
        transport,
        status,
        duration: row.get("duration")?,
        created_at: row.get("created_at")?,
        edited_at: row.get("edited_at")?,
    })
}

fn transport_to_db(transport: TransportMode) -> &'static str {
    match transport {
        TransportMode::Walking => "walking",
        TransportMode::Biking => "biking",
        TransportMode::Driving => "driving",
        TransportMode::Boating => "boating",
        TransportMode::Flying => "flying",
    }
}

fn parse_transport(value: &str) -> Option<TransportMode> {
    match value {
        "walking" => Some(TransportMode::Walking),
        "biking" => Some(TransportMode::Biking),
        "driving" => Some(TransportMode::Driving),
        "boating" => Some(TransportMode::Boating),
        "flying" => Some(TransportMode::Flying),
        _ => None,
    }
}

fn status_to_db(status: ProjectStatus) -> &'static str {
    match status {
        ProjectStatus::Draft => "draft",
        ProjectStatus::Published => "published",
    }
}

fn parse_status(value: &str) -> Option<ProjectStatus> {
    match value {
        "draft" => Some(ProjectStatus::Draft),
        "published" => Some(ProjectStatus::Published),
        _ => None,
    }
}
