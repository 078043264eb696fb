//! Repository layer abstractions and SQLite implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts per collection.
//! - Isolate SQLite query details from service/sync orchestration.
//!
//! # Invariants
//! - Repository writes enforce model `validate()` before persistence.
//! - Parent references are checked at insert time; deletes never
//!   cascade (referential cleanup is the remote engine's concern).
//! - Repository APIs return semantic errors (`NotFound`,
//!   `MissingParent`, `ThumbnailExists`) in addition to DB transport
//!   errors.

use crate::db::DbError;
use crate::model::{Collection, ValidationError};
use rusqlite::Connection;
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub mod extent_repo;
pub mod media_repo;
pub mod poi_repo;
pub mod project_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error for persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(ValidationError),
    Db(DbError),
    NotFound {
        collection: Collection,
        id: Uuid,
    },
    /// The referenced parent record does not exist.
    MissingParent {
        collection: Collection,
        parent: Collection,
        parent_id: Uuid,
    },
    /// A project may carry at most one thumbnail.
    ThumbnailExists {
        project_id: Uuid,
    },
    /// Another project already uses this name.
    DuplicateName {
        name: String,
    },
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { collection, id } => {
                write!(f, "{collection} record not found: {id}")
            }
            Self::MissingParent {
                collection,
                parent,
                parent_id,
            } => write!(
                f,
                "{collection} record references missing {parent} parent: {parent_id}"
            ),
            Self::ThumbnailExists { project_id } => {
                write!(f, "project {project_id} already has a thumbnail")
            }
            Self::DuplicateName { name } => {
                write!(f, "project name already in use: {name}")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

pub(crate) fn encode_shared_with(shared_with: &BTreeSet<String>) -> RepoResult<String> {
    serde_json::to_string(shared_with)
        .map_err(|err| RepoError::InvalidData(format!("cannot encode shared_with: {err}")))
}

pub(crate) fn decode_shared_with(raw: &str) -> RepoResult<BTreeSet<String>> {
    serde_json::from_str(raw).map_err(|err| {
        RepoError::InvalidData(format!("invalid shared_with value `{raw}`: {err}"))
    })
}

pub(crate) fn parse_uuid_text(text: &str, column: &'static str) -> RepoResult<Uuid> {
    Uuid::parse_str(text)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{text}` in {column}")))
}

/// Checks the referenced parent row exists, without FK constraints, so
/// parent deletion stays a plain point operation.
pub(crate) fn require_parent(
    conn: &Connection,
    collection: Collection,
    parent: Collection,
    parent_id: Uuid,
) -> RepoResult<()> {
    let sql = format!("SELECT 1 FROM {} WHERE uuid = ?1;", parent.table());
    let mut stmt = conn.prepare(&sql)?;
    let exists = stmt.exists([parent_id.to_string()])?;
    if exists {
        Ok(())
    } else {
        Err(RepoError::MissingParent {
            collection,
            parent,
            parent_id,
        })
    }
}

/// Maps a SQLite unique-constraint failure on `projects.name` to the
/// semantic duplicate-name error; other errors pass through.
pub(crate) fn map_project_insert_error(err: rusqlite::Error, name: &str) -> RepoError {
    if let rusqlite::Error::SqliteFailure(code, Some(message)) = &err {
        if code.code == rusqlite::ErrorCode::ConstraintViolation
            && message.contains("projects.name")
        {
            return RepoError::DuplicateName {
                name: name.to_string(),
            };
        }
    }
    err.into()
}
