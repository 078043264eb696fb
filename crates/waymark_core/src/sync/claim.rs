//! Ownership claim pass.
//!
//! # Responsibility
//! - Assign an identity to every record still created owner-less,
//!   across all five collections, record by record.
//!
//! # Invariants
//! - Only `owner_id` changes; `shared_with` and payload fields do not.
//! - Updates are guarded by `owner_id IS NULL`, so a record is claimed
//!   at most once and re-runs claim nothing.
//! - One failed record skips that record only; one failed scan skips
//!   that collection only. All five collections are always attempted.

use crate::event::{EventCategory, EventRecorder};
use crate::model::Collection;
use log::{info, warn};
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// The claim pass could not start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimError {
    /// The identity was empty or whitespace-only.
    EmptyIdentity,
}

impl Display for ClaimError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyIdentity => write!(f, "claim identity must not be empty"),
        }
    }
}

impl Error for ClaimError {}

/// One record the pass failed to claim.
#[derive(Debug, Clone)]
pub struct ClaimRecordError {
    pub collection: Collection,
    pub id: Uuid,
    pub message: String,
}

/// Per-collection claim outcome.
#[derive(Debug, Clone)]
pub struct CollectionClaim {
    pub collection: Collection,
    /// Unowned records found by the scan.
    pub examined: usize,
    pub claimed: usize,
    pub failed: usize,
    /// The unowned-record scan itself failed; nothing was attempted.
    pub scan_failed: bool,
    pub errors: Vec<ClaimRecordError>,
}

impl CollectionClaim {
    fn empty(collection: Collection) -> Self {
        Self {
            collection,
            examined: 0,
            claimed: 0,
            failed: 0,
            scan_failed: false,
            errors: Vec::new(),
        }
    }
}

/// Outcome of one full claim pass.
#[derive(Debug, Clone)]
pub struct ClaimSummary {
    pub identity: String,
    pub collections: Vec<CollectionClaim>,
}

impl ClaimSummary {
    pub fn total_claimed(&self) -> usize {
        self.collections.iter().map(|c| c.claimed).sum()
    }

    pub fn total_failed(&self) -> usize {
        self.collections.iter().map(|c| c.failed).sum()
    }

    /// Collections in which at least one record changed owner.
    pub fn changed_collections(&self) -> Vec<Collection> {
        self.collections
            .iter()
            .filter(|c| c.claimed > 0)
            .map(|c| c.collection)
            .collect()
    }
}

/// Claims every unowned record in every collection for `identity`.
///
/// Collections are walked in [`Collection::CLAIM_ORDER`], each record
/// with its own point update, strictly sequential. The pass is
/// best-effort: failures are tallied in the summary, never propagated.
pub fn claim_all_local_collections(
    conn: &Connection,
    identity: &str,
    recorder: &EventRecorder,
) -> Result<ClaimSummary, ClaimError> {
    let identity = identity.trim();
    if identity.is_empty() {
        warn!("event=claim_pass module=sync status=rejected reason=empty_identity");
        return Err(ClaimError::EmptyIdentity);
    }

    let mut collections = Vec::with_capacity(Collection::CLAIM_ORDER.len());
    for collection in Collection::CLAIM_ORDER {
        collections.push(claim_collection(conn, collection, identity, recorder));
    }

    let summary = ClaimSummary {
        identity: identity.to_string(),
        collections,
    };
    info!(
        "event=claim_pass module=sync status=ok identity={} claimed={} failed={}",
        identity,
        summary.total_claimed(),
        summary.total_failed()
    );
    recorder.record(
        EventCategory::Sync,
        format!(
            "claim pass: {} claimed, {} failed",
            summary.total_claimed(),
            summary.total_failed()
        ),
    );

    Ok(summary)
}

fn claim_collection(
    conn: &Connection,
    collection: Collection,
    identity: &str,
    recorder: &EventRecorder,
) -> CollectionClaim {
    let mut outcome = CollectionClaim::empty(collection);

    let unowned = match scan_unowned(conn, collection) {
        Ok(ids) => ids,
        Err(err) => {
            warn!(
                "event=claim_scan module=sync status=error collection={collection} error={err}"
            );
            recorder.record(
                EventCategory::Error,
                format!("claim scan failed for {collection}"),
            );
            outcome.scan_failed = true;
            return outcome;
        }
    };

    outcome.examined = unowned.len();
    let update_sql = format!(
        "UPDATE {} SET owner_id = ?1 WHERE uuid = ?2 AND owner_id IS NULL;",
        collection.table()
    );

    for id in unowned {
        match conn.execute(&update_sql, rusqlite::params![identity, id.to_string()]) {
            // 0 rows means someone claimed it between scan and update;
            // it is owned either way, so not a failure.
            Ok(changed) => {
                if changed > 0 {
                    outcome.claimed += 1;
                }
            }
            Err(err) => {
                warn!(
                    "event=claim_record module=sync status=error collection={collection} uuid={id} error={err}"
                );
                outcome.failed += 1;
                outcome.errors.push(ClaimRecordError {
                    collection,
                    id,
                    message: err.to_string(),
                });
            }
        }
    }

    outcome
}

/// Scans uuids of unowned records, projection only.
fn scan_unowned(conn: &Connection, collection: Collection) -> Result<Vec<Uuid>, rusqlite::Error> {
    let sql = format!(
        "SELECT uuid FROM {} WHERE owner_id IS NULL ORDER BY created_at ASC;",
        collection.table()
    );
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query([])?;

    let mut ids = Vec::new();
    while let Some(row) = rows.next()? {
        let text: String = row.get(0)?;
        // A malformed uuid cannot be claimed; its update would be the
        // failure anyway, so surface it through the scan instead.
        match Uuid::parse_str(&text) {
            Ok(id) => ids.push(id),
            Err(_) => {
                return Err(rusqlite::Error::InvalidColumnType(
                    0,
                    format!("invalid uuid `{text}` in {}", collection.table()),
                    rusqlite::types::Type::Text,
                ))
            }
        }
    }

    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::{claim_all_local_collections, ClaimError};
    use crate::db::open_db_in_memory;
    use crate::event::EventRecorder;

    #[test]
    fn empty_identity_is_rejected_before_touching_the_store() {
        let conn = open_db_in_memory().expect("in-memory db should open");
        let recorder = EventRecorder::new();
        let err = claim_all_local_collections(&conn, "   ", &recorder)
            .expect_err("blank identity should be rejected");
        assert_eq!(err, ClaimError::EmptyIdentity);
    }

    #[test]
    fn empty_store_claims_nothing() {
        let conn = open_db_in_memory().expect("in-memory db should open");
        let recorder = EventRecorder::new();
        let summary = claim_all_local_collections(&conn, "ada@example.org", &recorder)
            .expect("claim pass should run");
        assert_eq!(summary.total_claimed(), 0);
        assert_eq!(summary.total_failed(), 0);
        assert_eq!(summary.collections.len(), 5);
    }
}
