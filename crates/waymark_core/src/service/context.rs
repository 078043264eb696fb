//! Explicitly owned store handle.
//!
//! # Responsibility
//! - Bundle the open connection with the change emitter and the event
//!   recorder, so callers pass one context instead of a global client.
//!
//! # Invariants
//! - One context means one connection; no hidden shared state.

use crate::db::{open_db, open_db_in_memory, DbResult};
use crate::event::{Emitter, EventRecorder};
use crate::model::Collection;
use rusqlite::Connection;
use std::path::Path;
use std::sync::Arc;

pub struct StoreContext {
    conn: Connection,
    changes: Emitter<Collection>,
    recorder: Arc<EventRecorder>,
}

impl StoreContext {
    pub fn open(db_path: &Path) -> DbResult<Self> {
        Ok(Self::from_connection(open_db(db_path)?))
    }

    pub fn open_in_memory() -> DbResult<Self> {
        Ok(Self::from_connection(open_db_in_memory()?))
    }

    fn from_connection(conn: Connection) -> Self {
        Self {
            conn,
            changes: Emitter::new(),
            recorder: Arc::new(EventRecorder::new()),
        }
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Collection-change emitter; watches subscribe here.
    pub fn changes(&self) -> &Emitter<Collection> {
        &self.changes
    }

    pub fn recorder(&self) -> &Arc<EventRecorder> {
        &self.recorder
    }

    /// Announces that `collection` changed; live queries re-evaluate.
    pub fn notify_change(&self, collection: Collection) {
        self.changes.emit(&collection);
    }
}
