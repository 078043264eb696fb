//! In-process event record for the diagnostics surface.
//!
//! # Responsibility
//! - Keep a capped, newest-first history of notable application events.
//! - Redact credential material from structured detail payloads.
//!
//! # Invariants
//! - The history never exceeds its capacity.
//! - `password`, `access_token` and `refresh_token` values are never
//!   stored in clear text.

use crate::model::now_epoch_ms;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Mutex;

const DEFAULT_CAPACITY: usize = 1000;
const REDACTED_KEYS: [&str; 3] = ["password", "access_token", "refresh_token"];

/// Source area an event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventCategory {
    Auth,
    Store,
    Sync,
    App,
    Error,
}

impl EventCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Auth => "auth",
            Self::Store => "store",
            Self::Sync => "sync",
            Self::App => "app",
            Self::Error => "error",
        }
    }
}

/// One recorded event.
#[derive(Debug, Clone)]
pub struct EventEntry {
    pub timestamp_ms: i64,
    pub category: EventCategory,
    pub message: String,
    /// JSON-encoded details with credentials redacted.
    pub details: Option<String>,
}

/// Capped newest-first event history, safe to share across threads.
pub struct EventRecorder {
    entries: Mutex<VecDeque<EventEntry>>,
    capacity: usize,
}

impl Default for EventRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl EventRecorder {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(VecDeque::new()),
            capacity: capacity.max(1),
        }
    }

    /// Records a plain event.
    pub fn record(&self, category: EventCategory, message: impl Into<String>) {
        self.push(EventEntry {
            timestamp_ms: now_epoch_ms(),
            category,
            message: message.into(),
            details: None,
        });
    }

    /// Records an event with a structured detail payload.
    ///
    /// Credential fields are redacted before storage.
    pub fn record_with_details(
        &self,
        category: EventCategory,
        message: impl Into<String>,
        details: &Value,
    ) {
        self.push(EventEntry {
            timestamp_ms: now_epoch_ms(),
            category,
            message: message.into(),
            details: Some(redact(details).to_string()),
        });
    }

    /// Returns the history, newest first.
    pub fn snapshot(&self) -> Vec<EventEntry> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }

    fn push(&self, entry: EventEntry) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.push_front(entry);
        entries.truncate(self.capacity);
    }
}

fn redact(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut out = serde_json::Map::with_capacity(map.len());
            for (key, inner) in map {
                if REDACTED_KEYS.contains(&key.as_str()) {
                    out.insert(key.clone(), Value::String("[REDACTED]".to_string()));
                } else {
                    out.insert(key.clone(), redact(inner));
                }
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.iter().map(redact).collect()),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::{EventCategory, EventRecorder};
    use serde_json::json;

    #[test]
    fn snapshot_is_newest_first() {
        let recorder = EventRecorder::new();
        recorder.record(EventCategory::App, "first");
        recorder.record(EventCategory::App, "second");

        let entries = recorder.snapshot();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].message, "second");
        assert_eq!(entries[1].message, "first");
    }

    #[test]
    fn history_is_capped() {
        let recorder = EventRecorder::with_capacity(3);
        for i in 0..10 {
            recorder.record(EventCategory::Sync, format!("event {i}"));
        }
        let entries = recorder.snapshot();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].message, "event 9");
        assert_eq!(entries[2].message, "event 7");
    }

    #[test]
    fn credentials_are_redacted_recursively() {
        let recorder = EventRecorder::new();
        recorder.record_with_details(
            EventCategory::Auth,
            "sign in",
            &json!({
                "email": "a@b.c",
                "password": "hunter2",
                "session": { "access_token": "jwt", "refresh_token": "jwt2" }
            }),
        );

        let details = recorder.snapshot()[0]
            .details
            .clone()
            .expect("details should be stored");
        assert!(details.contains("a@b.c"));
        assert!(!details.contains("hunter2"));
        assert!(!details.contains("jwt"));
        assert_eq!(details.matches("[REDACTED]").count(), 3);
    }

    #[test]
    fn clear_empties_history() {
        let recorder = EventRecorder::new();
        recorder.record(EventCategory::Error, "boom");
        assert!(!recorder.is_empty());
        recorder.clear();
        assert!(recorder.is_empty());
    }
}
