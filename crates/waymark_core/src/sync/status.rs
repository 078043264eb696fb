//! Connection status tracking.
//!
//! # Responsibility
//! - Hold the latest transport connection status.
//! - Publish deduplicated status transitions to subscribers.
//! - Let callers block until the connection first reports open.
//!
//! # Invariants
//! - Consecutive identical statuses are collapsed to one emission.
//! - `Uninitialized` is the initial status and is never re-entered.
//! - Every accepted transition is logged and recorded.

use crate::event::{Emitter, EventCategory, EventRecorder, Subscription};
use log::{info, warn};
use std::fmt::{Display, Formatter};
use std::sync::{Arc, Condvar, Mutex};

/// Transport connection state as observed by the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Uninitialized,
    Connecting,
    Open,
    Closed,
}

impl ConnectionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Connecting => "connecting",
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }
}

impl Display for ConnectionStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Deduplicating status holder with blocking open-wait support.
pub struct ConnectionTracker {
    current: Mutex<ConnectionStatus>,
    opened: Condvar,
    changes: Emitter<ConnectionStatus>,
    recorder: Arc<EventRecorder>,
}

impl ConnectionTracker {
    pub fn new(recorder: Arc<EventRecorder>) -> Self {
        Self {
            current: Mutex::new(ConnectionStatus::Uninitialized),
            opened: Condvar::new(),
            changes: Emitter::new(),
            recorder,
        }
    }

    pub fn current(&self) -> ConnectionStatus {
        *self.current.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Accepts a status report from the transport.
    ///
    /// Duplicate consecutive statuses are dropped. Reverting to
    /// `Uninitialized` is rejected; the transport has by then already
    /// reported at least once.
    pub fn record(&self, status: ConnectionStatus) {
        let previous = {
            let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
            if *current == status {
                return;
            }
            if status == ConnectionStatus::Uninitialized {
                warn!(
                    "event=connection_status module=sync status=rejected from={} to=uninitialized",
                    *current
                );
                return;
            }
            let previous = *current;
            *current = status;
            if status == ConnectionStatus::Open {
                self.opened.notify_all();
            }
            previous
        };

        info!(
            "event=connection_status module=sync status=ok from={previous} to={status}"
        );
        self.recorder.record(
            EventCategory::Sync,
            format!("connection {previous} -> {status}"),
        );
        self.changes.emit(&status);
    }

    /// Subscribes to deduplicated status transitions.
    pub fn on_change(
        &self,
        callback: impl Fn(&ConnectionStatus) + Send + Sync + 'static,
    ) -> Subscription {
        self.changes.subscribe(callback)
    }

    /// Blocks until the status is `Open`, returning immediately when it
    /// already is. Timeouts are the transport's concern, not ours.
    pub fn wait_for_open(&self) {
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        while *current != ConnectionStatus::Open {
            current = self
                .opened
                .wait(current)
                .unwrap_or_else(|e| e.into_inner());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ConnectionStatus, ConnectionTracker};
    use crate::event::EventRecorder;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread;

    fn tracker() -> ConnectionTracker {
        ConnectionTracker::new(Arc::new(EventRecorder::new()))
    }

    #[test]
    fn starts_uninitialized() {
        assert_eq!(tracker().current(), ConnectionStatus::Uninitialized);
    }

    #[test]
    fn duplicate_statuses_do_not_re_emit() {
        let tracker = tracker();
        let emissions = Arc::new(AtomicUsize::new(0));
        let emissions_inner = Arc::clone(&emissions);
        let _sub = tracker.on_change(move |_| {
            emissions_inner.fetch_add(1, Ordering::SeqCst);
        });

        tracker.record(ConnectionStatus::Connecting);
        tracker.record(ConnectionStatus::Connecting);
        tracker.record(ConnectionStatus::Open);
        tracker.record(ConnectionStatus::Open);
        tracker.record(ConnectionStatus::Closed);

        assert_eq!(emissions.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn uninitialized_is_never_re_entered() {
        let tracker = tracker();
        tracker.record(ConnectionStatus::Connecting);
        tracker.record(ConnectionStatus::Uninitialized);
        assert_eq!(tracker.current(), ConnectionStatus::Connecting);
    }

    #[test]
    fn wait_for_open_returns_immediately_when_open() {
        let tracker = tracker();
        tracker.record(ConnectionStatus::Open);
        tracker.wait_for_open();
        assert_eq!(tracker.current(), ConnectionStatus::Open);
    }

    #[test]
    fn wait_for_open_unblocks_on_transition() {
        let tracker = Arc::new(tracker());
        let waiter = {
            let tracker = Arc::clone(&tracker);
            thread::spawn(move || {
                tracker.wait_for_open();
                tracker.current()
            })
        };

        tracker.record(ConnectionStatus::Connecting);
        tracker.record(ConnectionStatus::Open);

        let observed = waiter.join().expect("waiter thread should finish");
        assert_eq!(observed, ConnectionStatus::Open);
    }

    #[test]
    fn transitions_are_recorded() {
        let recorder = Arc::new(EventRecorder::new());
        let tracker = ConnectionTracker::new(Arc::clone(&recorder));
        tracker.record(ConnectionStatus::Connecting);
        tracker.record(ConnectionStatus::Open);

        let entries = recorder.snapshot();
        assert_eq!(entries.len(), 2);
        assert!(entries[0].message.contains("connecting -> open"));
    }
}
