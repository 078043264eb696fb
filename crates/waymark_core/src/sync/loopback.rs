//! In-process transport for tests and local development.
//!
//! # Responsibility
//! - Emulate the remote transport's session lifecycle without a
//!   network: `Connecting` then `Open` on start, `Closed` on end.
//! - Allow tests to reject configured tokens and inject failures.

use crate::event::{Emitter, Subscription};
use crate::sync::status::ConnectionStatus;
use crate::sync::transport::{SessionErrorKind, SyncTransport, TransportError, WriteFailure};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

#[derive(Default)]
pub struct LoopbackTransport {
    rejected_tokens: Mutex<HashSet<String>>,
    session_active: AtomicBool,
    sessions_started: AtomicUsize,
    sessions_ended: AtomicUsize,
    status_changes: Emitter<ConnectionStatus>,
    write_failures: Emitter<WriteFailure>,
    session_errors: Emitter<SessionErrorKind>,
}

impl LoopbackTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures `token` to be rejected on the next start attempts.
    pub fn reject_token(&self, token: &str) {
        self.rejected_tokens
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(token.to_string());
    }

    pub fn sessions_started(&self) -> usize {
        self.sessions_started.load(Ordering::SeqCst)
    }

    pub fn sessions_ended(&self) -> usize {
        self.sessions_ended.load(Ordering::SeqCst)
    }

    pub fn session_active(&self) -> bool {
        self.session_active.load(Ordering::SeqCst)
    }

    /// Simulates the remote invalidating the running session.
    pub fn inject_session_error(&self, kind: SessionErrorKind) {
        self.session_errors.emit(&kind);
    }

    /// Simulates a write the remote refused to accept.
    pub fn inject_write_failure(&self, message: &str) {
        self.write_failures.emit(&WriteFailure {
            message: message.to_string(),
        });
    }
}

impl SyncTransport for LoopbackTransport {
    fn start_session(&self, token: &str) -> Result<(), TransportError> {
        if self
            .rejected_tokens
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(token)
        {
            return Err(TransportError::Rejected {
                code: "invalid_token".to_string(),
                message: "token rejected by loopback transport".to_string(),
            });
        }

        self.sessions_started.fetch_add(1, Ordering::SeqCst);
        self.session_active.store(true, Ordering::SeqCst);
        self.status_changes.emit(&ConnectionStatus::Connecting);
        self.status_changes.emit(&ConnectionStatus::Open);
        Ok(())
    }

    fn end_session(&self) {
        // Ending without an active session is a no-op, matching a
        // transport that ignores redundant teardown.
        if !self.session_active.swap(false, Ordering::SeqCst) {
            return;
        }
        self.sessions_ended.fetch_add(1, Ordering::SeqCst);
        self.status_changes.emit(&ConnectionStatus::Closed);
    }

    fn on_status_change(
        &self,
        callback: Box<dyn Fn(&ConnectionStatus) + Send + Sync>,
    ) -> Subscription {
        self.status_changes.subscribe(move |status| callback(status))
    }

    fn on_write_failure(
        &self,
        callback: Box<dyn Fn(&WriteFailure) + Send + Sync>,
    ) -> Subscription {
        self.write_failures.subscribe(move |failure| callback(failure))
    }

    fn on_session_error(
        &self,
        callback: Box<dyn Fn(&SessionErrorKind) + Send + Sync>,
    ) -> Subscription {
        self.session_errors.subscribe(move |kind| callback(kind))
    }
}
