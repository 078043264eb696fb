//! Session lifecycle coordination.
//!
//! # Responsibility
//! - Drive the store between local-only and remote-synced operation:
//!   claim local records, attach the transport, track the session.
//! - Turn transport-side session invalidation into a local sign-out
//!   plus a notification the presentation layer can act on.
//!
//! # Invariants
//! - Token validation happens before any transport call.
//! - A rejected session start always lands back in `LocalOnly` with
//!   the transport torn down.
//! - Claim failures never fail a login; the store keeps working
//!   locally whatever the transport does.

use crate::event::{Emitter, EventCategory, EventRecorder, Subscription};
use crate::service::StoreContext;
use crate::sync::claim::{claim_all_local_collections, ClaimError, ClaimSummary};
use crate::sync::status::ConnectionTracker;
use crate::sync::transport::{SessionErrorKind, SyncTransport, TransportError, WriteFailure};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Arc, Mutex};

/// Where the store currently stands relative to the remote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No identity attached; all work is local.
    LocalOnly,
    /// Claim pass in progress.
    Claiming,
    /// Transport session being established.
    Authenticating,
    /// Transport connected and open.
    RemoteSynced,
}

impl SessionState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::LocalOnly => "local_only",
            Self::Claiming => "claiming",
            Self::Authenticating => "authenticating",
            Self::RemoteSynced => "remote_synced",
        }
    }
}

impl Display for SessionState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Session notification for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The remote invalidated the running session; a re-login is
    /// required. The coordinator has already returned to `LocalOnly`.
    SessionInvalidated(SessionErrorKind),
}

/// A login attempt failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStartError {
    MissingToken,
    MissingIdentity,
    Rejected(TransportError),
}

impl Display for SessionStartError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingToken => write!(f, "session start requires a non-empty token"),
            Self::MissingIdentity => write!(f, "session start requires a non-empty identity"),
            Self::Rejected(err) => write!(f, "session start rejected: {err}"),
        }
    }
}

impl Error for SessionStartError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Rejected(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ClaimError> for SessionStartError {
    fn from(value: ClaimError) -> Self {
        match value {
            ClaimError::EmptyIdentity => Self::MissingIdentity,
        }
    }
}

struct SessionShared {
    state: Mutex<SessionState>,
    identity: Mutex<Option<String>>,
    tracker: ConnectionTracker,
    events: Emitter<SessionEvent>,
    recorder: Arc<EventRecorder>,
}

impl SessionShared {
    fn set_state(&self, next: SessionState) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if *state == next {
            return;
        }
        info!(
            "event=session_state module=sync status=ok from={} to={next}",
            *state
        );
        *state = next;
    }
}

/// Coordinates claim, transport attach, and session teardown.
pub struct SessionCoordinator {
    transport: Arc<dyn SyncTransport>,
    shared: Arc<SessionShared>,
    _status_sub: Subscription,
    _write_sub: Subscription,
    _error_sub: Subscription,
}

impl SessionCoordinator {
    pub fn new(transport: Arc<dyn SyncTransport>, recorder: Arc<EventRecorder>) -> Self {
        let shared = Arc::new(SessionShared {
            state: Mutex::new(SessionState::LocalOnly),
            identity: Mutex::new(None),
            tracker: ConnectionTracker::new(Arc::clone(&recorder)),
            events: Emitter::new(),
            recorder,
        });

        let status_shared = Arc::clone(&shared);
        let status_sub = transport.on_status_change(Box::new(move |status| {
            status_shared.tracker.record(*status);
        }));

        let write_shared = Arc::clone(&shared);
        let write_sub = transport.on_write_failure(Box::new(move |failure: &WriteFailure| {
            warn!(
                "event=sync_write module=sync status=error error={}",
                failure.message
            );
            write_shared.recorder.record_with_details(
                EventCategory::Error,
                "remote rejected a write",
                &serde_json::json!({ "error": failure.message }),
            );
        }));

        let error_shared = Arc::clone(&shared);
        let error_transport = Arc::clone(&transport);
        let error_sub = transport.on_session_error(Box::new(move |kind: &SessionErrorKind| {
            warn!("event=session_error module=sync status=error kind={kind}");
            error_transport.end_session();
            *error_shared
                .identity
                .lock()
                .unwrap_or_else(|e| e.into_inner()) = None;
            error_shared.set_state(SessionState::LocalOnly);
            error_shared.recorder.record(
                EventCategory::Sync,
                format!("session invalidated: {kind}"),
            );
            error_shared
                .events
                .emit(&SessionEvent::SessionInvalidated(kind.clone()));
        }));

        Self {
            transport,
            shared,
            _status_sub: status_sub,
            _write_sub: write_sub,
            _error_sub: error_sub,
        }
    }

    pub fn state(&self) -> SessionState {
        *self
            .shared
            .state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
    }

    pub fn identity(&self) -> Option<String> {
        self.shared
            .identity
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn tracker(&self) -> &ConnectionTracker {
        &self.shared.tracker
    }

    pub fn on_session_event(
        &self,
        callback: impl Fn(&SessionEvent) + Send + Sync + 'static,
    ) -> Subscription {
        self.shared.events.subscribe(callback)
    }

    /// Starts a transport session with `token`, tearing down any
    /// previous session first.
    ///
    /// The token is validated before the transport is touched. On
    /// rejection the transport is forced closed and the coordinator
    /// stays in `LocalOnly`.
    pub fn start_authenticated_session(&self, token: &str) -> Result<(), SessionStartError> {
        if token.trim().is_empty() {
            warn!("event=session_start module=sync status=rejected reason=missing_token");
            return Err(SessionStartError::MissingToken);
        }

        // Clean slate: any previous session ends before the new one,
        // whether or not one is known to be active.
        self.transport.end_session();
        self.shared.set_state(SessionState::Authenticating);

        if let Err(err) = self.transport.start_session(token.trim()) {
            warn!("event=session_start module=sync status=error error={err}");
            self.transport.end_session();
            self.shared.set_state(SessionState::LocalOnly);
            self.shared.recorder.record_with_details(
                EventCategory::Error,
                "session start rejected",
                &serde_json::json!({ "error": err.to_string() }),
            );
            return Err(SessionStartError::Rejected(err));
        }

        info!("event=session_start module=sync status=ok");
        Ok(())
    }

    /// Full login: claim local records for `identity`, attach the
    /// transport with `token`, and wait until the connection is open.
    ///
    /// Returns the claim summary; per-record claim failures are part
    /// of the summary, never a login failure.
    pub fn login(
        &self,
        context: &StoreContext,
        identity: &str,
        token: &str,
    ) -> Result<ClaimSummary, SessionStartError> {
        if token.trim().is_empty() {
            warn!("event=login module=sync status=rejected reason=missing_token");
            return Err(SessionStartError::MissingToken);
        }

        self.shared.set_state(SessionState::Claiming);
        let summary =
            match claim_all_local_collections(context.conn(), identity, context.recorder()) {
                Ok(summary) => summary,
                Err(err) => {
                    self.shared.set_state(SessionState::LocalOnly);
                    return Err(err.into());
                }
            };
        for collection in summary.changed_collections() {
            context.notify_change(collection);
        }

        // On rejection start_authenticated_session has already
        // restored LocalOnly.
        self.start_authenticated_session(token)?;

        self.shared.tracker.wait_for_open();
        *self
            .shared
            .identity
            .lock()
            .unwrap_or_else(|e| e.into_inner()) = Some(summary.identity.clone());
        self.shared.set_state(SessionState::RemoteSynced);
        info!(
            "event=login module=sync status=ok identity={} claimed={}",
            summary.identity,
            summary.total_claimed()
        );
        self.shared
            .recorder
            .record(EventCategory::Sync, "remote session established");

        Ok(summary)
    }

    /// Ends the transport session and returns to local-only operation.
    pub fn end_session(&self) {
        self.transport.end_session();
        *self
            .shared
            .identity
            .lock()
            .unwrap_or_else(|e| e.into_inner()) = None;
        self.shared.set_state(SessionState::LocalOnly);
        info!("event=session_end module=sync status=ok");
        self.shared
            .recorder
            .record(EventCategory::Sync, "session ended");
    }
}
