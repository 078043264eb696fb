//! Identity caching wrapper over the provider seam.
//!
//! # Responsibility
//! - Track the signed-in identity without re-querying the provider.
//! - Re-publish provider auth events through a core-owned emitter.
//!
//! # Invariants
//! - `current_identity()` reflects the last successful sign-in/out.
//! - Sign-out clears local state even when the provider reports the
//!   session already expired.

use crate::auth::provider::{AuthError, AuthEvent, AuthSession, AuthTokenProvider};
use crate::event::{Emitter, EventCategory, EventRecorder, Subscription};
use log::{info, warn};
use std::sync::{Arc, Mutex};

pub struct AuthService {
    provider: Arc<dyn AuthTokenProvider>,
    identity: Mutex<Option<String>>,
    events: Emitter<AuthEvent>,
    recorder: Arc<EventRecorder>,
    _provider_sub: Subscription,
}

impl AuthService {
    pub fn new(provider: Arc<dyn AuthTokenProvider>, recorder: Arc<EventRecorder>) -> Self {
        let events = Emitter::new();
        let forward = events.clone();
        let provider_sub =
            provider.on_auth_event(Box::new(move |event| forward.emit(event)));

        Self {
            provider,
            identity: Mutex::new(None),
            events,
            recorder,
            _provider_sub: provider_sub,
        }
    }

    pub fn sign_up(&self, email: &str, password: &str) -> Result<(), AuthError> {
        self.provider.sign_up(email, password)?;
        info!("event=auth_sign_up module=auth status=ok");
        self.recorder
            .record(EventCategory::Auth, "sign-up accepted");
        Ok(())
    }

    pub fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        let session = self.provider.sign_in(email, password).map_err(|err| {
            warn!("event=auth_sign_in module=auth status=error error={err}");
            self.recorder.record_with_details(
                EventCategory::Error,
                "sign-in failed",
                &serde_json::json!({ "error": err.to_string() }),
            );
            err
        })?;

        *self.identity.lock().unwrap_or_else(|e| e.into_inner()) =
            Some(session.identity.clone());
        info!(
            "event=auth_sign_in module=auth status=ok identity={}",
            session.identity
        );
        self.recorder.record(EventCategory::Auth, "signed in");
        Ok(session)
    }

    /// Signs out and clears the cached identity.
    ///
    /// An already-expired provider session counts as success: the goal
    /// is a clean local state, which is reached either way.
    pub fn sign_out(&self) -> Result<(), AuthError> {
        let result = match self.provider.sign_out() {
            Ok(()) => Ok(()),
            Err(AuthError::SessionExpired) => {
                info!("event=auth_sign_out module=auth status=ok note=session_already_expired");
                Ok(())
            }
            Err(err) => Err(err),
        };

        *self.identity.lock().unwrap_or_else(|e| e.into_inner()) = None;
        if result.is_ok() {
            info!("event=auth_sign_out module=auth status=ok");
            self.recorder.record(EventCategory::Auth, "signed out");
        } else {
            warn!("event=auth_sign_out module=auth status=error");
        }
        result
    }

    pub fn current_identity(&self) -> Option<String> {
        self.identity
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn current_session(&self) -> Option<AuthSession> {
        self.provider.current_session()
    }

    /// Subscribes to auth transitions (provider events pass through).
    pub fn on_auth_event(
        &self,
        callback: impl Fn(&AuthEvent) + Send + Sync + 'static,
    ) -> Subscription {
        self.events.subscribe(callback)
    }
}
