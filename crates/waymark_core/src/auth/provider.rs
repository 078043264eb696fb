//! Identity provider contract.
//!
//! # Responsibility
//! - Describe what the core needs from an external auth backend:
//!   credential exchange, session introspection, and change events.

use crate::event::Subscription;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// An authenticated session as handed out by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    /// Stable identity string; becomes `owner_id` on claimed records.
    pub identity: String,
    /// Bearer token for the sync transport.
    pub token: String,
}

/// Auth state transitions published by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    SignedIn { identity: String },
    SignedOut,
    TokenRefreshed,
}

/// Provider-side failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Credentials were rejected by the provider.
    InvalidCredentials,
    /// The provider refused to create the account.
    SignUpRejected(String),
    /// No session is active where one is required.
    NotSignedIn,
    /// The session was already expired when the operation ran.
    SessionExpired,
    /// The provider could not be reached.
    Unavailable(String),
    Other(String),
}

impl Display for AuthError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidCredentials => write!(f, "invalid credentials"),
            Self::SignUpRejected(reason) => write!(f, "sign-up rejected: {reason}"),
            Self::NotSignedIn => write!(f, "no active session"),
            Self::SessionExpired => write!(f, "session already expired"),
            Self::Unavailable(reason) => write!(f, "auth provider unavailable: {reason}"),
            Self::Other(reason) => write!(f, "auth provider error: {reason}"),
        }
    }
}

impl Error for AuthError {}

/// External identity provider seam.
///
/// Implementations wrap a real auth backend; tests supply mocks.
pub trait AuthTokenProvider: Send + Sync {
    fn sign_up(&self, email: &str, password: &str) -> Result<(), AuthError>;
    fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AuthError>;
    fn sign_out(&self) -> Result<(), AuthError>;
    fn current_session(&self) -> Option<AuthSession>;
    fn on_auth_event(&self, callback: Box<dyn Fn(&AuthEvent) + Send + Sync>) -> Subscription;
}
