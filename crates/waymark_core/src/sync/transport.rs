//! Remote transport seam.
//!
//! # Responsibility
//! - Describe what the core needs from a remote sync engine: session
//!   control and notifications for status, write failures, and
//!   server-side session invalidation.

use crate::event::Subscription;
use crate::sync::status::ConnectionStatus;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Failure starting or running a transport session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The remote rejected the session (bad or expired token, policy).
    Rejected { code: String, message: String },
    /// The transport could not reach the remote at all.
    Unavailable(String),
}

impl Display for TransportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rejected { code, message } => {
                write!(f, "session rejected ({code}): {message}")
            }
            Self::Unavailable(reason) => write!(f, "transport unavailable: {reason}"),
        }
    }
}

impl Error for TransportError {}

/// Why the remote invalidated a running session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionErrorKind {
    TokenExpired,
    TokenInvalid,
    Other(String),
}

impl Display for SessionErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TokenExpired => write!(f, "token expired"),
            Self::TokenInvalid => write!(f, "token invalid"),
            Self::Other(reason) => write!(f, "{reason}"),
        }
    }
}

/// A write the transport failed to push to the remote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteFailure {
    pub message: String,
}

/// Remote sync engine seam.
///
/// The core drives sessions through this trait and observes the
/// transport through the three subscription hooks. Subscriptions are
/// guards; dropping one detaches its callback.
pub trait SyncTransport: Send + Sync {
    fn start_session(&self, token: &str) -> Result<(), TransportError>;
    fn end_session(&self);
    fn on_status_change(
        &self,
        callback: Box<dyn Fn(&ConnectionStatus) + Send + Sync>,
    ) -> Subscription;
    fn on_write_failure(&self, callback: Box<dyn Fn(&WriteFailure) + Send + Sync>)
        -> Subscription;
    fn on_session_error(
        &self,
        callback: Box<dyn Fn(&SessionErrorKind) + Send + Sync>,
    ) -> Subscription;
}
