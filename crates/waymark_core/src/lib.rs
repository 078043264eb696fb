//! Core domain logic for Waymark, a local-first project and
//! point-of-interest store.
//! This crate is the single source of truth for business invariants.

pub mod auth;
pub mod config;
pub mod db;
pub mod event;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod sync;

pub use auth::{AuthError, AuthEvent, AuthService, AuthSession, AuthTokenProvider};
pub use config::{substitute_placeholders, ConfigError, SyncConfig};
pub use event::{Emitter, EventCategory, EventEntry, EventRecorder, Subscription};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::project::{Project, ProjectId, ProjectStatus, TransportMode};
pub use model::Collection;
pub use repo::project_repo::{ProjectListQuery, ProjectRepository, ProjectWithRelations};
pub use repo::{RepoError, RepoResult};
pub use service::{ProjectDetailWatch, ProjectService, ProjectsWatch, StoreContext};
pub use sync::{
    claim_all_local_collections, ClaimError, ClaimSummary, CollectionClaim, ConnectionStatus,
    ConnectionTracker, LoopbackTransport, SessionCoordinator, SessionErrorKind, SessionEvent,
    SessionStartError, SessionState, SyncTransport, TransportError, WriteFailure,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
