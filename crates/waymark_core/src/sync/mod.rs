//! Remote sync coordination.
//!
//! # Responsibility
//! - Track the transport connection status.
//! - Run the ownership claim pass over local records.
//! - Drive the session lifecycle between local-only and remote-synced.
//!
//! # Invariants
//! - The local store stays fully usable whatever the transport does.
//! - Claiming and session start never corrupt local data on failure.

pub mod claim;
pub mod loopback;
pub mod session;
pub mod status;
pub mod transport;

pub use claim::{claim_all_local_collections, ClaimError, ClaimSummary, CollectionClaim};
pub use loopback::LoopbackTransport;
pub use session::{SessionCoordinator, SessionEvent, SessionStartError, SessionState};
pub use status::{ConnectionStatus, ConnectionTracker};
pub use transport::{SessionErrorKind, SyncTransport, TransportError, WriteFailure};
