//! Application-facing services over the repository layer.
//!
//! # Responsibility
//! - Own the store handle callers pass around explicitly.
//! - Offer use-case level operations that publish change events.
//! - Provide pull-based live query handles for list and detail views.

pub mod context;
pub mod project_service;
pub mod watch;

pub use context::StoreContext;
pub use project_service::ProjectService;
pub use watch::{ProjectDetailWatch, ProjectsWatch};
