//! Observer plumbing shared by sync, auth and the query surface.
//!
//! # Responsibility
//! - Provide a generic subscription hub with guaranteed unsubscription
//!   on guard drop.
//! - Keep a capped in-process record of notable application events.
//!
//! # Invariants
//! - Dropping a [`Subscription`] always detaches its callback.
//! - Callbacks are invoked outside the subscriber lock, so a callback
//!   may subscribe or emit without deadlocking.

mod emitter;
mod recorder;

pub use emitter::{Emitter, Subscription};
pub use recorder::{EventCategory, EventEntry, EventRecorder};
