//! Actor registry.
//!
//! Owns the set of live actors, indexes them by identity, type and capability
//! tag, and executes each actor under its own exclusion so that a slow or
//! faulting actor never blocks or corrupts another.
//!
//! # Concurrency & ordering
//!
//! * Readers load an immutable [`ActorSnapshot`] and never take the writer lock.
//! * Writers (register, deregister, republish) are serialized and publish a
//!   replacement snapshot before bumping the [`Generation`] counter, so any
//!   reader that observes the new generation also observes the new snapshot.
//! * Dispatch locks only the target actor.

mod actor;
mod entry;
mod error;
mod generation;
mod registry;

pub use actor::{Actor, ActorId, ActorInfo};
pub use entry::{ActorEntry, Published};
pub use error::RegistryError;
pub use generation::Generation;
pub use registry::{ActorRegistry, ActorSnapshot};
