//! Command palette engine.
//!
//! Turns the live actor set plus static and plugin command sources into a
//! searchable command list, and routes a chosen command id back to whoever
//! owns it.
//!
//! Data flow for a query:
//!
//! 1. [`GroupResolver`] evaluates group activation rules against the
//!    [`CommandContext`].
//! 2. [`CommandIndex`] asks each active [`CommandProvider`] for commands,
//!    cache first.
//! 3. Commands outside eligible groups are dropped and [`search()`] ranks the
//!    rest.
//!
//! Execution goes through [`ExecutionRouter`], which always returns a single
//! [`switchyard_invocation::ApiResult`] regardless of where the command lives.
//!
//! # Concurrency & ordering
//!
//! * The index reads a provider's generation before calling `provide`, and
//!   the actor provider's generation is the registry generation (acquire
//!   load). A query issued after a registry change returns is therefore never
//!   served from a cache entry computed before it.
//! * No lock is held across a provider or actor call except the target
//!   actor's own exclusion.

mod command;
pub mod config;
mod context;
mod error;
mod group;
mod index;
mod palette;
pub mod provider;
mod router;
pub mod search;

pub use command::{ACTOR_NAMESPACE, Command, CommandTarget, GLOBAL_NAMESPACE, PLUGIN_NAMESPACE};
pub use config::{CacheConfig, PaletteConfig, SearchConfig};
pub use context::CommandContext;
pub use error::{ConfigError, PaletteError};
pub use group::{ActivationPredicate, CommandGroup, GroupActivation, GroupResolver};
pub use index::{CommandIndex, IndexStats};
pub use palette::{CommandPalette, PaletteBuilder};
pub use provider::{ActorCommandProvider, CommandProvider, GlobalCommand, GlobalCommandProvider};
pub use router::{ExecutionRouter, LastExecuted};
pub use search::{SearchHit, search};

#[cfg(test)]
mod tests;
