//! Command providers.
//!
//! A provider is a pluggable source of [`Command`]s queried by the
//! [`crate::CommandIndex`]. Two kinds ship with the crate:
//!
//! * [`GlobalCommandProvider`]: a static table of actor-independent commands
//!   with their handlers, fixed once the palette is built.
//! * [`ActorCommandProvider`]: one command per method published by each live
//!   actor, derived from the [`switchyard_registry::ActorRegistry`].
//!
//! Hosts and plugins add their own by implementing [`CommandProvider`].

mod actor;
mod global;

pub use actor::ActorCommandProvider;
pub use global::{GlobalCommand, GlobalCommandProvider, GlobalHandler, action_handler};
use switchyard_invocation::{ApiError, ApiParams, ApiResult};

use crate::command::Command;
use crate::context::CommandContext;

/// A source of commands.
///
/// Implementations are shared across threads and queried concurrently. A
/// provider that fails (returns `Err` or panics) contributes no commands for
/// that query; other providers are unaffected.
pub trait CommandProvider: Send + Sync {
	/// Stable identity. Also the cache key half and, for plugins, the
	/// `plugin:<provider_id>:<name>` routing segment.
	fn provider_id(&self) -> &str;

	/// Advances whenever [`CommandProvider::provide`] would return something
	/// different for the same context. Cached output is reused while this is
	/// unchanged.
	fn generation(&self) -> u64 {
		0
	}

	/// Whether this provider participates for `ctx` at all.
	fn is_active(&self, _ctx: &CommandContext) -> bool {
		true
	}

	fn provide(&self, ctx: &CommandContext) -> Result<Vec<Command>, ApiError>;

	/// Executes one of this provider's own commands. `id` is the full command
	/// id, for error messages.
	fn execute(&self, id: &str, _name: &str, _params: &ApiParams, _ctx: &CommandContext) -> ApiResult {
		Err(ApiError::unknown_command(id))
	}
}
