use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use arc_swap::ArcSwapOption;
use chrono::{DateTime, Utc};
use serde::Serialize;
use switchyard_invocation::{ApiError, ApiParams, ApiResult, panic_message};
use switchyard_registry::ActorRegistry;
use tracing::{debug, warn};

use crate::command::{CommandTarget, GLOBAL_NAMESPACE};
use crate::context::CommandContext;
use crate::index::CommandIndex;

/// Advisory record of the most recent successful execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LastExecuted {
	pub command_id: String,
	pub at: DateTime<Utc>,
}

/// Resolves command ids to their owner and normalizes every outcome to one
/// [`ApiResult`] shape.
pub struct ExecutionRouter {
	registry: Arc<ActorRegistry>,
	index: Arc<CommandIndex>,
	last: ArcSwapOption<LastExecuted>,
}

impl std::fmt::Debug for ExecutionRouter {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ExecutionRouter").field("last", &self.last.load_full()).finish_non_exhaustive()
	}
}

impl ExecutionRouter {
	pub fn new(registry: Arc<ActorRegistry>, index: Arc<CommandIndex>) -> Self {
		Self {
			registry,
			index,
			last: ArcSwapOption::empty(),
		}
	}

	/// Executes `command_id` with `params`.
	///
	/// * `global:<name>` runs the global handler table.
	/// * `actor:<id>:<method>` dispatches under that actor's exclusion; an id
	///   that no longer resolves is `ActorGone`.
	/// * `plugin:<provider>:<name>` runs the provider's own executor; a panic
	///   there is `ProviderFault`.
	pub fn execute(&self, command_id: &str, params: &ApiParams, ctx: &CommandContext) -> ApiResult {
		debug!(command = command_id, "executing command");
		let result = match CommandTarget::parse(command_id)? {
			CommandTarget::Actor { actor, method } => self.registry.dispatch(actor, method, params),
			CommandTarget::Global { name } => self.execute_provided(GLOBAL_NAMESPACE, command_id, name, params, ctx),
			CommandTarget::Plugin { provider, name } => self.execute_provided(provider, command_id, name, params, ctx),
		};
		if result.is_ok() {
			self.last.store(Some(Arc::new(LastExecuted {
				command_id: command_id.to_string(),
				at: Utc::now(),
			})));
		}
		result
	}

	pub fn last_executed(&self) -> Option<Arc<LastExecuted>> {
		self.last.load_full()
	}

	fn execute_provided(&self, provider_id: &str, command_id: &str, name: &str, params: &ApiParams, ctx: &CommandContext) -> ApiResult {
		let provider = self.index.provider(provider_id).ok_or_else(|| ApiError::unknown_command(command_id))?;
		catch_unwind(AssertUnwindSafe(|| provider.execute(command_id, name, params, ctx))).unwrap_or_else(|payload| {
			let message = panic_message(&*payload);
			warn!(provider = provider_id, command = command_id, %message, "provider panicked during execution");
			Err(ApiError::provider_fault(format!("provider '{provider_id}' panicked executing '{name}': {message}")))
		})
	}
}
