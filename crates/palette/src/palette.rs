use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;
use switchyard_invocation::{ApiParams, ApiResult};
use switchyard_registry::{ActorId, ActorInfo, ActorRegistry, RegistryError};

use crate::command::Command;
use crate::config::{PaletteConfig, SearchConfig};
use crate::context::CommandContext;
use crate::error::PaletteError;
use crate::group::{ActivationPredicate, CommandGroup, GroupResolver};
use crate::index::{CommandIndex, IndexStats};
use crate::provider::{ActorCommandProvider, CommandProvider, GlobalCommandProvider};
use crate::router::{ExecutionRouter, LastExecuted};
use crate::search::{SearchHit, search};

/// Assembles a [`CommandPalette`].
pub struct PaletteBuilder {
	registry: Arc<ActorRegistry>,
	config: PaletteConfig,
	globals: GlobalCommandProvider,
	providers: Vec<Arc<dyn CommandProvider>>,
}

impl PaletteBuilder {
	pub fn config(mut self, config: PaletteConfig) -> Self {
		self.config = config;
		self
	}

	/// Replaces the global command table (the built-in defaults otherwise).
	pub fn globals(mut self, globals: GlobalCommandProvider) -> Self {
		self.globals = globals;
		self
	}

	/// Adds a provider ranked after the global and actor providers.
	pub fn provider(mut self, provider: Arc<dyn CommandProvider>) -> Self {
		self.providers.push(provider);
		self
	}

	pub fn build(self) -> Result<CommandPalette, PaletteError> {
		let resolver = GroupResolver::new(self.config.groups)?;
		let index = Arc::new(CommandIndex::new(self.config.cache.capacity()));
		index.register_provider(Arc::new(self.globals))?;
		index.register_provider(Arc::new(ActorCommandProvider::new(Arc::clone(&self.registry))))?;
		for provider in self.providers {
			index.register_provider(provider)?;
		}
		let router = ExecutionRouter::new(Arc::clone(&self.registry), Arc::clone(&index));

		Ok(CommandPalette {
			registry: self.registry,
			index,
			resolver,
			router,
			search: self.config.search,
		})
	}
}

/// Search-driven entry point over the actor registry.
///
/// Shareable across threads: searches may run concurrently with each other,
/// with dispatch, and with registry membership changes.
#[derive(Debug)]
pub struct CommandPalette {
	registry: Arc<ActorRegistry>,
	index: Arc<CommandIndex>,
	resolver: GroupResolver,
	router: ExecutionRouter,
	search: SearchConfig,
}

impl CommandPalette {
	pub fn builder(registry: Arc<ActorRegistry>) -> PaletteBuilder {
		PaletteBuilder {
			registry,
			config: PaletteConfig::default(),
			globals: GlobalCommandProvider::with_defaults(),
			providers: Vec::new(),
		}
	}

	/// Palette with built-in globals, groups and limits.
	pub fn new(registry: Arc<ActorRegistry>) -> Result<Self, PaletteError> {
		Self::builder(registry).build()
	}

	pub fn registry(&self) -> &Arc<ActorRegistry> {
		&self.registry
	}

	/// Every command eligible for `ctx`: global commands first, then actor
	/// commands in registration order, then plugin commands.
	pub fn get_available_commands(&self, ctx: &CommandContext) -> Vec<Command> {
		let eligible = self.resolver.eligible_groups(ctx);
		let mut commands = self.index.commands(ctx);
		commands.retain(|command| self.resolver.is_eligible(command, &eligible));
		commands
	}

	/// Ranked hits for `query`. Side-effect free apart from cache warming.
	pub fn search(&self, query: &str, ctx: &CommandContext) -> Vec<SearchHit> {
		search(self.get_available_commands(ctx), query, &self.search)
	}

	pub fn search_commands(&self, query: &str, ctx: &CommandContext) -> Vec<Command> {
		self.search(query, ctx).into_iter().map(|hit| hit.command).collect()
	}

	/// Executes a command with no parameters.
	pub fn execute_command(&self, command_id: &str, ctx: &CommandContext) -> ApiResult {
		self.router.execute(command_id, &ApiParams::new(), ctx)
	}

	/// Executes a command with explicit parameters. Group eligibility is not
	/// re-checked so ids bound directly (e.g. to keys) always route.
	pub fn execute_command_with(&self, command_id: &str, params: &ApiParams, ctx: &CommandContext) -> ApiResult {
		self.router.execute(command_id, params, ctx)
	}

	/// Adds a provider at runtime, ranked after every existing one.
	pub fn register_provider(&self, provider: Arc<dyn CommandProvider>) -> Result<usize, PaletteError> {
		self.index.register_provider(provider)
	}

	/// Registers or replaces the predicate behind `GroupActivation::Custom(id)`.
	pub fn add_custom_activator<F>(&self, id: impl Into<String>, predicate: F)
	where
		F: Fn(&CommandContext) -> bool + Send + Sync + 'static,
	{
		let predicate: ActivationPredicate = Arc::new(predicate);
		self.resolver.add_predicate(id, predicate);
	}

	pub fn groups(&self) -> impl Iterator<Item = &CommandGroup> {
		self.resolver.groups()
	}

	/// Whether `group` is eligible for `ctx`. Unknown groups are not.
	pub fn is_group_active(&self, group: &str, ctx: &CommandContext) -> bool {
		self.resolver.group(group).is_some_and(|g| self.resolver.is_active(g, ctx))
	}

	pub fn get_actors_info(&self) -> Vec<ActorInfo> {
		self.registry.actors_info()
	}

	pub fn get_actor_state(&self, id: ActorId) -> Result<BTreeMap<String, Value>, RegistryError> {
		self.registry.actor_state(id)
	}

	pub fn last_executed(&self) -> Option<Arc<LastExecuted>> {
		self.router.last_executed()
	}

	pub fn stats(&self) -> IndexStats {
		self.index.stats()
	}

	pub fn index(&self) -> &CommandIndex {
		&self.index
	}

	pub fn search_config(&self) -> &SearchConfig {
		&self.search
	}
}
