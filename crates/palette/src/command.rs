use serde::{Deserialize, Serialize};
use switchyard_invocation::ApiError;
use switchyard_registry::ActorId;

pub const GLOBAL_NAMESPACE: &str = "global";
pub const ACTOR_NAMESPACE: &str = "actor";
pub const PLUGIN_NAMESPACE: &str = "plugin";

/// Display-ready, searchable unit derived from a global action, an actor
/// method or a plugin.
///
/// Commands are derived data. They are rebuilt whenever their source changes
/// and never consulted as the source of truth for execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
	/// Namespaced id: `global:<name>`, `actor:<id>:<method>` or `plugin:<provider>:<name>`.
	pub id: String,
	pub title: String,
	pub description: Option<String>,
	pub category: String,
	/// Display-only key hint.
	pub shortcut: Option<String>,
	/// Group the provider assigned. Configured group membership overrides it.
	pub group: Option<String>,
	/// Type of the actor an `actor:` command dispatches to.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub actor_type: Option<String>,
	pub enabled: bool,
	/// Id of the provider that produced this command. Stamped by the index.
	#[serde(default)]
	pub provider: String,
	/// Registration order of that provider. Stamped by the index.
	#[serde(default)]
	pub provider_rank: usize,
}

impl Command {
	pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			title: title.into(),
			description: None,
			category: "General".to_string(),
			shortcut: None,
			group: None,
			actor_type: None,
			enabled: true,
			provider: String::new(),
			provider_rank: 0,
		}
	}

	pub fn global(name: &str, title: impl Into<String>) -> Self {
		Self::new(format!("{GLOBAL_NAMESPACE}:{name}"), title)
	}

	pub fn actor(actor: ActorId, method: &str, title: impl Into<String>) -> Self {
		Self::new(format!("{ACTOR_NAMESPACE}:{actor}:{method}"), title)
	}

	pub fn plugin(provider: &str, name: &str, title: impl Into<String>) -> Self {
		Self::new(format!("{PLUGIN_NAMESPACE}:{provider}:{name}"), title)
	}

	pub fn description(mut self, description: impl Into<String>) -> Self {
		self.description = Some(description.into());
		self
	}

	pub fn category(mut self, category: impl Into<String>) -> Self {
		self.category = category.into();
		self
	}

	pub fn shortcut(mut self, shortcut: impl Into<String>) -> Self {
		self.shortcut = Some(shortcut.into());
		self
	}

	pub fn group(mut self, group: impl Into<String>) -> Self {
		self.group = Some(group.into());
		self
	}

	pub fn actor_type(mut self, actor_type: impl Into<String>) -> Self {
		self.actor_type = Some(actor_type.into());
		self
	}

	pub fn disabled(mut self) -> Self {
		self.enabled = false;
		self
	}

	pub fn target(&self) -> Result<CommandTarget<'_>, ApiError> {
		CommandTarget::parse(&self.id)
	}
}

/// Where a command id routes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandTarget<'a> {
	Global { name: &'a str },
	Actor { actor: ActorId, method: &'a str },
	Plugin { provider: &'a str, name: &'a str },
}

impl<'a> CommandTarget<'a> {
	/// Parses a namespaced command id.
	///
	/// Anything that does not resolve to one of the three namespaces,
	/// including an actor segment that is not a valid id, is `UnknownCommand`.
	pub fn parse(id: &'a str) -> Result<Self, ApiError> {
		let unknown = || ApiError::unknown_command(id);
		let (namespace, rest) = id.split_once(':').ok_or_else(unknown)?;
		match namespace {
			GLOBAL_NAMESPACE if !rest.is_empty() => Ok(Self::Global { name: rest }),
			ACTOR_NAMESPACE => {
				let (actor, method) = rest.split_once(':').ok_or_else(unknown)?;
				let actor = actor.parse::<ActorId>().map_err(|_| unknown())?;
				if method.is_empty() {
					return Err(unknown());
				}
				Ok(Self::Actor { actor, method })
			}
			PLUGIN_NAMESPACE => match rest.split_once(':') {
				Some((provider, name)) if !provider.is_empty() && !name.is_empty() => Ok(Self::Plugin { provider, name }),
				_ => Err(unknown()),
			},
			_ => Err(unknown()),
		}
	}

	/// Provider responsible for executing this target, if it is provider-routed.
	pub fn provider(&self) -> Option<&'a str> {
		match *self {
			Self::Global { .. } => Some(GLOBAL_NAMESPACE),
			Self::Actor { .. } => None,
			Self::Plugin { provider, .. } => Some(provider),
		}
	}
}
