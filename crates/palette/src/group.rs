//! Command groups and activation rules.
//!
//! Groups are configuration: loaded once and read-only at query time. The
//! only runtime mutation is registering custom predicates, which plugins may
//! do at any point after startup.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::{Mutex, RwLock};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use switchyard_invocation::panic_message;
use tracing::{debug, warn};

use crate::command::Command;
use crate::context::CommandContext;
use crate::error::{ConfigError, Result};

/// Custom activation logic registered under a predicate id.
pub type ActivationPredicate = Arc<dyn Fn(&CommandContext) -> bool + Send + Sync>;

/// When a group's commands are eligible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupActivation {
	/// Always eligible.
	Always,
	/// Eligible when an actor of this type has focus.
	ActorType(String),
	/// Eligible when an actor of any of these types has focus.
	ActorGroup(Vec<String>),
	/// Eligible while this view system is active.
	ViewSystem(String),
	/// Eligible when the predicate registered under this id returns true.
	Custom(String),
}

/// Named set of commands sharing an activation rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandGroup {
	pub name: String,
	#[serde(default)]
	pub title: Option<String>,
	#[serde(default)]
	pub description: Option<String>,
	#[serde(default = "enabled_by_default")]
	pub enabled: bool,
	pub activation_rule: GroupActivation,
	/// Exact command ids or prefix patterns ending in `*`.
	#[serde(default)]
	pub command_ids: Vec<String>,
	/// Actor types whose commands belong to this group.
	#[serde(default)]
	pub actor_types: Vec<String>,
}

fn enabled_by_default() -> bool {
	true
}

impl CommandGroup {
	pub fn new(name: impl Into<String>, activation_rule: GroupActivation) -> Self {
		Self {
			name: name.into(),
			title: None,
			description: None,
			enabled: true,
			activation_rule,
			command_ids: Vec::new(),
			actor_types: Vec::new(),
		}
	}

	pub fn title(mut self, title: impl Into<String>) -> Self {
		self.title = Some(title.into());
		self
	}

	pub fn description(mut self, description: impl Into<String>) -> Self {
		self.description = Some(description.into());
		self
	}

	pub fn commands<I, S>(mut self, ids: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.command_ids.extend(ids.into_iter().map(Into::into));
		self
	}

	pub fn actor_types<I, S>(mut self, types: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.actor_types.extend(types.into_iter().map(Into::into));
		self
	}

	pub fn disabled(mut self) -> Self {
		self.enabled = false;
		self
	}
}

/// Evaluates group activation rules against a context.
pub struct GroupResolver {
	groups: IndexMap<String, CommandGroup>,
	exact: FxHashMap<String, usize>,
	prefixes: Vec<(String, usize)>,
	by_actor_type: FxHashMap<String, usize>,
	predicates: RwLock<FxHashMap<String, ActivationPredicate>>,
	reported_missing: Mutex<FxHashSet<String>>,
}

impl std::fmt::Debug for GroupResolver {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("GroupResolver")
			.field("groups", &self.groups.keys().collect::<Vec<_>>())
			.field("predicates", &self.predicates.read().keys().collect::<Vec<_>>())
			.finish_non_exhaustive()
	}
}

impl GroupResolver {
	/// Builds a resolver over `groups` in declaration order.
	///
	/// Fails on duplicate group names and on patterns with a `*` anywhere but
	/// the end. When two groups claim the same command, the first declaration wins.
	pub fn new(groups: impl IntoIterator<Item = CommandGroup>) -> Result<Self> {
		let mut by_name = IndexMap::new();
		let mut exact = FxHashMap::default();
		let mut prefixes = Vec::new();
		let mut by_actor_type = FxHashMap::default();

		for group in groups {
			if group.name.is_empty() {
				return Err(ConfigError::InvalidGroup {
					name: group.name,
					reason: "group name is empty".to_string(),
				});
			}
			if by_name.contains_key(&group.name) {
				return Err(ConfigError::InvalidGroup {
					name: group.name,
					reason: "declared more than once".to_string(),
				});
			}
			let index = by_name.len();
			for pattern in &group.command_ids {
				match pattern.find('*') {
					None => {
						exact.entry(pattern.clone()).or_insert(index);
					}
					Some(at) if at == pattern.len() - 1 => prefixes.push((pattern[..at].to_string(), index)),
					Some(_) => {
						return Err(ConfigError::InvalidGroup {
							name: group.name,
							reason: format!("pattern '{pattern}' may only end in '*'"),
						});
					}
				}
			}
			for actor_type in &group.actor_types {
				by_actor_type.entry(actor_type.clone()).or_insert(index);
			}
			by_name.insert(group.name.clone(), group);
		}

		Ok(Self {
			groups: by_name,
			exact,
			prefixes,
			by_actor_type,
			predicates: RwLock::new(FxHashMap::default()),
			reported_missing: Mutex::new(FxHashSet::default()),
		})
	}

	pub fn groups(&self) -> impl Iterator<Item = &CommandGroup> {
		self.groups.values()
	}

	pub fn group(&self, name: &str) -> Option<&CommandGroup> {
		self.groups.get(name)
	}

	/// Registers or replaces a custom predicate.
	pub fn add_predicate(&self, id: impl Into<String>, predicate: ActivationPredicate) {
		let id = id.into();
		self.reported_missing.lock().remove(&id);
		self.predicates.write().insert(id, predicate);
	}

	/// Group a command belongs to: configured ids and patterns first, then
	/// configured actor types, then the group its provider assigned.
	pub fn group_of<'a>(&'a self, command: &'a Command) -> Option<&'a str> {
		if let Some(&index) = self.exact.get(&command.id) {
			return self.groups.get_index(index).map(|(name, _)| name.as_str());
		}
		let configured = self
			.prefixes
			.iter()
			.filter(|(prefix, _)| command.id.starts_with(prefix.as_str()))
			.max_by_key(|(prefix, _)| prefix.len())
			.and_then(|&(_, index)| self.groups.get_index(index))
			.map(|(name, _)| name.as_str());
		let by_type = || {
			let index = *self.by_actor_type.get(command.actor_type.as_deref()?)?;
			self.groups.get_index(index).map(|(name, _)| name.as_str())
		};
		configured.or_else(by_type).or(command.group.as_deref())
	}

	/// Names of the groups eligible for `ctx`.
	pub fn eligible_groups(&self, ctx: &CommandContext) -> FxHashSet<&str> {
		self.groups.values().filter(|g| self.is_active(g, ctx)).map(|g| g.name.as_str()).collect()
	}

	/// Whether `command` may be offered given the eligible set from
	/// [`GroupResolver::eligible_groups`]. Commands without a group, or whose
	/// group is not declared, are always eligible.
	pub fn is_eligible(&self, command: &Command, eligible: &FxHashSet<&str>) -> bool {
		match self.group_of(command) {
			Some(name) if self.groups.contains_key(name) => eligible.contains(name),
			_ => true,
		}
	}

	pub fn is_active(&self, group: &CommandGroup, ctx: &CommandContext) -> bool {
		if !group.enabled {
			return false;
		}
		match &group.activation_rule {
			GroupActivation::Always => true,
			GroupActivation::ActorType(actor_type) => ctx.focused_actor_type.as_deref() == Some(actor_type.as_str()),
			GroupActivation::ActorGroup(types) => ctx.focused_actor_type.as_ref().is_some_and(|focused| types.contains(focused)),
			GroupActivation::ViewSystem(view) => ctx.active_view.as_deref() == Some(view.as_str()),
			GroupActivation::Custom(id) => self.evaluate_custom(&group.name, id, ctx),
		}
	}

	fn evaluate_custom(&self, group: &str, id: &str, ctx: &CommandContext) -> bool {
		let Some(predicate) = self.predicates.read().get(id).cloned() else {
			if self.reported_missing.lock().insert(id.to_string()) {
				debug!(group, predicate = id, "custom predicate not registered; group inactive");
			}
			return false;
		};
		catch_unwind(AssertUnwindSafe(|| predicate(ctx))).unwrap_or_else(|payload| {
			warn!(group, predicate = id, message = %panic_message(&*payload), "custom predicate panicked; group inactive");
			false
		})
	}
}
