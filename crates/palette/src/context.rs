use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

use rustc_hash::FxHasher;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use switchyard_registry::ActorId;

/// Read-only view of UI state, refreshed by the host before each query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandContext {
	/// Type tag of the focused actor, if any.
	pub focused_actor_type: Option<String>,
	/// Identity of the focused actor, if any.
	pub focused_actor: Option<ActorId>,
	/// Active view or system tag (e.g. `scene`, `tiling`).
	pub active_view: Option<String>,
	/// Host-defined values, consulted by custom predicates and plugin providers.
	pub extras: BTreeMap<String, Value>,
}

impl CommandContext {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn focused(mut self, actor_type: impl Into<String>) -> Self {
		self.focused_actor_type = Some(actor_type.into());
		self
	}

	pub fn focused_actor(mut self, id: ActorId) -> Self {
		self.focused_actor = Some(id);
		self
	}

	pub fn view(mut self, view: impl Into<String>) -> Self {
		self.active_view = Some(view.into());
		self
	}

	pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
		self.extras.insert(key.into(), value.into());
		self
	}

	/// Stable 64-bit digest of every field, used as the context half of a cache key.
	///
	/// Equal contexts always produce equal signatures within a process.
	pub fn signature(&self) -> u64 {
		let mut hasher = FxHasher::default();
		self.focused_actor_type.hash(&mut hasher);
		self.focused_actor.hash(&mut hasher);
		self.active_view.hash(&mut hasher);
		self.extras.len().hash(&mut hasher);
		for (key, value) in &self.extras {
			key.hash(&mut hasher);
			// serde_json::Value has no Hash; its canonical text does.
			value.to_string().hash(&mut hasher);
		}
		hasher.finish()
	}
}
