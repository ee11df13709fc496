use std::collections::BTreeMap;
use std::sync::Arc;

use arc_swap::ArcSwap;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use serde_json::Value;
use switchyard_invocation::{ApiParams, ApiResult};
use tracing::debug;

use crate::actor::{Actor, ActorId, ActorInfo};
use crate::entry::ActorEntry;
use crate::error::RegistryError;
use crate::generation::Generation;

/// Immutable view of the live actor set.
#[derive(Debug, Default, Clone)]
pub struct ActorSnapshot {
	order: Vec<Arc<ActorEntry>>,
	by_id: FxHashMap<ActorId, Arc<ActorEntry>>,
	by_type: FxHashMap<String, Vec<ActorId>>,
	by_capability: FxHashMap<String, Vec<ActorId>>,
}

impl ActorSnapshot {
	fn from_entries(order: Vec<Arc<ActorEntry>>) -> Self {
		let mut by_id = FxHashMap::default();
		let mut by_type: FxHashMap<String, Vec<ActorId>> = FxHashMap::default();
		let mut by_capability: FxHashMap<String, Vec<ActorId>> = FxHashMap::default();
		for entry in &order {
			by_id.insert(entry.id(), Arc::clone(entry));
			by_type.entry(entry.actor_type().to_string()).or_default().push(entry.id());
			for tag in &entry.published().capabilities {
				let ids = by_capability.entry(tag.clone()).or_default();
				if !ids.contains(&entry.id()) {
					ids.push(entry.id());
				}
			}
		}
		Self {
			order,
			by_id,
			by_type,
			by_capability,
		}
	}

	/// Live entries in registration order.
	pub fn entries(&self) -> &[Arc<ActorEntry>] {
		&self.order
	}

	pub fn get(&self, id: ActorId) -> Option<&Arc<ActorEntry>> {
		self.by_id.get(&id)
	}

	pub fn len(&self) -> usize {
		self.order.len()
	}

	pub fn is_empty(&self) -> bool {
		self.order.is_empty()
	}

	fn find_instance(&self, instance: uuid::Uuid) -> Option<ActorId> {
		self.order.iter().find(|e| e.instance() == instance).map(|e| e.id())
	}
}

/// Single owner of actor membership.
///
/// Passed explicitly (usually as `Arc<ActorRegistry>`) to every component
/// that needs it; its [`Generation`] is the only externally observable
/// mutation signal.
#[derive(Debug, Default)]
pub struct ActorRegistry {
	snap: ArcSwap<ActorSnapshot>,
	writer: Mutex<()>,
	generation: Generation,
}

impl ActorRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Current generation. Advances on register, deregister and method republish.
	pub fn generation(&self) -> u64 {
		self.generation.current()
	}

	/// Pins the current membership.
	pub fn snapshot(&self) -> Arc<ActorSnapshot> {
		self.snap.load_full()
	}

	pub fn register(&self, actor: Box<dyn Actor>) -> Result<ActorId, RegistryError> {
		let _writer = self.writer.lock();
		let current = self.snap.load_full();

		let entry = ActorEntry::new(ActorId::next(), actor)?;
		if let Some(existing) = current.find_instance(entry.instance()) {
			return Err(RegistryError::DuplicateRegistration {
				instance: entry.instance(),
				existing,
			});
		}

		let id = entry.id();
		let actor_type = entry.actor_type().to_string();
		let mut order = current.order.clone();
		order.push(Arc::new(entry));
		self.snap.store(Arc::new(ActorSnapshot::from_entries(order)));
		let generation = self.generation.bump();

		debug!(actor = %id, %actor_type, generation, "registered actor");
		Ok(id)
	}

	/// Removes an actor. A no-op when the id is absent.
	///
	/// Calls that already hold the actor's lock run to completion; any call
	/// acquiring it afterwards fails with `ActorGone`.
	pub fn deregister(&self, id: ActorId) {
		let _writer = self.writer.lock();
		let current = self.snap.load_full();
		let Some(entry) = current.get(id) else {
			return;
		};
		entry.retire();

		let order = current.order.iter().filter(|e| e.id() != id).cloned().collect();
		self.snap.store(Arc::new(ActorSnapshot::from_entries(order)));
		let generation = self.generation.bump();

		debug!(actor = %id, generation, "deregistered actor");
	}

	pub fn lookup(&self, id: ActorId) -> Result<Arc<ActorEntry>, RegistryError> {
		self.snap.load().get(id).cloned().ok_or(RegistryError::NotFound(id))
	}

	pub fn find_by_type(&self, actor_type: &str) -> Vec<ActorId> {
		self.snap.load().by_type.get(actor_type).cloned().unwrap_or_default()
	}

	pub fn find_by_capability(&self, tag: &str) -> Vec<ActorId> {
		self.snap.load().by_capability.get(tag).cloned().unwrap_or_default()
	}

	pub fn len(&self) -> usize {
		self.snap.load().len()
	}

	pub fn is_empty(&self) -> bool {
		self.snap.load().is_empty()
	}

	/// Executes `method` on actor `id` under that actor's exclusion.
	///
	/// Parameters are validated against the published descriptor before the
	/// actor is touched. If the actor advanced its api generation during the
	/// call, its methods are republished and the registry generation bumps.
	pub fn dispatch(&self, id: ActorId, method: &str, params: &ApiParams) -> ApiResult {
		let entry = self.lookup(id)?;
		let (result, republished) = entry.call(method, params);
		if republished {
			self.after_republish(&entry);
		}
		result
	}

	/// Re-reads an actor's methods and capabilities. Returns whether anything changed.
	///
	/// Waits for any in-flight call on that actor.
	pub fn refresh_methods(&self, id: ActorId) -> Result<bool, RegistryError> {
		let entry = self.lookup(id)?;
		let changed = entry.refresh()?;
		if changed {
			self.after_republish(&entry);
		}
		Ok(changed)
	}

	pub fn actors_info(&self) -> Vec<ActorInfo> {
		self.snap.load().order.iter().map(|e| e.info()).collect()
	}

	/// The actor's [`Actor::get_state`] snapshot. Waits for any in-flight call on that actor.
	pub fn actor_state(&self, id: ActorId) -> Result<BTreeMap<String, Value>, RegistryError> {
		self.lookup(id)?.state()
	}

	fn after_republish(&self, entry: &ActorEntry) {
		let _writer = self.writer.lock();
		let current = self.snap.load_full();
		if current.get(entry.id()).is_none() {
			return;
		}
		// capability index may have changed
		self.snap.store(Arc::new(ActorSnapshot::from_entries(current.order.clone())));
		let generation = self.generation.bump();
		debug!(actor = %entry.id(), generation, revision = entry.published().revision, "republished actor methods");
	}
}
