use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use switchyard_invocation::ApiError;
use switchyard_registry::{ActorEntry, ActorId, ActorRegistry};
use tracing::trace;

use super::CommandProvider;
use crate::command::{ACTOR_NAMESPACE, Command};
use crate::context::CommandContext;

/// Derives one command per method published by each live actor.
///
/// Output is memoized per actor against that actor's publish revision, so a
/// republish re-derives only the republishing actor. Entries for actors that
/// have left the registry are dropped on the next pass.
pub struct ActorCommandProvider {
	registry: Arc<ActorRegistry>,
	derived: Mutex<FxHashMap<ActorId, (u64, Arc<[Command]>)>>,
	derivations: AtomicU64,
}

impl ActorCommandProvider {
	pub fn new(registry: Arc<ActorRegistry>) -> Self {
		Self {
			registry,
			derived: Mutex::new(FxHashMap::default()),
			derivations: AtomicU64::new(0),
		}
	}

	/// How many per-actor command lists have been derived so far.
	pub fn derivations(&self) -> u64 {
		self.derivations.load(Ordering::Relaxed)
	}

	fn derive(entry: &ActorEntry) -> Arc<[Command]> {
		let published = entry.published();
		published
			.methods
			.methods()
			.iter()
			.map(|method| {
				let title = if method.summary.is_empty() { method.name.clone() } else { method.summary.clone() };
				let category = if method.category.is_empty() { entry.actor_type() } else { method.category.as_str() };
				Command::actor(entry.id(), &method.name, title)
					.description(format!("{} ({})", method.name, entry.name()))
					.category(category)
					.group(format!("{}_api", entry.actor_type()))
					.actor_type(entry.actor_type())
			})
			.collect()
	}
}

impl CommandProvider for ActorCommandProvider {
	fn provider_id(&self) -> &str {
		ACTOR_NAMESPACE
	}

	fn generation(&self) -> u64 {
		self.registry.generation()
	}

	fn provide(&self, _ctx: &CommandContext) -> Result<Vec<Command>, ApiError> {
		let snapshot = self.registry.snapshot();
		let mut derived = self.derived.lock();
		derived.retain(|id, _| snapshot.get(*id).is_some());

		let mut commands = Vec::new();
		for entry in snapshot.entries() {
			let revision = entry.published().revision;
			let list = match derived.get(&entry.id()) {
				Some((seen, list)) if *seen == revision => Arc::clone(list),
				_ => {
					let list = Self::derive(entry);
					self.derivations.fetch_add(1, Ordering::Relaxed);
					trace!(actor = %entry.id(), revision, commands = list.len(), "derived actor commands");
					derived.insert(entry.id(), (revision, Arc::clone(&list)));
					list
				}
			};
			commands.extend(list.iter().cloned());
		}
		Ok(commands)
	}
}
