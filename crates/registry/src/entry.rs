use std::collections::BTreeMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use arc_swap::ArcSwap;
use parking_lot::Mutex;
use serde_json::Value;
use switchyard_invocation::{ApiError, ApiParams, ApiResult, MethodTable, panic_message};
use uuid::Uuid;

use crate::actor::{Actor, ActorId, ActorInfo};
use crate::error::RegistryError;

/// What an actor has published, captured outside the actor's lock.
#[derive(Debug, Clone)]
pub struct Published {
	/// The actor's own [`Actor::api_generation`] when this was read.
	pub api_generation: u64,
	/// Entry-local publish counter. Distinguishes republishes even when the
	/// actor did not bump its generation.
	pub revision: u64,
	pub methods: MethodTable,
	pub capabilities: Vec<String>,
}

/// A live actor plus its published surface.
///
/// The actor itself sits behind a per-entry mutex: calls to the same actor
/// are serialized while different entries are fully independent.
pub struct ActorEntry {
	id: ActorId,
	instance: Uuid,
	actor_type: String,
	name: String,
	published: ArcSwap<Published>,
	actor: Mutex<Box<dyn Actor>>,
	retired: AtomicBool,
}

impl std::fmt::Debug for ActorEntry {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ActorEntry")
			.field("id", &self.id)
			.field("actor_type", &self.actor_type)
			.field("retired", &self.is_retired())
			.finish_non_exhaustive()
	}
}

impl ActorEntry {
	pub(crate) fn new(id: ActorId, actor: Box<dyn Actor>) -> Result<Self, RegistryError> {
		let (instance, actor_type, name, published) = catch_unwind(AssertUnwindSafe(|| {
			let published = read_published(actor.as_ref(), 0);
			(actor.instance_id(), actor.actor_type().to_string(), actor.name(), published)
		}))
		.map_err(|payload| RegistryError::ActorFault {
			stage: "registering",
			message: panic_message(&*payload),
		})?;

		Ok(Self {
			id,
			instance,
			actor_type,
			name,
			published: ArcSwap::from_pointee(published),
			actor: Mutex::new(actor),
			retired: AtomicBool::new(false),
		})
	}

	pub fn id(&self) -> ActorId {
		self.id
	}

	pub fn instance(&self) -> Uuid {
		self.instance
	}

	pub fn actor_type(&self) -> &str {
		&self.actor_type
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	/// Current published surface. Lock-free.
	pub fn published(&self) -> Arc<Published> {
		self.published.load_full()
	}

	pub fn is_retired(&self) -> bool {
		self.retired.load(Ordering::Acquire)
	}

	pub(crate) fn retire(&self) {
		self.retired.store(true, Ordering::Release);
	}

	#[cfg(test)]
	pub(crate) fn is_locked(&self) -> bool {
		self.actor.is_locked()
	}

	pub fn info(&self) -> ActorInfo {
		let published = self.published.load();
		ActorInfo {
			actor_id: self.id,
			actor_type: self.actor_type.clone(),
			name: self.name.clone(),
			capabilities: published.capabilities.clone(),
			method_count: published.methods.len(),
		}
	}

	/// Validates and executes `method` under this actor's exclusion.
	///
	/// Returns the result and whether the actor republished its methods
	/// during the call.
	pub(crate) fn call(&self, method: &str, params: &ApiParams) -> (ApiResult, bool) {
		let published = self.published.load_full();
		let validated = match published.methods.validate(method, params) {
			Ok(validated) => validated,
			Err(err) => return (Err(err), false),
		};

		let mut actor = self.actor.lock();
		if self.is_retired() {
			return (Err(ApiError::actor_gone(self.id)), false);
		}
		// The published table already vouched for `method`; the actor is only
		// asked when its methods moved on since publication.
		let stale = catch_unwind(AssertUnwindSafe(|| {
			actor.api_generation() != published.api_generation && !actor.can_handle_method(method)
		}));
		match stale {
			Ok(false) => {}
			Ok(true) => return (Err(ApiError::unknown_method(method)), false),
			Err(payload) => {
				let message = panic_message(&*payload);
				tracing::warn!(actor = %self.id, method, %message, "actor panicked during method lookup");
				return (Err(ApiError::actor_fault(format!("{} panicked looking up '{method}': {message}", self.actor_type))), false);
			}
		}

		let result = catch_unwind(AssertUnwindSafe(|| actor.execute_api_method(method, &validated))).unwrap_or_else(|payload| {
			let message = panic_message(&*payload);
			tracing::warn!(actor = %self.id, method, %message, "actor panicked during dispatch");
			Err(ApiError::actor_fault(format!("{} panicked in '{method}': {message}", self.actor_type)))
		});

		let republished = self.republish_if_changed(actor.as_ref(), &published);
		(result, republished)
	}

	/// Re-reads the actor's methods regardless of its generation.
	pub(crate) fn refresh(&self) -> Result<bool, RegistryError> {
		let actor = self.actor.lock();
		let current = self.published.load_full();
		let next = catch_unwind(AssertUnwindSafe(|| read_published(actor.as_ref(), current.revision + 1))).map_err(|payload| {
			RegistryError::ActorFault {
				stage: "refreshing methods",
				message: panic_message(&*payload),
			}
		})?;
		let changed = next.methods.methods() != current.methods.methods() || next.capabilities != current.capabilities;
		if changed {
			self.published.store(Arc::new(next));
		}
		Ok(changed)
	}

	pub(crate) fn state(&self) -> Result<BTreeMap<String, Value>, RegistryError> {
		let actor = self.actor.lock();
		catch_unwind(AssertUnwindSafe(|| actor.get_state())).map_err(|payload| RegistryError::ActorFault {
			stage: "reading state",
			message: panic_message(&*payload),
		})
	}

	fn republish_if_changed(&self, actor: &dyn Actor, seen: &Published) -> bool {
		let Ok(generation) = catch_unwind(AssertUnwindSafe(|| actor.api_generation())) else {
			return false;
		};
		if generation == seen.api_generation {
			return false;
		}
		match catch_unwind(AssertUnwindSafe(|| read_published(actor, seen.revision + 1))) {
			Ok(next) => {
				self.published.store(Arc::new(next));
				true
			}
			Err(payload) => {
				tracing::warn!(actor = %self.id, message = %panic_message(&*payload), "actor panicked while republishing methods");
				false
			}
		}
	}
}

fn read_published(actor: &dyn Actor, revision: u64) -> Published {
	Published {
		api_generation: actor.api_generation(),
		revision,
		methods: MethodTable::new(actor.get_api_methods()),
		capabilities: actor.get_capabilities(),
	}
}
