use std::collections::BTreeMap;
use std::fmt;
use std::num::NonZeroU64;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use switchyard_invocation::{ApiMethod, ApiParams, ApiResult};
use uuid::Uuid;

/// Contract every actor implements to describe and execute its own operations.
///
/// The registry only ever talks to actors through this trait; it never
/// downcasts. Implementations must not let faults escape `execute_api_method`,
/// but the registry still catches panics at the boundary and converts them to
/// [`switchyard_invocation::ErrorKind::ActorFault`].
pub trait Actor: Send {
	/// Identity of this instance, used to reject double registration.
	fn instance_id(&self) -> Uuid;

	/// Stable type tag shared by all instances of the same kind.
	fn actor_type(&self) -> &str;

	/// Human-readable instance name for diagnostics.
	fn name(&self) -> String {
		self.actor_type().to_string()
	}

	/// Published methods. Must be pure for a given [`Actor::api_generation`].
	fn get_api_methods(&self) -> Vec<ApiMethod>;

	/// Bumped by the actor whenever its method set changes.
	fn api_generation(&self) -> u64 {
		0
	}

	/// Membership check against the actor's current methods.
	///
	/// Dispatch answers from the published [`switchyard_invocation::MethodTable`]
	/// and only calls this when [`Actor::api_generation`] has moved past the
	/// published table. The default rebuilds the method list and is O(n);
	/// actors that change their methods often should override it with
	/// [`switchyard_invocation::MethodTable::contains`].
	fn can_handle_method(&self, name: &str) -> bool {
		self.get_api_methods().iter().any(|m| m.name == name)
	}

	/// Performs the method. `params` have already been validated against the
	/// published descriptor.
	fn execute_api_method(&mut self, name: &str, params: &ApiParams) -> ApiResult;

	/// Capability tags used for grouping and filtering only.
	fn get_capabilities(&self) -> Vec<String> {
		Vec::new()
	}

	/// Side-effect free state snapshot for diagnostics and context building.
	fn get_state(&self) -> BTreeMap<String, Value> {
		BTreeMap::new()
	}
}

static NEXT_ACTOR_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique actor identity. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(NonZeroU64);

impl ActorId {
	pub(crate) fn next() -> Self {
		let raw = NEXT_ACTOR_ID.fetch_add(1, Ordering::Relaxed);
		Self(NonZeroU64::new(raw).unwrap_or(NonZeroU64::MAX))
	}

	pub fn get(self) -> u64 {
		self.0.get()
	}
}

impl fmt::Display for ActorId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl FromStr for ActorId {
	type Err = std::num::ParseIntError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		s.parse::<NonZeroU64>().map(Self)
	}
}

/// Diagnostic record for one live actor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActorInfo {
	pub actor_id: ActorId,
	pub actor_type: String,
	pub name: String,
	pub capabilities: Vec<String>,
	pub method_count: usize,
}
