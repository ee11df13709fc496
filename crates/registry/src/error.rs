use switchyard_invocation::{ApiError, ErrorKind};
use uuid::Uuid;

use crate::ActorId;

/// Registry membership errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
	/// The same actor instance is already live.
	#[error("actor instance {instance} is already registered as {existing}")]
	DuplicateRegistration { instance: Uuid, existing: ActorId },

	/// No live actor has this id.
	#[error("actor {0} not found")]
	NotFound(ActorId),

	/// The actor panicked while being described.
	#[error("actor faulted while {stage}: {message}")]
	ActorFault { stage: &'static str, message: String },
}

impl RegistryError {
	pub fn kind(&self) -> ErrorKind {
		match self {
			Self::DuplicateRegistration { .. } => ErrorKind::DuplicateRegistration,
			Self::NotFound(_) => ErrorKind::ActorGone,
			Self::ActorFault { .. } => ErrorKind::ActorFault,
		}
	}
}

impl From<RegistryError> for ApiError {
	fn from(err: RegistryError) -> Self {
		match err {
			RegistryError::NotFound(id) => ApiError::actor_gone(id),
			other => ApiError::new(other.kind(), other.to_string()),
		}
	}
}
