use std::any::Any;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Normalized outcome of any dispatch: a structured value or a classified failure.
///
/// There are no partial results.
pub type ApiResult = Result<Value, ApiError>;

/// Failure classes reported across the dispatch boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
	/// The command id resolves in no namespace.
	UnknownCommand,
	/// The actor does not (or no longer) publish the method.
	UnknownMethod,
	/// The actor was deregistered between search and execution.
	ActorGone,
	/// A required parameter is missing or a value has the wrong type.
	InvalidParams,
	/// The same actor instance or provider id was registered twice.
	DuplicateRegistration,
	/// The actor reported or raised an internal failure.
	ActorFault,
	/// A provider failed while producing or executing commands.
	ProviderFault,
	/// The command is declared but disabled.
	Disabled,
}

impl ErrorKind {
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::UnknownCommand => "unknown_command",
			Self::UnknownMethod => "unknown_method",
			Self::ActorGone => "actor_gone",
			Self::InvalidParams => "invalid_params",
			Self::DuplicateRegistration => "duplicate_registration",
			Self::ActorFault => "actor_fault",
			Self::ProviderFault => "provider_fault",
			Self::Disabled => "disabled",
		}
	}
}

impl fmt::Display for ErrorKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// A classified dispatch failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct ApiError {
	pub kind: ErrorKind,
	pub message: String,
}

impl ApiError {
	pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
		Self {
			kind,
			message: message.into(),
		}
	}

	pub fn unknown_command(id: &str) -> Self {
		Self::new(ErrorKind::UnknownCommand, format!("no command with id '{id}'"))
	}

	pub fn unknown_method(method: &str) -> Self {
		Self::new(ErrorKind::UnknownMethod, format!("method '{method}' is not published"))
	}

	pub fn actor_gone(actor: impl fmt::Display) -> Self {
		Self::new(ErrorKind::ActorGone, format!("actor {actor} is no longer registered"))
	}

	pub fn invalid_params(message: impl Into<String>) -> Self {
		Self::new(ErrorKind::InvalidParams, message)
	}

	pub fn actor_fault(message: impl Into<String>) -> Self {
		Self::new(ErrorKind::ActorFault, message)
	}

	pub fn provider_fault(message: impl Into<String>) -> Self {
		Self::new(ErrorKind::ProviderFault, message)
	}

	pub fn is(&self, kind: ErrorKind) -> bool {
		self.kind == kind
	}
}

/// Extracts a readable message from a caught panic payload.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
	if let Some(s) = payload.downcast_ref::<&str>() {
		(*s).to_string()
	} else if let Some(s) = payload.downcast_ref::<String>() {
		s.clone()
	} else {
		"panic with non-string payload".to_string()
	}
}
