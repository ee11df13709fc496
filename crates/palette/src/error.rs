//! Error types for palette assembly and configuration.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur when loading palette configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error reading a configuration file.
	#[error("I/O error reading {path}: {error}")]
	Io {
		/// Path to the file that failed to read.
		path: PathBuf,
		/// The underlying I/O error.
		error: std::io::Error,
	},

	/// Error parsing TOML syntax or shape.
	#[error("TOML parse error: {0}")]
	Toml(#[from] toml::de::Error),

	/// A group definition is malformed.
	#[error("invalid group '{name}': {reason}")]
	InvalidGroup { name: String, reason: String },
}

/// Errors raised while assembling a palette or extending it at runtime.
#[derive(Debug, Error)]
pub enum PaletteError {
	#[error("a provider with id '{0}' is already registered")]
	DuplicateProvider(String),

	#[error("provider id '{0}' must be non-empty and free of ':'")]
	InvalidProviderId(String),

	#[error("global command '{0}' is already declared")]
	DuplicateGlobal(String),

	#[error(transparent)]
	Config(#[from] ConfigError),
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
