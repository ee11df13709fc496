//! Palette configuration.
//!
//! ```toml
//! [search]
//! max_results = 20
//!
//! [cache]
//! capacity = 128
//!
//! [[groups]]
//! name = "terminal_tools"
//! activation_rule = { actor_type = "terminal" }
//! command_ids = ["actor:*"]
//!
//! [[groups]]
//! name = "editor_tools"
//! activation_rule = { actor_group = ["code_editor", "markdown_editor"] }
//! actor_types = ["code_editor", "markdown_editor"]
//! ```

use std::num::NonZeroUsize;
use std::path::Path;

use serde::{Deserialize, Serialize};
use switchyard_matcher::Scoring;

use crate::error::{ConfigError, Result};
use crate::group::{CommandGroup, GroupActivation};

pub const DEFAULT_MAX_RESULTS: usize = 50;
pub const DEFAULT_CACHE_CAPACITY: usize = 64;

/// Top-level palette configuration. Every section is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaletteConfig {
	pub search: SearchConfig,
	pub cache: CacheConfig,
	/// Ordered group definitions. Replaces the built-in groups when present.
	pub groups: Vec<CommandGroup>,
}

impl Default for PaletteConfig {
	fn default() -> Self {
		Self {
			search: SearchConfig::default(),
			cache: CacheConfig::default(),
			groups: default_groups(),
		}
	}
}

impl PaletteConfig {
	/// Parses configuration from TOML text.
	pub fn parse(input: &str) -> Result<Self> {
		Ok(toml::from_str(input)?)
	}

	/// Load configuration from a file.
	pub fn load(path: impl AsRef<Path>) -> Result<Self> {
		let path = path.as_ref();
		let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
			path: path.to_path_buf(),
			error: e,
		})?;
		Self::parse(&content)
	}

	/// Loads `path` if it exists, defaults otherwise.
	pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
		let path = path.as_ref();
		if path.exists() { Self::load(path) } else { Ok(Self::default()) }
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
	/// Upper bound on returned results, for empty and non-empty queries alike.
	pub max_results: usize,
	pub scoring: Scoring,
}

impl Default for SearchConfig {
	fn default() -> Self {
		Self {
			max_results: DEFAULT_MAX_RESULTS,
			scoring: Scoring::default(),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
	/// Maximum number of (context, provider) entries kept.
	pub capacity: usize,
}

impl Default for CacheConfig {
	fn default() -> Self {
		Self {
			capacity: DEFAULT_CACHE_CAPACITY,
		}
	}
}

impl CacheConfig {
	/// Capacity clamped to at least one entry.
	pub fn capacity(&self) -> NonZeroUsize {
		NonZeroUsize::new(self.capacity).unwrap_or(NonZeroUsize::MIN)
	}
}

/// Editor actor types the built-in `editor_tools` group activates for and
/// claims commands from.
pub const EDITOR_ACTOR_TYPES: [&str; 2] = ["code_editor", "markdown_editor"];

/// Built-in groups used when configuration declares none.
pub fn default_groups() -> Vec<CommandGroup> {
	vec![
		CommandGroup::new("file_operations", GroupActivation::Always)
			.title("File Operations")
			.description("File and tab management"),
		CommandGroup::new("view_operations", GroupActivation::Always)
			.title("View Operations")
			.description("View and layout management"),
		CommandGroup::new(
			"editor_tools",
			GroupActivation::ActorGroup(EDITOR_ACTOR_TYPES.iter().map(|t| t.to_string()).collect()),
		)
		.title("Editor Tools")
		.description("Text editing tools")
		.actor_types(EDITOR_ACTOR_TYPES),
		CommandGroup::new("transform_operations", GroupActivation::ViewSystem("scene".to_string()))
			.title("Transform Operations")
			.description("Zoom and pan controls"),
	]
}
