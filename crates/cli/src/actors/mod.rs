//! Reference actors backing the command line front end.

pub mod editor;
pub mod terminal;

pub use editor::CodeEditor;
use switchyard_registry::{ActorId, ActorRegistry, RegistryError};
pub use terminal::Terminal;

/// Registers the demo workspace: one editor buffer and one terminal.
pub fn register_workspace(registry: &ActorRegistry) -> Result<Vec<ActorId>, RegistryError> {
	Ok(vec![
		registry.register(Box::new(CodeEditor::new("main.rs")))?,
		registry.register(Box::new(Terminal::default()))?,
	])
}

#[cfg(test)]
mod tests;
