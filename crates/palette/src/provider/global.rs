use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::json;
use switchyard_invocation::{ApiError, ApiMethod, ApiParameter, ApiParams, ApiResult, ErrorKind, ParamType};

use super::CommandProvider;
use crate::command::{Command, GLOBAL_NAMESPACE};
use crate::context::CommandContext;
use crate::error::PaletteError;

/// Handler invoked for `global:<name>` with validated parameters.
pub type GlobalHandler = Arc<dyn Fn(&ApiParams, &CommandContext) -> ApiResult + Send + Sync>;

/// Handler that performs nothing itself and reports the requested action back
/// to the host as `{ "action": <name>, "params": {...} }`.
pub fn action_handler(name: &str) -> GlobalHandler {
	let action = name.to_string();
	Arc::new(move |params, _ctx| Ok(json!({ "action": action, "params": params.to_json() })))
}

/// One entry of the global command table.
#[derive(Clone)]
pub struct GlobalCommand {
	name: String,
	command: Command,
	method: ApiMethod,
	handler: GlobalHandler,
}

impl fmt::Debug for GlobalCommand {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("GlobalCommand")
			.field("name", &self.name)
			.field("command", &self.command)
			.field("parameters", &self.method.parameters)
			.finish_non_exhaustive()
	}
}

impl GlobalCommand {
	/// Declares `global:<name>` with the default [`action_handler`].
	pub fn new(name: &str, title: impl Into<String>) -> Self {
		let title = title.into();
		Self {
			name: name.to_string(),
			method: ApiMethod::new(name, title.clone()),
			command: Command::global(name, title),
			handler: action_handler(name),
		}
	}

	pub fn description(mut self, description: impl Into<String>) -> Self {
		self.command = self.command.description(description);
		self
	}

	pub fn category(mut self, category: impl Into<String>) -> Self {
		self.command = self.command.category(category);
		self
	}

	pub fn shortcut(mut self, shortcut: impl Into<String>) -> Self {
		self.command = self.command.shortcut(shortcut);
		self
	}

	pub fn group(mut self, group: impl Into<String>) -> Self {
		self.command = self.command.group(group);
		self
	}

	pub fn param(mut self, parameter: ApiParameter) -> Self {
		self.method = self.method.param(parameter);
		self
	}

	pub fn disabled(mut self) -> Self {
		self.command = self.command.disabled();
		self
	}

	pub fn handler<F>(mut self, handler: F) -> Self
	where
		F: Fn(&ApiParams, &CommandContext) -> ApiResult + Send + Sync + 'static,
	{
		self.handler = Arc::new(handler);
		self
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn command(&self) -> &Command {
		&self.command
	}

	/// Parameter schema checked before the handler runs.
	pub fn method(&self) -> &ApiMethod {
		&self.method
	}
}

/// Actor-independent commands backed by a table that is fixed once the
/// palette is built.
#[derive(Debug, Clone, Default)]
pub struct GlobalCommandProvider {
	commands: IndexMap<String, GlobalCommand>,
}

impl GlobalCommandProvider {
	/// An empty table.
	pub fn new() -> Self {
		Self::default()
	}

	/// The built-in file, tab, view, palette and transform commands.
	pub fn with_defaults() -> Self {
		let mut provider = Self::new();
		for command in default_commands() {
			provider.commands.insert(command.name.clone(), command);
		}
		provider
	}

	pub fn declare(&mut self, command: GlobalCommand) -> Result<(), PaletteError> {
		if self.commands.contains_key(&command.name) {
			return Err(PaletteError::DuplicateGlobal(command.name));
		}
		self.commands.insert(command.name.clone(), command);
		Ok(())
	}

	/// Replaces the handler of an existing command. Returns `false` when
	/// `name` is not declared.
	pub fn set_handler<F>(&mut self, name: &str, handler: F) -> bool
	where
		F: Fn(&ApiParams, &CommandContext) -> ApiResult + Send + Sync + 'static,
	{
		match self.commands.get_mut(name) {
			Some(command) => {
				command.handler = Arc::new(handler);
				true
			}
			None => false,
		}
	}

	pub fn get(&self, name: &str) -> Option<&GlobalCommand> {
		self.commands.get(name)
	}

	pub fn len(&self) -> usize {
		self.commands.len()
	}

	pub fn is_empty(&self) -> bool {
		self.commands.is_empty()
	}
}

impl CommandProvider for GlobalCommandProvider {
	fn provider_id(&self) -> &str {
		GLOBAL_NAMESPACE
	}

	fn provide(&self, _ctx: &CommandContext) -> Result<Vec<Command>, ApiError> {
		Ok(self.commands.values().map(|c| c.command.clone()).collect())
	}

	fn execute(&self, id: &str, name: &str, params: &ApiParams, ctx: &CommandContext) -> ApiResult {
		let global = self.commands.get(name).ok_or_else(|| ApiError::unknown_command(id))?;
		if !global.command.enabled {
			return Err(ApiError::new(ErrorKind::Disabled, format!("command '{id}' is disabled")));
		}
		let params = global.method.validate(params)?;
		(global.handler)(&params, ctx)
	}
}

fn default_commands() -> Vec<GlobalCommand> {
	vec![
		GlobalCommand::new("file.new", "New File")
			.description("Create a new file")
			.category("File")
			.shortcut("Ctrl+N")
			.group("file_operations")
			.param(ApiParameter::optional("path", ParamType::String, "Where to create the file")),
		GlobalCommand::new("tab.new", "New Tab")
			.description("Create a new tab")
			.category("File")
			.shortcut("Ctrl+T")
			.group("file_operations"),
		GlobalCommand::new("tab.close", "Close Tab")
			.description("Close current tab")
			.category("File")
			.shortcut("Ctrl+W")
			.group("file_operations")
			.param(ApiParameter::optional("index", ParamType::Integer, "Tab to close instead of the current one")),
		GlobalCommand::new("view.toggle_widgets", "Toggle Widgets")
			.description("Show/hide all widgets")
			.category("View")
			.group("view_operations"),
		GlobalCommand::new("view.scene_system", "Switch to Scene System")
			.description("Use scene-based view system")
			.category("View")
			.group("view_operations"),
		GlobalCommand::new("view.tiling_system", "Switch to Tiling System")
			.description("Use tiling-based view system")
			.category("View")
			.group("view_operations"),
		GlobalCommand::new("palette.show", "Show Command Palette")
			.description("Open command palette")
			.category("Tools")
			.shortcut("Ctrl+Shift+P")
			.group("tools"),
		GlobalCommand::new("transform.reset", "Reset Transform")
			.description("Reset zoom and pan to defaults")
			.category("View")
			.group("transform_operations"),
	]
}
