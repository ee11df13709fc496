use std::collections::BTreeMap;
use std::path::PathBuf;

use serde_json::{Value, json};
use switchyard_invocation::{ApiError, ApiMethod, ApiParameter, ApiParams, ApiResult, MethodTable, ParamType};
use switchyard_registry::Actor;
use uuid::Uuid;

pub const ACTOR_TYPE: &str = "code_editor";

const WELCOME: &str = "// Welcome to switchyard\n\nfn main() {\n    println!(\"Hello, world!\");\n}\n";

/// In-memory code buffer.
pub struct CodeEditor {
	instance: Uuid,
	name: String,
	content: String,
	language: String,
	path: Option<PathBuf>,
	methods: MethodTable,
}

impl CodeEditor {
	pub fn new(name: impl Into<String>) -> Self {
		Self::with_content(name, WELCOME)
	}

	pub fn with_content(name: impl Into<String>, content: impl Into<String>) -> Self {
		Self {
			instance: Uuid::new_v4(),
			name: name.into(),
			content: content.into(),
			language: "rust".to_string(),
			path: None,
			methods: MethodTable::new(methods()),
		}
	}

	pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
		self.path = Some(path.into());
		self
	}

	fn format(&mut self) {
		let mut formatted = self.content.lines().map(str::trim_end).collect::<Vec<_>>().join("\n");
		if !formatted.is_empty() {
			formatted.push('\n');
		}
		self.content = formatted;
	}

	fn save(&mut self, path: Option<String>) -> ApiResult {
		let path = match path.map(PathBuf::from).or_else(|| self.path.clone()) {
			Some(path) => path,
			None => return Err(ApiError::invalid_params("save.path: required when the buffer has no file")),
		};
		std::fs::write(&path, &self.content).map_err(|e| ApiError::actor_fault(format!("writing {}: {e}", path.display())))?;
		tracing::debug!(editor = %self.name, path = %path.display(), "saved buffer");
		let saved = json!({ "path": path.display().to_string(), "bytes": self.content.len() });
		self.path = Some(path);
		Ok(saved)
	}

	fn find(&self, query: &str, case_sensitive: bool) -> ApiResult {
		if query.is_empty() {
			return Err(ApiError::invalid_params("find.query: must not be empty"));
		}
		let offsets: Vec<usize> = if case_sensitive {
			self.content.match_indices(query).map(|(at, _)| at).collect()
		} else {
			// byte offsets stay valid because only ASCII is folded
			self.content.to_ascii_lowercase().match_indices(&query.to_ascii_lowercase()).map(|(at, _)| at).collect()
		};
		Ok(json!(offsets))
	}
}

impl Actor for CodeEditor {
	fn instance_id(&self) -> Uuid {
		self.instance
	}

	fn actor_type(&self) -> &str {
		ACTOR_TYPE
	}

	fn name(&self) -> String {
		self.name.clone()
	}

	fn get_api_methods(&self) -> Vec<ApiMethod> {
		self.methods.methods().to_vec()
	}

	fn can_handle_method(&self, name: &str) -> bool {
		self.methods.contains(name)
	}

	fn execute_api_method(&mut self, name: &str, params: &ApiParams) -> ApiResult {
		match name {
			"get_content" => Ok(json!(self.content)),
			"set_content" => {
				self.content = params.get("content")?;
				Ok(Value::Null)
			}
			"get_language" => Ok(json!(self.language)),
			"set_language" => {
				self.language = params.get::<String>("language")?.to_lowercase();
				Ok(Value::Null)
			}
			"format" => {
				self.format();
				Ok(Value::Null)
			}
			"save" => self.save(params.get_optional("path")?),
			"find" => self.find(&params.get::<String>("query")?, params.get("case_sensitive")?),
			"get_stats" => Ok(json!({
				"lines": self.content.lines().count(),
				"characters": self.content.chars().count(),
				"words": self.content.split_whitespace().count(),
				"language": self.language,
				"name": self.name,
			})),
			other => Err(ApiError::unknown_method(other)),
		}
	}

	fn get_capabilities(&self) -> Vec<String> {
		["text_editing", "syntax_highlighting", "code_formatting", "file_operations", "search"]
			.into_iter()
			.map(String::from)
			.collect()
	}

	fn get_state(&self) -> BTreeMap<String, Value> {
		BTreeMap::from([
			("content_length".to_string(), json!(self.content.len())),
			("language".to_string(), json!(self.language)),
			("line_count".to_string(), json!(self.content.lines().count())),
			("path".to_string(), json!(self.path.as_ref().map(|p| p.display().to_string()))),
		])
	}
}

fn methods() -> Vec<ApiMethod> {
	vec![
		ApiMethod::new("get_content", "Get the current content of the editor")
			.returns(ParamType::String)
			.category("content"),
		ApiMethod::new("set_content", "Set the content of the editor")
			.param(ApiParameter::required("content", ParamType::String, "The new content for the editor"))
			.category("content"),
		ApiMethod::new("get_language", "Get the current programming language")
			.returns(ParamType::String)
			.category("language"),
		ApiMethod::new("set_language", "Set the programming language for syntax highlighting")
			.param(ApiParameter::required("language", ParamType::String, "The programming language (e.g. 'rust', 'python')"))
			.category("language"),
		ApiMethod::new("format", "Format the code in the editor").category("editing"),
		ApiMethod::new("save", "Save the current content to file")
			.param(ApiParameter::optional("path", ParamType::String, "File path; defaults to the buffer's file"))
			.returns(ParamType::Object)
			.category("file"),
		ApiMethod::new("find", "Find text in the editor")
			.param(ApiParameter::required("query", ParamType::String, "Text to search for"))
			.param(ApiParameter::optional("case_sensitive", ParamType::Boolean, "Whether search should be case sensitive").with_default(false))
			.returns(ParamType::Array)
			.category("search"),
		ApiMethod::new("get_stats", "Get statistics about the editor content")
			.returns(ParamType::Object)
			.category("info"),
	]
}
