use std::collections::BTreeMap;

use serde_json::{Value, json};
use switchyard_invocation::{ApiError, ApiMethod, ApiParameter, ApiParams, ApiResult, MethodTable, ParamType};
use switchyard_registry::Actor;
use uuid::Uuid;

pub const ACTOR_TYPE: &str = "terminal";

/// Lines kept before the oldest is dropped.
const SCROLLBACK: usize = 1000;

/// Line-buffered terminal surface. No process is attached; written text is
/// only recorded.
pub struct Terminal {
	instance: Uuid,
	title: String,
	cols: u16,
	rows: u16,
	lines: Vec<String>,
	methods: MethodTable,
}

impl Default for Terminal {
	fn default() -> Self {
		Self::new(80, 24)
	}
}

impl Terminal {
	pub fn new(cols: u16, rows: u16) -> Self {
		Self {
			instance: Uuid::new_v4(),
			title: "Terminal".to_string(),
			cols,
			rows,
			lines: vec![String::new()],
			methods: MethodTable::new(methods()),
		}
	}

	pub fn lines(&self) -> &[String] {
		&self.lines
	}

	fn write(&mut self, text: &str) {
		for (i, segment) in text.split('\n').enumerate() {
			if i > 0 {
				self.lines.push(String::new());
			}
			if let Some(line) = self.lines.last_mut() {
				line.extend(segment.chars().filter(|c| *c != '\r'));
			}
		}
		if self.lines.len() > SCROLLBACK {
			let excess = self.lines.len() - SCROLLBACK;
			self.lines.drain(..excess);
		}
	}

	fn cursor(&self) -> (usize, usize) {
		let y = self.lines.len().saturating_sub(1);
		let x = self.lines.last().map_or(0, |l| l.chars().count());
		(x, y)
	}
}

fn dimension(params: &ApiParams, name: &str) -> Result<u16, ApiError> {
	let value: i64 = params.get(name)?;
	u16::try_from(value)
		.ok()
		.filter(|v| *v > 0)
		.ok_or_else(|| ApiError::invalid_params(format!("resize.{name}: must be between 1 and {}", u16::MAX)))
}

impl Actor for Terminal {
	fn instance_id(&self) -> Uuid {
		self.instance
	}

	fn actor_type(&self) -> &str {
		ACTOR_TYPE
	}

	fn name(&self) -> String {
		self.title.clone()
	}

	fn get_api_methods(&self) -> Vec<ApiMethod> {
		self.methods.methods().to_vec()
	}

	fn can_handle_method(&self, name: &str) -> bool {
		self.methods.contains(name)
	}

	fn execute_api_method(&mut self, name: &str, params: &ApiParams) -> ApiResult {
		match name {
			"write" => {
				let text: String = params.get("text")?;
				self.write(&text);
				Ok(json!(text.chars().count()))
			}
			"clear" => {
				self.lines = vec![String::new()];
				Ok(Value::Null)
			}
			"resize" => {
				let cols = dimension(params, "cols")?;
				let rows = dimension(params, "rows")?;
				self.cols = cols;
				self.rows = rows;
				Ok(Value::Null)
			}
			"get_title" => Ok(json!(self.title)),
			"get_size" => Ok(json!({ "cols": self.cols, "rows": self.rows })),
			other => Err(ApiError::unknown_method(other)),
		}
	}

	fn get_capabilities(&self) -> Vec<String> {
		["terminal_emulation", "ansi_colors", "shell_integration", "vt100_compatibility", "pty_support"]
			.into_iter()
			.map(String::from)
			.collect()
	}

	fn get_state(&self) -> BTreeMap<String, Value> {
		let (x, y) = self.cursor();
		BTreeMap::from([
			("cols".to_string(), json!(self.cols)),
			("rows".to_string(), json!(self.rows)),
			("title".to_string(), json!(self.title)),
			("cursor_x".to_string(), json!(x)),
			("cursor_y".to_string(), json!(y)),
			("line_count".to_string(), json!(self.lines.len())),
		])
	}
}

fn methods() -> Vec<ApiMethod> {
	vec![
		ApiMethod::new("write", "Write text to the terminal")
			.param(ApiParameter::required("text", ParamType::String, "Text to write to the terminal"))
			.returns(ParamType::Integer)
			.category("input"),
		ApiMethod::new("clear", "Clear the terminal screen").category("display"),
		ApiMethod::new("resize", "Resize the terminal")
			.param(ApiParameter::required("cols", ParamType::Integer, "Number of columns"))
			.param(ApiParameter::required("rows", ParamType::Integer, "Number of rows"))
			.category("display"),
		ApiMethod::new("get_title", "Get the terminal title")
			.returns(ParamType::String)
			.category("info"),
		ApiMethod::new("get_size", "Get terminal dimensions")
			.returns(ParamType::Object)
			.category("info"),
	]
}
