use pretty_assertions::assert_eq;
use serde_json::json;
use switchyard_invocation::{ApiParams, ErrorKind};
use switchyard_registry::{Actor, ActorRegistry};

use super::*;

fn call(registry: &ActorRegistry, id: ActorId, method: &str, params: ApiParams) -> serde_json::Value {
	registry.dispatch(id, method, &params).unwrap()
}

#[test]
fn workspace_registers_editor_and_terminal() {
	let registry = ActorRegistry::new();
	let ids = register_workspace(&registry).unwrap();

	assert_eq!(registry.find_by_type(editor::ACTOR_TYPE), vec![ids[0]]);
	assert_eq!(registry.find_by_type(terminal::ACTOR_TYPE), vec![ids[1]]);
	assert_eq!(registry.find_by_capability("search"), vec![ids[0]]);
	assert_eq!(registry.find_by_capability("pty_support"), vec![ids[1]]);

	let info = registry.actors_info();
	assert_eq!(info[0].name, "main.rs");
	assert_eq!(info[0].method_count, 8);
	assert_eq!(info[1].method_count, 5);
}

#[test]
fn editor_edits_and_reports() {
	let registry = ActorRegistry::new();
	let id = registry.register(Box::new(CodeEditor::with_content("notes.txt", "Hello  \nhello world\t\n"))).unwrap();

	call(&registry, id, "format", ApiParams::new());
	assert_eq!(call(&registry, id, "get_content", ApiParams::new()), json!("Hello\nhello world\n"));

	assert_eq!(call(&registry, id, "find", ApiParams::new().with("query", "hello")), json!([0, 6]));
	assert_eq!(
		call(&registry, id, "find", ApiParams::new().with("query", "hello").with("case_sensitive", true)),
		json!([6])
	);

	call(&registry, id, "set_language", ApiParams::new().with("language", "Markdown"));
	assert_eq!(call(&registry, id, "get_language", ApiParams::new()), json!("markdown"));
	assert_eq!(
		call(&registry, id, "get_stats", ApiParams::new()),
		json!({ "lines": 2, "characters": 18, "words": 3, "language": "markdown", "name": "notes.txt" })
	);

	let state = registry.actor_state(id).unwrap();
	assert_eq!(state["line_count"], json!(2));
	assert_eq!(state["path"], json!(null));
}

#[test]
fn editor_rejects_bad_calls_before_running() {
	let registry = ActorRegistry::new();
	let id = registry.register(Box::new(CodeEditor::new("main.rs"))).unwrap();

	let err = registry.dispatch(id, "set_content", &ApiParams::new()).unwrap_err();
	assert_eq!(err.kind, ErrorKind::InvalidParams);
	let err = registry.dispatch(id, "find", &ApiParams::new().with("query", "")).unwrap_err();
	assert_eq!(err.kind, ErrorKind::InvalidParams);
	let err = registry.dispatch(id, "save", &ApiParams::new()).unwrap_err();
	assert_eq!(err.kind, ErrorKind::InvalidParams);
}

#[test]
fn editor_saves_to_disk() {
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("main.rs");
	let registry = ActorRegistry::new();
	let id = registry.register(Box::new(CodeEditor::with_content("main.rs", "fn main() {}\n"))).unwrap();

	let saved = call(&registry, id, "save", ApiParams::new().with("path", path.display().to_string()));
	assert_eq!(saved["bytes"], json!(13));
	assert_eq!(std::fs::read_to_string(&path).unwrap(), "fn main() {}\n");

	// the path is remembered
	call(&registry, id, "set_content", ApiParams::new().with("content", "// changed\n"));
	call(&registry, id, "save", ApiParams::new());
	assert_eq!(std::fs::read_to_string(&path).unwrap(), "// changed\n");
}

#[test]
fn terminal_writes_clears_and_resizes() {
	let registry = ActorRegistry::new();
	let id = registry.register(Box::new(Terminal::default())).unwrap();

	assert_eq!(call(&registry, id, "write", ApiParams::new().with("text", "ls\r\nsrc")), json!(7));
	let state = registry.actor_state(id).unwrap();
	assert_eq!(state["cursor_x"], json!(3));
	assert_eq!(state["cursor_y"], json!(1));

	call(&registry, id, "clear", ApiParams::new());
	assert_eq!(registry.actor_state(id).unwrap()["line_count"], json!(1));

	call(&registry, id, "resize", ApiParams::new().with("cols", 120).with("rows", 40));
	assert_eq!(call(&registry, id, "get_size", ApiParams::new()), json!({ "cols": 120, "rows": 40 }));
	assert_eq!(call(&registry, id, "get_title", ApiParams::new()), json!("Terminal"));

	for (cols, rows) in [(0, 10), (70_000, 10)] {
		let err = registry
			.dispatch(id, "resize", &ApiParams::new().with("cols", cols).with("rows", rows))
			.unwrap_err();
		assert_eq!(err.kind, ErrorKind::InvalidParams);
	}
	let err = registry
		.dispatch(id, "resize", &ApiParams::new().with("cols", 80.5).with("rows", 10))
		.unwrap_err();
	assert_eq!(err.kind, ErrorKind::InvalidParams);
}

#[test]
fn terminal_scrollback_is_bounded() {
	let mut terminal = Terminal::default();
	let text = "line\n".repeat(1500);
	terminal.execute_api_method("write", &ApiParams::new().with("text", text)).unwrap();
	assert_eq!(terminal.lines().len(), 1000);
}
