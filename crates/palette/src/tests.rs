use std::num::NonZeroUsize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rstest::rstest;
use serde_json::json;
use switchyard_invocation::{ApiError, ApiParams, ErrorKind};
use switchyard_registry::ActorId;

use super::*;

struct Fixed {
	id: &'static str,
	active: bool,
	generation: AtomicU64,
	commands: Vec<Command>,
	calls: AtomicUsize,
}

impl Fixed {
	fn new(id: &'static str, titles: &[&str]) -> Self {
		Self {
			id,
			active: true,
			generation: AtomicU64::new(0),
			commands: titles.iter().map(|t| Command::plugin(id, &t.to_lowercase().replace(' ', "_"), *t)).collect(),
			calls: AtomicUsize::new(0),
		}
	}
}

impl CommandProvider for Fixed {
	fn provider_id(&self) -> &str {
		self.id
	}

	fn generation(&self) -> u64 {
		self.generation.load(Ordering::Acquire)
	}

	fn is_active(&self, _ctx: &CommandContext) -> bool {
		self.active
	}

	fn provide(&self, _ctx: &CommandContext) -> Result<Vec<Command>, ApiError> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		Ok(self.commands.clone())
	}
}

struct Failing;

impl CommandProvider for Failing {
	fn provider_id(&self) -> &str {
		"failing"
	}

	fn provide(&self, _ctx: &CommandContext) -> Result<Vec<Command>, ApiError> {
		Err(ApiError::provider_fault("backing store unavailable"))
	}
}

struct Panicking;

impl CommandProvider for Panicking {
	fn provider_id(&self) -> &str {
		"panicking"
	}

	fn provide(&self, _ctx: &CommandContext) -> Result<Vec<Command>, ApiError> {
		panic!("provider blew up")
	}
}

fn titles(commands: &[Command]) -> Vec<&str> {
	commands.iter().map(|c| c.title.as_str()).collect()
}

fn index(capacity: usize) -> CommandIndex {
	CommandIndex::new(NonZeroUsize::new(capacity).unwrap())
}

#[rstest]
#[case("global:file.new", Some(CommandTarget::Global { name: "file.new" }))]
#[case("plugin:git:commit", Some(CommandTarget::Plugin { provider: "git", name: "commit" }))]
#[case("global:", None)]
#[case("actor:abc:format", None)]
#[case("actor:0:format", None)]
#[case("actor:7:", None)]
#[case("plugin:git", None)]
#[case("file.new", None)]
#[case("other:thing", None)]
fn parses_command_ids(#[case] id: &str, #[case] expected: Option<CommandTarget<'static>>) {
	match expected {
		Some(target) => assert_eq!(CommandTarget::parse(id).unwrap(), target),
		None => assert_eq!(CommandTarget::parse(id).unwrap_err().kind, ErrorKind::UnknownCommand),
	}
}

#[test]
fn parses_actor_ids() {
	let id: ActorId = "12".parse().unwrap();
	let command = Command::actor(id, "format", "Format Code");
	assert_eq!(command.id, "actor:12:format");
	assert_eq!(command.target().unwrap(), CommandTarget::Actor { actor: id, method: "format" });
}

#[test]
fn context_signature_tracks_every_field() {
	let base = CommandContext::new().focused("code_editor").view("scene").with_extra("mode", "insert");
	assert_eq!(base.signature(), base.clone().signature());
	assert_ne!(base.signature(), base.clone().view("tiling").signature());
	assert_ne!(base.signature(), base.clone().with_extra("mode", "normal").signature());
	assert_ne!(base.signature(), CommandContext::new().signature());
}

#[rstest]
#[case(GroupActivation::Always, CommandContext::new(), true)]
#[case(GroupActivation::ActorType("terminal".into()), CommandContext::new().focused("terminal"), true)]
#[case(GroupActivation::ActorType("terminal".into()), CommandContext::new().focused("code_editor"), false)]
#[case(GroupActivation::ActorType("terminal".into()), CommandContext::new(), false)]
#[case(
	GroupActivation::ActorGroup(vec!["code_editor".into(), "markdown_editor".into()]),
	CommandContext::new().focused("markdown_editor"),
	true
)]
#[case(GroupActivation::ActorGroup(vec!["code_editor".into()]), CommandContext::new().focused("terminal"), false)]
#[case(GroupActivation::ViewSystem("scene".into()), CommandContext::new().view("scene"), true)]
#[case(GroupActivation::ViewSystem("scene".into()), CommandContext::new().view("tiling"), false)]
#[case(GroupActivation::Custom("never_registered".into()), CommandContext::new(), false)]
fn evaluates_activation_rules(#[case] rule: GroupActivation, #[case] ctx: CommandContext, #[case] expected: bool) {
	let resolver = GroupResolver::new([CommandGroup::new("g", rule)]).unwrap();
	let group = resolver.group("g").unwrap();
	assert_eq!(resolver.is_active(group, &ctx), expected);
}

#[test]
fn disabled_group_is_never_active() {
	let resolver = GroupResolver::new([CommandGroup::new("g", GroupActivation::Always).disabled()]).unwrap();
	assert!(resolver.eligible_groups(&CommandContext::new()).is_empty());
}

#[test]
fn custom_predicates_can_be_added_later() {
	let resolver = GroupResolver::new([CommandGroup::new("vim", GroupActivation::Custom("vim_mode".into()))]).unwrap();
	let ctx = CommandContext::new().with_extra("vim", true);
	let group = resolver.group("vim").unwrap();
	assert!(!resolver.is_active(group, &ctx));

	resolver.add_predicate("vim_mode", Arc::new(|ctx: &CommandContext| ctx.extras.get("vim") == Some(&json!(true))));
	assert!(resolver.is_active(group, &ctx));
	assert!(!resolver.is_active(group, &CommandContext::new()));
}

#[test]
fn panicking_predicate_is_inactive() {
	let resolver = GroupResolver::new([CommandGroup::new("g", GroupActivation::Custom("bad".into()))]).unwrap();
	resolver.add_predicate("bad", Arc::new(|_: &CommandContext| panic!("predicate bug")));
	assert!(!resolver.is_active(resolver.group("g").unwrap(), &CommandContext::new()));
}

#[test]
fn configured_membership_overrides_provider_group() {
	let resolver = GroupResolver::new([
		CommandGroup::new("tabs", GroupActivation::ViewSystem("tiling".into())).commands(["global:tab.*"]),
		CommandGroup::new("closing", GroupActivation::Always).commands(["global:tab.close"]),
		CommandGroup::new("tab_news", GroupActivation::Always).commands(["global:tab.n*"]),
	])
	.unwrap();

	let close = Command::global("tab.close", "Close Tab").group("file_operations");
	let new = Command::global("tab.new", "New Tab").group("file_operations");
	let switch = Command::global("tab.switch", "Switch Tab").group("file_operations");
	let file = Command::global("file.new", "New File").group("file_operations");

	assert_eq!(resolver.group_of(&close), Some("closing"));
	assert_eq!(resolver.group_of(&new), Some("tab_news"));
	assert_eq!(resolver.group_of(&switch), Some("tabs"));
	assert_eq!(resolver.group_of(&file), Some("file_operations"));

	let eligible = resolver.eligible_groups(&CommandContext::new().view("scene"));
	assert!(resolver.is_eligible(&close, &eligible));
	assert!(!resolver.is_eligible(&switch, &eligible));
	// undeclared group
	assert!(resolver.is_eligible(&file, &eligible));
	assert!(resolver.is_eligible(&Command::global("x", "X"), &eligible));
}

#[test]
fn actor_types_assign_membership_below_configured_ids() {
	let resolver = GroupResolver::new([
		CommandGroup::new("pinned", GroupActivation::Always).commands(["actor:7:format"]),
		CommandGroup::new("editing", GroupActivation::ActorType("code_editor".into())).actor_types(["code_editor"]),
	])
	.unwrap();
	let actor = "7".parse::<ActorId>().unwrap();
	let format = Command::actor(actor, "format", "Format").group("code_editor_api").actor_type("code_editor");
	let save = Command::actor(actor, "save", "Save").group("code_editor_api").actor_type("code_editor");
	let write = Command::actor(actor, "write", "Write").group("terminal_api").actor_type("terminal");

	assert_eq!(resolver.group_of(&format), Some("pinned"));
	assert_eq!(resolver.group_of(&save), Some("editing"));
	assert_eq!(resolver.group_of(&write), Some("terminal_api"));

	let eligible = resolver.eligible_groups(&CommandContext::new().focused("terminal"));
	assert!(!resolver.is_eligible(&save, &eligible));
	assert!(resolver.is_eligible(&write, &eligible));
}

#[rstest]
#[case(vec![CommandGroup::new("a", GroupActivation::Always), CommandGroup::new("a", GroupActivation::Always)])]
#[case(vec![CommandGroup::new("a", GroupActivation::Always).commands(["global:*tab"])])]
#[case(vec![CommandGroup::new("", GroupActivation::Always)])]
fn rejects_invalid_groups(#[case] groups: Vec<CommandGroup>) {
	assert!(matches!(GroupResolver::new(groups), Err(ConfigError::InvalidGroup { .. })));
}

#[test]
fn parses_toml_config() {
	let config = PaletteConfig::parse(
		r#"
[search]
max_results = 10

[search.scoring]
prefix_bonus = 20

[[groups]]
name = "terminal_tools"
title = "Terminal"
activation_rule = { actor_type = "terminal" }
command_ids = ["actor:*"]

[[groups]]
name = "editors"
activation_rule = { actor_group = ["code_editor", "markdown_editor"] }

[[groups]]
name = "scene"
activation_rule = { view_system = "scene" }
enabled = false

[[groups]]
name = "plugin"
activation_rule = { custom = "plugin_loaded" }

[[groups]]
name = "everywhere"
activation_rule = "always"
"#,
	)
	.unwrap();

	assert_eq!(config.search.max_results, 10);
	assert_eq!(config.search.scoring.prefix_bonus, 20);
	assert_eq!(config.search.scoring.match_score, switchyard_matcher::r#const::MATCH_SCORE);
	assert_eq!(config.cache.capacity, config::DEFAULT_CACHE_CAPACITY);
	assert_eq!(
		config.groups.iter().map(|g| g.activation_rule.clone()).collect::<Vec<_>>(),
		vec![
			GroupActivation::ActorType("terminal".into()),
			GroupActivation::ActorGroup(vec!["code_editor".into(), "markdown_editor".into()]),
			GroupActivation::ViewSystem("scene".into()),
			GroupActivation::Custom("plugin_loaded".into()),
			GroupActivation::Always,
		]
	);
	assert_eq!(config.groups[0].title.as_deref(), Some("Terminal"));
	assert_eq!(config.groups[0].command_ids, vec!["actor:*".to_string()]);
	assert!(!config.groups[2].enabled);
	assert!(config.groups[3].enabled);
}

#[test]
fn empty_config_uses_defaults() {
	let config = PaletteConfig::parse("").unwrap();
	assert_eq!(config, PaletteConfig::default());
	assert_eq!(config.search.max_results, 50);
	assert_eq!(config.cache.capacity, 64);
	assert_eq!(
		config.groups.iter().map(|g| g.name.as_str()).collect::<Vec<_>>(),
		vec!["file_operations", "view_operations", "editor_tools", "transform_operations"]
	);
}

#[test]
fn default_editor_tools_claims_editor_actor_types() {
	let config = PaletteConfig::default();
	let editor_tools = config.groups.iter().find(|g| g.name == "editor_tools").unwrap();
	assert_eq!(editor_tools.actor_types, vec!["code_editor".to_string(), "markdown_editor".to_string()]);

	let parsed = PaletteConfig::parse(
		r#"
[[groups]]
name = "editor_tools"
activation_rule = { actor_group = ["code_editor"] }
actor_types = ["code_editor"]
"#,
	)
	.unwrap();
	assert_eq!(parsed.groups[0].actor_types, vec!["code_editor".to_string()]);
}

#[test]
fn zero_cache_capacity_is_clamped() {
	let config = PaletteConfig::parse("[cache]\ncapacity = 0\n").unwrap();
	assert_eq!(config.cache.capacity().get(), 1);
}

#[test]
fn malformed_config_is_an_error() {
	assert!(matches!(PaletteConfig::parse("[[groups]]\nname = \"x\"\n"), Err(ConfigError::Toml(_))));
	assert!(matches!(PaletteConfig::parse("search = 3"), Err(ConfigError::Toml(_))));
}

#[test]
fn loads_config_from_disk() {
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("palette.toml");
	std::fs::write(&path, "[search]\nmax_results = 5\n").unwrap();

	assert_eq!(PaletteConfig::load(&path).unwrap().search.max_results, 5);
	assert_eq!(PaletteConfig::load_or_default(dir.path().join("missing.toml")).unwrap(), PaletteConfig::default());
	assert!(matches!(PaletteConfig::load(dir.path().join("missing.toml")), Err(ConfigError::Io { .. })));
}

#[test]
fn global_defaults_execute_to_action_records() {
	let globals = GlobalCommandProvider::with_defaults();
	assert_eq!(globals.len(), 8);
	let ctx = CommandContext::new();

	let result = globals.execute("global:file.new", "file.new", &ApiParams::new().with("path", "notes.md"), &ctx);
	assert_eq!(result.unwrap(), json!({ "action": "file.new", "params": { "path": "notes.md" } }));

	let result = globals.execute("global:tab.new", "tab.new", &ApiParams::new(), &ctx);
	assert_eq!(result.unwrap(), json!({ "action": "tab.new", "params": {} }));
}

#[test]
fn global_execution_validates_and_checks_enabled() {
	let mut globals = GlobalCommandProvider::with_defaults();
	globals.declare(GlobalCommand::new("app.quit", "Quit").disabled()).unwrap();
	let ctx = CommandContext::new();

	let err = globals.execute("global:file.new", "file.new", &ApiParams::new().with("path", 3), &ctx).unwrap_err();
	assert_eq!(err.kind, ErrorKind::InvalidParams);
	let err = globals.execute("global:app.quit", "app.quit", &ApiParams::new(), &ctx).unwrap_err();
	assert_eq!(err.kind, ErrorKind::Disabled);
	let err = globals.execute("global:nope", "nope", &ApiParams::new(), &ctx).unwrap_err();
	assert_eq!(err.kind, ErrorKind::UnknownCommand);
}

#[test]
fn global_table_rejects_duplicates_and_overrides_handlers() {
	let mut globals = GlobalCommandProvider::with_defaults();
	assert!(matches!(globals.declare(GlobalCommand::new("tab.new", "Again")), Err(PaletteError::DuplicateGlobal(name)) if name == "tab.new"));

	assert!(globals.set_handler("tab.new", |_, ctx| Ok(json!(ctx.active_view))));
	assert!(!globals.set_handler("tab.missing", |_, _| Ok(json!(null))));
	let result = globals.execute("global:tab.new", "tab.new", &ApiParams::new(), &CommandContext::new().view("scene"));
	assert_eq!(result.unwrap(), json!("scene"));
}

#[test]
fn index_stamps_provider_and_rank() {
	let index = index(8);
	index.register_provider(Arc::new(Fixed::new("first", &["Alpha"]))).unwrap();
	index.register_provider(Arc::new(Fixed::new("second", &["Beta", "Gamma"]))).unwrap();

	let commands = index.commands(&CommandContext::new());
	assert_eq!(titles(&commands), vec!["Alpha", "Beta", "Gamma"]);
	assert_eq!(
		commands.iter().map(|c| (c.provider.as_str(), c.provider_rank)).collect::<Vec<_>>(),
		vec![("first", 0), ("second", 1), ("second", 1)]
	);
}

#[test]
fn index_rejects_duplicate_provider_ids() {
	let index = index(8);
	index.register_provider(Arc::new(Fixed::new("dup", &[]))).unwrap();
	let err = index.register_provider(Arc::new(Fixed::new("dup", &[]))).unwrap_err();
	assert!(matches!(err, PaletteError::DuplicateProvider(id) if id == "dup"));
}

#[rstest]
#[case("acme:tools")]
#[case("")]
fn index_rejects_provider_ids_that_cannot_route(#[case] id: &'static str) {
	let index = index(8);
	let err = index.register_provider(Arc::new(Fixed::new(id, &["Run"]))).unwrap_err();
	assert!(matches!(err, PaletteError::InvalidProviderId(rejected) if rejected == id));
	assert!(index.provider_ids().is_empty());
	assert!(index.commands(&CommandContext::new()).is_empty());
}

#[test]
fn faulting_providers_contribute_nothing() {
	let index = index(8);
	index.register_provider(Arc::new(Failing)).unwrap();
	index.register_provider(Arc::new(Fixed::new("healthy", &["Alpha", "Beta"]))).unwrap();
	index.register_provider(Arc::new(Panicking)).unwrap();

	let ctx = CommandContext::new();
	assert_eq!(titles(&index.commands(&ctx)), vec!["Alpha", "Beta"]);
	assert_eq!(titles(&index.commands(&ctx)), vec!["Alpha", "Beta"]);

	let stats = index.stats();
	assert_eq!(stats.hits, 1);
	assert_eq!(stats.misses, 5);
	assert_eq!(stats.recomputes_for("healthy"), 1);
	assert_eq!(stats.recomputes_for("failing"), 0);
	assert_eq!(stats.recomputes_for("panicking"), 0);
}

#[test]
fn cache_follows_generation_and_context() {
	let index = index(8);
	let provider = Arc::new(Fixed::new("p", &["Alpha"]));
	index.register_provider(provider.clone()).unwrap();

	let scene = CommandContext::new().view("scene");
	index.commands(&scene);
	index.commands(&scene);
	assert_eq!(provider.calls.load(Ordering::SeqCst), 1);

	index.commands(&CommandContext::new().view("tiling"));
	assert_eq!(provider.calls.load(Ordering::SeqCst), 2);

	provider.generation.fetch_add(1, Ordering::Release);
	index.commands(&scene);
	assert_eq!(provider.calls.load(Ordering::SeqCst), 3);
	assert_eq!(index.stats().recomputes_for("p"), 3);
}

#[test]
fn inactive_providers_are_skipped() {
	let index = index(8);
	let mut dormant = Fixed::new("dormant", &["Hidden"]);
	dormant.active = false;
	index.register_provider(Arc::new(dormant)).unwrap();
	index.register_provider(Arc::new(Fixed::new("awake", &["Shown"]))).unwrap();

	assert_eq!(titles(&index.commands(&CommandContext::new())), vec!["Shown"]);
}

#[test]
fn cache_is_bounded() {
	let index = index(2);
	index.register_provider(Arc::new(Fixed::new("p", &["Alpha"]))).unwrap();
	for view in ["a", "b", "c", "d"] {
		index.commands(&CommandContext::new().view(view));
	}
	assert_eq!(index.cached_entries(), 2);
}

fn candidates() -> Vec<Command> {
	vec![
		Command::global("file.open", "Open").description("Open a file"),
		Command::global("pane.focus", "Pane").description("Focus a pane"),
		Command::global("pane.new", "New Pane").description("Split the current pane"),
		Command::global("pane.open", "Open Pane"),
		Command::global("tab.new", "New Tab").description("Create a new tab"),
	]
}

#[test]
fn empty_query_keeps_candidate_order_and_truncates() {
	let config = SearchConfig {
		max_results: 3,
		..SearchConfig::default()
	};
	let hits = search(candidates(), "  ", &config);
	assert_eq!(
		hits.iter().map(|h| h.command.title.as_str()).collect::<Vec<_>>(),
		vec!["Open", "Pane", "New Pane"]
	);
	assert!(hits.iter().all(|h| h.score == 0));
}

#[test]
fn anchored_matches_rank_first() {
	let hits = search(candidates(), "np", &SearchConfig::default());
	let order: Vec<_> = hits.iter().map(|h| h.command.title.as_str()).collect();
	assert_eq!(order[0], "New Pane");
	assert_eq!(hits[0].title_indices, vec![0, 4]);
	let position = |title: &str| order.iter().position(|t| *t == title);
	for other in ["Open", "Pane", "Open Pane"] {
		if let Some(at) = position(other) {
			assert!(at > 0, "{other} ranked above New Pane: {order:?}");
		}
	}
}

#[test]
fn title_matches_beat_description_matches() {
	let hits = search(candidates(), "tab", &SearchConfig::default());
	assert_eq!(hits[0].command.title, "New Tab");
	assert!(hits[0].score > search::TITLE_WEIGHT);
}

#[test]
fn ties_break_on_length_then_rank_then_id() {
	let mut b = Command::global("b", "Save");
	b.provider_rank = 1;
	let mut a = Command::global("a", "Save");
	a.provider_rank = 1;
	let mut c = Command::global("c", "Save");
	c.provider_rank = 0;
	let longer = Command::global("0", "Save All");

	let hits = search(vec![longer, b, a, c], "save", &SearchConfig::default());
	assert_eq!(
		hits.iter().map(|h| h.command.id.as_str()).collect::<Vec<_>>(),
		vec!["global:c", "global:a", "global:b", "global:0"]
	);
}

#[test]
fn non_matching_query_returns_nothing() {
	assert!(search(candidates(), "zzz", &SearchConfig::default()).is_empty());
}

proptest! {
	#[test]
	fn search_is_pure(query in "[a-z ]{0,6}", max in 1usize..8) {
		let config = SearchConfig { max_results: max, ..SearchConfig::default() };
		let first = search(candidates(), &query, &config);
		let second = search(candidates(), &query, &config);
		prop_assert!(first.len() <= max);
		prop_assert_eq!(first, second);
	}
}
