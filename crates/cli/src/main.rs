//! Switchyard command line front end.
//!
//! Builds a palette over a small in-memory workspace (one code editor, one
//! terminal) and exposes search, execution and diagnostics as subcommands.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use switchyard_invocation::ApiParams;
use switchyard_palette::{CommandContext, CommandPalette, PaletteConfig};
use switchyard_registry::ActorRegistry;
use tracing::{debug, info};

mod actors;

/// Command line arguments.
#[derive(Parser, Debug)]
#[command(name = "switchyard")]
#[command(about = "Search and run commands exposed by workspace actors")]
struct Args {
	/// Palette configuration (TOML). Defaults apply when absent.
	#[arg(short, long, value_name = "PATH")]
	config: Option<PathBuf>,

	/// Verbose logging
	#[arg(short, long)]
	verbose: bool,

	#[command(subcommand)]
	command: Cmd,
}

/// Context flags shared by every subcommand that depends on focus or view.
#[derive(clap::Args, Debug, Default)]
struct ContextArgs {
	/// Actor type treated as focused (e.g. `code_editor`, `terminal`)
	#[arg(long, value_name = "TYPE")]
	focus: Option<String>,

	/// Active view system (e.g. `scene`, `tiling`)
	#[arg(long, value_name = "VIEW")]
	view: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Cmd {
	/// Rank commands against a query
	Search {
		/// Query; empty lists every eligible command
		#[arg(default_value = "")]
		query: String,

		#[command(flatten)]
		context: ContextArgs,
	},
	/// Execute a command id such as `global:file.new` or `actor:1:get_content`
	Exec {
		command_id: String,

		/// Parameters as a JSON object
		#[arg(short, long, value_name = "JSON")]
		params: Option<String>,

		#[command(flatten)]
		context: ContextArgs,
	},
	/// List live actors
	Actors {
		/// Include each actor's state snapshot
		#[arg(long)]
		state: bool,
	},
	/// List configured groups and whether they are active
	Groups {
		#[command(flatten)]
		context: ContextArgs,
	},
}

fn main() -> anyhow::Result<()> {
	let args = Args::parse();

	setup_tracing(args.verbose);

	let config = load_config(args.config.as_deref())?;

	let registry = Arc::new(ActorRegistry::new());
	let ids = actors::register_workspace(&registry)?;
	debug!(actors = ids.len(), "workspace ready");

	let palette = CommandPalette::builder(Arc::clone(&registry)).config(config).build()?;
	run(&palette, args.command)
}

fn run(palette: &CommandPalette, command: Cmd) -> anyhow::Result<()> {
	match command {
		Cmd::Search { query, context } => {
			let ctx = build_context(palette, &context);
			for hit in palette.search(&query, &ctx) {
				let shortcut = hit.command.shortcut.as_deref().unwrap_or("");
				println!("{:>5}  {:<32} {:<36} {}", hit.score, hit.command.id, hit.command.title, shortcut);
			}
		}
		Cmd::Exec { command_id, params, context } => {
			let ctx = build_context(palette, &context);
			let params = match params {
				Some(raw) => ApiParams::from_json(serde_json::from_str(&raw).context("parsing --params")?)?,
				None => ApiParams::new(),
			};
			let value = palette.execute_command_with(&command_id, &params, &ctx)?;
			info!(command = %command_id, "command executed");
			println!("{}", serde_json::to_string_pretty(&value)?);
		}
		Cmd::Actors { state } => {
			for info in palette.get_actors_info() {
				let mut record = serde_json::to_value(&info)?;
				if state {
					record["state"] = serde_json::to_value(palette.get_actor_state(info.actor_id)?)?;
				}
				println!("{}", serde_json::to_string_pretty(&record)?);
			}
		}
		Cmd::Groups { context } => {
			let ctx = build_context(palette, &context);
			for group in palette.groups() {
				let active = if palette.is_group_active(&group.name, &ctx) { "active" } else { "inactive" };
				println!("{:<24} {:<8} {}", group.name, active, group.title.as_deref().unwrap_or(""));
			}
		}
	}
	Ok(())
}

/// A missing file means defaults; an unreadable or malformed one is an error.
fn load_config(path: Option<&Path>) -> anyhow::Result<PaletteConfig> {
	match path {
		Some(path) => PaletteConfig::load_or_default(path).with_context(|| format!("loading {}", path.display())),
		None => Ok(PaletteConfig::default()),
	}
}

/// Focus resolves to the first live actor of the requested type.
fn build_context(palette: &CommandPalette, args: &ContextArgs) -> CommandContext {
	let mut ctx = CommandContext::new();
	if let Some(actor_type) = &args.focus {
		ctx = ctx.focused(actor_type.as_str());
		if let Some(id) = palette.registry().find_by_type(actor_type).first() {
			ctx = ctx.focused_actor(*id);
		}
	}
	if let Some(view) = &args.view {
		ctx = ctx.view(view.as_str());
	}
	ctx
}

fn setup_tracing(verbose: bool) {
	use tracing_subscriber::EnvFilter;

	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
		if verbose {
			EnvFilter::new("switchyard=debug,info")
		} else {
			EnvFilter::new("warn")
		}
	});

	tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).with_target(true).init();
}
