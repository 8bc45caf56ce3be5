//! Command-line entry point for the fixture commands.
//!
//! Applications wire their fixtures, purger factories and backend into a
//! [`FixtureApplication`] and hand the process arguments to
//! [`execute_from_args`]:
//!
//! ```ignore
//! #[tokio::main]
//! async fn main() -> std::process::ExitCode {
//!     let app = FixtureApplication::new(registry, Arc::new(backend))
//!         .with_purger(DEFAULT_PURGER, Arc::new(SqlPurgerFactory));
//!     let code = execute_from_args(&app, std::env::args_os()).await;
//!     std::process::ExitCode::from(code)
//! }
//! ```
//!
//! Exit codes: `0` on success, `1` when no fixtures were selected, `2` for
//! every other failure (including argument errors).

use std::ffi::OsString;
use std::io::{BufRead, IsTerminal, Write};
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use crate::backend::FixtureBackend;
use crate::commands::{
	ListFixturesCommand, LoadFixturesCommand, LoadFixturesOptions, render_listing,
};
use crate::error::FixtureResult;
use crate::progress::ProgressSink;
use crate::purger::{PurgerFactory, PurgerFactoryRegistry};
use crate::registry::FixtureRegistry;
use crate::resolver::DependencyPolicy;
use crate::settings::FixtureSettings;

/// Exit code for a successful run.
pub const EXIT_SUCCESS: u8 = 0;
/// Exit code when the requested groups select no fixtures.
pub const EXIT_NO_FIXTURES: u8 = 1;
/// Exit code for every other failure.
pub const EXIT_FAILURE: u8 = 2;

/// Parsed command line.
#[derive(Debug, Parser)]
#[command(name = "fixtures")]
#[command(about = "Reinhardt data fixture utility", long_about = None)]
#[command(version)]
pub struct Cli {
	/// Selected subcommand.
	#[command(subcommand)]
	pub command: Commands,

	/// Verbosity level (can be repeated)
	#[arg(short, long, action = clap::ArgAction::Count, global = true)]
	pub verbosity: u8,

	/// TOML file with a [fixtures] settings table
	#[arg(long, value_name = "PATH", global = true)]
	pub settings: Option<PathBuf>,
}

/// Fixture subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
	/// Load data fixtures to your database
	Loadfixtures {
		/// Append the data fixtures instead of deleting all data from the database first
		#[arg(long)]
		append: bool,

		/// Only load fixtures that belong to this group
		#[arg(long = "group", value_name = "GROUP")]
		groups: Vec<String>,

		/// The entity manager to use for this command
		#[arg(long = "em", value_name = "NAME")]
		entity_manager: Option<String>,

		/// The shard connection to use for this command
		#[arg(long, value_name = "SHARD")]
		shard: Option<String>,

		/// The purger to use for this command
		#[arg(long, value_name = "ALIAS")]
		purger: Option<String>,

		/// List of database tables to ignore while purging
		#[arg(long = "purge-exclusions", value_name = "TABLE")]
		purge_exclusions: Vec<String>,

		/// Purge data by using a database-level TRUNCATE statement
		#[arg(long)]
		purge_with_truncate: bool,

		/// How dependencies outside the selected groups are handled (strict or transitive)
		#[arg(long, value_name = "POLICY")]
		dependency_policy: Option<DependencyPolicy>,

		/// Do not ask for confirmation before purging
		#[arg(short = 'n', long)]
		no_interaction: bool,
	},

	/// List data fixtures in load order
	Listfixtures {
		/// Only list fixtures that belong to this group
		#[arg(long = "group", value_name = "GROUP")]
		groups: Vec<String>,

		/// Only list these fixtures and their dependencies
		#[arg(long = "fixture", value_name = "IDENTITY", conflicts_with = "groups")]
		fixtures: Vec<String>,

		/// How dependencies outside the selected groups are handled (strict or transitive)
		#[arg(long, value_name = "POLICY")]
		dependency_policy: Option<DependencyPolicy>,
	},
}

/// Everything the fixture commands need from the host application.
pub struct FixtureApplication<S> {
	registry: FixtureRegistry<S>,
	purgers: PurgerFactoryRegistry<S>,
	backend: Arc<dyn FixtureBackend<S>>,
}

impl<S> FixtureApplication<S> {
	/// Creates an application without purger factories.
	pub fn new(registry: FixtureRegistry<S>, backend: Arc<dyn FixtureBackend<S>>) -> Self {
		Self {
			registry,
			purgers: PurgerFactoryRegistry::new(),
			backend,
		}
	}

	/// Registers a purger factory under `alias`.
	pub fn with_purger(mut self, alias: impl Into<String>, factory: Arc<dyn PurgerFactory<S>>) -> Self {
		self.purgers.register(alias, factory);
		self
	}

	/// Replaces the purger factories.
	pub fn with_purgers(mut self, purgers: PurgerFactoryRegistry<S>) -> Self {
		self.purgers = purgers;
		self
	}

	/// Returns the fixture registry.
	pub fn registry(&self) -> &FixtureRegistry<S> {
		&self.registry
	}
}

/// Parses `args`, runs the selected command and returns the process exit code.
pub async fn execute_from_args<S, I, T>(app: &FixtureApplication<S>, args: I) -> u8
where
	I: IntoIterator<Item = T>,
	T: Into<OsString> + Clone,
{
	let cli = match Cli::try_parse_from(args) {
		Ok(cli) => cli,
		Err(e) => {
			let _ = e.print();
			return if e.use_stderr() { EXIT_FAILURE } else { EXIT_SUCCESS };
		}
	};

	init_tracing(cli.verbosity);

	let result = run(app, cli).await;
	match &result {
		Ok(()) => {}
		Err(e) if e.is_no_fixtures_found() => eprintln!("{}", e.to_string().yellow()),
		Err(e) => eprintln!("{} {}", "Error:".red().bold(), e),
	}
	exit_code(&result)
}

/// Maps a command result to its exit code.
pub fn exit_code<T>(result: &FixtureResult<T>) -> u8 {
	match result {
		Ok(_) => EXIT_SUCCESS,
		Err(e) if e.is_no_fixtures_found() => EXIT_NO_FIXTURES,
		Err(_) => EXIT_FAILURE,
	}
}

/// Runs a parsed command line.
pub async fn run<S>(app: &FixtureApplication<S>, cli: Cli) -> FixtureResult<()> {
	let settings = match &cli.settings {
		Some(path) => FixtureSettings::from_file(path)?,
		None => FixtureSettings::default(),
	};

	match cli.command {
		Commands::Loadfixtures {
			append,
			groups,
			entity_manager,
			shard,
			purger,
			purge_exclusions,
			purge_with_truncate,
			dependency_policy,
			no_interaction,
		} => {
			let mut options = LoadFixturesOptions::new()
				.with_append(append)
				.with_groups(groups)
				.with_purge_exclusions(purge_exclusions)
				.with_purge_with_truncate(purge_with_truncate)
				.with_verbosity(cli.verbosity);
			options.entity_manager = entity_manager;
			options.shard = shard;
			options.purger = purger;
			options.dependency_policy = dependency_policy;
			let options = options.merge_settings(&settings);

			let interactive = !no_interaction && std::io::stdin().is_terminal();
			if !options.append && interactive {
				let manager = options.entity_manager.as_deref().unwrap_or("default");
				let stdin = std::io::stdin();
				if !confirm_purge(manager, &mut stdin.lock(), &mut std::io::stdout())? {
					tracing::info!("purge cancelled by user");
					return Ok(());
				}
			}

			let sink: Arc<dyn ProgressSink> = Arc::new(|message: &str| {
				println!("  {} {}", ">".yellow(), message.green());
			});
			LoadFixturesCommand::new(&app.registry, &app.purgers, app.backend.as_ref())
				.with_sink(sink)
				.execute(&options)
				.await?;
			Ok(())
		}
		Commands::Listfixtures {
			groups,
			fixtures,
			dependency_policy,
		} => {
			let groups = if groups.is_empty() { settings.groups } else { groups };
			let policy = dependency_policy.unwrap_or(settings.dependency_policy);
			let command = ListFixturesCommand::new(&app.registry).with_policy(policy);
			let rows = if fixtures.is_empty() {
				command.execute(&groups)?
			} else {
				command.dependency_tree(&fixtures)?
			};
			print!("{}", render_listing(&rows));
			Ok(())
		}
	}
}

/// Asks whether the database of `manager` may be purged.
///
/// Anything other than `y` or `yes` (case-insensitive) declines.
pub fn confirm_purge<R, W>(manager: &str, input: &mut R, output: &mut W) -> FixtureResult<bool>
where
	R: BufRead,
	W: Write,
{
	write!(
		output,
		"Careful, database \"{}\" will be purged. Do you want to continue? (yes/no) [no]: ",
		manager
	)?;
	output.flush()?;

	let mut answer = String::new();
	input.read_line(&mut answer)?;
	Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

/// Installs a `tracing` subscriber on stderr.
///
/// `RUST_LOG` wins when set; otherwise `-v` raises the level from warn to
/// info, debug and trace. Calling this again after a subscriber is installed
/// has no effect.
pub fn init_tracing(verbosity: u8) {
	let level = match verbosity {
		0 => "warn",
		1 => "info",
		2 => "debug",
		_ => "trace",
	};
	let filter = EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| EnvFilter::new(format!("reinhardt_fixtures={level}")));

	let _ = tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.try_init();
}
