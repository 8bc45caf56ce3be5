//! loadfixtures command implementation.
//!
//! This command resolves the requested fixture groups, purges the database
//! unless appending, and loads every resolved fixture in dependency order.

use std::sync::Arc;

use crate::backend::FixtureBackend;
use crate::error::{FixtureError, FixtureResult};
use crate::executor::{ExecutionOptions, ExecutionReport, FixtureExecutor};
use crate::progress::ProgressSink;
use crate::purger::{PurgeMode, PurgerFactoryRegistry};
use crate::registry::FixtureRegistry;
use crate::resolver::{DependencyPolicy, DependencyResolver};
use crate::settings::FixtureSettings;

/// Options for the loadfixtures command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadFixturesOptions {
	/// Append fixtures instead of purging first.
	pub append: bool,

	/// Only load fixtures in these groups; empty loads everything.
	pub groups: Vec<String>,

	/// Connection (entity manager) to use.
	pub entity_manager: Option<String>,

	/// Shard to route the connection to.
	pub shard: Option<String>,

	/// Purger factory alias.
	pub purger: Option<String>,

	/// Tables excluded from purging.
	pub purge_exclusions: Vec<String>,

	/// Purge with `TRUNCATE` instead of `DELETE`.
	pub purge_with_truncate: bool,

	/// Handling of dependencies outside the requested groups; unset means
	/// the settings value, then [`DependencyPolicy::Strict`].
	pub dependency_policy: Option<DependencyPolicy>,

	/// Verbosity level.
	pub verbosity: u8,
}

impl LoadFixturesOptions {
	/// Creates new default options.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets append flag.
	pub fn with_append(mut self, append: bool) -> Self {
		self.append = append;
		self
	}

	/// Sets group filter.
	pub fn with_groups<I, G>(mut self, groups: I) -> Self
	where
		I: IntoIterator<Item = G>,
		G: Into<String>,
	{
		self.groups = groups.into_iter().map(Into::into).collect();
		self
	}

	/// Sets entity manager name.
	pub fn with_entity_manager(mut self, name: impl Into<String>) -> Self {
		self.entity_manager = Some(name.into());
		self
	}

	/// Sets shard identifier.
	pub fn with_shard(mut self, shard: impl Into<String>) -> Self {
		self.shard = Some(shard.into());
		self
	}

	/// Sets purger factory alias.
	pub fn with_purger(mut self, alias: impl Into<String>) -> Self {
		self.purger = Some(alias.into());
		self
	}

	/// Sets tables excluded from purging.
	pub fn with_purge_exclusions<I, T>(mut self, tables: I) -> Self
	where
		I: IntoIterator<Item = T>,
		T: Into<String>,
	{
		self.purge_exclusions = tables.into_iter().map(Into::into).collect();
		self
	}

	/// Sets truncate flag.
	pub fn with_purge_with_truncate(mut self, truncate: bool) -> Self {
		self.purge_with_truncate = truncate;
		self
	}

	/// Sets dependency policy.
	pub fn with_dependency_policy(mut self, policy: DependencyPolicy) -> Self {
		self.dependency_policy = Some(policy);
		self
	}

	/// Sets verbosity level.
	pub fn with_verbosity(mut self, level: u8) -> Self {
		self.verbosity = level;
		self
	}

	/// Fills unset options from `settings`.
	///
	/// Flags that are set here win; lists are taken from the settings only
	/// when empty here, and boolean flags are enabled by either side. The
	/// dependency policy comes from the settings only when unset here.
	pub fn merge_settings(mut self, settings: &FixtureSettings) -> Self {
		self.append |= settings.append;
		self.purge_with_truncate |= settings.purge_with_truncate;
		if self.groups.is_empty() {
			self.groups = settings.groups.clone();
		}
		if self.purge_exclusions.is_empty() {
			self.purge_exclusions = settings.purge_exclusions.clone();
		}
		if self.entity_manager.is_none() {
			self.entity_manager = settings.entity_manager.clone();
		}
		if self.shard.is_none() {
			self.shard = settings.shard.clone();
		}
		if self.purger.is_none() {
			self.purger = settings.purger.clone();
		}
		if self.dependency_policy.is_none() {
			self.dependency_policy = Some(settings.dependency_policy);
		}
		self
	}

	/// Returns the purge mode selected by these options.
	pub fn purge_mode(&self) -> PurgeMode {
		PurgeMode::from_truncate_flag(self.purge_with_truncate)
	}

	fn execution_options(&self) -> ExecutionOptions {
		ExecutionOptions::new()
			.with_append(self.append)
			.with_purge_mode(self.purge_mode())
			.with_excluded_tables(self.purge_exclusions.clone())
	}
}

impl From<FixtureSettings> for LoadFixturesOptions {
	fn from(settings: FixtureSettings) -> Self {
		Self::new().merge_settings(&settings)
	}
}

/// The loadfixtures command for loading registered fixtures into a session.
///
/// # Example
///
/// ```ignore
/// let command = LoadFixturesCommand::new(&registry, &purgers, &backend)
///     .with_sink(Arc::new(TracingSink));
/// let options = LoadFixturesOptions::new().with_groups(["staging"]);
/// let report = command.execute(&options).await?;
/// println!("Loaded {} fixture(s)", report.loaded.len());
/// ```
pub struct LoadFixturesCommand<'a, S> {
	registry: &'a FixtureRegistry<S>,
	purgers: &'a PurgerFactoryRegistry<S>,
	backend: &'a dyn FixtureBackend<S>,
	sink: Option<Arc<dyn ProgressSink>>,
}

impl<'a, S> LoadFixturesCommand<'a, S> {
	/// Creates a new loadfixtures command.
	pub fn new(
		registry: &'a FixtureRegistry<S>,
		purgers: &'a PurgerFactoryRegistry<S>,
		backend: &'a dyn FixtureBackend<S>,
	) -> Self {
		Self {
			registry,
			purgers,
			backend,
			sink: None,
		}
	}

	/// Sets the progress sink.
	pub fn with_sink(mut self, sink: Arc<dyn ProgressSink>) -> Self {
		self.sink = Some(sink);
		self
	}

	/// Returns the command name.
	pub fn name(&self) -> &str {
		"loadfixtures"
	}

	/// Returns the command description.
	pub fn description(&self) -> &str {
		"Load data fixtures to your database"
	}

	/// Returns the command help text.
	pub fn help(&self) -> &str {
		r#"
Usage: loadfixtures [options]

Loads data fixtures into the database. Existing data is purged first
unless --append is given.

Options:
  --append                   Append the data fixtures instead of deleting all data
  --group GROUP              Only load fixtures that belong to this group (repeatable)
  --em NAME                  The entity manager to use for this command
  --shard SHARD              The shard connection to use for this command
  --purger ALIAS             The purger to use for this command
  --purge-exclusions TABLE   List of database tables to ignore while purging (repeatable)
  --purge-with-truncate      Purge data by using a database-level TRUNCATE statement
  --dependency-policy NAME   strict or transitive
"#
	}

	/// Executes the loadfixtures command.
	///
	/// # Errors
	///
	/// - [`FixtureError::NoFixturesFound`] if the requested groups select nothing
	/// - [`FixtureError::MissingDependency`] / [`FixtureError::CircularDependency`] from resolution
	/// - [`FixtureError::UnknownPurger`] if the purger alias is not registered
	/// - [`FixtureError::ShardingUnsupported`] if a shard is requested from a backend without shards
	/// - [`FixtureError::Backend`] if no session can be opened
	/// - executor errors from purging and loading
	pub async fn execute(&self, options: &LoadFixturesOptions) -> FixtureResult<ExecutionReport> {
		let resolved = DependencyResolver::new(self.registry)
			.with_policy(options.dependency_policy.unwrap_or_default())
			.resolve(&options.groups)?;

		let manager = options.entity_manager.as_deref();
		let shard = options.shard.as_deref();
		if let Some(shard) = shard
			&& !self.backend.supports_shards(manager)
		{
			tracing::warn!(shard, "shard requested from a backend without shard support");
			return Err(FixtureError::ShardingUnsupported(
				manager.unwrap_or("default").to_string(),
			));
		}

		let mut executor = FixtureExecutor::<S>::new();
		if !options.append {
			let purger = self.purgers.create(
				options.purger.as_deref(),
				manager,
				&options.purge_exclusions,
				options.purge_mode(),
			)?;
			executor = executor.with_purger(purger);
		}
		if let Some(sink) = &self.sink {
			executor = executor.with_sink(Arc::clone(sink));
		}

		tracing::debug!(
			fixtures = resolved.len(),
			manager = manager.unwrap_or("default"),
			append = options.append,
			"opening fixture session"
		);
		let mut session = self
			.backend
			.session(manager, shard)
			.await
			.map_err(FixtureError::Backend)?;

		let report = executor
			.execute(&mut session, &resolved, &options.execution_options())
			.await?;

		if options.verbosity > 0 {
			self.print_result(&report);
		}

		Ok(report)
	}

	fn print_result(&self, report: &ExecutionReport) {
		println!("Loaded {} fixture(s)", report.loaded.len());
	}
}
