//! Purge-then-load execution of resolved fixtures.
//!
//! The executor walks through the following states for one execution:
//!
//! ```text
//! Idle -> Purging (skipped when appending) -> Loading[1..N] -> Done
//!            \                                   \
//!             +---------------> Failed <----------+
//! ```
//!
//! Fixtures are loaded strictly one after another because later fixtures may
//! look up data inserted by earlier ones through the [`ReferenceRepository`].
//! The first failure aborts the run; nothing that was already loaded is rolled
//! back here.

use std::sync::Arc;

use crate::error::{FixtureError, FixtureResult};
use crate::progress::ProgressSink;
use crate::purger::{PurgeMode, Purger};
use crate::references::ReferenceRepository;
use crate::registry::RegisteredFixture;

/// Current state of a [`FixtureExecutor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionState {
	/// Nothing has run yet.
	Idle,
	/// Existing data is being purged.
	Purging,
	/// The fixture at `index` (1-based) out of `total` is being loaded.
	Loading {
		/// Position of the fixture being loaded, starting at 1.
		index: usize,
		/// Number of fixtures in this execution.
		total: usize,
	},
	/// Every fixture was loaded.
	Done,
	/// Execution stopped on an error.
	Failed {
		/// Fixture whose load failed, `None` when the purge failed.
		fixture: Option<String>,
		/// Rendered error message.
		message: String,
	},
}

/// Options for one execution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionOptions {
	/// Load without purging existing data first.
	pub append: bool,
	/// Purge strategy used when not appending.
	pub purge_mode: PurgeMode,
	/// Tables left untouched by the purge.
	pub excluded_tables: Vec<String>,
}

impl ExecutionOptions {
	/// Creates default options (purge with `DELETE`, nothing excluded).
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the append flag.
	pub fn with_append(mut self, append: bool) -> Self {
		self.append = append;
		self
	}

	/// Sets the purge mode.
	pub fn with_purge_mode(mut self, mode: PurgeMode) -> Self {
		self.purge_mode = mode;
		self
	}

	/// Sets the tables excluded from purging.
	pub fn with_excluded_tables(mut self, tables: Vec<String>) -> Self {
		self.excluded_tables = tables;
		self
	}
}

/// Summary of a successful execution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionReport {
	/// Whether the purge step ran.
	pub purged: bool,
	/// Loaded fixture identities, in load order.
	pub loaded: Vec<String>,
}

/// Runs the purge step and loads fixtures in resolved order.
///
/// # Example
///
/// ```ignore
/// let resolved = DependencyResolver::new(&registry).resolve(&["staging"])?;
///
/// let mut executor = FixtureExecutor::new()
///     .with_purger(purger)
///     .with_sink(Arc::new(TracingSink));
/// let report = executor
///     .execute(&mut conn, &resolved, &ExecutionOptions::new())
///     .await?;
/// ```
pub struct FixtureExecutor<S> {
	purger: Option<Arc<dyn Purger<S>>>,
	sink: Option<Arc<dyn ProgressSink>>,
	references: ReferenceRepository,
	state: ExecutionState,
}

impl<S> FixtureExecutor<S> {
	/// Creates an executor without purger or progress sink.
	pub fn new() -> Self {
		Self {
			purger: None,
			sink: None,
			references: ReferenceRepository::new(),
			state: ExecutionState::Idle,
		}
	}

	/// Sets the purger used when not appending.
	pub fn with_purger(mut self, purger: Arc<dyn Purger<S>>) -> Self {
		self.purger = Some(purger);
		self
	}

	/// Sets the progress sink.
	pub fn with_sink(mut self, sink: Arc<dyn ProgressSink>) -> Self {
		self.sink = Some(sink);
		self
	}

	/// Returns the current execution state.
	pub fn state(&self) -> &ExecutionState {
		&self.state
	}

	/// Returns the references published by loaded fixtures.
	pub fn references(&self) -> &ReferenceRepository {
		&self.references
	}

	/// Purges (unless appending) and loads `fixtures` in the given order.
	///
	/// Every call starts from [`ExecutionState::Idle`] with an empty
	/// reference repository.
	///
	/// # Errors
	///
	/// - [`FixtureError::NoFixturesFound`] if `fixtures` is empty
	/// - [`FixtureError::MissingPurger`] if a purge is needed but no purger is set
	/// - [`FixtureError::PurgeFailed`] if the purger fails
	/// - [`FixtureError::LoadFailed`] if a fixture fails; later fixtures are not loaded
	pub async fn execute(
		&mut self,
		session: &mut S,
		fixtures: &[&RegisteredFixture<S>],
		options: &ExecutionOptions,
	) -> FixtureResult<ExecutionReport> {
		self.state = ExecutionState::Idle;
		self.references = ReferenceRepository::new();

		if fixtures.is_empty() {
			return Err(self.fail(None, FixtureError::NoFixturesFound { groups: Vec::new() }));
		}

		let mut report = ExecutionReport::default();

		if !options.append {
			self.purge(session, options).await?;
			report.purged = true;
		}

		let total = fixtures.len();
		for (position, registered) in fixtures.iter().enumerate() {
			let index = position + 1;
			self.state = ExecutionState::Loading { index, total };
			self.report(&format!(
				"loading {} ({}/{})",
				registered.identity(),
				index,
				total
			));
			tracing::debug!(fixture = %registered.identity(), index, total, "loading fixture");

			let outcome = registered
				.fixture()
				.load(session, &mut self.references)
				.await;
			if let Err(source) = outcome {
				tracing::error!(fixture = %registered.identity(), error = %source, "fixture load failed");
				return Err(self.fail(
					Some(registered.identity()),
					FixtureError::LoadFailed {
						fixture: registered.identity().to_string(),
						source,
					},
				));
			}

			report.loaded.push(registered.identity().to_string());
		}

		self.state = ExecutionState::Done;
		tracing::info!(
			loaded = report.loaded.len(),
			purged = report.purged,
			"fixtures loaded"
		);
		Ok(report)
	}

	async fn purge(&mut self, session: &mut S, options: &ExecutionOptions) -> FixtureResult<()> {
		let Some(purger) = self.purger.clone() else {
			return Err(self.fail(None, FixtureError::MissingPurger));
		};

		self.state = ExecutionState::Purging;
		self.report(&format!("purging database ({})", options.purge_mode));

		purger
			.purge(session, &options.excluded_tables, options.purge_mode)
			.await
			.map_err(|source| {
				tracing::error!(error = %source, "purge failed");
				self.fail(None, FixtureError::PurgeFailed(source))
			})
	}

	fn report(&self, message: &str) {
		if let Some(sink) = &self.sink {
			sink.log(message);
		}
	}

	fn fail(&mut self, fixture: Option<&str>, error: FixtureError) -> FixtureError {
		self.state = ExecutionState::Failed {
			fixture: fixture.map(str::to_string),
			message: error.to_string(),
		};
		error
	}
}

impl<S> Default for FixtureExecutor<S> {
	fn default() -> Self {
		Self::new()
	}
}
