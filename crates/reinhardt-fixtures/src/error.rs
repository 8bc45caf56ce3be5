//! Error types for the fixtures module.
//!
//! This module defines the error types used throughout the reinhardt-fixtures crate.

use thiserror::Error;

/// Boxed error returned by external collaborators (purgers, backends, fixture loads).
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while resolving or executing fixtures.
#[derive(Debug, Error)]
pub enum FixtureError {
	/// The resolved fixture set is empty.
	#[error("{}", no_fixtures_message(.groups))]
	NoFixturesFound {
		/// Groups that were requested (empty when all fixtures were requested).
		groups: Vec<String>,
	},

	/// A declared dependency could not be resolved in the working set.
	#[error("{}", missing_dependency_message(.dependency, .required_by, .in_group_filter))]
	MissingDependency {
		/// Identity of the dependency that could not be resolved.
		dependency: String,
		/// Identity of the fixture that declared the dependency.
		required_by: String,
		/// Whether the dependency is registered but excluded by the group filter.
		in_group_filter: bool,
	},

	/// A fixture requested by identity is not registered.
	#[error("Fixture \"{0}\" is not registered")]
	FixtureNotFound(String),

	/// The dependency graph contains a cycle.
	#[error("Circular dependency detected: {}", .path.join(" -> "))]
	CircularDependency {
		/// Cycle members, starting and ending with the same identity.
		path: Vec<String>,
	},

	/// The purge step failed before any fixture was loaded.
	#[error("Purge failed: {0}")]
	PurgeFailed(#[source] BoxError),

	/// A fixture's load operation failed.
	#[error("Failed to load fixture \"{fixture}\": {source}")]
	LoadFailed {
		/// Identity of the failing fixture.
		fixture: String,
		/// Error returned by the fixture.
		#[source]
		source: BoxError,
	},

	/// No purger factory is registered under the requested alias.
	#[error("Could not find purger factory with alias \"{0}\"")]
	UnknownPurger(String),

	/// Purging was requested but no purger was configured.
	#[error("A purger is required unless fixtures are appended")]
	MissingPurger,

	/// A shard was requested from a backend without shard support.
	#[error("Connection \"{0}\" does not support shard routing")]
	ShardingUnsupported(String),

	/// A reference with the same name was already added.
	#[error("Reference to \"{0}\" already exists, use set_reference to overwrite it")]
	DuplicateReference(String),

	/// No reference is stored under the requested name.
	#[error("Reference to \"{0}\" does not exist")]
	ReferenceNotFound(String),

	/// The persistence backend failed to provide a session.
	#[error("Backend error: {0}")]
	Backend(#[source] BoxError),

	/// Settings could not be applied.
	#[error("Settings error: {0}")]
	Settings(String),

	/// I/O operation failed.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),

	/// TOML settings could not be parsed.
	#[error("TOML error: {0}")]
	Toml(#[from] toml::de::Error),
}

impl FixtureError {
	/// Returns true if this error means nothing was selected for loading.
	pub fn is_no_fixtures_found(&self) -> bool {
		matches!(self, FixtureError::NoFixturesFound { .. })
	}
}

fn no_fixtures_message(groups: &[String]) -> String {
	if groups.is_empty() {
		"Could not find any fixture services to load.".to_string()
	} else {
		format!(
			"Could not find any fixture services to load in the groups ({}).",
			groups.join(", ")
		)
	}
}

fn missing_dependency_message(dependency: &str, required_by: &str, in_group_filter: &bool) -> String {
	if *in_group_filter {
		format!(
			"Fixture \"{}\" was declared as a dependency for fixture \"{}\", but it was not included in any of the loaded fixture groups.",
			dependency, required_by
		)
	} else {
		format!(
			"Fixture \"{}\" was declared as a dependency for fixture \"{}\", but it is not registered.",
			dependency, required_by
		)
	}
}

/// Result type alias for fixture operations.
pub type FixtureResult<T> = Result<T, FixtureError>;
