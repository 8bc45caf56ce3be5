//! Purger contracts.
//!
//! Purging removes existing data before fixtures are loaded. The SQL that does
//! the work belongs to the database backend; this module only defines the
//! contracts the executor and the `loadfixtures` command call into, and a
//! registry of named purger factories selectable with `--purger`.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{BoxError, FixtureError, FixtureResult};

/// Alias of the purger factory used when none is requested.
pub const DEFAULT_PURGER: &str = "default";

/// How existing rows are removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PurgeMode {
	/// `DELETE FROM` every table.
	#[default]
	Delete,
	/// `TRUNCATE` every table.
	Truncate,
}

impl PurgeMode {
	/// Returns the mode selected by a `--purge-with-truncate` flag.
	pub fn from_truncate_flag(truncate: bool) -> Self {
		if truncate {
			PurgeMode::Truncate
		} else {
			PurgeMode::Delete
		}
	}
}

impl std::fmt::Display for PurgeMode {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			PurgeMode::Delete => write!(f, "delete"),
			PurgeMode::Truncate => write!(f, "truncate"),
		}
	}
}

/// Removes existing data through a session `S`.
#[async_trait]
pub trait Purger<S>: Send + Sync {
	/// Purges every table except `excluded`.
	async fn purge(&self, session: &mut S, excluded: &[String], mode: PurgeMode)
	-> Result<(), BoxError>;
}

/// Creates purgers for a named connection.
pub trait PurgerFactory<S>: Send + Sync {
	/// Creates a purger for `manager` (`None` selects the default connection).
	fn create_for_manager(
		&self,
		manager: Option<&str>,
		excluded: &[String],
		mode: PurgeMode,
	) -> Arc<dyn Purger<S>>;
}

/// Named purger factories.
pub struct PurgerFactoryRegistry<S> {
	factories: HashMap<String, Arc<dyn PurgerFactory<S>>>,
}

impl<S> PurgerFactoryRegistry<S> {
	/// Creates an empty registry.
	pub fn new() -> Self {
		Self {
			factories: HashMap::new(),
		}
	}

	/// Registers a factory under `alias`, replacing any previous one.
	pub fn register(&mut self, alias: impl Into<String>, factory: Arc<dyn PurgerFactory<S>>) {
		let alias = alias.into();
		tracing::debug!(alias = %alias, "registered purger factory");
		self.factories.insert(alias, factory);
	}

	/// Registers a factory and returns the registry.
	pub fn with_factory(
		mut self,
		alias: impl Into<String>,
		factory: Arc<dyn PurgerFactory<S>>,
	) -> Self {
		self.register(alias, factory);
		self
	}

	/// Returns the factory registered under `alias`.
	///
	/// # Errors
	///
	/// Returns [`FixtureError::UnknownPurger`] if no factory uses this alias.
	pub fn get(&self, alias: &str) -> FixtureResult<Arc<dyn PurgerFactory<S>>> {
		self.factories
			.get(alias)
			.cloned()
			.ok_or_else(|| FixtureError::UnknownPurger(alias.to_string()))
	}

	/// Creates a purger from the factory under `alias` (or [`DEFAULT_PURGER`]).
	pub fn create(
		&self,
		alias: Option<&str>,
		manager: Option<&str>,
		excluded: &[String],
		mode: PurgeMode,
	) -> FixtureResult<Arc<dyn Purger<S>>> {
		let factory = self.get(alias.unwrap_or(DEFAULT_PURGER))?;
		Ok(factory.create_for_manager(manager, excluded, mode))
	}

	/// Returns the registered aliases, sorted.
	pub fn aliases(&self) -> Vec<&str> {
		let mut aliases: Vec<&str> = self.factories.keys().map(String::as_str).collect();
		aliases.sort_unstable();
		aliases
	}
}

impl<S> Default for PurgerFactoryRegistry<S> {
	fn default() -> Self {
		Self::new()
	}
}
