//! Test fixtures for reinhardt-fixtures integration tests.
//!
//! This module provides rstest fixtures wiring the in-memory store helpers
//! into registries, purger factories and backends.

#[path = "helpers.rs"]
pub mod helpers;

use std::sync::Arc;

use reinhardt_fixtures::{DEFAULT_PURGER, FixtureRegistry, PurgerFactoryRegistry};
use rstest::fixture;

pub use helpers::app_fixtures::*;
pub use helpers::store::{BrokenPurger, MemoryBackend, MemorySession, TablePurgerFactory};

/// Registry with `OtherFixtures` and `WithDependenciesFixtures` and only their own groups.
#[fixture]
pub fn registry() -> FixtureRegistry<MemorySession> {
	plain_registry()
}

/// Registry where discovery also tags `OtherFixtures` with `fulfilledDependencyGroup`.
#[fixture]
pub fn discovered() -> FixtureRegistry<MemorySession> {
	discovered_registry()
}

/// Purger factories with the table purger as default.
#[fixture]
pub fn purgers() -> PurgerFactoryRegistry<MemorySession> {
	PurgerFactoryRegistry::<MemorySession>::new().with_factory(DEFAULT_PURGER, Arc::new(TablePurgerFactory))
}

/// Backend whose `users` table already holds three rows and `migrations` one.
#[fixture]
pub fn backend() -> MemoryBackend {
	let backend = MemoryBackend::new();
	backend.seed("users", 3);
	backend.seed("migrations", 1);
	backend
}
