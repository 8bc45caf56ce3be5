//! Application fixtures used across the integration tests.

use std::sync::Arc;

use async_trait::async_trait;
use reinhardt_fixtures::{
	BoxError, Fixture, FixtureRegistration, FixtureRegistry, ReferenceRepository,
};
use serde_json::json;

use super::store::MemorySession;

pub const OTHER: &str = "app::fixtures::OtherFixtures";
pub const WITH_DEPENDENCIES: &str = "app::fixtures::WithDependenciesFixtures";
pub const FAILING: &str = "app::fixtures::FailingFixtures";

/// Inserts two users and publishes a reference to the first one.
pub struct OtherFixtures;

#[async_trait]
impl Fixture<MemorySession> for OtherFixtures {
	fn name(&self) -> &str {
		OTHER
	}

	fn groups(&self) -> Vec<String> {
		vec!["staging".to_string()]
	}

	async fn load(
		&self,
		session: &mut MemorySession,
		references: &mut ReferenceRepository,
	) -> Result<(), BoxError> {
		session.insert("users", json!({ "id": 1, "username": "admin" }));
		session.insert("users", json!({ "id": 2, "username": "guest" }));
		references.add_reference("admin-user", json!(1))?;
		session.record(format!("load {OTHER}"));
		Ok(())
	}
}

/// Inserts a post owned by the user published by [`OtherFixtures`].
pub struct WithDependenciesFixtures;

#[async_trait]
impl Fixture<MemorySession> for WithDependenciesFixtures {
	fn name(&self) -> &str {
		WITH_DEPENDENCIES
	}

	fn dependencies(&self) -> Vec<String> {
		vec![OTHER.to_string()]
	}

	fn groups(&self) -> Vec<String> {
		vec![
			"missingDependencyGroup".to_string(),
			"fulfilledDependencyGroup".to_string(),
		]
	}

	async fn load(
		&self,
		session: &mut MemorySession,
		references: &mut ReferenceRepository,
	) -> Result<(), BoxError> {
		let author = references.get_reference("admin-user")?.clone();
		session.insert("posts", json!({ "id": 1, "author": author }));
		session.record(format!("load {WITH_DEPENDENCIES}"));
		Ok(())
	}
}

/// Fails after writing one row.
pub struct FailingFixtures;

#[async_trait]
impl Fixture<MemorySession> for FailingFixtures {
	fn name(&self) -> &str {
		FAILING
	}

	fn dependencies(&self) -> Vec<String> {
		vec![OTHER.to_string()]
	}

	async fn load(
		&self,
		session: &mut MemorySession,
		_references: &mut ReferenceRepository,
	) -> Result<(), BoxError> {
		session.insert("audit", json!({ "event": "partial" }));
		Err("unique constraint violated on audit.event".into())
	}
}

/// Registers both fixtures with only the groups they declare.
pub fn plain_registry() -> FixtureRegistry<MemorySession> {
	let mut registry = FixtureRegistry::<MemorySession>::new();
	registry.register(Arc::new(OtherFixtures));
	registry.register(Arc::new(WithDependenciesFixtures));
	registry
}

/// Registers both fixtures the way application wiring discovers them:
/// `OtherFixtures` is additionally tagged with `fulfilledDependencyGroup`.
pub fn discovered_registry() -> FixtureRegistry<MemorySession> {
	let discovered: Vec<FixtureRegistration<MemorySession>> = vec![
		FixtureRegistration::new(Arc::new(OtherFixtures)).with_group("fulfilledDependencyGroup"),
		FixtureRegistration::new(Arc::new(WithDependenciesFixtures)),
	];
	FixtureRegistry::from_provider(&discovered)
}
