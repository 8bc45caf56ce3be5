//! listfixtures command implementation.
//!
//! Prints the fixtures that `loadfixtures` would load, in load order, without
//! touching the database.

use crate::error::FixtureResult;
use crate::registry::{FixtureRegistry, RegisteredFixture};
use crate::resolver::{DependencyPolicy, DependencyResolver};

/// One row of the listfixtures output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureListing {
	/// 1-based load position.
	pub position: usize,
	/// Fixture identity.
	pub identity: String,
	/// Groups the fixture belongs to.
	pub groups: Vec<String>,
	/// Declared dependencies.
	pub dependencies: Vec<String>,
}

impl std::fmt::Display for FixtureListing {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{:>3}. {} [{}]", self.position, self.identity, self.groups.join(", "))?;
		if !self.dependencies.is_empty() {
			write!(f, " <- {}", self.dependencies.join(", "))?;
		}
		Ok(())
	}
}

/// The listfixtures command.
pub struct ListFixturesCommand<'a, S> {
	registry: &'a FixtureRegistry<S>,
	policy: DependencyPolicy,
}

impl<'a, S> ListFixturesCommand<'a, S> {
	/// Creates a new listfixtures command.
	pub fn new(registry: &'a FixtureRegistry<S>) -> Self {
		Self {
			registry,
			policy: DependencyPolicy::default(),
		}
	}

	/// Sets the dependency policy used for resolution.
	pub fn with_policy(mut self, policy: DependencyPolicy) -> Self {
		self.policy = policy;
		self
	}

	/// Returns the command name.
	pub fn name(&self) -> &str {
		"listfixtures"
	}

	/// Returns the command description.
	pub fn description(&self) -> &str {
		"List data fixtures in load order"
	}

	/// Resolves `groups` and returns the fixtures in load order.
	pub fn execute<G: AsRef<str>>(&self, groups: &[G]) -> FixtureResult<Vec<FixtureListing>> {
		let resolved = DependencyResolver::new(self.registry)
			.with_policy(self.policy)
			.resolve(groups)?;

		Ok(listing(&resolved))
	}

	/// Returns the listing for `roots` and everything they depend on.
	pub fn dependency_tree<I: AsRef<str>>(&self, roots: &[I]) -> FixtureResult<Vec<FixtureListing>> {
		let resolved = DependencyResolver::new(self.registry).resolve_subtree(roots)?;

		Ok(listing(&resolved))
	}
}

fn listing<S>(resolved: &[&RegisteredFixture<S>]) -> Vec<FixtureListing> {
	resolved
		.iter()
		.enumerate()
		.map(|(position, fixture)| FixtureListing {
			position: position + 1,
			identity: fixture.identity().to_string(),
			groups: fixture.groups().map(str::to_string).collect(),
			dependencies: fixture.dependencies().to_vec(),
		})
		.collect()
}

/// Renders listing rows, one per line.
pub fn render_listing(rows: &[FixtureListing]) -> String {
	rows.iter().map(|row| format!("{row}\n")).collect()
}
