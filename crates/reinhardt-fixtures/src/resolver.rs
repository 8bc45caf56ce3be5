//! Dependency resolution for registered fixtures.
//!
//! The resolver turns a seed set of fixtures into one linear execution order in
//! which every dependency precedes its dependents. Seeds are visited in registry
//! order and dependencies in declaration order, so the same registrations and the
//! same request always produce the same order.
//!
//! # Group filtering
//!
//! When groups are requested, the seeds are the fixtures belonging to any of them.
//! What happens to a dependency outside those groups depends on the
//! [`DependencyPolicy`]:
//!
//! - [`DependencyPolicy::Strict`] fails with
//!   [`FixtureError::MissingDependency`]; the caller has to request the
//!   dependency's group as well.
//! - [`DependencyPolicy::Transitive`] pulls the dependency in anyway.

use std::collections::HashMap;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::error::{FixtureError, FixtureResult};
use crate::registry::{FixtureRegistry, RegisteredFixture};

/// How dependencies outside the requested groups are handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyPolicy {
	/// Dependencies must belong to one of the requested groups.
	#[default]
	Strict,
	/// Registered dependencies are included regardless of group membership.
	Transitive,
}

impl std::fmt::Display for DependencyPolicy {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			DependencyPolicy::Strict => write!(f, "strict"),
			DependencyPolicy::Transitive => write!(f, "transitive"),
		}
	}
}

impl std::str::FromStr for DependencyPolicy {
	type Err = FixtureError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_lowercase().as_str() {
			"strict" => Ok(DependencyPolicy::Strict),
			"transitive" => Ok(DependencyPolicy::Transitive),
			other => Err(FixtureError::Settings(format!(
				"unknown dependency policy \"{}\" (expected \"strict\" or \"transitive\")",
				other
			))),
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VisitState {
	InProgress,
	Done,
}

/// Computes dependency-respecting execution orders over a [`FixtureRegistry`].
pub struct DependencyResolver<'a, S> {
	registry: &'a FixtureRegistry<S>,
	policy: DependencyPolicy,
}

impl<'a, S> DependencyResolver<'a, S> {
	/// Creates a resolver using [`DependencyPolicy::Strict`].
	pub fn new(registry: &'a FixtureRegistry<S>) -> Self {
		Self {
			registry,
			policy: DependencyPolicy::Strict,
		}
	}

	/// Sets the dependency policy.
	pub fn with_policy(mut self, policy: DependencyPolicy) -> Self {
		self.policy = policy;
		self
	}

	/// Returns the active dependency policy.
	pub fn policy(&self) -> DependencyPolicy {
		self.policy
	}

	/// Resolves the fixtures to execute for the requested groups.
	///
	/// An empty `groups` slice selects every registered fixture.
	///
	/// # Errors
	///
	/// - [`FixtureError::NoFixturesFound`] if nothing was selected
	/// - [`FixtureError::MissingDependency`] if a dependency cannot be resolved
	/// - [`FixtureError::CircularDependency`] if the dependency graph has a cycle
	pub fn resolve<G: AsRef<str>>(
		&self,
		groups: &[G],
	) -> FixtureResult<Vec<&'a RegisteredFixture<S>>> {
		let registered = self.registry.all_ordered_by_registration();

		let ordered = if groups.is_empty() {
			self.order(registered, None)?
		} else {
			let working_set = self.registry.identities_in_groups(groups);
			let seeds = registered
				.into_iter()
				.filter(|fixture| working_set.contains(fixture.identity()))
				.collect();
			self.order(seeds, Some(&working_set))?
		};

		if ordered.is_empty() {
			return Err(FixtureError::NoFixturesFound {
				groups: groups.iter().map(|g| g.as_ref().to_string()).collect(),
			});
		}

		tracing::debug!(
			policy = %self.policy,
			fixtures = ordered.len(),
			"resolved fixture execution order"
		);
		Ok(ordered)
	}

	/// Resolves the dependency subtree of explicitly named fixtures.
	///
	/// The result contains the named fixtures and everything they depend on,
	/// ordered dependencies first. Other registered fixtures are omitted.
	///
	/// # Errors
	///
	/// - [`FixtureError::FixtureNotFound`] if a named fixture is not registered
	/// - [`FixtureError::MissingDependency`] if a dependency is not registered
	/// - [`FixtureError::CircularDependency`] if the dependency graph has a cycle
	pub fn resolve_subtree<I: AsRef<str>>(
		&self,
		identities: &[I],
	) -> FixtureResult<Vec<&'a RegisteredFixture<S>>> {
		let seeds = identities
			.iter()
			.map(|identity| {
				self.registry
					.lookup(identity.as_ref())
					.ok_or_else(|| FixtureError::FixtureNotFound(identity.as_ref().to_string()))
			})
			.collect::<FixtureResult<Vec<_>>>()?;

		self.order(seeds, None)
	}

	fn order(
		&self,
		seeds: Vec<&'a RegisteredFixture<S>>,
		working_set: Option<&IndexSet<String>>,
	) -> FixtureResult<Vec<&'a RegisteredFixture<S>>> {
		let mut states: HashMap<&'a str, VisitState> = HashMap::new();
		let mut ordered = Vec::with_capacity(seeds.len());

		for seed in seeds {
			self.visit(seed, working_set, &mut states, &mut ordered)?;
		}

		Ok(ordered)
	}

	/// Depth-first visit using an explicit stack of `(fixture, next dependency index)`.
	fn visit(
		&self,
		root: &'a RegisteredFixture<S>,
		working_set: Option<&IndexSet<String>>,
		states: &mut HashMap<&'a str, VisitState>,
		ordered: &mut Vec<&'a RegisteredFixture<S>>,
	) -> FixtureResult<()> {
		if states.contains_key(root.identity()) {
			return Ok(());
		}

		states.insert(root.identity(), VisitState::InProgress);
		let mut stack: Vec<(&'a RegisteredFixture<S>, usize)> = vec![(root, 0)];

		while let Some(&(fixture, next)) = stack.last() {
			let Some(dependency) = fixture.dependencies().get(next) else {
				states.insert(fixture.identity(), VisitState::Done);
				ordered.push(fixture);
				stack.pop();
				continue;
			};

			if let Some(top) = stack.last_mut() {
				top.1 += 1;
			}

			match states.get(dependency.as_str()) {
				Some(VisitState::Done) => continue,
				Some(VisitState::InProgress) => {
					return Err(cycle_error(&stack, dependency));
				}
				None => {}
			}

			let resolved = self.lookup_dependency(dependency, fixture, working_set)?;
			states.insert(resolved.identity(), VisitState::InProgress);
			stack.push((resolved, 0));
		}

		Ok(())
	}

	fn lookup_dependency(
		&self,
		dependency: &str,
		required_by: &RegisteredFixture<S>,
		working_set: Option<&IndexSet<String>>,
	) -> FixtureResult<&'a RegisteredFixture<S>> {
		let Some(resolved) = self.registry.lookup(dependency) else {
			return Err(FixtureError::MissingDependency {
				dependency: dependency.to_string(),
				required_by: required_by.identity().to_string(),
				in_group_filter: false,
			});
		};

		if self.policy == DependencyPolicy::Strict
			&& let Some(working_set) = working_set
			&& !working_set.contains(dependency)
		{
			return Err(FixtureError::MissingDependency {
				dependency: dependency.to_string(),
				required_by: required_by.identity().to_string(),
				in_group_filter: true,
			});
		}

		if working_set.is_some_and(|set| !set.contains(dependency)) {
			tracing::debug!(
				fixture = %required_by.identity(),
				dependency,
				"including dependency outside the requested groups"
			);
		}

		Ok(resolved)
	}
}

fn cycle_error<S>(stack: &[(&RegisteredFixture<S>, usize)], reentered: &str) -> FixtureError {
	let start = stack
		.iter()
		.position(|(fixture, _)| fixture.identity() == reentered)
		.unwrap_or(0);
	let mut path: Vec<String> = stack[start..]
		.iter()
		.map(|(fixture, _)| fixture.identity().to_string())
		.collect();
	path.push(reentered.to_string());
	FixtureError::CircularDependency { path }
}
