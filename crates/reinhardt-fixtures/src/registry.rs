//! Fixture registry.
//!
//! This module indexes registered fixtures by identity and by group. Registration
//! is last-write-wins on identity and additive on groups, so the final indexes do
//! not depend on the order in which fixtures were registered. Every fixture is
//! also a member of the group named after its short name, which allows selecting
//! a single fixture with a group filter.

use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};

use crate::fixture::{Fixture, FixtureProvider, FixtureRegistration, short_name};

/// A fixture stored in the registry together with its resolved metadata.
pub struct RegisteredFixture<S> {
	identity: String,
	short_name: String,
	dependencies: Vec<String>,
	groups: IndexSet<String>,
	fixture: Arc<dyn Fixture<S>>,
}

impl<S> RegisteredFixture<S> {
	/// Returns the fixture identity.
	pub fn identity(&self) -> &str {
		&self.identity
	}

	/// Returns the short name (last identity segment).
	pub fn short_name(&self) -> &str {
		&self.short_name
	}

	/// Returns the declared dependencies in declaration order.
	pub fn dependencies(&self) -> &[String] {
		&self.dependencies
	}

	/// Returns every group this fixture belongs to, including its short name.
	pub fn groups(&self) -> impl Iterator<Item = &str> {
		self.groups.iter().map(String::as_str)
	}

	/// Returns true if the fixture belongs to `group`.
	pub fn in_group(&self, group: &str) -> bool {
		self.groups.contains(group)
	}

	/// Returns the fixture instance.
	pub fn fixture(&self) -> &Arc<dyn Fixture<S>> {
		&self.fixture
	}
}

impl<S> Clone for RegisteredFixture<S> {
	fn clone(&self) -> Self {
		Self {
			identity: self.identity.clone(),
			short_name: self.short_name.clone(),
			dependencies: self.dependencies.clone(),
			groups: self.groups.clone(),
			fixture: Arc::clone(&self.fixture),
		}
	}
}

impl<S> std::fmt::Debug for RegisteredFixture<S> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("RegisteredFixture")
			.field("identity", &self.identity)
			.field("dependencies", &self.dependencies)
			.field("groups", &self.groups)
			.finish()
	}
}

/// Registry of known fixtures, indexed by identity and by group.
///
/// # Example
///
/// ```ignore
/// let mut registry = FixtureRegistry::new();
/// registry.register(Arc::new(UserFixtures));
/// registry.register_with_groups(Arc::new(GroupFixtures), ["staging"]);
///
/// assert!(registry.contains("app::fixtures::UserFixtures"));
/// assert_eq!(registry.identities_in_groups(&["UserFixtures"]).len(), 1);
/// ```
pub struct FixtureRegistry<S> {
	by_identity: IndexMap<String, RegisteredFixture<S>>,
	by_group: IndexMap<String, IndexSet<String>>,
}

impl<S> FixtureRegistry<S> {
	/// Creates an empty registry.
	pub fn new() -> Self {
		Self {
			by_identity: IndexMap::new(),
			by_group: IndexMap::new(),
		}
	}

	/// Creates a registry populated from a provider.
	pub fn from_provider(provider: &dyn FixtureProvider<S>) -> Self {
		let mut registry = Self::new();
		registry.register_provider(provider);
		registry
	}

	/// Registers a fixture with only its self-declared groups.
	pub fn register(&mut self, fixture: Arc<dyn Fixture<S>>) {
		self.register_with_groups(fixture, std::iter::empty::<String>());
	}

	/// Registers a fixture with additional discovery groups.
	///
	/// Re-registering an identity replaces the stored instance but keeps its
	/// original registration position. Group memberships only ever grow.
	pub fn register_with_groups<I, G>(&mut self, fixture: Arc<dyn Fixture<S>>, groups: I)
	where
		I: IntoIterator<Item = G>,
		G: Into<String>,
	{
		let identity = fixture.name().to_string();
		let short = short_name(&identity).to_string();

		let mut group_set: IndexSet<String> = self
			.by_identity
			.get(&identity)
			.map(|existing| existing.groups.clone())
			.unwrap_or_default();
		group_set.insert(short.clone());
		group_set.extend(fixture.groups());
		group_set.extend(groups.into_iter().map(Into::into));

		for group in &group_set {
			self.by_group
				.entry(group.clone())
				.or_default()
				.insert(identity.clone());
		}

		let replaced = self.by_identity.contains_key(&identity);
		tracing::debug!(
			fixture = %identity,
			groups = ?group_set,
			replaced,
			"registered fixture"
		);

		let registered = RegisteredFixture {
			identity: identity.clone(),
			short_name: short,
			dependencies: fixture.dependencies(),
			groups: group_set,
			fixture,
		};
		self.by_identity.insert(identity, registered);
	}

	/// Registers a batch of discovered fixtures.
	pub fn add_fixtures(&mut self, registrations: impl IntoIterator<Item = FixtureRegistration<S>>) {
		for registration in registrations {
			self.register_with_groups(registration.fixture, registration.groups);
		}
	}

	/// Registers every fixture yielded by `provider`.
	pub fn register_provider(&mut self, provider: &dyn FixtureProvider<S>) {
		self.add_fixtures(provider.fixtures());
	}

	/// Looks up a fixture by identity.
	pub fn lookup(&self, identity: &str) -> Option<&RegisteredFixture<S>> {
		self.by_identity.get(identity)
	}

	/// Returns true if a fixture with this identity is registered.
	pub fn contains(&self, identity: &str) -> bool {
		self.by_identity.contains_key(identity)
	}

	/// Returns all fixtures in registration order.
	pub fn all_ordered_by_registration(&self) -> Vec<&RegisteredFixture<S>> {
		self.by_identity.values().collect()
	}

	/// Returns the identities belonging to any of `groups`.
	///
	/// Unknown group names contribute nothing.
	pub fn identities_in_groups<G: AsRef<str>>(&self, groups: &[G]) -> IndexSet<String> {
		let mut identities = IndexSet::new();
		for group in groups {
			if let Some(members) = self.by_group.get(group.as_ref()) {
				identities.extend(members.iter().cloned());
			}
		}
		identities
	}

	/// Returns all known group names in first-seen order.
	pub fn groups(&self) -> impl Iterator<Item = &str> {
		self.by_group.keys().map(String::as_str)
	}

	/// Returns the groups of a registered fixture.
	pub fn groups_of(&self, identity: &str) -> Option<Vec<&str>> {
		self.lookup(identity).map(|f| f.groups().collect())
	}

	/// Returns the number of registered fixtures.
	pub fn len(&self) -> usize {
		self.by_identity.len()
	}

	/// Returns true if no fixtures are registered.
	pub fn is_empty(&self) -> bool {
		self.by_identity.is_empty()
	}
}

impl<S> Default for FixtureRegistry<S> {
	fn default() -> Self {
		Self::new()
	}
}

impl<S> std::fmt::Debug for FixtureRegistry<S> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("FixtureRegistry")
			.field("fixtures", &self.by_identity.keys().collect::<Vec<_>>())
			.field("groups", &self.by_group)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::BoxError;
	use crate::references::ReferenceRepository;
	use async_trait::async_trait;
	use rstest::rstest;

	struct TestFixture {
		name: &'static str,
		dependencies: Vec<&'static str>,
		groups: Vec<&'static str>,
	}

	impl TestFixture {
		fn new(name: &'static str) -> Self {
			Self {
				name,
				dependencies: Vec::new(),
				groups: Vec::new(),
			}
		}

		fn depends_on(mut self, dependency: &'static str) -> Self {
			self.dependencies.push(dependency);
			self
		}

		fn in_group(mut self, group: &'static str) -> Self {
			self.groups.push(group);
			self
		}
	}

	#[async_trait]
	impl Fixture<()> for TestFixture {
		fn name(&self) -> &str {
			self.name
		}

		fn dependencies(&self) -> Vec<String> {
			self.dependencies.iter().map(|d| d.to_string()).collect()
		}

		fn groups(&self) -> Vec<String> {
			self.groups.iter().map(|g| g.to_string()).collect()
		}

		async fn load(&self, _: &mut (), _: &mut ReferenceRepository) -> Result<(), BoxError> {
			Ok(())
		}
	}

	#[rstest]
	fn test_register_and_lookup() {
		let mut registry = FixtureRegistry::<()>::new();
		registry.register(Arc::new(
			TestFixture::new("app::UserFixtures").depends_on("app::GroupFixtures"),
		));

		let fixture = registry.lookup("app::UserFixtures").unwrap();
		assert_eq!(fixture.identity(), "app::UserFixtures");
		assert_eq!(fixture.short_name(), "UserFixtures");
		assert_eq!(fixture.dependencies(), ["app::GroupFixtures".to_string()]);
		assert!(registry.lookup("app::Other").is_none());
	}

	#[rstest]
	fn test_short_name_group_is_implicit() {
		let mut registry = FixtureRegistry::<()>::new();
		registry.register(Arc::new(TestFixture::new("app::UserFixtures")));

		let members = registry.identities_in_groups(&["UserFixtures"]);
		assert_eq!(members.len(), 1);
		assert!(members.contains("app::UserFixtures"));
	}

	#[rstest]
	fn test_trailing_separator_never_yields_empty_group() {
		let mut registry = FixtureRegistry::<()>::new();
		registry.register(Arc::new(TestFixture::new("app::")));

		assert_eq!(registry.lookup("app::").unwrap().short_name(), "app::");
		assert!(registry.identities_in_groups(&[""]).is_empty());
		assert!(registry.identities_in_groups(&["app::"]).contains("app::"));
	}

	#[rstest]
	fn test_declared_and_discovery_groups_are_merged() {
		let mut registry = FixtureRegistry::<()>::new();
		registry.register_with_groups(
			Arc::new(TestFixture::new("app::UserFixtures").in_group("staging")),
			["demo"],
		);

		let groups = registry.groups_of("app::UserFixtures").unwrap();
		assert_eq!(groups, vec!["UserFixtures", "staging", "demo"]);
	}

	#[rstest]
	fn test_reregistration_is_idempotent() {
		let mut registry = FixtureRegistry::<()>::new();
		registry.register(Arc::new(TestFixture::new("app::A").in_group("staging")));
		registry.register(Arc::new(TestFixture::new("app::B")));
		registry.register(Arc::new(TestFixture::new("app::A").in_group("staging")));

		assert_eq!(registry.len(), 2);
		let staging = registry.identities_in_groups(&["staging"]);
		assert_eq!(staging.len(), 1);
		let order: Vec<_> = registry
			.all_ordered_by_registration()
			.iter()
			.map(|f| f.identity().to_string())
			.collect();
		assert_eq!(order, vec!["app::A", "app::B"]);
	}

	#[rstest]
	fn test_reregistration_replaces_instance_and_keeps_groups() {
		let mut registry = FixtureRegistry::<()>::new();
		registry.register(Arc::new(TestFixture::new("app::A").in_group("first")));
		registry.register(Arc::new(
			TestFixture::new("app::A")
				.in_group("second")
				.depends_on("app::B"),
		));

		let fixture = registry.lookup("app::A").unwrap();
		assert_eq!(fixture.dependencies(), ["app::B".to_string()]);
		assert!(fixture.in_group("first"));
		assert!(fixture.in_group("second"));
	}

	#[rstest]
	fn test_unknown_groups_contribute_nothing() {
		let mut registry = FixtureRegistry::<()>::new();
		registry.register(Arc::new(TestFixture::new("app::A").in_group("staging")));

		assert!(registry.identities_in_groups(&["nope"]).is_empty());
		assert_eq!(registry.identities_in_groups(&["nope", "staging"]).len(), 1);
	}

	#[rstest]
	fn test_registration_order_does_not_change_indexes() {
		let a = || Arc::new(TestFixture::new("app::A").in_group("g1")) as Arc<dyn Fixture<()>>;
		let b = || {
			Arc::new(TestFixture::new("app::B").in_group("g1").in_group("g2"))
				as Arc<dyn Fixture<()>>
		};

		let mut forward = FixtureRegistry::<()>::new();
		forward.register(a());
		forward.register(b());

		let mut backward = FixtureRegistry::<()>::new();
		backward.register(b());
		backward.register(a());

		for group in ["g1", "g2", "A", "B"] {
			let mut left: Vec<_> = forward.identities_in_groups(&[group]).into_iter().collect();
			let mut right: Vec<_> = backward.identities_in_groups(&[group]).into_iter().collect();
			left.sort();
			right.sort();
			assert_eq!(left, right, "group {group}");
		}
		assert_eq!(forward.len(), backward.len());
	}

	#[rstest]
	fn test_from_provider() {
		let provider: Vec<FixtureRegistration<()>> = vec![
			FixtureRegistration::new(Arc::new(TestFixture::new("app::A"))).with_group("staging"),
			FixtureRegistration::new(Arc::new(TestFixture::new("app::B"))),
		];

		let registry = FixtureRegistry::from_provider(&provider);

		assert_eq!(registry.len(), 2);
		assert!(registry.contains("app::A"));
		assert!(registry.groups().any(|g| g == "staging"));
	}
}
