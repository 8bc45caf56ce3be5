//! Fixture trait and discovery types.
//!
//! A fixture is a named unit of data-seeding logic. Every fixture has a stable
//! identity (a `::`-separated path such as `app::fixtures::UserFixtures`), may
//! declare the identities of other fixtures it depends on, and may declare the
//! groups it belongs to. Fixtures are handed to the
//! [`FixtureRegistry`](crate::FixtureRegistry) by a [`FixtureProvider`] once at
//! startup; the registry never instantiates fixtures itself.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::BoxError;
use crate::references::ReferenceRepository;

/// A unit of data-seeding logic loaded against a persistence session `S`.
///
/// Only [`name`](Fixture::name) and [`load`](Fixture::load) are required.
/// Fixtures without dependencies or groups keep the default empty lists.
///
/// # Example
///
/// ```ignore
/// struct UserFixtures;
///
/// #[async_trait]
/// impl Fixture<DatabaseConnection> for UserFixtures {
///     fn name(&self) -> &str {
///         "app::fixtures::UserFixtures"
///     }
///
///     fn dependencies(&self) -> Vec<String> {
///         vec!["app::fixtures::GroupFixtures".to_string()]
///     }
///
///     fn groups(&self) -> Vec<String> {
///         vec!["staging".to_string()]
///     }
///
///     async fn load(
///         &self,
///         conn: &mut DatabaseConnection,
///         references: &mut ReferenceRepository,
///     ) -> Result<(), BoxError> {
///         let admins = references.get_reference("admin-group")?;
///         // insert users belonging to `admins`
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Fixture<S>: Send + Sync {
	/// Returns the fully-qualified identity of this fixture.
	fn name(&self) -> &str;

	/// Returns the identities of fixtures that must be loaded before this one.
	fn dependencies(&self) -> Vec<String> {
		Vec::new()
	}

	/// Returns the groups this fixture declares for itself.
	fn groups(&self) -> Vec<String> {
		Vec::new()
	}

	/// Loads the fixture data through the given session.
	async fn load(
		&self,
		session: &mut S,
		references: &mut ReferenceRepository,
	) -> Result<(), BoxError>;
}

/// A discovered fixture together with the groups assigned by discovery.
///
/// Discovery groups are added on top of the groups the fixture declares itself,
/// e.g. groups attached when the fixture was tagged during application wiring.
pub struct FixtureRegistration<S> {
	/// The fixture instance.
	pub fixture: Arc<dyn Fixture<S>>,
	/// Additional groups assigned by discovery.
	pub groups: Vec<String>,
}

impl<S> FixtureRegistration<S> {
	/// Creates a registration without discovery groups.
	pub fn new(fixture: Arc<dyn Fixture<S>>) -> Self {
		Self {
			fixture,
			groups: Vec::new(),
		}
	}

	/// Adds a discovery group.
	pub fn with_group(mut self, group: impl Into<String>) -> Self {
		self.groups.push(group.into());
		self
	}

	/// Adds several discovery groups.
	pub fn with_groups<I, G>(mut self, groups: I) -> Self
	where
		I: IntoIterator<Item = G>,
		G: Into<String>,
	{
		self.groups.extend(groups.into_iter().map(Into::into));
		self
	}
}

impl<S> Clone for FixtureRegistration<S> {
	fn clone(&self) -> Self {
		Self {
			fixture: Arc::clone(&self.fixture),
			groups: self.groups.clone(),
		}
	}
}

impl<S> std::fmt::Debug for FixtureRegistration<S> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("FixtureRegistration")
			.field("fixture", &self.fixture.name())
			.field("groups", &self.groups)
			.finish()
	}
}

/// Source of fixtures discovered by the host application.
pub trait FixtureProvider<S>: Send + Sync {
	/// Returns every discovered fixture with its discovery groups.
	fn fixtures(&self) -> Vec<FixtureRegistration<S>>;
}

impl<S> FixtureProvider<S> for Vec<FixtureRegistration<S>> {
	fn fixtures(&self) -> Vec<FixtureRegistration<S>> {
		self.clone()
	}
}

/// Returns the short name of a fixture identity: its last `::` segment.
///
/// An identity whose last segment is empty is its own short name.
///
/// ```
/// use reinhardt_fixtures::fixture::short_name;
///
/// assert_eq!(short_name("app::fixtures::UserFixtures"), "UserFixtures");
/// assert_eq!(short_name("UserFixtures"), "UserFixtures");
/// ```
pub fn short_name(identity: &str) -> &str {
	match identity.rsplit("::").next() {
		Some(segment) if !segment.is_empty() => segment,
		_ => identity,
	}
}
