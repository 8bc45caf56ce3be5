//! Dependency-ordered data fixture loading for the Reinhardt framework.
//!
//! This crate loads named data fixtures into a database in an order that
//! respects their declared dependencies:
//!
//! - **Registry**: fixtures are registered once at startup, together with the
//!   groups they belong to
//! - **Resolver**: the fixtures of the requested groups are ordered so that
//!   every dependency is loaded first
//! - **Executor**: the database is purged (unless appending) and fixtures are
//!   loaded one after another
//! - **CLI Commands**: `loadfixtures` and `listfixtures`
//!
//! # Features
//!
//! - `cli` - clap-based command line and `tracing` subscriber setup (enabled by default)
//! - `full` - All features enabled
//!
//! # Quick Start
//!
//! Define fixtures against your session type:
//!
//! ```ignore
//! use reinhardt_fixtures::prelude::*;
//!
//! struct GroupFixtures;
//!
//! #[async_trait]
//! impl Fixture<DatabaseConnection> for GroupFixtures {
//!     fn name(&self) -> &str {
//!         "app::fixtures::GroupFixtures"
//!     }
//!
//!     async fn load(
//!         &self,
//!         conn: &mut DatabaseConnection,
//!         references: &mut ReferenceRepository,
//!     ) -> Result<(), BoxError> {
//!         let id = insert_group(conn, "admins").await?;
//!         references.add_reference("admin-group", id.into())?;
//!         Ok(())
//!     }
//! }
//! ```
//!
//! Register them and load the `staging` group:
//!
//! ```ignore
//! let mut registry = FixtureRegistry::new();
//! registry.register(Arc::new(GroupFixtures));
//! registry.register_with_groups(Arc::new(UserFixtures), ["staging"]);
//!
//! let purgers = PurgerFactoryRegistry::new()
//!     .with_factory(DEFAULT_PURGER, Arc::new(SqlPurgerFactory));
//! let report = LoadFixturesCommand::new(&registry, &purgers, &backend)
//!     .with_sink(Arc::new(TracingSink))
//!     .execute(&LoadFixturesOptions::new().with_groups(["staging"]))
//!     .await?;
//! ```
//!
//! # Architecture
//!
//! - [`FixtureRegistry`] - fixtures by identity and by group
//! - [`DependencyResolver`] - topological ordering with cycle detection
//! - [`FixtureExecutor`] - purge-then-load state machine
//! - [`Purger`] / [`PurgerFactory`] - database purging, supplied by the backend
//! - [`FixtureBackend`] - opens the session fixtures are loaded through
//! - [`FixtureSettings`] - `[fixtures]` table of a TOML settings file

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod backend;
#[cfg(feature = "cli")]
pub mod cli;
pub mod commands;
pub mod error;
pub mod executor;
pub mod fixture;
pub mod prelude;
pub mod progress;
pub mod purger;
pub mod references;
pub mod registry;
pub mod resolver;
pub mod settings;

// Re-export commonly used types at crate root
pub use backend::FixtureBackend;
pub use error::{BoxError, FixtureError, FixtureResult};
pub use executor::{ExecutionOptions, ExecutionReport, ExecutionState, FixtureExecutor};
pub use fixture::{Fixture, FixtureProvider, FixtureRegistration};
pub use progress::{CollectingSink, ProgressSink, TracingSink};
pub use purger::{DEFAULT_PURGER, PurgeMode, Purger, PurgerFactory, PurgerFactoryRegistry};
pub use references::ReferenceRepository;
pub use registry::{FixtureRegistry, RegisteredFixture};
pub use resolver::{DependencyPolicy, DependencyResolver};
pub use settings::FixtureSettings;
