//! Convenience re-exports for common usage.
//!
//! ```ignore
//! use reinhardt_fixtures::prelude::*;
//! ```

pub use async_trait::async_trait;

// Error types
pub use crate::error::{BoxError, FixtureError, FixtureResult};

// Fixture definition and registration
pub use crate::fixture::{Fixture, FixtureProvider, FixtureRegistration};
pub use crate::references::ReferenceRepository;
pub use crate::registry::{FixtureRegistry, RegisteredFixture};

// Resolution and execution
pub use crate::executor::{ExecutionOptions, ExecutionReport, ExecutionState, FixtureExecutor};
pub use crate::progress::{ProgressSink, TracingSink};
pub use crate::resolver::{DependencyPolicy, DependencyResolver};

// Collaborators supplied by the host application
pub use crate::backend::FixtureBackend;
pub use crate::purger::{DEFAULT_PURGER, PurgeMode, Purger, PurgerFactory, PurgerFactoryRegistry};

// Command types
pub use crate::commands::{
	FixtureListing, ListFixturesCommand, LoadFixturesCommand, LoadFixturesOptions,
};
pub use crate::settings::FixtureSettings;
