//! Management commands for fixtures.
//!
//! - [`LoadFixturesCommand`] - purge the database and load fixtures
//! - [`ListFixturesCommand`] - show the resolved load order

mod list;
mod load;

pub use list::{FixtureListing, ListFixturesCommand, render_listing};
pub use load::{LoadFixturesCommand, LoadFixturesOptions};
