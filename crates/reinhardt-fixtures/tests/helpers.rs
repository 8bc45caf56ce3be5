//! Test helpers for reinhardt-fixtures integration tests.
//!
//! This module provides an in-memory store that stands in for a database
//! session, plus a set of application fixtures wired against it.

#[path = "helpers/store.rs"]
pub mod store;

#[path = "helpers/app_fixtures.rs"]
pub mod app_fixtures;
