//! Shared references between fixtures.
//!
//! Fixtures run sequentially, so a later fixture can look up records created by
//! an earlier one. Each fixture publishes what others may need under a name
//! (typically the primary key or a JSON snapshot of the record).

use indexmap::IndexMap;
use serde_json::Value;

use crate::error::{FixtureError, FixtureResult};

/// Named values published by fixtures during one execution.
#[derive(Debug, Clone, Default)]
pub struct ReferenceRepository {
	references: IndexMap<String, Value>,
}

impl ReferenceRepository {
	/// Creates an empty repository.
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds a new reference.
	///
	/// # Errors
	///
	/// Returns [`FixtureError::DuplicateReference`] if the name is already taken.
	pub fn add_reference(&mut self, name: impl Into<String>, value: Value) -> FixtureResult<()> {
		let name = name.into();
		if self.references.contains_key(&name) {
			return Err(FixtureError::DuplicateReference(name));
		}
		self.references.insert(name, value);
		Ok(())
	}

	/// Stores a reference, replacing any previous value under the same name.
	pub fn set_reference(&mut self, name: impl Into<String>, value: Value) {
		self.references.insert(name.into(), value);
	}

	/// Returns the value stored under `name`.
	///
	/// # Errors
	///
	/// Returns [`FixtureError::ReferenceNotFound`] if nothing is stored under `name`.
	pub fn get_reference(&self, name: &str) -> FixtureResult<&Value> {
		self.references
			.get(name)
			.ok_or_else(|| FixtureError::ReferenceNotFound(name.to_string()))
	}

	/// Returns true if a reference is stored under `name`.
	pub fn has_reference(&self, name: &str) -> bool {
		self.references.contains_key(name)
	}

	/// Returns all reference names in publication order.
	pub fn names(&self) -> impl Iterator<Item = &str> {
		self.references.keys().map(String::as_str)
	}

	/// Returns the number of stored references.
	pub fn len(&self) -> usize {
		self.references.len()
	}

	/// Returns true if no references are stored.
	pub fn is_empty(&self) -> bool {
		self.references.is_empty()
	}
}
