//! Fixture loading settings.
//!
//! Settings are read from the `[fixtures]` table of a TOML file. Command-line
//! flags take precedence over file values, see
//! [`LoadFixturesOptions::merge_settings`](crate::commands::LoadFixturesOptions::merge_settings).
//!
//! ```toml
//! [fixtures]
//! groups = ["staging"]
//! purger = "default"
//! purge_exclusions = ["migrations"]
//! purge_with_truncate = true
//! dependency_policy = "strict"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::FixtureResult;
use crate::purger::PurgeMode;
use crate::resolver::DependencyPolicy;

/// Settings for loading fixtures.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FixtureSettings {
	/// Append instead of purging first.
	pub append: bool,
	/// Groups to load; empty loads everything.
	pub groups: Vec<String>,
	/// Connection (entity manager) name.
	pub entity_manager: Option<String>,
	/// Shard to route the connection to.
	pub shard: Option<String>,
	/// Purger factory alias.
	pub purger: Option<String>,
	/// Tables excluded from purging.
	pub purge_exclusions: Vec<String>,
	/// Purge with `TRUNCATE` instead of `DELETE`.
	pub purge_with_truncate: bool,
	/// Handling of dependencies outside the requested groups.
	pub dependency_policy: DependencyPolicy,
}

#[derive(Debug, Default, Deserialize)]
struct SettingsFile {
	#[serde(default)]
	fixtures: FixtureSettings,
}

impl FixtureSettings {
	/// Parses settings from TOML text.
	///
	/// A document without a `[fixtures]` table yields the defaults.
	pub fn from_toml_str(content: &str) -> FixtureResult<Self> {
		let file: SettingsFile = toml::from_str(content)?;
		Ok(file.fixtures)
	}

	/// Reads settings from a TOML file.
	pub fn from_file(path: impl AsRef<Path>) -> FixtureResult<Self> {
		let path = path.as_ref();
		let content = std::fs::read_to_string(path)?;
		tracing::debug!(path = %path.display(), "loaded fixture settings");
		Self::from_toml_str(&content)
	}

	/// Returns the purge mode selected by these settings.
	pub fn purge_mode(&self) -> PurgeMode {
		PurgeMode::from_truncate_flag(self.purge_with_truncate)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::FixtureError;
	use rstest::rstest;
	use std::io::Write;
	use tempfile::NamedTempFile;

	#[rstest]
	fn test_parse_full_table() {
		let settings = FixtureSettings::from_toml_str(
			r#"
			[fixtures]
			append = true
			groups = ["staging", "demo"]
			entity_manager = "reporting"
			purger = "orm"
			purge_exclusions = ["migrations"]
			purge_with_truncate = true
			dependency_policy = "transitive"
			"#,
		)
		.unwrap();

		assert!(settings.append);
		assert_eq!(settings.groups, vec!["staging", "demo"]);
		assert_eq!(settings.entity_manager.as_deref(), Some("reporting"));
		assert_eq!(settings.shard, None);
		assert_eq!(settings.purger.as_deref(), Some("orm"));
		assert_eq!(settings.purge_exclusions, vec!["migrations"]);
		assert_eq!(settings.purge_mode(), PurgeMode::Truncate);
		assert_eq!(settings.dependency_policy, DependencyPolicy::Transitive);
	}

	#[rstest]
	fn test_missing_table_uses_defaults() {
		let settings = FixtureSettings::from_toml_str("[database]\nurl = \"sqlite::memory:\"\n").unwrap();
		assert_eq!(settings, FixtureSettings::default());
		assert_eq!(settings.dependency_policy, DependencyPolicy::Strict);
		assert_eq!(settings.purge_mode(), PurgeMode::Delete);
	}

	#[rstest]
	fn test_invalid_policy() {
		let result = FixtureSettings::from_toml_str("[fixtures]\ndependency_policy = \"lenient\"\n");
		assert!(matches!(result, Err(FixtureError::Toml(_))));
	}

	#[rstest]
	fn test_from_file() {
		let mut file = NamedTempFile::with_suffix(".toml").unwrap();
		writeln!(file, "[fixtures]\ngroups = [\"staging\"]").unwrap();

		let settings = FixtureSettings::from_file(file.path()).unwrap();

		assert_eq!(settings.groups, vec!["staging"]);
	}

	#[rstest]
	fn test_from_missing_file() {
		let result = FixtureSettings::from_file("/nonexistent/fixtures.toml");
		assert!(matches!(result, Err(FixtureError::Io(_))));
	}
}
