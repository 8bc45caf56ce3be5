//! Session provider used by the fixture commands.

use async_trait::async_trait;

use crate::error::BoxError;

/// Opens sessions of type `S` against the persistence layer.
///
/// The `loadfixtures` command asks the backend for one session per run and
/// hands it to the purger and to every fixture.
#[async_trait]
pub trait FixtureBackend<S>: Send + Sync {
	/// Opens a session for `manager` (`None` selects the default connection).
	///
	/// `shard` is only passed when [`supports_shards`](Self::supports_shards)
	/// returns true for the same manager.
	async fn session(&self, manager: Option<&str>, shard: Option<&str>) -> Result<S, BoxError>;

	/// Returns whether connections of `manager` can be routed to a shard.
	fn supports_shards(&self, _manager: Option<&str>) -> bool {
		false
	}
}
