//! In-memory store used as the fixture session.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use reinhardt_fixtures::{BoxError, FixtureBackend, PurgeMode, Purger, PurgerFactory};
use serde_json::Value;

/// Tables and an event journal shared by every session of one backend.
#[derive(Debug, Default)]
pub struct StoreState {
	pub tables: BTreeMap<String, Vec<Value>>,
	pub journal: Vec<String>,
}

/// Session handed to fixtures and purgers.
#[derive(Debug, Clone, Default)]
pub struct MemorySession {
	state: Arc<Mutex<StoreState>>,
}

impl MemorySession {
	pub fn insert(&mut self, table: &str, row: Value) {
		let mut state = self.state.lock();
		state.tables.entry(table.to_string()).or_default().push(row);
	}

	pub fn rows(&self, table: &str) -> Vec<Value> {
		self.state
			.lock()
			.tables
			.get(table)
			.cloned()
			.unwrap_or_default()
	}

	pub fn record(&mut self, event: impl Into<String>) {
		self.state.lock().journal.push(event.into());
	}
}

/// Backend whose sessions all share one [`StoreState`].
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
	state: Arc<Mutex<StoreState>>,
	sharded: bool,
}

impl MemoryBackend {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn sharded() -> Self {
		Self {
			sharded: true,
			..Self::default()
		}
	}

	/// Pre-populates `table` with `count` placeholder rows.
	pub fn seed(&self, table: &str, count: usize) {
		let mut state = self.state.lock();
		let rows = state.tables.entry(table.to_string()).or_default();
		rows.extend((0..count).map(|i| serde_json::json!({ "seed": i })));
	}

	pub fn open(&self) -> MemorySession {
		MemorySession {
			state: Arc::clone(&self.state),
		}
	}

	pub fn journal(&self) -> Vec<String> {
		self.state.lock().journal.clone()
	}

	pub fn count(&self, table: &str) -> usize {
		self.state.lock().tables.get(table).map_or(0, Vec::len)
	}
}

#[async_trait]
impl FixtureBackend<MemorySession> for MemoryBackend {
	async fn session(
		&self,
		manager: Option<&str>,
		shard: Option<&str>,
	) -> Result<MemorySession, BoxError> {
		let mut session = self.open();
		session.record(format!(
			"connect {}{}",
			manager.unwrap_or("default"),
			shard.map(|s| format!(" shard={s}")).unwrap_or_default()
		));
		Ok(session)
	}

	fn supports_shards(&self, _manager: Option<&str>) -> bool {
		self.sharded
	}
}

/// Empties every table except the excluded ones and journals the call.
pub struct TablePurger {
	manager: String,
}

#[async_trait]
impl Purger<MemorySession> for TablePurger {
	async fn purge(
		&self,
		session: &mut MemorySession,
		excluded: &[String],
		mode: PurgeMode,
	) -> Result<(), BoxError> {
		{
			let mut state = session.state.lock();
			for (table, rows) in state.tables.iter_mut() {
				if !excluded.contains(table) {
					rows.clear();
				}
			}
		}
		session.record(format!("purge {} {}", self.manager, mode));
		Ok(())
	}
}

pub struct TablePurgerFactory;

impl PurgerFactory<MemorySession> for TablePurgerFactory {
	fn create_for_manager(
		&self,
		manager: Option<&str>,
		_excluded: &[String],
		_mode: PurgeMode,
	) -> Arc<dyn Purger<MemorySession>> {
		Arc::new(TablePurger {
			manager: manager.unwrap_or("default").to_string(),
		})
	}
}

/// Purger that always fails, for error propagation tests.
pub struct BrokenPurger;

#[async_trait]
impl Purger<MemorySession> for BrokenPurger {
	async fn purge(
		&self,
		_session: &mut MemorySession,
		_excluded: &[String],
		_mode: PurgeMode,
	) -> Result<(), BoxError> {
		Err("connection reset by peer".into())
	}
}
