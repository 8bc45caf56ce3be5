//! Progress reporting for fixture execution.

use parking_lot::Mutex;

/// Receives human-readable progress messages from the executor.
pub trait ProgressSink: Send + Sync {
	/// Records one progress message.
	fn log(&self, message: &str);
}

impl<F> ProgressSink for F
where
	F: Fn(&str) + Send + Sync,
{
	fn log(&self, message: &str) {
		self(message)
	}
}

/// Forwards progress messages to `tracing` at info level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl ProgressSink for TracingSink {
	fn log(&self, message: &str) {
		tracing::info!(target: "reinhardt_fixtures::progress", "{}", message);
	}
}

/// Keeps every progress message in memory.
#[derive(Debug, Default)]
pub struct CollectingSink {
	messages: Mutex<Vec<String>>,
}

impl CollectingSink {
	/// Creates an empty sink.
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns a copy of the collected messages.
	pub fn messages(&self) -> Vec<String> {
		self.messages.lock().clone()
	}
}

impl ProgressSink for CollectingSink {
	fn log(&self, message: &str) {
		self.messages.lock().push(message.to_string());
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use std::sync::atomic::{AtomicUsize, Ordering};

	#[rstest]
	fn test_closure_sink() {
		let count = AtomicUsize::new(0);
		let sink = |_: &str| {
			count.fetch_add(1, Ordering::SeqCst);
		};

		sink.log("purging database");
		sink.log("loading app::Users");

		assert_eq!(count.load(Ordering::SeqCst), 2);
	}

	#[rstest]
	fn test_collecting_sink() {
		let sink = CollectingSink::new();
		sink.log("purging database");
		assert_eq!(sink.messages(), vec!["purging database"]);
	}
}
