//! Change notification dispatcher
//!
//! Each values store owns one dispatcher thread. Writers enqueue the key of
//! every effective change on an unbounded channel and return immediately;
//! the dispatcher runs the registered callbacks outside of any lock. Having
//! a single consumer serializes callbacks for the same key.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{OnceLock, Weak};
use std::thread::{self, ThreadId};
use std::time::{Duration, Instant};

use crate::prelude::*;
use crate::values::{OnChange, Values, ValuesConfig, ValuesInner};

pub(crate) enum Message {
	Changed(InternalKey),
	Flush(flume::Sender<()>),
}

pub(crate) struct Dispatcher {
	tx: flume::Sender<Message>,
	thread: OnceLock<ThreadId>,
}

fn stopped() -> Error {
	Error::Internal("settings dispatcher is not running".into())
}

impl Dispatcher {
	pub(crate) fn channel() -> (Self, flume::Receiver<Message>) {
		let (tx, rx) = flume::unbounded();
		(Self { tx, thread: OnceLock::new() }, rx)
	}

	/// Spawn the dispatcher thread
	///
	/// The thread only holds a weak reference to the store, so dropping the
	/// last [`Values`] handle closes the channel and stops it.
	pub(crate) fn start(
		&self,
		rx: flume::Receiver<Message>,
		store: Weak<ValuesInner>,
		config: &ValuesConfig,
	) -> ClResult<()> {
		let slow_threshold = config.slow_callback_threshold();
		let handle = thread::Builder::new()
			.name(config.dispatcher_thread_name.clone())
			.spawn(move || run(&rx, &store, slow_threshold))
			.map_err(|e| Error::Internal(format!("failed to spawn settings dispatcher: {}", e)))?;
		if self.thread.set(handle.thread().id()).is_err() {
			return Err(Error::Internal("settings dispatcher started twice".into()));
		}
		Ok(())
	}

	pub(crate) fn notify(&self, key: InternalKey) {
		if self.tx.send(Message::Changed(key)).is_err() {
			error!("Settings dispatcher is gone, dropping change notification");
		}
	}

	fn on_dispatcher_thread(&self) -> bool {
		self.thread.get() == Some(&thread::current().id())
	}

	fn barrier(&self) -> ClResult<flume::Receiver<()>> {
		if self.on_dispatcher_thread() {
			return Err(Error::Internal(
				"cannot wait for change notifications from a change callback".into(),
			));
		}
		let (done_tx, done_rx) = flume::bounded(1);
		self.tx.send(Message::Flush(done_tx)).map_err(|_| stopped())?;
		Ok(done_rx)
	}

	pub(crate) fn flush(&self) -> ClResult<()> {
		self.barrier()?.recv().map_err(|_| stopped())
	}

	pub(crate) async fn flushed(&self) -> ClResult<()> {
		self.barrier()?.recv_async().await.map_err(|_| stopped())
	}
}

fn run(rx: &flume::Receiver<Message>, store: &Weak<ValuesInner>, slow_threshold: Duration) {
	debug!("Settings dispatcher started");
	while let Ok(msg) = rx.recv() {
		match msg {
			Message::Changed(key) => {
				let Some(inner) = store.upgrade() else {
					break;
				};
				let values = Values::from_inner(inner);
				for callback in values.callbacks(key.as_str()) {
					invoke(&values, &key, &callback, slow_threshold);
				}
			}
			Message::Flush(done) => {
				// The waiter may have given up already
				let _ignore = done.send(());
			}
		}
	}
	debug!("Settings dispatcher stopped");
}

fn invoke(values: &Values, key: &InternalKey, callback: &OnChange, slow_threshold: Duration) {
	let start = Instant::now();
	if catch_unwind(AssertUnwindSafe(|| callback(values))).is_err() {
		error!(key = %key, "Change callback panicked");
	}
	let elapsed = start.elapsed();
	if elapsed > slow_threshold {
		warn!(key = %key, elapsed_ms = elapsed.as_millis() as u64, "Slow change callback");
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::definition::SettingDefinition;
	use crate::kind::SettingKind;
	use crate::registry::SettingsRegistry;
	use std::sync::Arc;
	use std::sync::atomic::{AtomicUsize, Ordering};

	fn store() -> Values {
		let mut registry = SettingsRegistry::new();
		registry
			.register(
				SettingDefinition::builder("kv.enabled", SettingKind::Bool)
					.description("enabled")
					.default("false")
					.build()
					.unwrap(),
			)
			.unwrap();
		Values::new(Arc::new(registry.freeze())).unwrap()
	}

	#[test]
	fn test_panicking_callback_does_not_stop_dispatcher() {
		let values = store();
		let calls = Arc::new(AtomicUsize::new(0));
		values.set_on_change("kv.enabled", |_| panic!("boom")).unwrap();
		let counter = calls.clone();
		values
			.set_on_change("kv.enabled", move |_| {
				counter.fetch_add(1, Ordering::SeqCst);
			})
			.unwrap();

		values.set_explicit("kv.enabled", "true").unwrap();
		values.set_explicit("kv.enabled", "false").unwrap();
		values.flush().unwrap();
		assert_eq!(calls.load(Ordering::SeqCst), 2);
	}

	#[test]
	fn test_flush_from_callback_fails() {
		let values = store();
		let result = Arc::new(parking_lot::Mutex::new(None));
		let slot = result.clone();
		values
			.set_on_change("kv.enabled", move |values| {
				*slot.lock() = Some(values.flush());
			})
			.unwrap();

		values.set_explicit("kv.enabled", "true").unwrap();
		values.flush().unwrap();
		assert!(matches!(*result.lock(), Some(Err(Error::Internal(_)))));
	}

	#[cfg(target_os = "linux")]
	fn threads_named(name: &str) -> usize {
		std::fs::read_dir("/proc/self/task")
			.unwrap()
			.filter_map(|task| std::fs::read_to_string(task.ok()?.path().join("comm")).ok())
			.filter(|comm| comm.trim_end() == name)
			.count()
	}

	#[cfg(target_os = "linux")]
	#[test]
	fn test_dispatcher_exits_with_last_handle() {
		// Thread names are truncated to 15 bytes in comm
		let name = "settings-exit";
		let config = ValuesConfig { dispatcher_thread_name: name.to_string(), ..Default::default() };
		let values = Values::with_config(store().registry().clone(), &config).unwrap();
		let handle = values.clone();
		values.set_explicit("kv.enabled", "true").unwrap();
		values.flush().unwrap();
		assert_eq!(threads_named(name), 1);

		drop(values);
		assert_eq!(threads_named(name), 1);

		drop(handle);
		let deadline = Instant::now() + Duration::from_secs(5);
		while threads_named(name) > 0 && Instant::now() < deadline {
			thread::sleep(Duration::from_millis(10));
		}
		assert_eq!(threads_named(name), 0);
	}
}

// vim: ts=4
