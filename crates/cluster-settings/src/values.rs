//! Per-instance value stores
//!
//! A [`Values`] store holds the explicit and external layers of every
//! setting in a frozen registry. Several stores may coexist in one process
//! (one per tenant server, for example); they share the registry but nothing
//! else.
//!
//! Each key has its own lock. Writes to the same key are linearizable, writes
//! to different keys are unordered with respect to each other.

use parking_lot::RwLock;
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

use crate::definition::SettingDefinition;
use crate::dispatch::Dispatcher;
use crate::kind::SettingValue;
use crate::precedence::{Layer, Layers, Resolved, Transition};
use crate::prelude::*;
use crate::registry::FrozenSettingsRegistry;

/// Change callback, invoked on the dispatcher thread
pub type OnChange = Arc<dyn Fn(&Values) + Send + Sync>;

/// Values store configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ValuesConfig {
	/// Name of the dispatcher thread
	pub dispatcher_thread_name: String,
	/// Callbacks running longer than this are logged as slow
	pub slow_callback_threshold_ms: u64,
}

impl Default for ValuesConfig {
	fn default() -> Self {
		Self { dispatcher_thread_name: "settings-dispatch".to_string(), slow_callback_threshold_ms: 100 }
	}
}

impl ValuesConfig {
	pub fn slow_callback_threshold(&self) -> Duration {
		Duration::from_millis(self.slow_callback_threshold_ms)
	}
}

/// Consistent view of one setting, taken under a single read lock
#[derive(Debug, Clone, PartialEq)]
pub struct SettingSnapshot {
	pub layers: Layers,
	pub value: SettingValue,
	pub encoded: String,
	pub origin: ValueOrigin,
}

pub(crate) struct Slot {
	def: Arc<SettingDefinition>,
	layers: RwLock<Layers>,
	callbacks: RwLock<Vec<OnChange>>,
}

impl Slot {
	fn new(def: Arc<SettingDefinition>) -> Self {
		Self { def, layers: RwLock::new(Layers::default()), callbacks: RwLock::new(Vec::new()) }
	}
}

pub(crate) struct ValuesInner {
	registry: Arc<FrozenSettingsRegistry>,
	slots: HashMap<InternalKey, Slot>,
	dispatcher: Dispatcher,
}

/// Handle to a values store
///
/// Cloning is cheap; all clones refer to the same store. The dispatcher
/// thread stops once the last handle is dropped.
#[derive(Clone)]
pub struct Values {
	inner: Arc<ValuesInner>,
}

impl Debug for Values {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Values").field("settings", &self.inner.slots.len()).finish_non_exhaustive()
	}
}

impl Values {
	pub fn new(registry: Arc<FrozenSettingsRegistry>) -> ClResult<Self> {
		Self::with_config(registry, &ValuesConfig::default())
	}

	pub fn with_config(registry: Arc<FrozenSettingsRegistry>, config: &ValuesConfig) -> ClResult<Self> {
		let slots = registry.list().map(|def| (def.key.clone(), Slot::new(def.clone()))).collect();
		let (dispatcher, queue) = Dispatcher::channel();
		let inner = Arc::new(ValuesInner { registry, slots, dispatcher });
		inner.dispatcher.start(queue, Arc::downgrade(&inner), config)?;

		info!("Created settings store with {} settings", inner.slots.len());
		Ok(Self { inner })
	}

	pub(crate) fn from_inner(inner: Arc<ValuesInner>) -> Self {
		Self { inner }
	}

	/// The registry this store was created from
	pub fn registry(&self) -> &Arc<FrozenSettingsRegistry> {
		&self.inner.registry
	}

	fn slot(&self, key: &str) -> ClResult<&Slot> {
		self.inner.slots.get(key).ok_or_else(|| Error::NotFound(key.to_string()))
	}

	// Writes
	//********

	/// Set the explicit layer from a user-supplied or encoded value
	pub fn set_explicit(&self, key: &str, raw: &str) -> ClResult<bool> {
		let slot = self.slot(key)?;
		let layer = Layer::new(slot.def.decode(raw)?);
		Ok(self.transition(slot, Transition::SetExplicit(layer)))
	}

	pub fn clear_explicit(&self, key: &str) -> ClResult<bool> {
		let slot = self.slot(key)?;
		Ok(self.transition(slot, Transition::ClearExplicit))
	}

	/// Set the external layer. Allowed for every class.
	pub fn set_external(&self, key: &str, raw: &str) -> ClResult<bool> {
		let slot = self.slot(key)?;
		let layer = Layer::new(slot.def.decode(raw)?);
		Ok(self.transition(slot, Transition::SetExternal(layer)))
	}

	pub fn clear_external(&self, key: &str) -> ClResult<bool> {
		let slot = self.slot(key)?;
		Ok(self.transition(slot, Transition::ClearExternal))
	}

	/// Apply an update from the propagation feed; `None` clears the layer
	pub fn apply_external_update(&self, key: &str, value: Option<&str>) -> ClResult<bool> {
		match value {
			Some(raw) => self.set_external(key, raw),
			None => self.clear_external(key),
		}
	}

	fn transition(&self, slot: &Slot, transition: Transition) -> bool {
		let op = transition.name();
		let mut layers = slot.layers.write();
		let before = layers.resolve(&slot.def).encoded.to_string();
		layers.apply(transition);
		let after = layers.resolve(&slot.def);
		let changed = after.encoded != before;
		let origin = after.origin;
		if changed {
			// Enqueue under the lock so notifications follow transition order
			self.inner.dispatcher.notify(slot.def.key.clone());
		}
		drop(layers);

		if changed {
			debug!(key = %slot.def.key, op, origin = %origin, "Setting changed");
		} else {
			debug!(key = %slot.def.key, op, "Setting unchanged");
		}
		changed
	}

	// Reads
	//*******

	pub(crate) fn with_resolved<R>(&self, def: &SettingDefinition, f: impl FnOnce(Resolved<'_>) -> R) -> R {
		match self.inner.slots.get(def.key.as_str()) {
			Some(slot) => {
				let layers = slot.layers.read();
				f(layers.resolve(&slot.def))
			}
			None => {
				error!(key = %def.key, "Setting belongs to a different registry, using its default");
				let empty = Layers::default();
				f(empty.resolve(def))
			}
		}
	}

	fn read<R>(&self, key: &str, f: impl FnOnce(&Layers, Resolved<'_>) -> R) -> ClResult<R> {
		let slot = self.slot(key)?;
		let layers = slot.layers.read();
		Ok(f(&layers, layers.resolve(&slot.def)))
	}

	/// Canonical encoding of the current value
	pub fn encoded(&self, key: &str) -> ClResult<String> {
		self.read(key, |_, resolved| resolved.encoded.to_string())
	}

	/// Display form of the current value
	pub fn string(&self, key: &str) -> ClResult<String> {
		let slot = self.slot(key)?;
		let layers = slot.layers.read();
		Ok(slot.def.render(layers.resolve(&slot.def).value))
	}

	pub fn value_origin(&self, key: &str) -> ClResult<ValueOrigin> {
		self.read(key, |_, resolved| resolved.origin)
	}

	pub fn get(&self, key: &str) -> ClResult<SettingValue> {
		self.read(key, |_, resolved| resolved.value.clone())
	}

	pub fn layers(&self, key: &str) -> ClResult<Layers> {
		self.read(key, |layers, _| layers.clone())
	}

	pub fn snapshot(&self, key: &str) -> ClResult<SettingSnapshot> {
		self.read(key, |layers, resolved| SettingSnapshot {
			layers: layers.clone(),
			value: resolved.value.clone(),
			encoded: resolved.encoded.to_string(),
			origin: resolved.origin,
		})
	}

	/// Class of a setting. Does not depend on who is asking.
	pub fn class(&self, key: &str) -> ClResult<Class> {
		Ok(self.slot(key)?.def.class)
	}

	fn mismatch(&self, key: &str, expected: &str, value: &SettingValue) -> Error {
		Error::Internal(format!(
			"setting '{}' holds a {} value, not {}",
			key,
			value.type_name(),
			expected
		))
	}

	pub fn get_bool(&self, key: &str) -> ClResult<bool> {
		match self.get(key)? {
			SettingValue::Bool(b) => Ok(b),
			other => Err(self.mismatch(key, "bool", &other)),
		}
	}

	pub fn get_int(&self, key: &str) -> ClResult<i64> {
		match self.get(key)? {
			SettingValue::Int(i) => Ok(i),
			other => Err(self.mismatch(key, "int", &other)),
		}
	}

	pub fn get_float(&self, key: &str) -> ClResult<f64> {
		match self.get(key)? {
			SettingValue::Float(f) => Ok(f),
			other => Err(self.mismatch(key, "float", &other)),
		}
	}

	pub fn get_string(&self, key: &str) -> ClResult<String> {
		match self.get(key)? {
			SettingValue::String(s) => Ok(s),
			other => Err(self.mismatch(key, "string", &other)),
		}
	}

	pub fn get_duration(&self, key: &str) -> ClResult<Duration> {
		match self.get(key)? {
			SettingValue::Duration(d) => Ok(d),
			other => Err(self.mismatch(key, "duration", &other)),
		}
	}

	/// Ordinal of an enum setting
	pub fn get_enum(&self, key: &str) -> ClResult<i64> {
		match self.get(key)? {
			SettingValue::Enum(ordinal) => Ok(ordinal),
			other => Err(self.mismatch(key, "enum", &other)),
		}
	}

	pub fn get_byte_size(&self, key: &str) -> ClResult<u64> {
		match self.get(key)? {
			SettingValue::ByteSize(n) => Ok(n),
			other => Err(self.mismatch(key, "byte size", &other)),
		}
	}

	// Change notification
	//*********************

	/// Register a change callback for `key`
	///
	/// Callbacks run on the dispatcher thread, in registration order, once
	/// per effective change. They must not block.
	pub fn set_on_change<F>(&self, key: &str, f: F) -> ClResult<()>
	where
		F: Fn(&Values) + Send + Sync + 'static,
	{
		self.register_callback(key, Arc::new(f))
	}

	pub(crate) fn register_callback(&self, key: &str, f: OnChange) -> ClResult<()> {
		let slot = self.slot(key)?;
		slot.callbacks.write().push(f);
		debug!(key = %slot.def.key, "Registered change callback");
		Ok(())
	}

	pub(crate) fn callbacks(&self, key: &str) -> Vec<OnChange> {
		self.inner.slots.get(key).map(|slot| slot.callbacks.read().clone()).unwrap_or_default()
	}

	/// Block until every change notification enqueued so far was delivered
	///
	/// Returns an error when called from a change callback.
	pub fn flush(&self) -> ClResult<()> {
		self.inner.dispatcher.flush()
	}

	/// Async variant of [`Values::flush`]
	pub async fn flushed(&self) -> ClResult<()> {
		self.inner.dispatcher.flushed().await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::kind::SettingKind;
	use crate::registry::SettingsRegistry;

	fn store() -> Values {
		let mut registry = SettingsRegistry::new();
		registry
			.register(
				SettingDefinition::builder("sql.limit", SettingKind::Int)
					.description("limit")
					.default("10")
					.build()
					.unwrap(),
			)
			.unwrap();
		Values::new(Arc::new(registry.freeze())).unwrap()
	}

	#[test]
	fn test_set_and_clear_explicit() {
		let values = store();
		assert!(values.set_explicit("sql.limit", "20").unwrap());
		assert!(!values.set_explicit("sql.limit", "20").unwrap());
		assert_eq!(values.get_int("sql.limit").unwrap(), 20);
		assert_eq!(values.value_origin("sql.limit").unwrap(), ValueOrigin::ExplicitlySet);

		assert!(values.clear_explicit("sql.limit").unwrap());
		assert!(!values.clear_explicit("sql.limit").unwrap());
		assert_eq!(values.value_origin("sql.limit").unwrap(), ValueOrigin::Default);
	}

	#[test]
	fn test_invalid_value_leaves_state_untouched() {
		let values = store();
		values.set_explicit("sql.limit", "20").unwrap();
		let err = values.set_explicit("sql.limit", "many").unwrap_err();
		assert!(matches!(err, Error::Validation { .. }));
		assert_eq!(values.encoded("sql.limit").unwrap(), "20");
	}

	#[test]
	fn test_unknown_key() {
		let values = store();
		assert!(matches!(values.set_explicit("sql.nope", "1"), Err(Error::NotFound(_))));
		assert!(matches!(values.encoded("sql.nope"), Err(Error::NotFound(_))));
	}

	#[test]
	fn test_type_mismatch() {
		let values = store();
		assert!(matches!(values.get_bool("sql.limit"), Err(Error::Internal(_))));
	}

	#[test]
	fn test_config_deserializes_with_defaults() {
		let config: ValuesConfig =
			serde_json::from_str(r#"{"slow_callback_threshold_ms": 5}"#).unwrap();
		assert_eq!(config.slow_callback_threshold(), Duration::from_millis(5));
		assert_eq!(config.dispatcher_thread_name, "settings-dispatch");
	}
}

// vim: ts=4
