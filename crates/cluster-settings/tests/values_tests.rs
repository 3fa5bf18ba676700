//! Values store tests: precedence, change notification and registry lookups

mod common;

use cluster_settings::core_settings::SNAPSHOT_REBALANCE_MAX_RATE;
use cluster_settings::prelude::*;
use cluster_settings::{SettingDefinition, SettingKind, SettingValue, SettingsRegistry, Values};
use common::*;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

fn counter(values: &Values, key: &str) -> Arc<AtomicUsize> {
	let calls = Arc::new(AtomicUsize::new(0));
	let c = calls.clone();
	values
		.set_on_change(key, move |_| {
			c.fetch_add(1, Ordering::SeqCst);
		})
		.unwrap();
	calls
}

#[test]
fn test_lookup_by_key_returns_same_key() {
	let registry = registry();
	for def in registry.list() {
		let key = def.internal_key().as_str();
		assert_eq!(registry.lookup_by_key(key).unwrap().internal_key().as_str(), key);
	}
}

#[test]
fn test_duplicate_registration_is_rejected() {
	let mut registry = SettingsRegistry::new();
	register_fixtures(&mut registry).unwrap();

	let result = registry.register(
		SettingDefinition::builder(LIMIT, SettingKind::Int)
			.name("test.other_limit")
			.description("shadow")
			.default("1")
			.build()
			.unwrap(),
	);
	assert!(matches!(result, Err(Error::DuplicateSetting(_))));
}

#[test]
fn test_precedence_law() {
	let values = store();
	assert_eq!(values.encoded(LIMIT).unwrap(), "10");
	assert_eq!(values.value_origin(LIMIT).unwrap(), ValueOrigin::Default);

	values.set_explicit(LIMIT, "20").unwrap();
	assert_eq!(values.encoded(LIMIT).unwrap(), "20");
	assert_eq!(values.value_origin(LIMIT).unwrap(), ValueOrigin::ExplicitlySet);

	values.set_external(LIMIT, "30").unwrap();
	assert_eq!(values.encoded(LIMIT).unwrap(), "30");
	assert_eq!(values.value_origin(LIMIT).unwrap(), ValueOrigin::ExternallySet);

	values.clear_external(LIMIT).unwrap();
	assert_eq!(values.encoded(LIMIT).unwrap(), "20");
	assert_eq!(values.value_origin(LIMIT).unwrap(), ValueOrigin::ExplicitlySet);

	values.clear_explicit(LIMIT).unwrap();
	assert_eq!(values.encoded(LIMIT).unwrap(), "10");
	assert_eq!(values.value_origin(LIMIT).unwrap(), ValueOrigin::Default);
}

#[test]
fn test_snapshot_rebalance_rate_end_to_end() {
	let values = store();
	let def = values.registry().lookup_by_key(SNAPSHOT_REBALANCE_MAX_RATE).unwrap().clone();
	assert_eq!(def.class(), Class::TenantReadOnly);
	assert_eq!(def.string(&values), "32 MiB");

	assert_eq!(def.value_origin(&values), ValueOrigin::Default);

	values.apply_external_update(SNAPSHOT_REBALANCE_MAX_RATE, Some("64MiB")).unwrap();
	assert_eq!(def.string(&values), "64 MiB");
	assert_eq!(def.value_origin(&values), ValueOrigin::ExternallySet);

	values.set_explicit(SNAPSHOT_REBALANCE_MAX_RATE, "16MiB").unwrap();
	let layers = values.layers(SNAPSHOT_REBALANCE_MAX_RATE).unwrap();
	assert_eq!(layers.explicit.as_ref().map(|l| l.encoded()), Some("16777216"));

	assert_eq!(def.string(&values), "64 MiB");
	assert_eq!(def.value_origin(&values), ValueOrigin::ExternallySet);
	assert_eq!(values.get_byte_size(SNAPSHOT_REBALANCE_MAX_RATE).unwrap(), 64 << 20);

	values.clear_external(SNAPSHOT_REBALANCE_MAX_RATE).unwrap();
	assert_eq!(def.string(&values), "16 MiB");
	assert_eq!(def.value_origin(&values), ValueOrigin::ExplicitlySet);
}

#[test]
fn test_callback_fires_once_per_effective_change() {
	let values = store();
	let calls = counter(&values, LIMIT);

	values.set_explicit(LIMIT, "20").unwrap();
	values.set_explicit(LIMIT, "20").unwrap();
	values.flush().unwrap();
	assert_eq!(calls.load(Ordering::SeqCst), 1);

	// Hidden by the external layer, so no effective change
	values.set_external(LIMIT, "30").unwrap();
	values.set_explicit(LIMIT, "25").unwrap();
	values.flush().unwrap();
	assert_eq!(calls.load(Ordering::SeqCst), 2);

	// Clearing the external layer reveals the new explicit value
	values.clear_external(LIMIT).unwrap();
	values.flush().unwrap();
	assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[test]
fn test_explicit_equal_to_default_is_not_a_change() {
	let values = store();
	let calls = counter(&values, LIMIT);

	assert!(!values.set_explicit(LIMIT, "10").unwrap());
	values.flush().unwrap();
	assert_eq!(calls.load(Ordering::SeqCst), 0);
	assert_eq!(values.value_origin(LIMIT).unwrap(), ValueOrigin::ExplicitlySet);
}

#[test]
fn test_callbacks_run_in_registration_order_and_may_read() {
	let values = store();
	let seen = Arc::new(Mutex::new(Vec::new()));
	for tag in ["first", "second"] {
		let seen = seen.clone();
		values
			.set_on_change(MODE, move |values| {
				let mode = values.string(MODE).unwrap_or_default();
				seen.lock().push(format!("{}:{}", tag, mode));
			})
			.unwrap();
	}

	values.set_explicit(MODE, "on").unwrap();
	values.flush().unwrap();
	assert_eq!(*seen.lock(), vec!["first:on".to_string(), "second:on".to_string()]);
}

#[test]
fn test_callbacks_observe_changes_in_order() {
	let values = store();
	let seen = Arc::new(Mutex::new(Vec::new()));
	let s = seen.clone();
	values
		.set_on_change(LIMIT, move |values| {
			s.lock().push(values.get_int(LIMIT).unwrap_or(-1));
		})
		.unwrap();

	for i in 1..=50 {
		values.set_explicit(LIMIT, &i.to_string()).unwrap();
	}
	values.flush().unwrap();

	let seen = seen.lock();
	assert_eq!(seen.len(), 50);
	assert!(seen.windows(2).all(|w| w[0] <= w[1]));
	assert_eq!(seen.last(), Some(&50));
}

#[test]
fn test_rejected_value_keeps_state_and_fires_nothing() {
	let values = store();
	let calls = counter(&values, RATIO);

	let err = values.set_explicit(RATIO, "1.5").unwrap_err();
	assert!(matches!(err, Error::Validation { .. }));
	assert!(!err.is_fatal());
	values.flush().unwrap();
	assert_eq!(calls.load(Ordering::SeqCst), 0);
	assert_eq!(values.layers(RATIO).unwrap().state(), cluster_settings::LayerState::Unset);
}

#[test]
fn test_typed_getters() {
	let values = store();
	values.set_explicit(ENABLED, "true").unwrap();
	values.set_explicit(TIMEOUT, "1m30s").unwrap();
	values.set_explicit(TOKEN, "abc").unwrap();

	assert!(values.get_bool(ENABLED).unwrap());
	assert_eq!(values.get_duration(TIMEOUT).unwrap(), Duration::from_secs(90));
	assert_eq!(values.string(TIMEOUT).unwrap(), "1m30s");
	assert_eq!(values.get_string(TOKEN).unwrap(), "abc");
	assert_eq!(values.get_enum(MODE).unwrap(), 1);
	assert_eq!(values.string(MODE).unwrap(), "auto");
	assert!((values.get_float(RATIO).unwrap() - 0.5).abs() < f64::EPSILON);
	assert_eq!(values.get(BUFFER).unwrap(), SettingValue::ByteSize(1 << 20));
}

#[test]
fn test_stores_are_independent() {
	let registry = registry();
	let host = Values::new(registry.clone()).unwrap();
	let tenant = Values::new(registry).unwrap();

	host.set_explicit(LIMIT, "99").unwrap();
	assert_eq!(host.encoded(LIMIT).unwrap(), "99");
	assert_eq!(tenant.encoded(LIMIT).unwrap(), "10");
}

#[test]
fn test_external_writes_ignore_class() {
	let values = store();
	assert_eq!(values.class(ENABLED).unwrap(), Class::SystemOnly);
	assert!(values.apply_external_update(ENABLED, Some("true")).unwrap());
	assert!(values.apply_external_update(ENABLED, None).unwrap());
	assert!(!values.get_bool(ENABLED).unwrap());
}

#[tokio::test]
async fn test_flushed_waits_for_delivery() {
	let values = store();
	let calls = counter(&values, TIMEOUT);
	values.set_explicit(TIMEOUT, "5s").unwrap();
	values.flushed().await.unwrap();
	assert_eq!(calls.load(Ordering::SeqCst), 1);
}

// vim: ts=4
