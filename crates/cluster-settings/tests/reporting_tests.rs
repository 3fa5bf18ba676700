//! Redaction tests for the reporting view

mod common;

use cluster_settings::core_settings::CLUSTER_ORGANIZATION;
use cluster_settings::prelude::*;
use cluster_settings::reporting::{
	REDACTED, altered_settings, reporting_snapshot, reporting_snapshot_json,
};
use cluster_settings::{SettingDefinition, SettingKind, SettingsRegistry, Values};
use common::*;
use std::sync::Arc;

const SECRET: &str = "secret123";

fn assert_not_leaked(values: &Values) {
	let masked = values.registry().lookup_for_reporting_by_key(TOKEN).unwrap();
	assert!(!masked.is_reportable());
	assert_eq!(masked.string(values), REDACTED);

	let json = reporting_snapshot_json(values).unwrap().to_string();
	assert!(!json.contains(SECRET), "secret leaked: {}", json);
}

#[test]
fn test_secret_never_reported_in_any_state() {
	let values = store();
	assert_not_leaked(&values);

	values.set_explicit(TOKEN, SECRET).unwrap();
	assert_not_leaked(&values);

	values.set_external(TOKEN, SECRET).unwrap();
	assert_not_leaked(&values);

	values.clear_explicit(TOKEN).unwrap();
	assert_not_leaked(&values);

	values.clear_external(TOKEN).unwrap();
	assert_not_leaked(&values);
}

#[test]
fn test_default_secret_is_redacted() {
	init_tracing();
	let mut registry = SettingsRegistry::new();
	registry
		.register(
			SettingDefinition::builder("server.api_key", SettingKind::String)
				.description("api key")
				.default(SECRET)
				.build()
				.unwrap(),
		)
		.unwrap();
	let values = Values::new(Arc::new(registry.freeze())).unwrap();

	let report = reporting_snapshot(&values).unwrap();
	assert_eq!(report.len(), 1);
	assert_eq!(report[0].value, REDACTED);
	assert_eq!(report[0].origin, ValueOrigin::Default);
}

#[test]
fn test_snapshot_contents() {
	let values = store();
	values.set_explicit(LIMIT, "42").unwrap();
	values.set_explicit(CLUSTER_ORGANIZATION, "Acme Corp").unwrap();

	let report = reporting_snapshot(&values).unwrap();
	assert_eq!(report.len(), values.registry().len());
	let names: Vec<&str> = report.iter().map(|e| e.name.as_str()).collect();
	let mut sorted = names.clone();
	sorted.sort_unstable();
	assert_eq!(names, sorted);

	let limit = report.iter().find(|e| e.key.as_str() == LIMIT).unwrap();
	assert_eq!(limit.value, "42");
	assert_eq!(limit.origin, ValueOrigin::ExplicitlySet);
	assert_eq!(limit.typ, "i");

	let org = report.iter().find(|e| e.key.as_str() == CLUSTER_ORGANIZATION).unwrap();
	assert_eq!(org.value, REDACTED);
}

#[test]
fn test_json_shape() {
	let values = store();
	values.set_external(LIMIT, "7").unwrap();

	let json = reporting_snapshot_json(&values).unwrap();
	let entry = json
		.as_array()
		.unwrap()
		.iter()
		.find(|e| e["key"] == LIMIT)
		.unwrap();
	assert_eq!(entry["value"], "7");
	assert_eq!(entry["origin"], "external-override");
	assert_eq!(entry["class"], "tenant-rw");
	assert_eq!(entry["visibility"], "public");
	assert_eq!(entry["reportable"], true);
}

#[test]
fn test_altered_settings_only() {
	let values = store();
	assert!(altered_settings(&values).unwrap().is_empty());

	values.set_explicit(TOKEN, SECRET).unwrap();
	let altered = altered_settings(&values).unwrap();
	assert_eq!(altered.len(), 1);
	assert_eq!(altered[0].value, REDACTED);
}

// vim: ts=4
