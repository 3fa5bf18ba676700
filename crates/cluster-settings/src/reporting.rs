//! Redacted view of settings for externally shared reports
//!
//! Telemetry and diagnostics must go through [`MaskedSetting`], which never
//! hands out the value of a non-reportable setting.

use serde::Serialize;
use std::sync::Arc;

use crate::definition::SettingDefinition;
use crate::prelude::*;
use crate::values::Values;

/// Replaces the value of non-reportable settings
pub const REDACTED: &str = "<redacted>";

/// Metadata-only wrapper around a setting definition
#[derive(Debug, Clone)]
pub struct MaskedSetting {
	def: Arc<SettingDefinition>,
}

impl MaskedSetting {
	pub(crate) fn new(def: Arc<SettingDefinition>) -> Self {
		Self { def }
	}
}

impl Setting for MaskedSetting {
	fn class(&self) -> Class {
		self.def.class()
	}

	fn internal_key(&self) -> &InternalKey {
		self.def.internal_key()
	}

	fn name(&self) -> &SettingName {
		Setting::name(&*self.def)
	}

	fn typ(&self) -> &'static str {
		self.def.typ()
	}

	fn description(&self) -> &str {
		Setting::description(&*self.def)
	}

	fn visibility(&self) -> Visibility {
		Setting::visibility(&*self.def)
	}

	fn is_reportable(&self) -> bool {
		self.def.is_reportable()
	}

	fn string(&self, values: &Values) -> String {
		if self.def.is_reportable() { self.def.string(values) } else { REDACTED.to_string() }
	}

	fn value_origin(&self, values: &Values) -> ValueOrigin {
		self.def.value_origin(values)
	}
}

/// One entry of a reporting snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportedSetting {
	pub key: InternalKey,
	pub name: SettingName,
	pub typ: &'static str,
	pub value: String,
	pub origin: ValueOrigin,
	pub class: Class,
	pub visibility: Visibility,
	pub reportable: bool,
}

fn report(setting: &MaskedSetting, values: &Values) -> ClResult<ReportedSetting> {
	let entry = ReportedSetting {
		key: setting.internal_key().clone(),
		name: setting.name().clone(),
		typ: setting.typ(),
		value: setting.string(values),
		origin: setting.value_origin(values),
		class: setting.class(),
		visibility: setting.visibility(),
		reportable: setting.is_reportable(),
	};
	if !entry.reportable && entry.value != REDACTED {
		error!(key = %entry.key, "Non-reportable setting value escaped redaction");
		return Err(Error::RedactionViolation(entry.key.to_string()));
	}
	Ok(entry)
}

/// Report every registered setting, ordered by name
pub fn reporting_snapshot(values: &Values) -> ClResult<Vec<ReportedSetting>> {
	let registry = values.registry();
	let mut entries = Vec::with_capacity(registry.len());
	for key in registry.keys() {
		let setting = registry.lookup_for_reporting_by_key(key.as_str())?;
		entries.push(report(&setting, values)?);
	}
	Ok(entries)
}

/// Report only settings whose value does not come from the default
pub fn altered_settings(values: &Values) -> ClResult<Vec<ReportedSetting>> {
	let mut entries = reporting_snapshot(values)?;
	entries.retain(|entry| entry.origin != ValueOrigin::Default);
	Ok(entries)
}

/// [`reporting_snapshot`] rendered as JSON
pub fn reporting_snapshot_json(values: &Values) -> ClResult<serde_json::Value> {
	let entries = reporting_snapshot(values)?;
	serde_json::to_value(entries)
		.map_err(|e| Error::Internal(format!("failed to serialize settings report: {}", e)))
}


// vim: ts=4
