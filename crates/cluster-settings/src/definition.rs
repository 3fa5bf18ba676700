//! Setting definitions (descriptors)
//!
//! A definition is the immutable metadata of one setting. Definitions are
//! created with [`SettingDefinition::builder`] during startup, registered in
//! a [`SettingsRegistry`](crate::registry::SettingsRegistry) and never
//! modified afterwards. Current values live in [`Values`](crate::values::Values).

use std::fmt::Debug;

use crate::kind::{SettingKind, SettingValue};
use crate::prelude::*;

/// Type alias for setting validator function
pub type SettingValidator = Box<dyn Fn(&SettingValue) -> Result<(), String> + Send + Sync>;

/// Setting definition - defines metadata for each setting
pub struct SettingDefinition {
	pub(crate) key: InternalKey,
	pub(crate) name: SettingName,
	pub(crate) retired_names: Vec<SettingName>,
	pub(crate) class: Class,
	pub(crate) visibility: Visibility,
	pub(crate) kind: SettingKind,
	pub(crate) description: String,
	pub(crate) default: SettingValue,
	pub(crate) encoded_default: String,
	pub(crate) validator: Option<SettingValidator>,
	pub(crate) reportable: bool,
	pub(crate) error_hint: Option<String>,
}

impl Debug for SettingDefinition {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("SettingDefinition")
			.field("key", &self.key)
			.field("name", &self.name)
			.field("class", &self.class)
			.field("visibility", &self.visibility)
			.field("typ", &self.kind.typ())
			.field("reportable", &self.reportable)
			.field("validator", &self.validator.is_some())
			.finish_non_exhaustive()
	}
}

impl SettingDefinition {
	/// Create a builder for constructing a SettingDefinition
	pub fn builder(key: impl Into<InternalKey>, kind: SettingKind) -> SettingDefinitionBuilder {
		SettingDefinitionBuilder::new(key, kind)
	}

	pub fn kind(&self) -> &SettingKind {
		&self.kind
	}

	/// Previous display names that still resolve to this setting
	pub fn retired_names(&self) -> &[SettingName] {
		&self.retired_names
	}

	/// The decoded default value
	pub fn default_value(&self) -> &SettingValue {
		&self.default
	}

	/// Decode and validate a raw value without touching any store
	pub fn decode(&self, raw: &str) -> ClResult<SettingValue> {
		let value = self.kind.decode(raw).map_err(|reason| self.invalid(raw, reason))?;
		if let Some(validator) = &self.validator {
			validator(&value).map_err(|reason| self.invalid(raw, reason))?;
		}
		Ok(value)
	}

	/// Render a decoded value for display
	pub fn render(&self, value: &SettingValue) -> String {
		self.kind.render(value)
	}

	fn invalid(&self, raw: &str, reason: String) -> Error {
		Error::Validation {
			setting: self.name.to_string(),
			typ: self.kind.typ(),
			raw: raw.to_string(),
			reason,
			hint: None,
		}
	}
}

/// Builder for SettingDefinition with fluent API
pub struct SettingDefinitionBuilder {
	key: InternalKey,
	kind: SettingKind,
	name: Option<SettingName>,
	retired_names: Vec<SettingName>,
	class: Class,
	visibility: Visibility,
	description: Option<String>,
	default: Option<String>,
	validator: Option<SettingValidator>,
	reportable: Option<bool>,
	error_hint: Option<String>,
}

impl SettingDefinitionBuilder {
	pub fn new(key: impl Into<InternalKey>, kind: SettingKind) -> Self {
		Self {
			key: key.into(),
			kind,
			name: None,
			retired_names: Vec::new(),
			class: Class::TenantReadOnly, // Visible to tenants, settable by the host only
			visibility: Visibility::Reserved,
			description: None,
			default: None,
			validator: None,
			reportable: None,
			error_hint: None,
		}
	}

	/// Set the display name (defaults to the key)
	pub fn name(mut self, name: impl Into<SettingName>) -> Self {
		self.name = Some(name.into());
		self
	}

	/// Keep accepting an old display name
	pub fn retired_name(mut self, name: impl Into<SettingName>) -> Self {
		self.retired_names.push(name.into());
		self
	}

	/// Set the multi-tenant class (defaults to TenantReadOnly)
	pub fn class(mut self, class: Class) -> Self {
		self.class = class;
		self
	}

	/// Set the visibility (defaults to Reserved)
	pub fn visibility(mut self, visibility: Visibility) -> Self {
		self.visibility = visibility;
		self
	}

	/// Set the description (required)
	pub fn description(mut self, description: impl Into<String>) -> Self {
		self.description = Some(description.into());
		self
	}

	/// Set the default value in user-facing or encoded form (required)
	pub fn default(mut self, raw: impl Into<String>) -> Self {
		self.default = Some(raw.into());
		self
	}

	/// Set a validation function
	pub fn validator<F>(mut self, f: F) -> Self
	where
		F: Fn(&SettingValue) -> Result<(), String> + Send + Sync + 'static,
	{
		self.validator = Some(Box::new(f));
		self
	}

	/// Whether the value may appear in diagnostics reports
	///
	/// String settings default to non-reportable, everything else to
	/// reportable.
	pub fn reportable(mut self, reportable: bool) -> Self {
		self.reportable = Some(reportable);
		self
	}

	/// Hint shown to the user when setting the value fails
	pub fn error_hint(mut self, hint: impl Into<String>) -> Self {
		self.error_hint = Some(hint.into());
		self
	}

	/// Build the SettingDefinition
	pub fn build(self) -> ClResult<SettingDefinition> {
		if self.key.as_str().is_empty() {
			return Err(Error::ConfigError("Setting key must not be empty".into()));
		}
		let description = self.description.ok_or_else(|| {
			Error::ConfigError(format!("Setting '{}' has no description", self.key))
		})?;
		let raw_default = self.default.ok_or_else(|| {
			Error::ConfigError(format!("Setting '{}' has no default value", self.key))
		})?;
		if let SettingKind::Enum(choices) = &self.kind {
			choices
				.check()
				.map_err(|e| Error::ConfigError(format!("Setting '{}': {}", self.key, e)))?;
		}

		let reportable = match (self.reportable, &self.kind) {
			(Some(true), SettingKind::String) => {
				warn!(
					"Setting '{}' is a reportable string setting - make sure it never holds secrets",
					self.key
				);
				true
			}
			(Some(reportable), _) => reportable,
			(None, SettingKind::String) => false,
			(None, _) => true,
		};

		let mut def = SettingDefinition {
			name: self.name.unwrap_or_else(|| SettingName::new(self.key.as_str())),
			key: self.key,
			retired_names: self.retired_names,
			class: self.class,
			visibility: self.visibility,
			kind: self.kind,
			description,
			default: SettingValue::Bool(false),
			encoded_default: String::new(),
			validator: self.validator,
			reportable,
			error_hint: self.error_hint,
		};

		// The default must pass the same checks as any user-supplied value
		let default = def.decode(&raw_default).map_err(|e| {
			Error::ConfigError(format!("Setting '{}' has an invalid default: {}", def.key, e))
		})?;
		def.encoded_default = default.encode();
		def.default = default;

		Ok(def)
	}
}


// vim: ts=4
