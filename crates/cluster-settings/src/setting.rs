//! Capability traits shared by all setting kinds
//!
//! [`Setting`] is the metadata view that is safe to hand to any consumer,
//! including telemetry. [`NonMaskedSetting`] adds access to actual values and
//! is only implemented by [`SettingDefinition`]; the reporting path uses
//! [`MaskedSetting`](crate::reporting::MaskedSetting) instead.

use std::fmt::Debug;

use crate::definition::SettingDefinition;
use crate::prelude::*;
use crate::values::{OnChange, Values};

pub trait Setting: Debug + Send + Sync {
	/// Scope of the setting in multi-tenant deployments
	fn class(&self) -> Class;

	/// Storage key. Use [`Setting::name`] for anything user-facing.
	fn internal_key(&self) -> &InternalKey;

	/// User-visible name for SET/SHOW and error messages
	fn name(&self) -> &SettingName;

	/// Single-letter type tag
	fn typ(&self) -> &'static str;

	fn description(&self) -> &str;

	fn visibility(&self) -> Visibility;

	/// Whether the value may appear in externally shared reports
	fn is_reportable(&self) -> bool;

	/// Display form of the current value, as used by SHOW CLUSTER SETTING
	///
	/// A setting from a different registry than the one `values` was built
	/// from is a programming error: it is logged at error level and the
	/// default is returned.
	fn string(&self, values: &Values) -> String;

	/// Which layer the current value comes from
	fn value_origin(&self, values: &Values) -> ValueOrigin;
}

/// Value access for settings that are not being reported
pub trait NonMaskedSetting: Setting {
	/// Canonical encoding of the current value
	fn encoded(&self, values: &Values) -> String;

	/// Canonical encoding of the default value
	fn encoded_default(&self) -> &str;

	/// Validate an encoded (or user-supplied) value and render it, without
	/// modifying any store
	fn decode_to_string(&self, encoded: &str) -> ClResult<String>;

	/// Install a callback invoked on the dispatcher thread after every
	/// effective change of this setting in `values`
	///
	/// The callback must not block, and must not modify this setting
	/// synchronously.
	fn set_on_change(&self, values: &Values, f: OnChange) -> ClResult<()>;

	/// Hint shown to the user when setting the value fails
	fn error_hint(&self) -> Option<&str>;
}

impl Setting for SettingDefinition {
	fn class(&self) -> Class {
		self.class
	}

	fn internal_key(&self) -> &InternalKey {
		&self.key
	}

	fn name(&self) -> &SettingName {
		&self.name
	}

	fn typ(&self) -> &'static str {
		self.kind.typ()
	}

	fn description(&self) -> &str {
		&self.description
	}

	fn visibility(&self) -> Visibility {
		self.visibility
	}

	fn is_reportable(&self) -> bool {
		self.reportable
	}

	fn string(&self, values: &Values) -> String {
		values.with_resolved(self, |resolved| self.render(resolved.value))
	}

	fn value_origin(&self, values: &Values) -> ValueOrigin {
		values.with_resolved(self, |resolved| resolved.origin)
	}
}

impl NonMaskedSetting for SettingDefinition {
	fn encoded(&self, values: &Values) -> String {
		values.with_resolved(self, |resolved| resolved.encoded.to_string())
	}

	fn encoded_default(&self) -> &str {
		&self.encoded_default
	}

	fn decode_to_string(&self, encoded: &str) -> ClResult<String> {
		self.decode(encoded).map(|value| self.render(&value))
	}

	fn set_on_change(&self, values: &Values, f: OnChange) -> ClResult<()> {
		values.register_callback(self.key.as_str(), f)
	}

	fn error_hint(&self) -> Option<&str> {
		self.error_hint.as_deref()
	}
}


// vim: ts=4
