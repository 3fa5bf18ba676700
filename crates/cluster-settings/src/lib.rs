//! Typed cluster settings.
//!
//! Settings are declared once at startup as [`SettingDefinition`]s and
//! collected in a [`SettingsRegistry`]. Freezing the registry turns it into
//! an immutable [`FrozenSettingsRegistry`] that backs any number of
//! per-instance [`Values`] stores. Each store resolves a setting from its
//! external layer (propagated from the host cluster), its explicit layer
//! (SET CLUSTER SETTING) or the default, in that order, and notifies
//! registered callbacks of every effective change.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod codec;
pub mod core_settings;
pub mod definition;
mod dispatch;
pub mod feed;
pub mod kind;
pub mod precedence;
pub mod prelude;
pub mod registry;
pub mod reporting;
pub mod setting;
pub mod validators;
pub mod values;

pub use cluster_settings_types::{
	ClResult, Class, Error, InternalKey, SettingName, TenantKind, ValueOrigin, Visibility,
};
pub use definition::{SettingDefinition, SettingDefinitionBuilder};
pub use feed::{FeedMessage, FeedStats, SettingUpdate};
pub use kind::{EnumChoices, SettingKind, SettingValue};
pub use precedence::{Layer, LayerState, Layers, Transition};
pub use registry::{FrozenSettingsRegistry, NameStatus, SettingsRegistry};
pub use reporting::{MaskedSetting, REDACTED, ReportedSetting};
pub use setting::{NonMaskedSetting, Setting};
pub use values::{OnChange, SettingSnapshot, Values, ValuesConfig};

/// Register the built-in settings of this crate
pub fn register_settings(registry: &mut SettingsRegistry) -> ClResult<()> {
	core_settings::register_settings(registry)
}

// vim: ts=4
