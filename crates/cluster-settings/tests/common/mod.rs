//! Common test utilities and fixtures
//!
//! Shared by all integration tests of the settings crate: a fixture registry
//! covering every value kind and class, and test logging setup.

#![allow(dead_code)]

use cluster_settings::prelude::*;
use cluster_settings::validators;
use cluster_settings::{
	EnumChoices, FrozenSettingsRegistry, SettingDefinition, SettingKind, SettingsRegistry, Values,
};
use std::sync::{Arc, Once};

pub const LIMIT: &str = "test.limit";
pub const ENABLED: &str = "test.enabled";
pub const RATIO: &str = "test.ratio";
pub const TOKEN: &str = "test.token";
pub const TIMEOUT: &str = "test.timeout";
pub const MODE: &str = "test.mode";
pub const BUFFER: &str = "test.buffer";

static TRACING: Once = Once::new();

/// Route `tracing` output through the test harness
pub fn init_tracing() {
	TRACING.call_once(|| {
		let _ = tracing_subscriber::fmt()
			.with_max_level(tracing::Level::DEBUG)
			.with_test_writer()
			.try_init();
	});
}

pub fn register_fixtures(registry: &mut SettingsRegistry) -> ClResult<()> {
	registry.register(
		SettingDefinition::builder(LIMIT, SettingKind::Int)
			.description("row limit")
			.default("10")
			.class(Class::TenantWritable)
			.visibility(Visibility::Public)
			.validator(validators::non_negative_int)
			.error_hint("use a non-negative integer")
			.build()?,
	)?;
	registry.register(
		SettingDefinition::builder(ENABLED, SettingKind::Bool)
			.description("feature switch")
			.default("false")
			.class(Class::SystemOnly)
			.build()?,
	)?;
	registry.register(
		SettingDefinition::builder(RATIO, SettingKind::Float)
			.description("sampling ratio")
			.default("0.5")
			.class(Class::TenantReadOnly)
			.validator(validators::fraction)
			.build()?,
	)?;
	registry.register(
		SettingDefinition::builder(TOKEN, SettingKind::String)
			.description("access token")
			.default("")
			.class(Class::TenantWritable)
			.build()?,
	)?;
	registry.register(
		SettingDefinition::builder(TIMEOUT, SettingKind::Duration)
			.description("request timeout")
			.default("30s")
			.class(Class::TenantWritable)
			.build()?,
	)?;
	registry.register(
		SettingDefinition::builder(
			MODE,
			SettingKind::Enum(EnumChoices::new([(0, "off"), (1, "auto"), (2, "on")])),
		)
		.description("execution mode")
		.default("auto")
		.class(Class::TenantWritable)
		.build()?,
	)?;
	registry.register(
		SettingDefinition::builder(BUFFER, SettingKind::ByteSize)
			.description("buffer size")
			.default("1MiB")
			.class(Class::TenantReadOnly)
			.build()?,
	)?;
	Ok(())
}

/// Frozen registry with the fixtures and the built-in settings
pub fn registry() -> Arc<FrozenSettingsRegistry> {
	init_tracing();
	let mut registry = SettingsRegistry::new();
	register_fixtures(&mut registry).unwrap();
	cluster_settings::register_settings(&mut registry).unwrap();
	Arc::new(registry.freeze())
}

pub fn store() -> Values {
	Values::new(registry()).unwrap()
}

// vim: ts=4
