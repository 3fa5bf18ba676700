//! Built-in cluster settings
//!
//! Registers the settings every deployment carries, across all value kinds
//! and classes.

use std::time::Duration;

use crate::definition::SettingDefinition;
use crate::kind::{EnumChoices, SettingKind};
use crate::prelude::*;
use crate::registry::SettingsRegistry;
use crate::validators;

pub const SNAPSHOT_REBALANCE_MAX_RATE: &str = "kv.snapshot_rebalance.max_rate";
pub const TIME_UNTIL_STORE_DEAD: &str = "server.time_until_store_dead";
pub const SHUTDOWN_DRAIN_WAIT: &str = "server.shutdown.drain_wait";
pub const RANGEFEED_ENABLED: &str = "kv.rangefeed.enabled";
pub const DIAGNOSTICS_REPORTING_ENABLED: &str = "diagnostics.reporting.enabled";
pub const CLUSTER_ORGANIZATION: &str = "cluster.organization";
pub const DISTSQL_MODE: &str = "sql.defaults.distsql";
pub const STATS_FRACTION_STALE_ROWS: &str = "sql.stats.automatic_collection.fraction_stale_rows";
pub const STATS_MIN_STALE_ROWS: &str = "sql.stats.automatic_collection.min_stale_rows";
pub const MAX_READ_BUFFER_MESSAGE_SIZE: &str = "sql.conn.max_read_buffer_message_size";

/// Register all built-in settings
pub fn register_settings(registry: &mut SettingsRegistry) -> ClResult<()> {
	registry.register(
		SettingDefinition::builder(SNAPSHOT_REBALANCE_MAX_RATE, SettingKind::ByteSize)
			.description("the rate limit (bytes/sec) to use for rebalance and upreplication snapshots")
			.default("32MiB")
			.class(Class::TenantReadOnly)
			.visibility(Visibility::Public)
			.validator(validators::byte_size_with_minimum(1 << 20))
			.error_hint("use a byte size of at least 1MiB, such as 32MiB")
			.build()?,
	)?;

	registry.register(
		SettingDefinition::builder(TIME_UNTIL_STORE_DEAD, SettingKind::Duration)
			.description("the time after which a store is considered dead if it has not gossiped")
			.default("5m0s")
			.class(Class::SystemOnly)
			.visibility(Visibility::Public)
			.validator(validators::duration_with_minimum(Duration::from_secs(75)))
			.build()?,
	)?;

	// Renamed; the storage key stays the same
	registry.register(
		SettingDefinition::builder(SHUTDOWN_DRAIN_WAIT, SettingKind::Duration)
			.name("server.shutdown.initial_wait")
			.retired_name(SHUTDOWN_DRAIN_WAIT)
			.description("the amount of time a server waits in an unready state before proceeding with a drain")
			.default("0s")
			.class(Class::TenantWritable)
			.visibility(Visibility::Public)
			.build()?,
	)?;

	registry.register(
		SettingDefinition::builder(RANGEFEED_ENABLED, SettingKind::Bool)
			.description("if set, rangefeed registration is enabled")
			.default("false")
			.class(Class::SystemOnly)
			.visibility(Visibility::Public)
			.build()?,
	)?;

	registry.register(
		SettingDefinition::builder(DIAGNOSTICS_REPORTING_ENABLED, SettingKind::Bool)
			.description("enable reporting diagnostic metrics")
			.default("true")
			.class(Class::TenantWritable)
			.visibility(Visibility::Public)
			.build()?,
	)?;

	registry.register(
		SettingDefinition::builder(CLUSTER_ORGANIZATION, SettingKind::String)
			.description("organization name")
			.default("")
			.class(Class::TenantReadOnly)
			.visibility(Visibility::Public)
			.build()?,
	)?;

	registry.register(
		SettingDefinition::builder(
			DISTSQL_MODE,
			SettingKind::Enum(EnumChoices::new([(0, "off"), (1, "auto"), (2, "on")])),
		)
		.description("default distributed SQL execution mode")
		.default("auto")
		.class(Class::TenantWritable)
		.visibility(Visibility::Public)
		.build()?,
	)?;

	registry.register(
		SettingDefinition::builder(STATS_FRACTION_STALE_ROWS, SettingKind::Float)
			.description("target fraction of stale rows per table that will trigger a statistics refresh")
			.default("0.2")
			.class(Class::TenantWritable)
			.visibility(Visibility::Public)
			.validator(validators::non_negative_float)
			.build()?,
	)?;

	registry.register(
		SettingDefinition::builder(STATS_MIN_STALE_ROWS, SettingKind::Int)
			.description("target minimum number of stale rows per table that will trigger a statistics refresh")
			.default("500")
			.class(Class::TenantWritable)
			.visibility(Visibility::Public)
			.validator(validators::non_negative_int)
			.build()?,
	)?;

	registry.register(
		SettingDefinition::builder(MAX_READ_BUFFER_MESSAGE_SIZE, SettingKind::ByteSize)
			.description("maximum buffer size to allow for ingesting sql statements")
			.default("16MiB")
			.class(Class::TenantWritable)
			.validator(validators::byte_size_with_minimum(16 << 10))
			.build()?,
	)?;

	Ok(())
}


// vim: ts=4
