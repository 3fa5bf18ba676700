//! Propagation feed consumer
//!
//! The host cluster streams setting changes for a tenant as a sequence of
//! [`FeedMessage`]s. Updates land in the external layer of the tenant's
//! values store. Unknown keys (written by a newer binary) and values that do
//! not decode are skipped so that one bad row cannot stall the feed.

use std::collections::HashSet;

use crate::prelude::*;
use crate::values::Values;

/// One row of the propagation feed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingUpdate {
	pub key: InternalKey,
	/// Encoded value; `None` is a tombstone
	pub value: Option<String>,
}

impl SettingUpdate {
	pub fn set(key: impl Into<InternalKey>, value: impl Into<String>) -> Self {
		Self { key: key.into(), value: Some(value.into()) }
	}

	pub fn tombstone(key: impl Into<InternalKey>) -> Self {
		Self { key: key.into(), value: None }
	}

	pub fn is_tombstone(&self) -> bool {
		self.value.is_none()
	}
}

#[derive(Debug, Clone)]
pub enum FeedMessage {
	/// A single incremental change
	Update(SettingUpdate),
	/// The full external state; keys not listed are cleared
	Snapshot(Vec<SettingUpdate>),
}

/// Feed processing counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeedStats {
	/// Updates (including clears) accepted by the store
	pub applied: u64,
	/// Accepted updates that changed the resolved value
	pub changed: u64,
	/// Updates for keys not present in the registry
	pub unknown: u64,
	/// Updates whose value failed to decode or validate
	pub invalid: u64,
}

impl FeedStats {
	fn record(&mut self, key: &InternalKey, result: ClResult<bool>) {
		match result {
			Ok(changed) => {
				self.applied += 1;
				if changed {
					self.changed += 1;
				}
			}
			Err(Error::NotFound(_)) => {
				self.unknown += 1;
				warn!(key = %key, "Ignoring update for unknown setting");
			}
			// Never log the raw value
			Err(Error::Validation { typ, reason, .. }) => {
				self.invalid += 1;
				warn!(key = %key, typ, "Ignoring invalid setting update: {}", reason);
			}
			Err(err) => {
				self.invalid += 1;
				error!(key = %key, "Failed to apply setting update: {}", err);
			}
		}
	}

	fn merge(&mut self, other: FeedStats) {
		self.applied += other.applied;
		self.changed += other.changed;
		self.unknown += other.unknown;
		self.invalid += other.invalid;
	}
}

/// Apply one update to the external layer
pub fn apply_update(values: &Values, update: &SettingUpdate) -> ClResult<bool> {
	values.apply_external_update(update.key.as_str(), update.value.as_deref())
}

/// Replace the whole external layer with `updates`
pub fn apply_snapshot(values: &Values, updates: &[SettingUpdate]) -> FeedStats {
	let mut stats = FeedStats::default();
	let mut seen = HashSet::with_capacity(updates.len());
	for update in updates {
		seen.insert(update.key.as_str());
		stats.record(&update.key, apply_update(values, update));
	}

	let stale: Vec<InternalKey> =
		values.registry().keys().filter(|key| !seen.contains(key.as_str())).cloned().collect();
	for key in stale {
		// Clearing an absent layer is not an update
		match values.layers(key.as_str()) {
			Ok(layers) if layers.external.is_none() => continue,
			Ok(_) => stats.record(&key, values.clear_external(key.as_str())),
			Err(err) => stats.record(&key, Err(err)),
		}
	}
	stats
}

/// Consume feed messages until the channel closes
pub async fn run_feed(values: Values, rx: flume::Receiver<FeedMessage>) -> FeedStats {
	info!("Settings feed listener started");
	let mut stats = FeedStats::default();

	while let Ok(msg) = rx.recv_async().await {
		match msg {
			FeedMessage::Update(update) => {
				let result = apply_update(&values, &update);
				stats.record(&update.key, result);
			}
			FeedMessage::Snapshot(updates) => {
				let snapshot = apply_snapshot(&values, &updates);
				debug!(
					rows = updates.len(),
					changed = snapshot.changed,
					"Applied settings snapshot"
				);
				stats.merge(snapshot);
			}
		}
	}

	info!(
		applied = stats.applied,
		changed = stats.changed,
		unknown = stats.unknown,
		invalid = stats.invalid,
		"Settings feed closed"
	);
	stats
}


// vim: ts=4
