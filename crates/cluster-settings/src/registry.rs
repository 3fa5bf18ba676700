//! Descriptor registry
//!
//! [`SettingsRegistry`] collects definitions during startup. Freezing it
//! yields a [`FrozenSettingsRegistry`] that is shared read-only by every
//! values store. There is no global registry: the frozen registry is passed
//! around explicitly as `Arc<FrozenSettingsRegistry>`.

use std::collections::HashMap;
use std::sync::Arc;

use crate::definition::SettingDefinition;
use crate::prelude::*;
use crate::reporting::MaskedSetting;

/// How a display name resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameStatus {
	/// The current name of the setting
	Active,
	/// A previous name that still resolves to the setting
	Retired,
}

/// Mutable registry used during startup
#[derive(Debug, Default)]
pub struct SettingsRegistry {
	definitions: HashMap<InternalKey, Arc<SettingDefinition>>,
	names: HashMap<SettingName, (InternalKey, NameStatus)>,
}

impl SettingsRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Register a new setting definition
	///
	/// Fails with [`Error::DuplicateSetting`] when the key, the name or one of
	/// the retired names is already taken. This is a programming error;
	/// startup code propagates it and aborts.
	pub fn register(&mut self, def: SettingDefinition) -> ClResult<Arc<SettingDefinition>> {
		if let Some(existing) = self.definitions.get(&def.key) {
			error!(
				"Setting key '{}' registered twice (names '{}' and '{}')",
				def.key, existing.name, def.name
			);
			return Err(Error::DuplicateSetting(format!("key '{}'", def.key)));
		}

		let mut new_names = vec![(def.name.clone(), NameStatus::Active)];
		new_names.extend(def.retired_names.iter().map(|n| (n.clone(), NameStatus::Retired)));
		for (i, (name, _)) in new_names.iter().enumerate() {
			if new_names[..i].iter().any(|(seen, _)| seen == name) {
				error!("Setting '{}' lists name '{}' more than once", def.key, name);
				return Err(Error::DuplicateSetting(format!("name '{}'", name)));
			}
			if let Some((owner, _)) = self.names.get(name) {
				error!("Setting name '{}' of '{}' is already used by '{}'", name, def.key, owner);
				return Err(Error::DuplicateSetting(format!("name '{}'", name)));
			}
			// A display name may not shadow the key of a different setting
			if name.as_str() != def.key.as_str() && self.definitions.contains_key(name.as_str()) {
				error!("Setting name '{}' of '{}' collides with a setting key", name, def.key);
				return Err(Error::DuplicateSetting(format!("name '{}'", name)));
			}
		}
		if let Some((owner, _)) = self.names.get(def.key.as_str()) {
			if owner != &def.key {
				error!("Setting key '{}' collides with the name of '{}'", def.key, owner);
				return Err(Error::DuplicateSetting(format!("key '{}'", def.key)));
			}
		}

		debug!("Registering setting: {} ({})", def.key, def.kind.typ());
		let def = Arc::new(def);
		for (name, status) in new_names {
			self.names.insert(name, (def.key.clone(), status));
		}
		self.definitions.insert(def.key.clone(), def.clone());
		Ok(def)
	}

	/// Freeze the registry (make it immutable)
	pub fn freeze(self) -> FrozenSettingsRegistry {
		info!("Freezing settings registry with {} definitions", self.definitions.len());
		let mut ordered: Vec<Arc<SettingDefinition>> = self.definitions.values().cloned().collect();
		ordered.sort_by(|a, b| a.name.cmp(&b.name));
		FrozenSettingsRegistry { definitions: self.definitions, names: self.names, ordered }
	}

	/// Get number of registered settings
	pub fn len(&self) -> usize {
		self.definitions.len()
	}

	/// Check if registry is empty
	pub fn is_empty(&self) -> bool {
		self.definitions.is_empty()
	}
}

/// Immutable registry shared by all values stores
#[derive(Debug)]
pub struct FrozenSettingsRegistry {
	definitions: HashMap<InternalKey, Arc<SettingDefinition>>,
	names: HashMap<SettingName, (InternalKey, NameStatus)>,
	ordered: Vec<Arc<SettingDefinition>>,
}

impl FrozenSettingsRegistry {
	/// Get a setting definition by key, if registered
	pub fn get(&self, key: &str) -> Option<&Arc<SettingDefinition>> {
		self.definitions.get(key)
	}

	pub fn lookup_by_key(&self, key: &str) -> ClResult<&Arc<SettingDefinition>> {
		self.definitions.get(key).ok_or_else(|| Error::NotFound(key.to_string()))
	}

	/// Look up by display name (current or retired)
	pub fn lookup_by_name(&self, name: &str) -> ClResult<&Arc<SettingDefinition>> {
		self.resolve_name(name).map(|(def, _)| def)
	}

	/// Look up by display name and report whether a retired name was used
	pub fn resolve_name(&self, name: &str) -> ClResult<(&Arc<SettingDefinition>, NameStatus)> {
		let (key, status) = self.names.get(name).ok_or_else(|| Error::NotFound(name.to_string()))?;
		let def = self.definitions.get(key).ok_or_else(|| {
			Error::Internal(format!("name '{}' points at unregistered key '{}'", name, key))
		})?;
		Ok((def, *status))
	}

	/// Look up a setting for use in externally shared reports
	///
	/// The returned view hides the value of non-reportable settings.
	pub fn lookup_for_reporting_by_key(&self, key: &str) -> ClResult<MaskedSetting> {
		self.lookup_by_key(key).map(|def| MaskedSetting::new(def.clone()))
	}

	/// List all registered settings, ordered by name
	pub fn list(&self) -> impl Iterator<Item = &Arc<SettingDefinition>> {
		self.ordered.iter()
	}

	/// All registered keys, in name order
	pub fn keys(&self) -> impl Iterator<Item = &InternalKey> {
		self.ordered.iter().map(|def| &def.key)
	}

	/// Get number of registered settings
	pub fn len(&self) -> usize {
		self.definitions.len()
	}

	/// Check if registry is empty
	pub fn is_empty(&self) -> bool {
		self.definitions.is_empty()
	}
}


// vim: ts=4
