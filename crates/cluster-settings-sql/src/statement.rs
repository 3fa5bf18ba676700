//! Cluster setting statements
//!
//! Input is an already-parsed [`Statement`]. The executor resolves display
//! names (including retired ones), applies the class gate for the calling
//! tenant and forwards to the explicit layer of the values store.

use serde::Serialize;
use std::sync::Arc;

use cluster_settings::registry::NameStatus;
use cluster_settings::{SettingDefinition, Values};

use crate::prelude::*;

/// Right-hand side of `SET CLUSTER SETTING`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetValue {
	Literal(String),
	/// `= DEFAULT`, same as RESET
	Default,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
	Set { name: String, value: SetValue },
	Reset { name: String },
	Show { name: String },
	ShowAll { include_reserved: bool },
}

/// One row of SHOW output
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SettingRow {
	pub variable: SettingName,
	pub value: String,
	pub setting_type: &'static str,
	pub origin: ValueOrigin,
	pub public: bool,
	pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatementOutput {
	pub rows: Vec<SettingRow>,
	pub notices: Vec<String>,
}

/// Executes statements on behalf of one tenant
#[derive(Debug, Clone)]
pub struct StatementExecutor {
	values: Values,
	tenant: TenantKind,
}

impl StatementExecutor {
	pub fn new(values: Values, tenant: TenantKind) -> Self {
		Self { values, tenant }
	}

	pub fn tenant(&self) -> TenantKind {
		self.tenant
	}

	pub fn execute(&self, statement: &Statement) -> ClResult<StatementOutput> {
		match statement {
			Statement::Set { name, value } => self.set(name, value),
			Statement::Reset { name } => self.reset(name),
			Statement::Show { name } => {
				let (def, notices) = self.resolve(name)?;
				Ok(StatementOutput { rows: vec![self.row(&def)], notices })
			}
			Statement::ShowAll { include_reserved } => {
				Ok(StatementOutput { rows: self.show_all(*include_reserved), notices: Vec::new() })
			}
		}
	}

	/// Resolve a display name for this tenant
	///
	/// Settings the tenant cannot see are reported as unknown.
	fn resolve(&self, name: &str) -> ClResult<(Arc<SettingDefinition>, Vec<String>)> {
		let (def, status) = self.values.registry().resolve_name(name)?;
		if !def.class().is_visible_to(self.tenant) {
			debug!(setting = name, tenant = ?self.tenant, "Setting hidden from tenant");
			return Err(Error::NotFound(name.to_string()));
		}

		let mut notices = Vec::new();
		if status == NameStatus::Retired {
			notices.push(format!("setting {} has been renamed to {}", name, def.name()));
		}
		Ok((def.clone(), notices))
	}

	fn check_writable(&self, def: &SettingDefinition) -> ClResult<()> {
		if def.class().is_writable_by(self.tenant) {
			Ok(())
		} else {
			warn!(setting = %def.name(), tenant = ?self.tenant, "Rejected write to read-only setting");
			Err(Error::PermissionDenied(format!(
				"setting {} is only settable by the operator",
				def.name()
			)))
		}
	}

	pub fn set(&self, name: &str, value: &SetValue) -> ClResult<StatementOutput> {
		let raw = match value {
			SetValue::Literal(raw) => raw,
			SetValue::Default => return self.reset(name),
		};

		let (def, notices) = self.resolve(name)?;
		self.check_writable(&def)?;
		let key = def.internal_key().as_str();

		def.decode_to_string(raw).map_err(|err| annotate(&def, err))?;
		let changed = self.values.set_explicit(key, raw).map_err(|err| annotate(&def, err))?;

		info!(setting = %def.name(), changed, "Cluster setting updated");
		Ok(StatementOutput { rows: Vec::new(), notices })
	}

	pub fn reset(&self, name: &str) -> ClResult<StatementOutput> {
		let (def, notices) = self.resolve(name)?;
		self.check_writable(&def)?;

		let changed = self.values.clear_explicit(def.internal_key().as_str())?;
		info!(setting = %def.name(), changed, "Cluster setting reset");
		Ok(StatementOutput { rows: Vec::new(), notices })
	}

	pub fn show(&self, name: &str) -> ClResult<SettingRow> {
		let (def, _) = self.resolve(name)?;
		Ok(self.row(&def))
	}

	/// All settings visible to the tenant, ordered by name
	pub fn show_all(&self, include_reserved: bool) -> Vec<SettingRow> {
		self.values
			.registry()
			.list()
			.filter(|def| def.class().is_visible_to(self.tenant))
			.filter(|def| include_reserved || def.visibility() == Visibility::Public)
			.map(|def| self.row(def))
			.collect()
	}

	fn row(&self, def: &SettingDefinition) -> SettingRow {
		SettingRow {
			variable: def.name().clone(),
			value: def.string(&self.values),
			setting_type: def.typ(),
			origin: def.value_origin(&self.values),
			public: def.visibility() == Visibility::Public,
			description: def.description().to_string(),
		}
	}
}

fn annotate(def: &SettingDefinition, err: Error) -> Error {
	match def.error_hint() {
		Some(hint) => err.with_hint(hint),
		None => err,
	}
}


// vim: ts=4
