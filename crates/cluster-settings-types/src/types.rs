//! Identifiers and classification enums shared by all settings crates.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

macro_rules! string_id {
	($(#[$meta:meta])* $name:ident) => {
		$(#[$meta])*
		#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
		#[serde(transparent)]
		pub struct $name(Box<str>);

		impl $name {
			pub fn new(id: impl Into<Box<str>>) -> Self {
				Self(id.into())
			}

			pub fn as_str(&self) -> &str {
				&self.0
			}
		}

		impl fmt::Display for $name {
			fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				f.write_str(&self.0)
			}
		}

		impl Borrow<str> for $name {
			fn borrow(&self) -> &str {
				&self.0
			}
		}

		impl AsRef<str> for $name {
			fn as_ref(&self) -> &str {
				&self.0
			}
		}

		impl From<&str> for $name {
			fn from(id: &str) -> Self {
				Self(id.into())
			}
		}

		impl From<String> for $name {
			fn from(id: String) -> Self {
				Self(id.into_boxed_str())
			}
		}
	};
}

string_id!(
	/// User-visible name of a setting.
	///
	/// Used by SET/SHOW CLUSTER SETTING and in error messages. For storage and
	/// propagation use [`InternalKey`].
	SettingName
);

string_id!(
	/// Storage key of a setting.
	///
	/// Used by the settings table and its change feed. It never changes once
	/// a setting is released, even when the display name does.
	InternalKey
);

/// Which kind of tenant is executing a statement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TenantKind {
	/// The system tenant of a single-tenant or host cluster
	#[serde(rename = "system")]
	System,
	/// Any other (virtual) tenant
	#[serde(rename = "secondary")]
	Secondary,
}

/// Multi-tenant scope of a setting
///
/// All settings can be used by the system tenant; the class restricts what
/// secondary tenants may do with them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Class {
	/// Only exists for the system tenant
	#[serde(rename = "system-only")]
	SystemOnly,
	/// Visible to secondary tenants, but only settable by the host cluster
	#[serde(rename = "tenant-ro")]
	TenantReadOnly,
	/// Visible to and settable by secondary tenants. The host cluster may
	/// still override the value.
	#[serde(rename = "tenant-rw")]
	TenantWritable,
}

impl Class {
	pub fn as_str(&self) -> &'static str {
		match self {
			Class::SystemOnly => "system-only",
			Class::TenantReadOnly => "tenant-ro",
			Class::TenantWritable => "tenant-rw",
		}
	}

	/// Whether the tenant may observe settings of this class at all
	pub fn is_visible_to(&self, tenant: TenantKind) -> bool {
		match (self, tenant) {
			(_, TenantKind::System) => true,
			(Class::SystemOnly, TenantKind::Secondary) => false,
			(Class::TenantReadOnly | Class::TenantWritable, TenantKind::Secondary) => true,
		}
	}

	/// Whether the tenant may set or reset the explicit value
	pub fn is_writable_by(&self, tenant: TenantKind) -> bool {
		match (self, tenant) {
			(_, TenantKind::System) => true,
			(Class::TenantWritable, TenantKind::Secondary) => true,
			(Class::SystemOnly | Class::TenantReadOnly, TenantKind::Secondary) => false,
		}
	}
}

impl fmt::Display for Class {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Documentation status of a setting. Has no security implications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Visibility {
	/// Undocumented; customize at your own risk
	#[default]
	#[serde(rename = "reserved")]
	Reserved,
	/// Documented and supported
	#[serde(rename = "public")]
	Public,
}

/// Which layer produced the value currently in effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueOrigin {
	/// The in-code default
	#[serde(rename = "default")]
	Default,
	/// Set locally (SET CLUSTER SETTING)
	#[serde(rename = "override")]
	ExplicitlySet,
	/// Propagated from the host cluster
	#[serde(rename = "external-override")]
	ExternallySet,
}

impl ValueOrigin {
	pub fn as_str(&self) -> &'static str {
		match self {
			ValueOrigin::Default => "default",
			ValueOrigin::ExplicitlySet => "override",
			ValueOrigin::ExternallySet => "external-override",
		}
	}
}

impl fmt::Display for ValueOrigin {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}


// vim: ts=4
