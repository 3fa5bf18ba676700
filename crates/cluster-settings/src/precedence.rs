//! Layer precedence
//!
//! Every setting in a values store has two optional layers: `explicit`
//! (SET CLUSTER SETTING on this instance) and `external` (propagated from
//! the host cluster). The external layer always wins, regardless of the
//! order in which the layers were written; without either layer the
//! definition's default applies.

use crate::definition::SettingDefinition;
use crate::kind::SettingValue;
use crate::prelude::*;

/// A decoded value together with its canonical encoding
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
	encoded: String,
	value: SettingValue,
}

impl Layer {
	pub fn new(value: SettingValue) -> Self {
		Self { encoded: value.encode(), value }
	}

	pub fn encoded(&self) -> &str {
		&self.encoded
	}

	pub fn value(&self) -> &SettingValue {
		&self.value
	}
}

/// Which layers are present
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerState {
	Unset,
	ExplicitOnly,
	ExternalOnly,
	Both,
}

/// A single mutation of a setting's layers
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
	SetExplicit(Layer),
	ClearExplicit,
	SetExternal(Layer),
	ClearExternal,
}

impl Transition {
	pub fn name(&self) -> &'static str {
		match self {
			Transition::SetExplicit(_) => "set-explicit",
			Transition::ClearExplicit => "clear-explicit",
			Transition::SetExternal(_) => "set-external",
			Transition::ClearExternal => "clear-external",
		}
	}
}

/// The explicit and external layers of one setting
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Layers {
	pub explicit: Option<Layer>,
	pub external: Option<Layer>,
}

/// The value in effect and where it came from
#[derive(Debug, Clone, Copy)]
pub struct Resolved<'a> {
	pub value: &'a SettingValue,
	pub encoded: &'a str,
	pub origin: ValueOrigin,
}

impl Layers {
	pub fn state(&self) -> LayerState {
		match (&self.explicit, &self.external) {
			(None, None) => LayerState::Unset,
			(Some(_), None) => LayerState::ExplicitOnly,
			(None, Some(_)) => LayerState::ExternalOnly,
			(Some(_), Some(_)) => LayerState::Both,
		}
	}

	pub fn apply(&mut self, transition: Transition) {
		match transition {
			Transition::SetExplicit(layer) => self.explicit = Some(layer),
			Transition::ClearExplicit => self.explicit = None,
			Transition::SetExternal(layer) => self.external = Some(layer),
			Transition::ClearExternal => self.external = None,
		}
	}

	/// Resolve the effective value: external, then explicit, then default
	pub fn resolve<'a>(&'a self, def: &'a SettingDefinition) -> Resolved<'a> {
		if let Some(layer) = &self.external {
			return Resolved {
				value: &layer.value,
				encoded: &layer.encoded,
				origin: ValueOrigin::ExternallySet,
			};
		}
		if let Some(layer) = &self.explicit {
			return Resolved {
				value: &layer.value,
				encoded: &layer.encoded,
				origin: ValueOrigin::ExplicitlySet,
			};
		}
		Resolved { value: &def.default, encoded: &def.encoded_default, origin: ValueOrigin::Default }
	}
}


// vim: ts=4
