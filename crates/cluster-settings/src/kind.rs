//! Setting kinds and values
//!
//! The set of kinds is closed. Everything that differs between kinds
//! (decoding user input, the canonical stored encoding, and the display
//! rendering) lives here; the rest of the subsystem is kind-agnostic.

use serde::Serialize;
use std::time::Duration;

use crate::codec;

/// A decoded setting value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SettingValue {
	Bool(bool),
	Int(i64),
	Float(f64),
	String(String),
	Duration(Duration),
	/// Ordinal of an enumeration choice
	Enum(i64),
	/// Size in bytes
	ByteSize(u64),
}

impl SettingValue {
	/// Canonical encoding, as stored in the settings table
	pub fn encode(&self) -> String {
		match self {
			SettingValue::Bool(b) => b.to_string(),
			SettingValue::Int(i) | SettingValue::Enum(i) => i.to_string(),
			SettingValue::Float(f) => f.to_string(),
			SettingValue::String(s) => s.clone(),
			SettingValue::Duration(d) => codec::format_duration(*d),
			SettingValue::ByteSize(n) => n.to_string(),
		}
	}

	/// Get the type name for error messages
	pub fn type_name(&self) -> &'static str {
		match self {
			SettingValue::Bool(_) => "bool",
			SettingValue::Int(_) => "int",
			SettingValue::Float(_) => "float",
			SettingValue::String(_) => "string",
			SettingValue::Duration(_) => "duration",
			SettingValue::Enum(_) => "enumeration",
			SettingValue::ByteSize(_) => "byte size",
		}
	}
}

/// Choices of an enumeration setting: ordinal and lowercase name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumChoices {
	choices: Vec<(i64, Box<str>)>,
}

impl EnumChoices {
	pub fn new<I, S>(choices: I) -> Self
	where
		I: IntoIterator<Item = (i64, S)>,
		S: Into<Box<str>>,
	{
		Self { choices: choices.into_iter().map(|(ord, name)| (ord, name.into())).collect() }
	}

	pub fn name_of(&self, ordinal: i64) -> Option<&str> {
		self.choices.iter().find(|(ord, _)| *ord == ordinal).map(|(_, name)| name.as_ref())
	}

	pub fn ordinal_of(&self, name: &str) -> Option<i64> {
		self.choices.iter().find(|(_, n)| n.eq_ignore_ascii_case(name)).map(|(ord, _)| *ord)
	}

	pub fn iter(&self) -> impl Iterator<Item = (i64, &str)> {
		self.choices.iter().map(|(ord, name)| (*ord, name.as_ref()))
	}

	/// `[off = 0, auto = 1, on = 2]`
	pub fn describe(&self) -> String {
		let parts: Vec<String> =
			self.choices.iter().map(|(ord, name)| format!("{} = {}", name, ord)).collect();
		format!("[{}]", parts.join(", "))
	}

	/// Check that the choice list is usable
	pub(crate) fn check(&self) -> Result<(), String> {
		if self.choices.is_empty() {
			return Err("enumeration has no choices".into());
		}
		for (i, (ord, name)) in self.choices.iter().enumerate() {
			if name.is_empty() {
				return Err(format!("enumeration choice {} has an empty name", ord));
			}
			for (other_ord, other_name) in &self.choices[i + 1..] {
				if other_ord == ord {
					return Err(format!("enumeration ordinal {} is used twice", ord));
				}
				if other_name.eq_ignore_ascii_case(name) {
					return Err(format!("enumeration choice {:?} is used twice", name));
				}
			}
		}
		Ok(())
	}
}

/// Kind (type) of a setting
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingKind {
	Bool,
	Int,
	Float,
	String,
	Duration,
	Enum(EnumChoices),
	ByteSize,
}

impl SettingKind {
	/// Short type tag consumed by catalog views. Never change it for an
	/// existing kind.
	pub fn typ(&self) -> &'static str {
		match self {
			SettingKind::Bool => "b",
			SettingKind::Int => "i",
			SettingKind::Float => "f",
			SettingKind::String => "s",
			SettingKind::Duration => "d",
			SettingKind::Enum(_) => "e",
			SettingKind::ByteSize => "z",
		}
	}

	pub fn type_name(&self) -> &'static str {
		match self {
			SettingKind::Bool => "bool",
			SettingKind::Int => "int",
			SettingKind::Float => "float",
			SettingKind::String => "string",
			SettingKind::Duration => "duration",
			SettingKind::Enum(_) => "enumeration",
			SettingKind::ByteSize => "byte size",
		}
	}

	/// Whether a value belongs to this kind
	pub fn matches(&self, value: &SettingValue) -> bool {
		matches!(
			(self, value),
			(SettingKind::Bool, SettingValue::Bool(_))
				| (SettingKind::Int, SettingValue::Int(_))
				| (SettingKind::Float, SettingValue::Float(_))
				| (SettingKind::String, SettingValue::String(_))
				| (SettingKind::Duration, SettingValue::Duration(_))
				| (SettingKind::Enum(_), SettingValue::Enum(_))
				| (SettingKind::ByteSize, SettingValue::ByteSize(_))
		)
	}

	/// Decode user input or a stored encoding
	///
	/// Both forms are accepted; the result re-encodes canonically through
	/// [`SettingValue::encode`].
	pub fn decode(&self, raw: &str) -> Result<SettingValue, String> {
		match self {
			SettingKind::Bool => match raw.trim().to_ascii_lowercase().as_str() {
				"true" | "t" | "1" => Ok(SettingValue::Bool(true)),
				"false" | "f" | "0" => Ok(SettingValue::Bool(false)),
				_ => Err("expected true or false".into()),
			},
			SettingKind::Int => raw
				.trim()
				.parse::<i64>()
				.map(SettingValue::Int)
				.map_err(|e| format!("expected an integer: {}", e)),
			SettingKind::Float => {
				let f = raw
					.trim()
					.parse::<f64>()
					.map_err(|e| format!("expected a number: {}", e))?;
				if !f.is_finite() {
					return Err("value must be finite".into());
				}
				Ok(SettingValue::Float(f))
			}
			SettingKind::String => Ok(SettingValue::String(raw.to_string())),
			SettingKind::Duration => codec::parse_duration(raw).map(SettingValue::Duration),
			SettingKind::Enum(choices) => {
				let raw = raw.trim();
				let ordinal = match raw.parse::<i64>() {
					Ok(ord) => choices.name_of(ord).map(|_| ord),
					Err(_) => choices.ordinal_of(raw),
				};
				ordinal
					.map(SettingValue::Enum)
					.ok_or_else(|| format!("expected one of {}", choices.describe()))
			}
			SettingKind::ByteSize => codec::parse_bytes(raw).map(SettingValue::ByteSize),
		}
	}

	/// Human-readable rendering used by SHOW
	pub fn render(&self, value: &SettingValue) -> String {
		match (self, value) {
			(SettingKind::Enum(choices), SettingValue::Enum(ord)) => {
				choices.name_of(*ord).map_or_else(|| ord.to_string(), str::to_string)
			}
			(_, SettingValue::ByteSize(n)) => codec::format_bytes(*n),
			(_, other) => other.encode(),
		}
	}
}


// vim: ts=4
