//! Common validators for setting definitions

use std::time::Duration;

use crate::codec;
use crate::kind::SettingValue;

fn unexpected(value: &SettingValue, expected: &str) -> String {
	format!("expected {}, got {}", expected, value.type_name())
}

pub fn non_negative_int(value: &SettingValue) -> Result<(), String> {
	match value {
		SettingValue::Int(i) if *i >= 0 => Ok(()),
		SettingValue::Int(_) => Err("cannot be set to a negative value".into()),
		other => Err(unexpected(other, "int")),
	}
}

pub fn positive_int(value: &SettingValue) -> Result<(), String> {
	match value {
		SettingValue::Int(i) if *i > 0 => Ok(()),
		SettingValue::Int(_) => Err("must be positive".into()),
		other => Err(unexpected(other, "int")),
	}
}

pub fn int_in_range(min: i64, max: i64) -> impl Fn(&SettingValue) -> Result<(), String> + Send + Sync {
	move |value| match value {
		SettingValue::Int(i) if (min..=max).contains(i) => Ok(()),
		SettingValue::Int(_) => Err(format!("must be between {} and {}", min, max)),
		other => Err(unexpected(other, "int")),
	}
}

pub fn non_negative_float(value: &SettingValue) -> Result<(), String> {
	match value {
		SettingValue::Float(f) if *f >= 0.0 => Ok(()),
		SettingValue::Float(_) => Err("cannot be set to a negative value".into()),
		other => Err(unexpected(other, "float")),
	}
}

/// Float between 0 and 1 inclusive
pub fn fraction(value: &SettingValue) -> Result<(), String> {
	match value {
		SettingValue::Float(f) if (0.0..=1.0).contains(f) => Ok(()),
		SettingValue::Float(_) => Err("must be between 0 and 1".into()),
		other => Err(unexpected(other, "float")),
	}
}

pub fn positive_duration(value: &SettingValue) -> Result<(), String> {
	match value {
		SettingValue::Duration(d) if !d.is_zero() => Ok(()),
		SettingValue::Duration(_) => Err("must be positive".into()),
		other => Err(unexpected(other, "duration")),
	}
}

pub fn duration_with_minimum(
	min: Duration,
) -> impl Fn(&SettingValue) -> Result<(), String> + Send + Sync {
	move |value| match value {
		SettingValue::Duration(d) if *d >= min => Ok(()),
		SettingValue::Duration(_) => {
			Err(format!("cannot be set to a value smaller than {}", codec::format_duration(min)))
		}
		other => Err(unexpected(other, "duration")),
	}
}

pub fn byte_size_with_minimum(min: u64) -> impl Fn(&SettingValue) -> Result<(), String> + Send + Sync {
	move |value| match value {
		SettingValue::ByteSize(n) if *n >= min => Ok(()),
		SettingValue::ByteSize(_) => {
			Err(format!("cannot be set to a value smaller than {}", codec::format_bytes(min)))
		}
		other => Err(unexpected(other, "byte size")),
	}
}


// vim: ts=4
