//! Error types for the cluster settings subsystem.
//!
//! Errors fall in two groups. Programming errors (duplicate registration,
//! malformed definitions, redaction violations, a dead dispatcher) are fatal:
//! they only surface during startup or signal a broken invariant, and callers
//! are expected to abort initialization. Everything else is recoverable and
//! is returned to the immediate caller (usually a SET statement).

use std::fmt;

pub type ClResult<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
	/// A key or name was registered twice
	DuplicateSetting(String),
	/// A setting definition is malformed
	ConfigError(String),
	/// Unknown setting name or key
	NotFound(String),
	/// A value failed to decode or validate
	Validation {
		/// Display name (or key) of the setting
		setting: String,
		/// Single-letter type tag of the setting
		typ: &'static str,
		/// The offending raw value
		raw: String,
		/// Why the value was rejected
		reason: String,
		/// Optional user-facing hint attached by the statement layer
		hint: Option<String>,
	},
	/// The calling tenant may not access the setting this way
	PermissionDenied(String),
	/// A non-reportable value escaped the reporting view
	RedactionViolation(String),
	/// Internal failure (dispatcher unavailable, misuse of the API)
	Internal(String),
}

impl Error {
	/// Whether the error belongs to the fatal (programming error) class
	pub fn is_fatal(&self) -> bool {
		matches!(
			self,
			Error::DuplicateSetting(_)
				| Error::ConfigError(_)
				| Error::RedactionViolation(_)
				| Error::Internal(_)
		)
	}

	/// Attach a hint to a validation error. Other variants are returned as-is.
	pub fn with_hint(self, new_hint: impl Into<String>) -> Self {
		match self {
			Error::Validation { setting, typ, raw, reason, .. } => {
				Error::Validation { setting, typ, raw, reason, hint: Some(new_hint.into()) }
			}
			other => other,
		}
	}
}

impl fmt::Display for Error {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Error::DuplicateSetting(what) => write!(f, "setting registered twice: {}", what),
			Error::ConfigError(msg) => write!(f, "invalid setting definition: {}", msg),
			Error::NotFound(name) => write!(f, "unknown cluster setting: {}", name),
			Error::Validation { setting, typ, raw, reason, hint } => {
				write!(
					f,
					"invalid value {:?} for setting {} (type {}): {}",
					raw, setting, typ, reason
				)?;
				if let Some(hint) = hint {
					write!(f, " (hint: {})", hint)?;
				}
				Ok(())
			}
			Error::PermissionDenied(msg) => write!(f, "permission denied: {}", msg),
			Error::RedactionViolation(key) => {
				write!(f, "non-reportable setting {} escaped redaction", key)
			}
			Error::Internal(msg) => write!(f, "internal error: {}", msg),
		}
	}
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_fatal_classification() {
		assert!(Error::DuplicateSetting("a".into()).is_fatal());
		assert!(Error::ConfigError("a".into()).is_fatal());
		assert!(Error::RedactionViolation("a".into()).is_fatal());
		assert!(!Error::NotFound("a".into()).is_fatal());
		assert!(!Error::PermissionDenied("a".into()).is_fatal());
	}

	#[test]
	fn test_validation_display_with_hint() {
		let err = Error::Validation {
			setting: "kv.rate".into(),
			typ: "z",
			raw: "lots".into(),
			reason: "not a byte size".into(),
			hint: None,
		}
		.with_hint("use a value like 32MiB");

		let msg = err.to_string();
		assert!(msg.contains("\"lots\""));
		assert!(msg.contains("type z"));
		assert!(msg.ends_with("(hint: use a value like 32MiB)"));
	}

	#[test]
	fn test_with_hint_ignores_other_variants() {
		let err = Error::NotFound("x".into()).with_hint("ignored");
		assert_eq!(err, Error::NotFound("x".into()));
	}
}

// vim: ts=4
