//! Shared types for the cluster settings subsystem.
//!
//! This crate holds the identifiers, multi-tenant classes, value origins and
//! the error type used by the registry/store crate and the statement layer.
//! Keeping them separate lets the statement layer and external collaborators
//! (propagation feed, telemetry) depend on the vocabulary without pulling in
//! the store itself.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod error;
pub mod prelude;
pub mod types;

pub use error::{ClResult, Error};
pub use types::{Class, InternalKey, SettingName, TenantKind, ValueOrigin, Visibility};

// vim: ts=4
