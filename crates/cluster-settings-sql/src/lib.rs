//! Statement layer for cluster settings.
//!
//! Executes already-parsed `SET CLUSTER SETTING`, `RESET CLUSTER SETTING`,
//! `SHOW CLUSTER SETTING` and `SHOW ALL CLUSTER SETTINGS` statements against
//! a values store, enforcing the multi-tenant class rules for the calling
//! tenant.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod prelude;
pub mod statement;

pub use statement::{SetValue, SettingRow, Statement, StatementExecutor, StatementOutput};

// vim: ts=4
