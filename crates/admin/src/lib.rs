//! Client for the ProxySQL admin interface.
//!
//! `proxyconf_admin` executes the plans computed by `proxyconf_core`
//! against a live ProxySQL instance:
//!
//! - [`config`] -- connection options, with defaults matching a stock
//!   install and an optional TOML credentials file.
//! - [`conn`] -- one short-lived MySQL-protocol session ([`AdminConn`]),
//!   including decoding of the admin's all-text result rows.
//! - [`sql`] -- text-protocol statement rendering (the admin interface
//!   cannot service binary prepared statements) and column parsing.
//! - [`apply`] -- the reconciliation engine: fetch, plan, execute, then
//!   `SAVE ... TO DISK` / `LOAD ... TO RUNTIME` when something changed.

pub mod apply;
pub mod config;
pub mod conn;
pub mod error;
pub mod sql;

pub use apply::{apply, commit, ApplyOpts, ApplyReport};
pub use config::AdminOpts;
pub use conn::AdminConn;
pub use error::{Error, Result};
