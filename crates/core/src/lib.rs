//! Domain model for ProxySQL Galera hostgroup management.
//!
//! `proxyconf_core` models one row of ProxySQL's `mysql_galera_hostgroups`
//! admin table -- the mapping from a writer hostgroup to its paired backup
//! writer, reader, and offline hostgroups -- and decides, without any I/O,
//! what has to happen to converge the table on a declared state.
//!
//! The crate has two halves:
//!
//! 1. [`hostgroup`] -- the typed row ([`GaleraHostgroup`]), the closed set of
//!    values ProxySQL accepts for `writer_is_also_reader`
//!    ([`WriterIsAlsoReader`]), and input validation.
//! 2. [`plan`] -- the idempotent reconciliation step: given a target
//!    [`State`] and the row currently in the table (if any), [`plan()`]
//!    returns the minimal [`Plan`] (create, update changed columns, delete,
//!    or nothing).
//!
//! Executing a plan against a live admin interface lives in
//! `proxyconf_admin`; this crate stays pure so reconciliation is testable
//! without a server.
//!
//! # Entry point
//!
//! ```rust
//! use proxyconf_core::{plan, GaleraHostgroup, Plan, State};
//!
//! let desired = GaleraHostgroup::new(10, 11, 20, 30);
//! assert_eq!(plan(State::Present, &desired, None), Plan::Create);
//! assert_eq!(plan(State::Present, &desired, Some(&desired)), Plan::Unchanged);
//! ```
//!
//! # Crate features
//!
//! - **`serde`** -- `Serialize`/`Deserialize` derives on the row and plan
//!   types.
//! - **`schemars`** -- `JsonSchema` derives (implies `serde`), used by the
//!   CLI's `schema` subcommand.

pub mod hostgroup;
pub mod plan;

pub use hostgroup::{Column, GaleraHostgroup, ValidationError, WriterIsAlsoReader};
pub use plan::{plan, FieldChange, Plan, State};
