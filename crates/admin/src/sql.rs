//! Statement rendering and value parsing for the admin text protocol.
//!
//! The ProxySQL admin interface speaks the MySQL wire protocol but cannot
//! service binary prepared statements, so every statement is rendered as
//! text here and executed unprepared. String values go through
//! [`quote_literal`]; everything else in the table is numeric.
//!
//! The reverse direction is just as quirky: the admin interface returns
//! every column as text (the backing store is SQLite), so the parse helpers
//! here turn column strings back into the typed row.

use proxyconf_core::{Column, FieldChange, GaleraHostgroup, WriterIsAlsoReader};

use crate::error::{Error, Result};

/// Persist the in-memory servers config (Galera hostgroups included) to disk.
pub const SAVE_SERVERS_TO_DISK: &str = "SAVE MYSQL SERVERS TO DISK";

/// Activate the in-memory servers config on the running proxy.
pub const LOAD_SERVERS_TO_RUNTIME: &str = "LOAD MYSQL SERVERS TO RUNTIME";

/// Quote a string for inclusion in an admin statement.
///
/// MySQL-style escaping: backslashes and single quotes are
/// backslash-escaped, and the result is wrapped in single quotes.
#[must_use]
pub fn quote_literal(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('\'');
    for ch in value.chars() {
        match ch {
            '\'' => quoted.push_str("\\'"),
            '\\' => quoted.push_str("\\\\"),
            _ => quoted.push(ch),
        }
    }
    quoted.push('\'');
    quoted
}

fn render_value(column: Column, wire: &str) -> String {
    if column.is_text() {
        quote_literal(wire)
    } else {
        wire.to_owned()
    }
}

#[must_use]
pub fn select_galera_hostgroup(writer_hostgroup: u32) -> String {
    format!(
        "SELECT writer_hostgroup, backup_writer_hostgroup, reader_hostgroup, \
         offline_hostgroup, active, max_writers, writer_is_also_reader, \
         max_transactions_behind, comment \
         FROM mysql_galera_hostgroups WHERE writer_hostgroup = {writer_hostgroup}"
    )
}

#[must_use]
pub fn select_all_galera_hostgroups() -> String {
    "SELECT writer_hostgroup, backup_writer_hostgroup, reader_hostgroup, \
     offline_hostgroup, active, max_writers, writer_is_also_reader, \
     max_transactions_behind, comment \
     FROM mysql_galera_hostgroups ORDER BY writer_hostgroup"
        .to_owned()
}

#[must_use]
pub fn insert_galera_hostgroup(row: &GaleraHostgroup) -> String {
    let values: Vec<String> = Column::ALL
        .into_iter()
        .map(|column| render_value(column, &row.wire_value(column)))
        .collect();
    format!(
        "INSERT INTO mysql_galera_hostgroups (writer_hostgroup, \
         backup_writer_hostgroup, reader_hostgroup, offline_hostgroup, \
         active, max_writers, writer_is_also_reader, \
         max_transactions_behind, comment) VALUES ({}, {})",
        row.writer_hostgroup,
        values.join(", ")
    )
}

/// Render an `UPDATE` touching exactly the changed columns.
#[must_use]
pub fn update_galera_hostgroup(writer_hostgroup: u32, changes: &[FieldChange]) -> String {
    let assignments: Vec<String> = changes
        .iter()
        .map(|change| {
            format!(
                "{} = {}",
                change.column,
                render_value(change.column, &change.new)
            )
        })
        .collect();
    format!(
        "UPDATE mysql_galera_hostgroups SET {} WHERE writer_hostgroup = {writer_hostgroup}",
        assignments.join(", ")
    )
}

#[must_use]
pub fn delete_galera_hostgroup(writer_hostgroup: u32) -> String {
    format!("DELETE FROM mysql_galera_hostgroups WHERE writer_hostgroup = {writer_hostgroup}")
}

/// Parse a numeric admin column returned as text.
///
/// # Errors
///
/// Returns [`Error::Decode`] naming the column when the value is not a
/// base-10 unsigned integer.
pub fn parse_u32(column: &'static str, value: &str) -> Result<u32> {
    value.trim().parse().map_err(|_| Error::Decode {
        column,
        value: value.to_owned(),
    })
}

/// Parse the `active` column (`0` or `1`).
///
/// # Errors
///
/// Returns [`Error::Decode`] for anything other than `0` or `1`.
pub fn parse_bool(column: &'static str, value: &str) -> Result<bool> {
    match value.trim() {
        "0" => Ok(false),
        "1" => Ok(true),
        _ => Err(Error::Decode {
            column,
            value: value.to_owned(),
        }),
    }
}

/// Parse the `writer_is_also_reader` column (`0`, `1`, or `2`).
///
/// # Errors
///
/// Returns [`Error::Decode`] for values outside ProxySQL's accepted set.
pub fn parse_policy(column: &'static str, value: &str) -> Result<WriterIsAlsoReader> {
    let wire = parse_u32(column, value)?;
    u8::try_from(wire)
        .ok()
        .and_then(WriterIsAlsoReader::from_wire)
        .ok_or_else(|| Error::Decode {
            column,
            value: value.to_owned(),
        })
}
