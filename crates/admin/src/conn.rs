//! Connection to the ProxySQL admin interface.

use std::time::Duration;

use proxyconf_core::GaleraHostgroup;
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection, MySqlRow};
use sqlx::{Connection, Executor, Row};

use crate::config::AdminOpts;
use crate::error::{Error, Result};
use crate::sql;

/// An open session on the admin interface.
///
/// One short-lived connection per invocation; the admin interface is a
/// low-traffic control plane and needs no pooling.
pub struct AdminConn {
    conn: MySqlConnection,
}

impl AdminConn {
    /// Connect and authenticate against the admin interface.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConnectTimeout`] when the handshake does not finish
    /// within `opts.connect_timeout_secs`, or [`Error::Sqlx`] for protocol
    /// and authentication failures.
    pub async fn connect(opts: &AdminOpts) -> Result<Self> {
        let options = MySqlConnectOptions::new()
            .host(&opts.host)
            .port(opts.port)
            .username(&opts.user)
            .password(&opts.password)
            // The admin interface cannot service binary prepared statements;
            // everything goes through the text protocol unprepared.
            .statement_cache_capacity(0);

        tracing::debug!(host = %opts.host, port = opts.port, user = %opts.user, "connecting to admin interface");
        let conn = tokio::time::timeout(
            Duration::from_secs(opts.connect_timeout_secs),
            MySqlConnection::connect_with(&options),
        )
        .await
        .map_err(|_| Error::ConnectTimeout {
            secs: opts.connect_timeout_secs,
        })??;

        Ok(Self { conn })
    }

    /// Close the session cleanly.
    ///
    /// # Errors
    ///
    /// Returns an error if the protocol-level goodbye fails.
    pub async fn close(self) -> Result<()> {
        self.conn.close().await?;
        Ok(())
    }

    /// ProxySQL admin version string, e.g. `2.6.2-Admin`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or returns no row.
    pub async fn version(&mut self) -> Result<String> {
        let row = sqlx::raw_sql("SELECT version()")
            .fetch_one(&mut self.conn)
            .await?;
        let version: String = row.try_get(0)?;
        Ok(version)
    }

    /// Fetch the Galera hostgroup row for a writer hostgroup, if present.
    ///
    /// # Errors
    ///
    /// Returns an error on query failure or when a column comes back in a
    /// form we cannot parse.
    pub async fn fetch_galera_hostgroup(
        &mut self,
        writer_hostgroup: u32,
    ) -> Result<Option<GaleraHostgroup>> {
        let statement = sql::select_galera_hostgroup(writer_hostgroup);
        tracing::debug!(%statement, "admin query");
        // `RawSql::fetch_optional` in sqlx 0.8 mistakenly returns a bare row;
        // go through the `Executor` trait method, which returns `Option`.
        let row = self.conn.fetch_optional(sqlx::raw_sql(&statement)).await?;
        row.as_ref().map(decode_galera_hostgroup).transpose()
    }

    /// Fetch every row of `mysql_galera_hostgroups`, ordered by writer id.
    ///
    /// # Errors
    ///
    /// Returns an error on query failure or when a column comes back in a
    /// form we cannot parse.
    pub async fn list_galera_hostgroups(&mut self) -> Result<Vec<GaleraHostgroup>> {
        let statement = sql::select_all_galera_hostgroups();
        tracing::debug!(%statement, "admin query");
        let rows = sqlx::raw_sql(&statement)
            .fetch_all(&mut self.conn)
            .await?;
        rows.iter().map(decode_galera_hostgroup).collect()
    }

    /// Execute one mutation statement on the admin interface.
    ///
    /// # Errors
    ///
    /// Returns an error when the admin interface rejects the statement.
    pub async fn execute(&mut self, statement: &str) -> Result<()> {
        tracing::debug!(%statement, "admin execute");
        sqlx::raw_sql(statement).execute(&mut self.conn).await?;
        Ok(())
    }

    /// `SAVE MYSQL SERVERS TO DISK`.
    ///
    /// # Errors
    ///
    /// Returns an error when the admin interface rejects the statement.
    pub async fn save_servers_to_disk(&mut self) -> Result<()> {
        self.execute(sql::SAVE_SERVERS_TO_DISK).await
    }

    /// `LOAD MYSQL SERVERS TO RUNTIME`.
    ///
    /// # Errors
    ///
    /// Returns an error when the admin interface rejects the statement.
    pub async fn load_servers_to_runtime(&mut self) -> Result<()> {
        self.execute(sql::LOAD_SERVERS_TO_RUNTIME).await
    }
}

/// Decode one admin row into the typed struct.
///
/// Every column arrives as text (the admin store is SQLite behind a MySQL
/// facade), so this is string parsing, not driver-level type mapping.
fn decode_galera_hostgroup(row: &MySqlRow) -> Result<GaleraHostgroup> {
    let text = |column: &'static str| -> Result<String> {
        row.try_get::<String, _>(column).map_err(Error::from)
    };

    Ok(GaleraHostgroup {
        writer_hostgroup: sql::parse_u32("writer_hostgroup", &text("writer_hostgroup")?)?,
        backup_writer_hostgroup: sql::parse_u32(
            "backup_writer_hostgroup",
            &text("backup_writer_hostgroup")?,
        )?,
        reader_hostgroup: sql::parse_u32("reader_hostgroup", &text("reader_hostgroup")?)?,
        offline_hostgroup: sql::parse_u32("offline_hostgroup", &text("offline_hostgroup")?)?,
        active: sql::parse_bool("active", &text("active")?)?,
        max_writers: sql::parse_u32("max_writers", &text("max_writers")?)?,
        writer_is_also_reader: sql::parse_policy(
            "writer_is_also_reader",
            &text("writer_is_also_reader")?,
        )?,
        max_transactions_behind: sql::parse_u32(
            "max_transactions_behind",
            &text("max_transactions_behind")?,
        )?,
        comment: text("comment")?,
    })
}
