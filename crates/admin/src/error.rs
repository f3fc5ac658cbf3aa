use std::path::PathBuf;

use thiserror::Error;

/// Errors from talking to the ProxySQL admin interface.
#[derive(Error, Debug)]
pub enum Error {
    /// The desired hostgroup configuration is invalid before any I/O happens.
    #[error("invalid configuration: {0}")]
    Validation(#[from] proxyconf_core::ValidationError),

    /// Reading the connection config file failed.
    #[error("failed to read config file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The connection config file is not valid TOML for [`AdminOpts`].
    ///
    /// [`AdminOpts`]: crate::config::AdminOpts
    #[error("failed to parse config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// Connecting to the admin interface did not finish in time.
    #[error("timed out connecting to ProxySQL admin interface after {secs}s")]
    ConnectTimeout { secs: u64 },

    /// Error from the MySQL wire protocol / sqlx.
    #[error("ProxySQL admin interface error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// The admin interface returned a column value we cannot interpret.
    #[error("unexpected value {value:?} in column {column}")]
    Decode { column: &'static str, value: String },

    /// A row that was expected to exist is missing.
    #[error("no galera hostgroup with writer_hostgroup = {writer_hostgroup}")]
    RowMissing { writer_hostgroup: u32 },
}

pub type Result<T, E = Error> = core::result::Result<T, E>;
