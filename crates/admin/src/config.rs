//! Connection options for the ProxySQL admin interface.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};

/// How to reach the admin interface.
///
/// Defaults match a stock ProxySQL install: `admin:admin` on
/// `127.0.0.1:6032`. Options can also be read from a TOML file with the
/// same field names, so credentials stay out of shell history:
///
/// ```toml
/// host = "proxysql.internal"
/// port = 6032
/// user = "admin"
/// password = "s3cret"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AdminOpts {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    /// Seconds to wait for the TCP connection and handshake.
    pub connect_timeout_secs: u64,
}

impl Default for AdminOpts {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 6032,
            user: "admin".to_owned(),
            password: "admin".to_owned(),
            connect_timeout_secs: 10,
        }
    }
}

impl AdminOpts {
    /// Read options from a TOML file; absent keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be read or is not valid TOML
    /// for this struct.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| Error::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }
}
