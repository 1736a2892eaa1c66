//! Process settings loaded via OrthoConfig.
//!
//! Values come from `CALLBOARD_*` environment variables, configuration files,
//! and command-line flags, in OrthoConfig's usual precedence.

use std::net::SocketAddr;

use ortho_config::OrthoConfig;
use serde::Deserialize;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_POOL_MAX_SIZE: u32 = 10;

/// Errors raised while interpreting loaded settings.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SettingsError {
    /// No database URL was configured.
    #[error("CALLBOARD_DATABASE_URL must be set")]
    MissingDatabaseUrl,
    /// The bind address is not a socket address.
    #[error("invalid bind address {value:?}: {message}")]
    InvalidBindAddr {
        /// The configured text.
        value: String,
        /// Parser error text.
        message: String,
    },
    /// `pool_max_size` was zero.
    #[error("pool size must be at least 1")]
    EmptyPool,
}

/// Settings for the HTTP server and its database.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "CALLBOARD")]
pub struct AppSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// PostgreSQL connection string.
    pub database_url: Option<String>,
    /// Upper bound on pooled connections.
    pub pool_max_size: Option<u32>,
    /// Mark the `access_token` cookie `Secure`. Unset means `true`; set
    /// `false` only for plain-HTTP development.
    pub cookie_secure: Option<bool>,
}

impl AppSettings {
    /// Parsed listen address, falling back to `0.0.0.0:8080`.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.trim()
            .parse()
            .map_err(|err: std::net::AddrParseError| SettingsError::InvalidBindAddr {
                value: raw.to_owned(),
                message: err.to_string(),
            })
    }

    /// Whether the `access_token` cookie carries `Secure`. Defaults to `true`.
    #[must_use]
    pub fn cookie_secure(&self) -> bool {
        self.cookie_secure.unwrap_or(true)
    }

    /// Connection string, rejecting a missing or blank value.
    pub fn database_url(&self) -> Result<&str, SettingsError> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .ok_or(SettingsError::MissingDatabaseUrl)
    }

    /// Pool ceiling, defaulting to 10. Zero is rejected.
    pub fn pool_max_size(&self) -> Result<u32, SettingsError> {
        match self.pool_max_size {
            Some(0) => Err(SettingsError::EmptyPool),
            Some(size) => Ok(size),
            None => Ok(DEFAULT_POOL_MAX_SIZE),
        }
    }
}
