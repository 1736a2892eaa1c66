//! `bb8` pool of `diesel-async` PostgreSQL connections shared by the
//! repositories.

use std::time::Duration;

use diesel_async::AsyncPgConnection;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::pooled_connection::bb8::{Pool, PooledConnection};

use crate::domain::ports::define_port_error;

/// A connection borrowed from [`DbPool`]; returned when dropped.
pub type PooledPg<'a> = PooledConnection<'a, AsyncPgConnection>;

define_port_error! {
    /// Pool failures. Repositories report both as their `Connection` variant.
    pub enum PoolError {
        /// No connection became free before the checkout timeout.
        Checkout { message: String } => "no database connection available: {message}",
        /// The pool could not be constructed from the config.
        Build { message: String } => "database pool could not be built: {message}",
    }
}

/// Sizing and timeouts for [`DbPool`].
///
/// A fresh config allows ten connections, keeps one idle, and gives up on a
/// checkout after five seconds.
///
/// ```
/// use std::time::Duration;
/// use callboard::outbound::persistence::PoolConfig;
///
/// let config = PoolConfig::new("postgres://localhost/callboard")
///     .with_max_size(4)
///     .with_connection_timeout(Duration::from_secs(2));
/// assert_eq!(config.database_url(), "postgres://localhost/callboard");
/// ```
#[derive(Debug, Clone)]
pub struct PoolConfig {
    url: String,
    max_size: u32,
    min_idle: Option<u32>,
    checkout_timeout: Duration,
}

impl PoolConfig {
    const DEFAULT_MAX_SIZE: u32 = 10;
    const DEFAULT_CHECKOUT_TIMEOUT: Duration = Duration::from_secs(5);

    /// Defaults for `database_url`.
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            url: database_url.into(),
            max_size: Self::DEFAULT_MAX_SIZE,
            min_idle: Some(1),
            checkout_timeout: Self::DEFAULT_CHECKOUT_TIMEOUT,
        }
    }

    /// Cap on open connections.
    #[must_use]
    pub fn with_max_size(self, max_size: u32) -> Self {
        Self { max_size, ..self }
    }

    /// Connections kept open while idle.
    #[must_use]
    pub fn with_min_idle(self, min_idle: Option<u32>) -> Self {
        Self { min_idle, ..self }
    }

    /// How long a checkout waits for a free connection.
    #[must_use]
    pub fn with_connection_timeout(self, checkout_timeout: Duration) -> Self {
        Self {
            checkout_timeout,
            ..self
        }
    }

    /// PostgreSQL connection string.
    pub fn database_url(&self) -> &str {
        &self.url
    }
}

/// Cloneable handle over the shared pool.
#[derive(Clone)]
pub struct DbPool {
    pool: Pool<AsyncPgConnection>,
}

impl DbPool {
    /// Build the pool. Connections are opened lazily, so an unreachable
    /// database surfaces on the first checkout rather than here.
    ///
    /// # Errors
    ///
    /// [`PoolError::Build`] if `bb8` rejects the configuration.
    pub async fn new(config: PoolConfig) -> Result<Self, PoolError> {
        let PoolConfig {
            url,
            max_size,
            min_idle,
            checkout_timeout,
        } = config;
        let pool = Pool::builder()
            .max_size(max_size)
            .min_idle(min_idle)
            .connection_timeout(checkout_timeout)
            .build(AsyncDieselConnectionManager::<AsyncPgConnection>::new(url))
            .await
            .map_err(|err| PoolError::build(err.to_string()))?;
        Ok(Self { pool })
    }

    /// Borrow a connection, waiting at most the configured timeout.
    ///
    /// # Errors
    ///
    /// [`PoolError::Checkout`] when the wait times out or the connection
    /// cannot be opened.
    pub async fn connection(&self) -> Result<PooledPg<'_>, PoolError> {
        self.pool
            .get()
            .await
            .map_err(|err| PoolError::checkout(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn fresh_config_uses_defaults() {
        let config = PoolConfig::new("postgres://localhost/callboard");

        assert_eq!(config.max_size, PoolConfig::DEFAULT_MAX_SIZE);
        assert_eq!(config.min_idle, Some(1));
        assert_eq!(config.checkout_timeout, PoolConfig::DEFAULT_CHECKOUT_TIMEOUT);
    }

    #[rstest]
    fn builders_replace_one_field_each() {
        let config = PoolConfig::new("postgres://db/callboard")
            .with_max_size(2)
            .with_min_idle(None)
            .with_connection_timeout(Duration::from_millis(250));

        assert_eq!(config.database_url(), "postgres://db/callboard");
        assert_eq!(config.max_size, 2);
        assert_eq!(config.min_idle, None);
        assert_eq!(config.checkout_timeout, Duration::from_millis(250));
    }

    #[rstest]
    fn checkout_failures_name_the_cause() {
        let err = PoolError::checkout("timed out");
        assert_eq!(err.to_string(), "no database connection available: timed out");
    }
}
