//! Embedded PostgreSQL for the Diesel adapter suites.
//!
//! Every test boots its own [`TestCluster`] under the workspace target
//! directory, creates one database, and applies the crate's migrations. The
//! cluster stops when the context holding it is dropped.
//!
//! Setup failures panic unless `SKIP_TEST_CLUSTER` is truthy, in which case
//! the test prints a skip marker and returns.

use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};
use std::time::Duration;

use callboard::outbound::persistence::{DbPool, PoolConfig, run_migrations};
use pg_embedded_setup_unpriv::TestCluster;
use postgres::{Client, NoTls};
use tokio::runtime::Runtime;
use uuid::Uuid;

const DATABASE: &str = "callboard_test";
const BOOTSTRAP_RETRIES: u32 = 3;
const RETRY_BASE_DELAY: Duration = Duration::from_millis(500);

static BOOTSTRAP_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

/// A migrated database on a private cluster.
pub struct PgContext {
    /// Pool over [`PgContext::database_url`].
    pub pool: DbPool,
    /// Drives the async repositories from synchronous tests.
    pub runtime: Runtime,
    /// Connection string of the migrated database.
    pub database_url: String,
    _cluster: TestCluster,
}

impl PgContext {
    /// Boot a cluster, create the database, and migrate it.
    pub fn start() -> Result<Self, String> {
        let runtime = Runtime::new().map_err(|err| err.to_string())?;
        let cluster = test_cluster()?;
        create_database(&cluster.connection().database_url("postgres"))?;
        let database_url = cluster.connection().database_url(DATABASE);
        runtime
            .block_on(run_migrations(&database_url))
            .map_err(|err| err.to_string())?;

        // Concurrency tests need two connections at once.
        let config = PoolConfig::new(database_url.as_str())
            .with_max_size(4)
            .with_min_idle(Some(1));
        let pool = runtime
            .block_on(DbPool::new(config))
            .map_err(|err| err.to_string())?;

        Ok(Self {
            pool,
            runtime,
            database_url,
            _cluster: cluster,
        })
    }

    /// Run one SQL query returning a single `bigint`.
    pub fn scalar(&self, sql: &str) -> i64 {
        let mut client = Client::connect(&self.database_url, NoTls)
            .unwrap_or_else(|err| panic!("connect: {}", format_postgres_error(&err)));
        client
            .query_one(sql, &[])
            .unwrap_or_else(|err| panic!("{sql}: {}", format_postgres_error(&err)))
            .get(0)
    }
}

fn create_database(maintenance_url: &str) -> Result<(), String> {
    let mut client =
        Client::connect(maintenance_url, NoTls).map_err(|err| format_postgres_error(&err))?;
    client
        .batch_execute(&format!("CREATE DATABASE {DATABASE}"))
        .map_err(|err| format_postgres_error(&err))
}

fn pg_embed_dirs() -> Result<(String, String), std::io::Error> {
    let target = std::env::var_os("CARGO_TARGET_DIR").map_or_else(
        || PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("..").join("target"),
        PathBuf::from,
    );
    let base = target
        .join("pg-embed")
        .join(format!("{}-{}", std::process::id(), Uuid::new_v4()));
    let runtime_dir = base.join("install");
    let data_dir = base.join("data");
    std::fs::create_dir_all(&runtime_dir)?;
    std::fs::create_dir_all(&data_dir)?;
    Ok((
        runtime_dir.to_string_lossy().into_owned(),
        data_dir.to_string_lossy().into_owned(),
    ))
}

fn is_transient(error: &str) -> bool {
    let error = error.to_lowercase();
    [
        "connection reset",
        "connection refused",
        "timed out",
        "timeout",
        "temporarily unavailable",
        "dns error",
        "error decoding response body",
    ]
    .iter()
    .any(|pattern| error.contains(pattern))
}

/// Boot a cluster, retrying binary downloads that fail transiently.
///
/// `PG_RUNTIME_DIR` and `PG_DATA_DIR` are pointed at a fresh directory under
/// the target dir for the duration of the bootstrap unless both are already
/// set.
pub fn test_cluster() -> Result<TestCluster, String> {
    let _bootstrap = BOOTSTRAP_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|err| err.into_inner());

    let _env = if std::env::var_os("PG_RUNTIME_DIR").is_some()
        && std::env::var_os("PG_DATA_DIR").is_some()
    {
        None
    } else {
        let (runtime_dir, data_dir) = pg_embed_dirs().map_err(|err| err.to_string())?;
        Some(env_lock::lock_env([
            ("PG_RUNTIME_DIR", Some(runtime_dir)),
            ("PG_DATA_DIR", Some(data_dir)),
        ]))
    };

    let mut attempt = 0;
    loop {
        match TestCluster::new() {
            Ok(cluster) => return Ok(cluster),
            Err(err) => {
                let message = format!("{err:?}");
                if attempt >= BOOTSTRAP_RETRIES || !is_transient(&message) {
                    return Err(message);
                }
                let delay = RETRY_BASE_DELAY * 2_u32.pow(attempt);
                eprintln!("pg-embed: transient bootstrap failure, retrying in {delay:?}: {message}");
                std::thread::sleep(delay);
                attempt += 1;
            }
        }
    }
}

/// `SKIP_TEST_CLUSTER` is one of `1`, `true`, or `yes`, ignoring case.
pub fn should_skip_test_cluster() -> bool {
    std::env::var("SKIP_TEST_CLUSTER")
        .is_ok_and(|value| matches!(value.to_lowercase().as_str(), "1" | "true" | "yes"))
}

/// Skip when `SKIP_TEST_CLUSTER` allows it; otherwise fail loudly.
pub fn handle_cluster_setup_failure<T>(reason: impl std::fmt::Display) -> Option<T> {
    if should_skip_test_cluster() {
        eprintln!("SKIP-TEST-CLUSTER: {reason}");
        None
    } else {
        panic!("test cluster setup failed: {reason}. Set SKIP_TEST_CLUSTER=1 to skip.");
    }
}

/// Render a `postgres` error with its SQLSTATE and server message.
///
/// The plain `Display` output collapses most server errors to `db error`.
pub fn format_postgres_error(error: &postgres::Error) -> String {
    let Some(db_error) = error.as_db_error() else {
        return error.to_string();
    };
    let mut summary = format!("postgres error {:?}: {}", db_error.code(), db_error.message());
    if let Some(detail) = db_error.detail() {
        summary.push_str("; detail: ");
        summary.push_str(detail);
    }
    summary
}
