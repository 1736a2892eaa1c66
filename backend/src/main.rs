//! Backend entry-point: loads settings, applies migrations, and serves the
//! REST API.

mod server;

use std::io;
use std::sync::Arc;

use actix_web::web;
#[cfg(feature = "metrics")]
use actix_web_prom::{PrometheusMetrics, PrometheusMetricsBuilder};
use mockable::{DefaultClock, DefaultEnv};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use callboard::inbound::http::health::HealthState;
use callboard::inbound::http::token_config::{BuildMode, token_settings_from_env};
use callboard::outbound::persistence::{DbPool, PoolConfig, run_migrations};
use callboard::settings::AppSettings;
use server::{ServerConfig, TokenKey, build_http_state, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load().map_err(|err| io::Error::other(err.to_string()))?;
    let bind_addr = settings.bind_addr().map_err(io::Error::other)?;
    let database_url = settings.database_url().map_err(io::Error::other)?;
    let pool_max_size = settings.pool_max_size().map_err(io::Error::other)?;

    let tokens = token_settings_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
        .map_err(io::Error::other)?;
    if tokens.ephemeral {
        warn!(
            fingerprint = %tokens.fingerprint,
            "using an ephemeral token key; sessions end when the process exits"
        );
    } else {
        info!(fingerprint = %tokens.fingerprint, "token signing key loaded");
    }

    let applied = run_migrations(database_url)
        .await
        .map_err(io::Error::other)?;
    info!(applied, "database migrations complete");

    let pool = DbPool::new(PoolConfig::new(database_url).with_max_size(pool_max_size))
        .await
        .map_err(io::Error::other)?;

    let ports = build_http_state(
        &pool,
        TokenKey {
            key: tokens.key(),
            ttl: tokens.ttl,
        },
        Arc::new(DefaultClock),
    );
    drop(tokens);

    let config = ServerConfig::new(bind_addr).with_cookie_secure(settings.cookie_secure());
    #[cfg(feature = "metrics")]
    let config = config.with_metrics(initialize_metrics(|| {
        PrometheusMetricsBuilder::new("callboard")
            .endpoint("/metrics")
            .build()
    }));

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), ports, config)?;
    info!(%bind_addr, "listening");

    let outcome = server.await;
    health_state.mark_draining();
    outcome
}

/// Build Prometheus middleware, continuing without metrics when the
/// registry rejects it.
#[cfg(feature = "metrics")]
fn initialize_metrics<F, E>(build: F) -> Option<PrometheusMetrics>
where
    F: FnOnce() -> Result<PrometheusMetrics, E>,
    E: std::fmt::Display,
{
    match build() {
        Ok(metrics) => Some(metrics),
        Err(error) => {
            warn!(%error, "Prometheus metrics disabled");
            None
        }
    }
}
