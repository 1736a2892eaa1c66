//! Liveness and readiness probes.
//!
//! Readiness flips on once migrations have run and the listener is bound.
//! Liveness flips off when shutdown begins so orchestrators stop routing
//! traffic before connections drain.

use std::sync::atomic::{AtomicBool, Ordering};

use actix_web::{HttpResponse, get, http::header, web};
use tracing::info;

/// Process health flags shared between `main` and the probe handlers.
#[derive(Debug)]
pub struct HealthState {
    ready: AtomicBool,
    live: AtomicBool,
}

impl Default for HealthState {
    fn default() -> Self {
        Self {
            ready: AtomicBool::new(false),
            live: AtomicBool::new(true),
        }
    }
}

impl HealthState {
    /// Not ready, but live.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Report ready once startup has finished.
    pub fn mark_ready(&self) {
        if !self.ready.swap(true, Ordering::AcqRel) {
            info!("service ready");
        }
    }

    /// Fail both probes from now on.
    pub fn mark_draining(&self) {
        self.ready.store(false, Ordering::Release);
        if self.live.swap(false, Ordering::AcqRel) {
            info!("service draining");
        }
    }

    /// Whether readiness probes should pass.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Whether liveness probes should pass.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.live.load(Ordering::Acquire)
    }
}

fn probe_response(ok: bool) -> HttpResponse {
    let mut response = if ok {
        HttpResponse::Ok()
    } else {
        HttpResponse::ServiceUnavailable()
    };
    response
        .insert_header((header::CACHE_CONTROL, "no-store"))
        .finish()
}

/// Readiness probe.
#[utoipa::path(
    get,
    path = "/health/ready",
    responses(
        (status = 200, description = "Accepting traffic"),
        (status = 503, description = "Starting up or draining")
    ),
    tags = ["health"],
    operation_id = "ready"
)]
#[get("/health/ready")]
pub async fn ready(state: web::Data<HealthState>) -> HttpResponse {
    probe_response(state.is_ready())
}

/// Liveness probe.
#[utoipa::path(
    get,
    path = "/health/live",
    responses(
        (status = 200, description = "Process alive"),
        (status = 503, description = "Shutting down")
    ),
    tags = ["health"],
    operation_id = "live"
)]
#[get("/health/live")]
pub async fn live(state: web::Data<HealthState>) -> HttpResponse {
    probe_response(state.is_alive())
}
