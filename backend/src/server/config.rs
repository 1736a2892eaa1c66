//! HTTP server configuration object.

use std::net::SocketAddr;

#[cfg(feature = "metrics")]
use actix_web_prom::PrometheusMetrics;
use callboard::inbound::http::state::CookiePolicy;

/// Listener and cross-cutting options for [`super::create_server`].
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) cookies: CookiePolicy,
    #[cfg(feature = "metrics")]
    pub(crate) prometheus: Option<PrometheusMetrics>,
}

impl ServerConfig {
    /// Listen on `bind_addr` with `Secure` cookies.
    #[must_use]
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            cookies: CookiePolicy::default(),
            #[cfg(feature = "metrics")]
            prometheus: None,
        }
    }

    /// Override the `access_token` cookie policy.
    #[must_use]
    pub fn with_cookie_secure(mut self, secure: bool) -> Self {
        self.cookies = CookiePolicy { secure };
        self
    }

    #[cfg(feature = "metrics")]
    /// Attach Prometheus middleware; `None` leaves requests unmeasured.
    #[must_use]
    pub fn with_metrics(mut self, prometheus: Option<PrometheusMetrics>) -> Self {
        self.prometheus = prometheus;
        self
    }
}
