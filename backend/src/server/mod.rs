//! Builds the Actix server: shared state, the tracing middleware, the domain
//! routes, probes, and (in debug builds) Swagger UI.

mod config;
#[cfg(feature = "metrics")]
mod metrics;
mod state_builders;

pub use config::ServerConfig;
pub use state_builders::{TokenKey, build_http_state};

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};

use callboard::Trace;
use callboard::inbound::http::configure;
use callboard::inbound::http::health::{self, HealthState};
use callboard::inbound::http::state::{HttpState, HttpStatePorts};

/// Probes plus every domain endpoint, and the API explorer in debug builds.
fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(health::ready).service(health::live).configure(configure);

    #[cfg(debug_assertions)]
    {
        use callboard::ApiDoc;
        use utoipa::OpenApi as _;
        use utoipa_swagger_ui::SwaggerUi;

        cfg.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    }
}

pub(crate) fn build_app(
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(Trace)
        .configure(routes)
}

/// Bind the listener, start the workers, and flip the readiness probe.
///
/// The returned [`Server`] must be awaited to serve requests.
///
/// # Errors
/// Fails when the socket cannot be bound.
pub fn create_server(
    health_state: web::Data<HealthState>,
    ports: HttpStatePorts,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let http_state =
        web::Data::new(HttpState::new(ports).with_cookie_policy(config.cookies));
    let worker_health = health_state.clone();

    #[cfg(feature = "metrics")]
    let measured = metrics::MetricsLayer::new(config.prometheus);

    let server = HttpServer::new(move || {
        let app = build_app(worker_health.clone(), http_state.clone());
        #[cfg(feature = "metrics")]
        let app = app.wrap(measured.clone());
        app
    })
    .bind(config.bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}
