//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every HTTP endpoint together with the bearer and
//! cookie security schemes. The document backs Swagger UI in debug builds
//! and is exported by `cargo run --bin openapi-dump`.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::metrics::{CallStats, LogListDetail, LogListSummary, UserStats};
use crate::domain::ports::{Dashboard, Overview, SessionGrant, UserDetails};
use crate::domain::{CallLog, Error, ErrorCode, LogList, Role, User};
use crate::inbound::http::admin::{
    CreateUserBody, CreatedUserResponse, PasswordResetResponse, UpdateUserBody,
};
use crate::inbound::http::auth::{InitAdminRequest, TokenRequest};
use crate::inbound::http::calls::RecordCallRequest;
use crate::inbound::http::log_lists::CreateLogListRequest;
use crate::inbound::http::users::ChangePasswordRequest;

/// Name of the `Authorization: Bearer` scheme.
pub const BEARER_SCHEME: &str = "bearerAuth";
/// Name of the `access_token` cookie scheme used by page routes.
pub const COOKIE_SCHEME: &str = "cookieAuth";

/// Paths whose operations need no session. Their `security` is set to an
/// empty list so the document-wide bearer requirement does not apply.
pub const PUBLIC_PATHS: [&str; 5] = [
    "/token",
    "/logout",
    "/init-admin",
    "/health/ready",
    "/health/live",
];

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            BEARER_SCHEME,
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some("Token issued by POST /token."))
                    .build(),
            ),
        );
        components.add_security_scheme(
            COOKIE_SCHEME,
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "access_token",
                "Cookie set by POST /token, holding `Bearer <token>`.",
            ))),
        );

        for path in PUBLIC_PATHS {
            let Some(item) = openapi.paths.paths.get_mut(path) else {
                continue;
            };
            for operation in [&mut item.get, &mut item.post].into_iter().flatten() {
                operation.security = Some(Vec::new());
            }
        }
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Callboard API",
        description = "Call logging with per-list transfer-rate statistics and user administration."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("bearerAuth" = [])),
    paths(
        crate::inbound::http::auth::issue_token,
        crate::inbound::http::auth::logout,
        crate::inbound::http::auth::init_admin,
        crate::inbound::http::users::current_user,
        crate::inbound::http::users::change_password,
        crate::inbound::http::admin::list_users,
        crate::inbound::http::admin::create_user,
        crate::inbound::http::admin::update_user,
        crate::inbound::http::admin::deactivate_user,
        crate::inbound::http::admin::activate_user,
        crate::inbound::http::admin::delete_user,
        crate::inbound::http::admin::user_details,
        crate::inbound::http::admin::reset_password,
        crate::inbound::http::admin::overview,
        crate::inbound::http::log_lists::create_log_list,
        crate::inbound::http::log_lists::list_log_lists,
        crate::inbound::http::log_lists::get_log_list,
        crate::inbound::http::log_lists::delete_log_list,
        crate::inbound::http::calls::record_call,
        crate::inbound::http::calls::delete_call,
        crate::inbound::http::dashboard::dashboard_page,
        crate::inbound::http::dashboard::dashboard,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        User,
        Role,
        LogList,
        CallLog,
        CallStats,
        LogListSummary,
        LogListDetail,
        UserStats,
        Overview,
        UserDetails,
        Dashboard,
        SessionGrant,
        TokenRequest,
        InitAdminRequest,
        ChangePasswordRequest,
        CreateUserBody,
        CreatedUserResponse,
        UpdateUserBody,
        PasswordResetResponse,
        CreateLogListRequest,
        RecordCallRequest,
    )),
    tags(
        (name = "auth", description = "Token issue and first-admin bootstrap"),
        (name = "users", description = "The signed-in user's own account"),
        (name = "admin", description = "User management and reporting for administrators"),
        (name = "log-lists", description = "Named collections of call records"),
        (name = "calls", description = "Individual call records"),
        (name = "dashboard", description = "Combined views for the front end"),
        (name = "health", description = "Liveness and readiness probes")
    )
)]
pub struct ApiDoc;
