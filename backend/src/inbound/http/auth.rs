//! Authentication handlers: token issue, logout, and first-admin bootstrap.
//!
//! ```text
//! POST /token {"username":"ada","password":"..."}
//! POST /logout
//! POST /init-admin {"username":"root","password":"..."}
//! ```

use actix_web::{Either, HttpResponse, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::{BootstrapAdminRequest, SessionGrant};
use crate::domain::{Error, LoginCredentials, Secret, User};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::{access_token_cookie, cleared_access_token_cookie};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    PASSWORD, credential_error, field_error, parse_display_name, parse_username,
};

/// Credentials for `POST /token`, accepted as JSON or as an
/// `application/x-www-form-urlencoded` login form.
#[derive(Deserialize, Serialize, ToSchema)]
pub struct TokenRequest {
    /// Login name.
    pub username: String,
    /// Plaintext password.
    pub password: String,
}

/// Issue a session token.
///
/// The token is returned in the body for API clients and set as the
/// `access_token` cookie for browsers.
#[utoipa::path(
    post,
    path = "/token",
    request_body(content = TokenRequest, content_type = "application/json"),
    responses(
        (status = 200, description = "Token issued", body = SessionGrant,
            headers(("Set-Cookie" = String, description = "access_token cookie"))),
        (status = 400, description = "Empty username or password", body = Error),
        (status = 401, description = "Invalid credentials or inactive account", body = Error),
        (status = 503, description = "Store unavailable", body = Error)
    ),
    tags = ["auth"],
    operation_id = "issueToken"
)]
#[post("/token")]
pub async fn issue_token(
    state: web::Data<HttpState>,
    payload: Either<web::Json<TokenRequest>, web::Form<TokenRequest>>,
) -> ApiResult<HttpResponse> {
    let request = match payload {
        Either::Left(json) => json.into_inner(),
        Either::Right(form) => form.into_inner(),
    };
    let credentials = LoginCredentials::try_from_parts(&request.username, &request.password)
        .map_err(|err| credential_error(err, PASSWORD))?;
    let grant = state.login.login(&credentials).await?;
    let cookie = access_token_cookie(&grant.access_token, grant.expires_in, state.cookies.secure);
    Ok(HttpResponse::Ok().cookie(cookie).json(grant))
}

/// Forget the browser session.
///
/// Tokens are stateless, so API clients simply discard theirs.
#[utoipa::path(
    post,
    path = "/logout",
    responses(
        (status = 204, description = "Cookie cleared",
            headers(("Set-Cookie" = String, description = "Expired access_token cookie")))
    ),
    tags = ["auth"],
    operation_id = "logout"
)]
#[post("/logout")]
pub async fn logout(state: web::Data<HttpState>) -> HttpResponse {
    HttpResponse::NoContent()
        .cookie(cleared_access_token_cookie(state.cookies.secure))
        .finish()
}

/// Body for `POST /init-admin`.
#[derive(Deserialize, Serialize, ToSchema)]
pub struct InitAdminRequest {
    /// Login name of the first administrator.
    pub username: String,
    /// Defaults to the username.
    pub display_name: Option<String>,
    /// Chosen password.
    pub password: String,
}

impl TryFrom<InitAdminRequest> for BootstrapAdminRequest {
    type Error = Error;

    fn try_from(value: InitAdminRequest) -> Result<Self, Self::Error> {
        let username = parse_username(&value.username)?;
        let display_name = value
            .display_name
            .unwrap_or_else(|| username.to_string());
        let display_name = parse_display_name(&display_name)?;
        if value.password.is_empty() {
            return Err(field_error(
                PASSWORD,
                "empty_password",
                "password must not be empty",
            ));
        }
        Ok(Self {
            username,
            display_name,
            password: Secret::new(value.password),
        })
    }
}

/// Create the first administrator. Refused once any administrator exists.
#[utoipa::path(
    post,
    path = "/init-admin",
    request_body = InitAdminRequest,
    responses(
        (status = 200, description = "Administrator created", body = User),
        (status = 400, description = "Administrator exists or invalid input", body = Error),
        (status = 409, description = "Concurrent bootstrap", body = Error)
    ),
    tags = ["auth"],
    operation_id = "initAdmin"
)]
#[post("/init-admin")]
pub async fn init_admin(
    state: web::Data<HttpState>,
    payload: web::Json<InitAdminRequest>,
) -> ApiResult<web::Json<User>> {
    let request = BootstrapAdminRequest::try_from(payload.into_inner())?;
    let admin = state.bootstrap.init_admin(request).await?;
    Ok(web::Json(admin))
}

#[cfg(test)]
#[path = "auth_tests.rs"]
mod tests;
