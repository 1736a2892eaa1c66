//! Self-service account handlers.
//!
//! ```text
//! GET /users/me
//! POST /users/me/password {"current_password":"...","new_password":"..."}
//! ```
//!
//! Both endpoints stay reachable while a password change is pending.

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Error, PasswordChange, User};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::ApiSession;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{CURRENT_PASSWORD, credential_error};

/// Return the signed-in user's profile.
#[utoipa::path(
    get,
    path = "/users/me",
    responses(
        (status = 200, description = "Current user", body = User),
        (status = 401, description = "No session", body = Error)
    ),
    tags = ["users"],
    operation_id = "currentUser"
)]
#[get("/users/me")]
pub async fn current_user(session: ApiSession) -> web::Json<User> {
    web::Json(session.0.into_user())
}

/// Body for `POST /users/me/password`.
#[derive(Deserialize, Serialize, ToSchema)]
pub struct ChangePasswordRequest {
    /// Password held now.
    pub current_password: String,
    /// Replacement password.
    pub new_password: String,
}

/// Replace the caller's password and clear any pending rotation.
#[utoipa::path(
    post,
    path = "/users/me/password",
    request_body = ChangePasswordRequest,
    responses(
        (status = 204, description = "Password changed"),
        (status = 400, description = "Wrong current password, or a weak or unchanged replacement", body = Error),
        (status = 401, description = "No session", body = Error)
    ),
    tags = ["users"],
    operation_id = "changePassword"
)]
#[post("/users/me/password")]
pub async fn change_password(
    state: web::Data<HttpState>,
    session: ApiSession,
    payload: web::Json<ChangePasswordRequest>,
) -> ApiResult<HttpResponse> {
    let ChangePasswordRequest {
        current_password,
        new_password,
    } = payload.into_inner();
    let change = PasswordChange::try_new(&current_password, &new_password)
        .map_err(|err| credential_error(err, CURRENT_PASSWORD))?;
    state
        .account
        .change_password(session.identity(), change)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
#[path = "users_tests.rs"]
mod tests;
