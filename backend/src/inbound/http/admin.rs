//! Administrator handlers for user management and reporting.
//!
//! ```text
//! GET /admin/users?skip=0&limit=100
//! POST /admin/users {"username":"bob","role":"USER"}
//! PUT /admin/users/{id} {"display_name":"Bob","is_active":false}
//! POST /admin/users/{id}/deactivate
//! POST /admin/users/{id}/activate
//! DELETE /admin/users/{id}
//! GET /admin/users/{id}/details
//! POST /admin/users/{id}/reset-password
//! GET /admin/overview
//! ```
//!
//! Role checks happen in the domain; these handlers only shape input and
//! output.

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::{
    CreateUserRequest, CreatedUser, Overview, PasswordReset, UserDetails, UserPage, UserUpdate,
};
use crate::domain::{Error, Role, Secret, User, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::ApiSession;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    ID, PASSWORD, field_error, parse_display_name, parse_id, parse_role, parse_username,
};

/// Paging for `GET /admin/users`.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ListUsersQuery {
    /// Rows to skip. Defaults to 0.
    pub skip: Option<u32>,
    /// Page size, clamped to 1..=500. Defaults to 100.
    pub limit: Option<u32>,
}

impl From<ListUsersQuery> for UserPage {
    fn from(query: ListUsersQuery) -> Self {
        Self::new(
            query.skip.unwrap_or(0),
            query.limit.unwrap_or(UserPage::DEFAULT_LIMIT),
        )
    }
}

/// List accounts, paged by `skip` and `limit`.
#[utoipa::path(
    get,
    path = "/admin/users",
    params(ListUsersQuery),
    responses(
        (status = 200, description = "Users ordered by username", body = [User]),
        (status = 401, description = "No session", body = Error),
        (status = 403, description = "Administrator role required", body = Error)
    ),
    tags = ["admin"],
    operation_id = "listUsers"
)]
#[get("/admin/users")]
pub async fn list_users(
    state: web::Data<HttpState>,
    session: ApiSession,
    query: web::Query<ListUsersQuery>,
) -> ApiResult<web::Json<Vec<User>>> {
    let users = state
        .users
        .list_users(session.identity(), query.into_inner().into())
        .await?;
    Ok(web::Json(users))
}

/// Body for `POST /admin/users`.
#[derive(Deserialize, Serialize, ToSchema)]
pub struct CreateUserBody {
    /// Login name.
    pub username: String,
    /// Defaults to the username.
    pub display_name: Option<String>,
    /// `ADMIN` or `USER`. Defaults to `USER`.
    pub role: Option<String>,
    /// When omitted a temporary password is generated and returned once.
    pub password: Option<String>,
}

impl TryFrom<CreateUserBody> for CreateUserRequest {
    type Error = Error;

    fn try_from(body: CreateUserBody) -> Result<Self, Self::Error> {
        let username = parse_username(&body.username)?;
        let display_name = body.display_name.unwrap_or_else(|| username.to_string());
        let display_name = parse_display_name(&display_name)?;
        let role = body
            .role
            .as_deref()
            .map(parse_role)
            .transpose()?
            .unwrap_or(Role::User);
        let password = match body.password {
            Some(password) if password.is_empty() => {
                return Err(field_error(
                    PASSWORD,
                    "empty_password",
                    "password must not be empty",
                ));
            }
            other => other.map(Secret::new),
        };
        Ok(Self {
            username,
            display_name,
            role,
            password,
        })
    }
}

/// A created account, with the generated password when one was minted.
#[derive(Serialize, ToSchema)]
pub struct CreatedUserResponse {
    /// The stored account.
    pub user: User,
    /// Generated password, present only when none was supplied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temporary_password: Option<String>,
}

impl From<CreatedUser> for CreatedUserResponse {
    fn from(created: CreatedUser) -> Self {
        Self {
            user: created.user,
            temporary_password: created
                .temporary_password
                .map(|secret| secret.expose().to_owned()),
        }
    }
}

/// Create an account. A generated password is returned once.
#[utoipa::path(
    post,
    path = "/admin/users",
    request_body = CreateUserBody,
    responses(
        (status = 201, description = "User created", body = CreatedUserResponse),
        (status = 400, description = "Invalid input or duplicate username", body = Error),
        (status = 401, description = "No session", body = Error),
        (status = 403, description = "Administrator role required", body = Error)
    ),
    tags = ["admin"],
    operation_id = "createUser"
)]
#[post("/admin/users")]
pub async fn create_user(
    state: web::Data<HttpState>,
    session: ApiSession,
    payload: web::Json<CreateUserBody>,
) -> ApiResult<HttpResponse> {
    let request = CreateUserRequest::try_from(payload.into_inner())?;
    let created = state.users.create_user(session.identity(), request).await?;
    Ok(HttpResponse::Created().json(CreatedUserResponse::from(created)))
}

/// Partial update for `PUT /admin/users/{id}`. Absent fields are unchanged.
#[derive(Deserialize, Serialize, ToSchema)]
pub struct UpdateUserBody {
    /// New display name.
    pub display_name: Option<String>,
    /// New role, `ADMIN` or `USER`.
    pub role: Option<String>,
    /// New active flag.
    pub is_active: Option<bool>,
}

impl TryFrom<UpdateUserBody> for UserUpdate {
    type Error = Error;

    fn try_from(body: UpdateUserBody) -> Result<Self, Self::Error> {
        Ok(Self {
            display_name: body.display_name.as_deref().map(parse_display_name).transpose()?,
            role: body.role.as_deref().map(parse_role).transpose()?,
            is_active: body.is_active,
        })
    }
}

/// Partially update an account.
#[utoipa::path(
    put,
    path = "/admin/users/{id}",
    params(("id" = String, Path, description = "User id")),
    request_body = UpdateUserBody,
    responses(
        (status = 200, description = "Updated user", body = User),
        (status = 400, description = "Invalid input, self-demotion or self-deactivation", body = Error),
        (status = 403, description = "Administrator role required", body = Error),
        (status = 404, description = "User not found", body = Error)
    ),
    tags = ["admin"],
    operation_id = "updateUser"
)]
#[put("/admin/users/{id}")]
pub async fn update_user(
    state: web::Data<HttpState>,
    session: ApiSession,
    path: web::Path<String>,
    payload: web::Json<UpdateUserBody>,
) -> ApiResult<web::Json<User>> {
    let id: UserId = parse_id(&path, ID)?;
    let update = UserUpdate::try_from(payload.into_inner())?;
    let user = state
        .users
        .update_user(session.identity(), &id, update)
        .await?;
    Ok(web::Json(user))
}

/// Switch an account off.
#[utoipa::path(
    post,
    path = "/admin/users/{id}/deactivate",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "Deactivated user", body = User),
        (status = 400, description = "Self-deactivation", body = Error),
        (status = 403, description = "Administrator role required", body = Error),
        (status = 404, description = "User not found", body = Error)
    ),
    tags = ["admin"],
    operation_id = "deactivateUser"
)]
#[post("/admin/users/{id}/deactivate")]
pub async fn deactivate_user(
    state: web::Data<HttpState>,
    session: ApiSession,
    path: web::Path<String>,
) -> ApiResult<web::Json<User>> {
    set_active(&state, &session, &path, false).await
}

/// Switch an account back on.
#[utoipa::path(
    post,
    path = "/admin/users/{id}/activate",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "Activated user", body = User),
        (status = 403, description = "Administrator role required", body = Error),
        (status = 404, description = "User not found", body = Error)
    ),
    tags = ["admin"],
    operation_id = "activateUser"
)]
#[post("/admin/users/{id}/activate")]
pub async fn activate_user(
    state: web::Data<HttpState>,
    session: ApiSession,
    path: web::Path<String>,
) -> ApiResult<web::Json<User>> {
    set_active(&state, &session, &path, true).await
}

async fn set_active(
    state: &HttpState,
    session: &ApiSession,
    raw_id: &str,
    active: bool,
) -> ApiResult<web::Json<User>> {
    let id: UserId = parse_id(raw_id, ID)?;
    let user = state
        .users
        .set_active(session.identity(), &id, active)
        .await?;
    Ok(web::Json(user))
}

/// Delete an account that owns no call records.
#[utoipa::path(
    delete,
    path = "/admin/users/{id}",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 204, description = "User and owned lists deleted"),
        (status = 400, description = "Self-deletion or user has call records", body = Error),
        (status = 403, description = "Administrator role required", body = Error),
        (status = 404, description = "User not found", body = Error)
    ),
    tags = ["admin"],
    operation_id = "deleteUser"
)]
#[delete("/admin/users/{id}")]
pub async fn delete_user(
    state: web::Data<HttpState>,
    session: ApiSession,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id: UserId = parse_id(&path, ID)?;
    state.users.delete_user(session.identity(), &id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// One user with statistics and every list.
#[utoipa::path(
    get,
    path = "/admin/users/{id}/details",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "Profile, statistics, and lists with calls", body = UserDetails),
        (status = 403, description = "Administrator role required", body = Error),
        (status = 404, description = "User not found", body = Error)
    ),
    tags = ["admin"],
    operation_id = "userDetails"
)]
#[get("/admin/users/{id}/details")]
pub async fn user_details(
    state: web::Data<HttpState>,
    session: ApiSession,
    path: web::Path<String>,
) -> ApiResult<web::Json<UserDetails>> {
    let id: UserId = parse_id(&path, ID)?;
    let details = state.stats.user_details(session.identity(), &id).await?;
    Ok(web::Json(details))
}

/// A freshly generated password. Shown once; the user must replace it.
#[derive(Serialize, ToSchema)]
pub struct PasswordResetResponse {
    /// The updated account.
    pub user: User,
    /// One-time password to hand over.
    pub temporary_password: String,
}

impl From<PasswordReset> for PasswordResetResponse {
    fn from(reset: PasswordReset) -> Self {
        Self {
            temporary_password: reset.temporary_password.expose().to_owned(),
            user: reset.user,
        }
    }
}

/// Issue a temporary password and force a change.
#[utoipa::path(
    post,
    path = "/admin/users/{id}/reset-password",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "Temporary password issued", body = PasswordResetResponse),
        (status = 403, description = "Administrator role required", body = Error),
        (status = 404, description = "User not found", body = Error)
    ),
    tags = ["admin"],
    operation_id = "resetPassword"
)]
#[post("/admin/users/{id}/reset-password")]
pub async fn reset_password(
    state: web::Data<HttpState>,
    session: ApiSession,
    path: web::Path<String>,
) -> ApiResult<web::Json<PasswordResetResponse>> {
    let id: UserId = parse_id(&path, ID)?;
    let reset = state.users.reset_password(session.identity(), &id).await?;
    Ok(web::Json(reset.into()))
}

/// Every list in the system with global totals.
#[utoipa::path(
    get,
    path = "/admin/overview",
    responses(
        (status = 200, description = "Global totals and per-list statistics", body = Overview),
        (status = 401, description = "No session", body = Error),
        (status = 403, description = "Administrator role required", body = Error)
    ),
    tags = ["admin"],
    operation_id = "adminOverview"
)]
#[get("/admin/overview")]
pub async fn overview(
    state: web::Data<HttpState>,
    session: ApiSession,
) -> ApiResult<web::Json<Overview>> {
    let report = state.stats.overview(session.identity()).await?;
    Ok(web::Json(report))
}

#[cfg(test)]
#[path = "admin_tests.rs"]
mod tests;
