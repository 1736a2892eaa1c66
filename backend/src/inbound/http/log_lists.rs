//! Log list handlers.
//!
//! ```text
//! POST /log-lists/ {"name":"Monday"}
//! GET /log-lists/
//! GET /log-lists/{id}
//! DELETE /log-lists/{id}
//! ```

use actix_web::{HttpResponse, delete, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::metrics::LogListDetail;
use crate::domain::{Error, LogList, LogListId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::ApiSession;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{ID, parse_id, parse_log_list_name};

/// Body for `POST /log-lists/`.
#[derive(Deserialize, Serialize, ToSchema)]
pub struct CreateLogListRequest {
    /// List name, trimmed.
    pub name: String,
}

/// Create a list owned by the caller.
#[utoipa::path(
    post,
    path = "/log-lists/",
    request_body = CreateLogListRequest,
    responses(
        (status = 201, description = "Log list created", body = LogList),
        (status = 400, description = "Invalid name", body = Error),
        (status = 401, description = "No session", body = Error),
        (status = 403, description = "Administrators cannot own lists, or a password change is pending", body = Error)
    ),
    tags = ["log-lists"],
    operation_id = "createLogList"
)]
#[post("/log-lists/")]
pub async fn create_log_list(
    state: web::Data<HttpState>,
    session: ApiSession,
    payload: web::Json<CreateLogListRequest>,
) -> ApiResult<HttpResponse> {
    let name = parse_log_list_name(&payload.name)?;
    let list = state.log_lists.create(session.identity(), name).await?;
    Ok(HttpResponse::Created().json(list))
}

/// Lists visible to the caller: their own, or every list for an
/// administrator.
#[utoipa::path(
    get,
    path = "/log-lists/",
    responses(
        (status = 200, description = "Visible log lists", body = [LogList]),
        (status = 401, description = "No session", body = Error),
        (status = 403, description = "Password change pending", body = Error)
    ),
    tags = ["log-lists"],
    operation_id = "listLogLists"
)]
#[get("/log-lists/")]
pub async fn list_log_lists(
    state: web::Data<HttpState>,
    session: ApiSession,
) -> ApiResult<web::Json<Vec<LogList>>> {
    let lists = state.log_lists_query.list(session.identity()).await?;
    Ok(web::Json(lists))
}

/// One list with statistics and calls.
#[utoipa::path(
    get,
    path = "/log-lists/{id}",
    params(("id" = String, Path, description = "Log list id")),
    responses(
        (status = 200, description = "Log list with statistics and calls, newest first", body = LogListDetail),
        (status = 403, description = "List belongs to another user", body = Error),
        (status = 404, description = "Log list not found", body = Error)
    ),
    tags = ["log-lists"],
    operation_id = "getLogList"
)]
#[get("/log-lists/{id}")]
pub async fn get_log_list(
    state: web::Data<HttpState>,
    session: ApiSession,
    path: web::Path<String>,
) -> ApiResult<web::Json<LogListDetail>> {
    let id: LogListId = parse_id(&path, ID)?;
    let detail = state.log_lists_query.get(session.identity(), &id).await?;
    Ok(web::Json(detail))
}

/// Delete a list and its calls. The owner's last list cannot be deleted.
#[utoipa::path(
    delete,
    path = "/log-lists/{id}",
    params(("id" = String, Path, description = "Log list id")),
    responses(
        (status = 204, description = "Log list deleted"),
        (status = 400, description = "Last remaining list", body = Error),
        (status = 403, description = "List belongs to another user", body = Error),
        (status = 404, description = "Log list not found", body = Error),
        (status = 409, description = "Concurrent deletion; retry", body = Error)
    ),
    tags = ["log-lists"],
    operation_id = "deleteLogList"
)]
#[delete("/log-lists/{id}")]
pub async fn delete_log_list(
    state: web::Data<HttpState>,
    session: ApiSession,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id: LogListId = parse_id(&path, ID)?;
    state.log_lists.delete(session.identity(), &id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
#[path = "log_lists_tests.rs"]
mod tests;
