//! Call record handlers.
//!
//! ```text
//! POST /calls/ {"log_list_id":"...","call_type":"APPOINTMENT"}
//! DELETE /calls/{id}
//! ```

use actix_web::{HttpResponse, delete, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{CallLog, CallLogId, Error, LogListId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::ApiSession;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{ID, LOG_LIST_ID, parse_id};

/// Body for `POST /calls/`.
#[derive(Deserialize, Serialize, ToSchema)]
pub struct RecordCallRequest {
    /// Target list, owned by the caller.
    pub log_list_id: String,
    /// One of the sale or other call types, matched exactly.
    #[schema(example = "APPOINTMENT")]
    pub call_type: String,
}

/// Record a call against one of the caller's own lists.
#[utoipa::path(
    post,
    path = "/calls/",
    request_body = RecordCallRequest,
    responses(
        (status = 201, description = "Call recorded", body = CallLog),
        (status = 400, description = "Unknown call type or malformed list id", body = Error),
        (status = 403, description = "Not the list owner, or an administrator", body = Error),
        (status = 404, description = "Log list not found", body = Error)
    ),
    tags = ["calls"],
    operation_id = "recordCall"
)]
#[post("/calls/")]
pub async fn record_call(
    state: web::Data<HttpState>,
    session: ApiSession,
    payload: web::Json<RecordCallRequest>,
) -> ApiResult<HttpResponse> {
    let log_list_id: LogListId = parse_id(&payload.log_list_id, LOG_LIST_ID)?;
    let call = state
        .calls
        .record(session.identity(), &log_list_id, &payload.call_type)
        .await?;
    Ok(HttpResponse::Created().json(call))
}

/// Delete one call record.
#[utoipa::path(
    delete,
    path = "/calls/{id}",
    params(("id" = String, Path, description = "Call log id")),
    responses(
        (status = 204, description = "Call deleted"),
        (status = 403, description = "Parent list belongs to another user", body = Error),
        (status = 404, description = "Call log not found", body = Error)
    ),
    tags = ["calls"],
    operation_id = "deleteCall"
)]
#[delete("/calls/{id}")]
pub async fn delete_call(
    state: web::Data<HttpState>,
    session: ApiSession,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id: CallLogId = parse_id(&path, ID)?;
    state.calls.delete(session.identity(), &id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
#[path = "calls_tests.rs"]
mod tests;
