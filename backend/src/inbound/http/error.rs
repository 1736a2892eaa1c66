//! Turns domain [`Error`] values into Actix responses.
//!
//! Every failure leaves as the JSON error envelope, with the trace id echoed
//! in the `trace-id` header. Internal errors keep their code and trace id but
//! lose their message and details on the way out.

use actix_web::error::{JsonPayloadError, QueryPayloadError};
use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;
use tracing::{debug, error};

use crate::domain::{Error, ErrorCode, TRACE_ID_HEADER};

/// Result type returned by every handler.
pub type ApiResult<T> = Result<T, Error>;

/// Challenge advertised on every `401 Unauthorized` response.
pub const BEARER_CHALLENGE: &str = "Bearer";

const REDACTED_MESSAGE: &str = "Internal server error";

const fn http_status(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest | ErrorCode::IntegrityViolation => StatusCode::BAD_REQUEST,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Conflict => StatusCode::CONFLICT,
        ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// The envelope a client is allowed to see for `error`.
fn public_envelope(error: &Error) -> Error {
    if error.code() != ErrorCode::InternalError {
        return error.clone();
    }
    let redacted = Error::internal(REDACTED_MESSAGE);
    match error.trace_id() {
        Some(id) => redacted.with_trace_id(id),
        None => redacted,
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        http_status(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        let mut response = HttpResponse::build(self.status_code());
        if let Some(id) = self.trace_id() {
            response.insert_header((TRACE_ID_HEADER, id));
        }
        match self.code() {
            ErrorCode::InternalError => {
                error!(message = %self.message(), trace_id = ?self.trace_id(), "request failed");
            }
            ErrorCode::Unauthorized => {
                response.insert_header((header::WWW_AUTHENTICATE, BEARER_CHALLENGE));
            }
            code => debug!(?code, detail = ?self.detail_code(), "request rejected"),
        }
        response.json(public_envelope(self))
    }
}

/// `JsonConfig` error handler: undecodable bodies become `invalid_request`.
pub fn json_rejection(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    Error::invalid_request("request body is not valid JSON for this endpoint")
        .with_details(json!({ "code": "malformed_body", "reason": err.to_string() }))
        .into()
}

/// `QueryConfig` error handler: unparsable query strings become
/// `invalid_request`.
pub fn query_rejection(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    Error::invalid_request("query string could not be parsed")
        .with_details(json!({ "code": "malformed_query", "reason": err.to_string() }))
        .into()
}

#[cfg(test)]
mod tests;
