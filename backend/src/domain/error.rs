//! Domain-level error types.
//!
//! These errors are transport agnostic. The HTTP adapter maps each
//! [`ErrorCode`] to a status and renders the payload as JSON; the domain never
//! sees a status code.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use utoipa::ToSchema;

use super::TraceId;

/// Header carrying the request correlation identifier.
pub const TRACE_ID_HEADER: &str = "trace-id";

/// Stable machine-readable error code describing the failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[non_exhaustive]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// The request is malformed or fails validation.
    InvalidRequest,
    /// No usable session, bad credentials, or an inactive account.
    Unauthorized,
    /// Authenticated but not permitted to perform this action.
    Forbidden,
    /// The requested resource does not exist.
    NotFound,
    /// The operation would break a data-protection rule such as deleting the
    /// last log list.
    IntegrityViolation,
    /// A concurrent transaction won; the caller may retry.
    Conflict,
    /// A backing store is unreachable.
    ServiceUnavailable,
    /// An unexpected error occurred inside the domain.
    InternalError,
}

/// Refinements carried in `details.code`.
///
/// Clients branch on these rather than parsing messages.
pub mod detail {
    /// Call type outside the vocabulary.
    pub const INVALID_CALL_TYPE: &str = "invalid_call_type";
    /// The owner or system would be left without a log list.
    pub const LAST_LOG_LIST: &str = "last_log_list";
    /// The user still owns call records.
    pub const USER_HAS_CALL_LOGS: &str = "user_has_call_logs";
    /// An administrator tried to delete their own account.
    pub const SELF_DELETION: &str = "self_deletion";
    /// An administrator tried to deactivate their own account.
    pub const SELF_DEACTIVATION: &str = "self_deactivation";
    /// An administrator tried to drop their own admin role.
    pub const SELF_DEMOTION: &str = "self_demotion";
    /// The account exists but is switched off.
    pub const INACTIVE_ACCOUNT: &str = "inactive_account";
    /// The username is already taken.
    pub const DUPLICATE_USERNAME: &str = "duplicate_username";
    /// Bootstrap was attempted after an administrator exists.
    pub const ADMIN_EXISTS: &str = "admin_exists";
    /// The caller must rotate their password first.
    pub const PASSWORD_CHANGE_REQUIRED: &str = "password_change_required";
    /// Unknown username or wrong password.
    pub const INVALID_CREDENTIALS: &str = "invalid_credentials";
    /// A concurrent transaction won.
    pub const SERIALIZATION_FAILURE: &str = "serialization_failure";
}

/// Domain error payload.
///
/// ## Invariants
/// - `message` is non-empty once trimmed.
/// - `trace_id`, when present, is non-empty.
///
/// Constructors pick up the ambient [`TraceId`] so errors raised while
/// serving a request carry its correlation identifier.
///
/// # Examples
/// ```
/// use callboard::domain::{Error, ErrorCode};
///
/// let err = Error::not_found("log list not found");
/// assert_eq!(err.code(), ErrorCode::NotFound);
/// assert!(err.trace_id().is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[serde(try_from = "ErrorDto", into = "ErrorDto")]
pub struct Error {
    #[schema(example = "forbidden")]
    code: ErrorCode,
    #[schema(example = "log list belongs to another user")]
    message: String,
    #[schema(example = "5c2b4b1e-8a0e-4c55-9d7b-0f8e6f7f4d21")]
    trace_id: Option<String>,
    details: Option<Value>,
}

/// Validation errors emitted by the constructors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ErrorValidationError {
    /// Message is blank.
    #[error("error message must not be empty")]
    EmptyMessage,
    /// Trace identifier is blank.
    #[error("trace identifier must not be empty")]
    EmptyTraceId,
}

impl Error {
    /// Create a new error, panicking if the message is blank.
    ///
    /// # Panics
    /// When `message` is empty or whitespace. All call sites in this crate
    /// pass literals or formatted strings with literal prefixes.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        match Self::try_new(code, message) {
            Ok(value) => value,
            Err(err) => panic!("error messages must satisfy validation: {err}"),
        }
    }

    /// Fallible constructor that validates the message content.
    pub fn try_new(code: ErrorCode, message: impl Into<String>) -> Result<Self, ErrorValidationError> {
        let message = message.into();
        if message.trim().is_empty() {
            return Err(ErrorValidationError::EmptyMessage);
        }
        Ok(Self {
            code,
            message,
            trace_id: TraceId::current().map(|id| id.to_string()),
            details: None,
        })
    }

    /// Failure category.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        self.code
    }

    /// Human readable description.
    #[must_use]
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Correlation identifier of the request that failed.
    #[must_use]
    pub fn trace_id(&self) -> Option<&str> {
        self.trace_id.as_deref()
    }

    /// Structured extras, if any.
    #[must_use]
    pub const fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    /// The `details.code` refinement, when one was attached.
    #[must_use]
    pub fn detail_code(&self) -> Option<&str> {
        self.details
            .as_ref()
            .and_then(|details| details.get("code"))
            .and_then(Value::as_str)
    }

    /// Attach structured details to the error.
    #[must_use]
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Attach a `details.code` refinement.
    ///
    /// # Examples
    /// ```
    /// use callboard::domain::{Error, error::detail};
    ///
    /// let err = Error::integrity_violation("cannot delete the last log list")
    ///     .with_detail_code(detail::LAST_LOG_LIST);
    /// assert_eq!(err.detail_code(), Some("last_log_list"));
    /// ```
    #[must_use]
    pub fn with_detail_code(self, code: &str) -> Self {
        self.with_details(json!({ "code": code }))
    }

    /// Replace the trace identifier, panicking if it is blank.
    ///
    /// # Panics
    /// When `trace_id` is empty or whitespace.
    #[must_use]
    pub fn with_trace_id(self, trace_id: impl Into<String>) -> Self {
        match self.try_with_trace_id(trace_id) {
            Ok(value) => value,
            Err(err) => panic!("trace identifiers must satisfy validation: {err}"),
        }
    }

    /// Fallible variant of [`Self::with_trace_id`].
    pub fn try_with_trace_id(
        mut self,
        trace_id: impl Into<String>,
    ) -> Result<Self, ErrorValidationError> {
        let trace_id = trace_id.into();
        if trace_id.trim().is_empty() {
            return Err(ErrorValidationError::EmptyTraceId);
        }
        self.trace_id = Some(trace_id);
        Ok(self)
    }

    /// Shorthand for [`ErrorCode::InvalidRequest`].
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, message)
    }

    /// Shorthand for [`ErrorCode::Unauthorized`].
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    /// Shorthand for [`ErrorCode::Forbidden`].
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Forbidden, message)
    }

    /// Shorthand for [`ErrorCode::NotFound`].
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    /// Shorthand for [`ErrorCode::IntegrityViolation`].
    pub fn integrity_violation(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::IntegrityViolation, message)
    }

    /// Shorthand for [`ErrorCode::Conflict`].
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Conflict, message)
    }

    /// Shorthand for [`ErrorCode::ServiceUnavailable`].
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ServiceUnavailable, message)
    }

    /// Shorthand for [`ErrorCode::InternalError`].
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for Error {}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ErrorDto {
    pub(crate) code: ErrorCode,
    pub(crate) message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) trace_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) details: Option<Value>,
}

impl From<Error> for ErrorDto {
    fn from(value: Error) -> Self {
        Self {
            code: value.code,
            message: value.message,
            trace_id: value.trace_id,
            details: value.details,
        }
    }
}

impl TryFrom<ErrorDto> for Error {
    type Error = ErrorValidationError;

    // Decoded payloads keep their own trace id, never the ambient one.
    fn try_from(value: ErrorDto) -> Result<Self, Self::Error> {
        let ErrorDto {
            code,
            message,
            trace_id,
            details,
        } = value;
        let mut error = Self::try_new(code, message)?;
        error.trace_id = None;
        if let Some(trace_id) = trace_id {
            error = error.try_with_trace_id(trace_id)?;
        }
        error.details = details;
        Ok(error)
    }
}
