//! Domain primitives, aggregates, and services.
//!
//! Purpose: Define strongly typed entities for users, log lists, and call
//! records, the access rules that govern them, and the services implementing
//! the driving ports. Types are immutable once constructed and validate their
//! invariants at the boundary.
//!
//! Public surface:
//! - [`Error`] and [`ErrorCode`]: the API error payload and its stable code.
//! - [`User`], [`LogList`], [`CallLog`]: the persisted aggregates.
//! - [`AccountService`], [`SessionService`], [`LogBookService`] and
//!   [`ReportingService`]: driving port implementations.

pub mod access;
pub mod auth;
pub mod call_log;
pub mod error;
pub(crate) mod ids;
pub mod log_list;
pub mod metrics;
pub mod ports;
pub mod trace_id;
pub mod user;

mod account_service;
mod error_mapping;
mod log_book_service;
mod reporting_service;
mod session_service;
#[cfg(test)]
pub(crate) mod test_fixtures;

pub use self::account_service::{AccountService, DEFAULT_TOKEN_TTL_MINUTES};
pub use self::auth::{
    CredentialValidationError, LoginCredentials, MIN_PASSWORD_LENGTH, PasswordChange,
    PasswordDigest, Secret,
};
pub use self::call_log::{
    CallLog, CallLogId, CallType, InvalidCallType, OTHER_CALL_TYPES, SALE_CALL_TYPES,
};
pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::ids::IdParseError;
pub use self::log_book_service::LogBookService;
pub use self::log_list::{LogList, LogListId, LogListName, LogListValidationError};
pub use self::reporting_service::ReportingService;
pub use self::session_service::SessionService;
pub use self::trace_id::TraceId;
pub use self::user::{DisplayName, Role, User, UserId, UserValidationError, Username};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use callboard::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
