//! Translate driven-port failures into API errors.
//!
//! Domain outcomes that carry meaning (duplicate usernames, lost
//! serialisation races) become client errors with a stable `details.code`;
//! infrastructure faults become `service_unavailable` or `internal_error`.

use super::error::detail;
use super::ports::{
    CallLogRepositoryError, LogListRepositoryError, PasswordHashError, TokenError,
    UserPersistenceError,
};
use super::Error;

fn serialization_conflict(message: String) -> Error {
    Error::conflict(format!("concurrent update, retry the request: {message}"))
        .with_detail_code(detail::SERIALIZATION_FAILURE)
}

pub(crate) fn map_user_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserPersistenceError::DuplicateUsername { username } => {
            Error::invalid_request(format!("username {username} is already taken"))
                .with_detail_code(detail::DUPLICATE_USERNAME)
        }
        UserPersistenceError::AdminExists => {
            Error::invalid_request("an administrator already exists")
                .with_detail_code(detail::ADMIN_EXISTS)
        }
        UserPersistenceError::Conflict { message } => serialization_conflict(message),
    }
}

pub(crate) fn map_log_list_error(error: LogListRepositoryError) -> Error {
    match error {
        LogListRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("log list repository unavailable: {message}"))
        }
        LogListRepositoryError::Query { message } => {
            Error::internal(format!("log list repository error: {message}"))
        }
        LogListRepositoryError::OwnerMissing => Error::not_found("log list owner not found"),
        LogListRepositoryError::Conflict { message } => serialization_conflict(message),
    }
}

pub(crate) fn map_call_log_error(error: CallLogRepositoryError) -> Error {
    match error {
        CallLogRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("call log repository unavailable: {message}"))
        }
        CallLogRepositoryError::Query { message } => {
            Error::internal(format!("call log repository error: {message}"))
        }
        CallLogRepositoryError::LogListMissing => Error::not_found("log list not found"),
    }
}

pub(crate) fn map_hash_error(error: PasswordHashError) -> Error {
    Error::internal(error.to_string())
}

pub(crate) fn map_token_error(error: TokenError) -> Error {
    match error {
        TokenError::InvalidToken => Error::unauthorized("invalid or expired session"),
        TokenError::Signing { .. } => Error::internal(error.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    #[case(UserPersistenceError::connection("refused"), ErrorCode::ServiceUnavailable, None)]
    #[case(UserPersistenceError::query("boom"), ErrorCode::InternalError, None)]
    #[case(
        UserPersistenceError::duplicate_username("ada"),
        ErrorCode::InvalidRequest,
        Some(detail::DUPLICATE_USERNAME)
    )]
    #[case(
        UserPersistenceError::admin_exists(),
        ErrorCode::InvalidRequest,
        Some(detail::ADMIN_EXISTS)
    )]
    #[case(
        UserPersistenceError::conflict("40001"),
        ErrorCode::Conflict,
        Some(detail::SERIALIZATION_FAILURE)
    )]
    fn user_errors_map_to_api_codes(
        #[case] error: UserPersistenceError,
        #[case] code: ErrorCode,
        #[case] detail_code: Option<&str>,
    ) {
        let mapped = map_user_error(error);
        assert_eq!(mapped.code(), code);
        assert_eq!(mapped.detail_code(), detail_code);
    }

    #[rstest]
    fn log_list_conflict_is_retryable() {
        let mapped = map_log_list_error(LogListRepositoryError::conflict("lost race"));
        assert_eq!(mapped.code(), ErrorCode::Conflict);
        assert_eq!(mapped.detail_code(), Some(detail::SERIALIZATION_FAILURE));
    }

    #[rstest]
    fn missing_parent_list_is_not_found() {
        let mapped = map_call_log_error(CallLogRepositoryError::log_list_missing());
        assert_eq!(mapped.code(), ErrorCode::NotFound);
    }

    #[rstest]
    fn invalid_token_is_unauthorized() {
        assert_eq!(
            map_token_error(TokenError::invalid_token()).code(),
            ErrorCode::Unauthorized
        );
    }
}
