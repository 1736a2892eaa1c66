//! Shared Diesel error classification for the repositories in this module.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use super::pool::PoolError;

/// Extract a readable message from a pool error.
pub(super) fn pool_error_message(error: PoolError) -> String {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    }
}

/// Coarse outcome of a failed Diesel operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum DieselFailure {
    Connection,
    UniqueViolation,
    ForeignKeyViolation,
    /// A serializable transaction lost to a concurrent writer (SQLSTATE 40001).
    SerializationFailure,
    Query(&'static str),
}

impl DieselFailure {
    pub(super) const fn message(self) -> &'static str {
        match self {
            Self::Connection => "database connection error",
            Self::UniqueViolation => "unique constraint violated",
            Self::ForeignKeyViolation => "foreign key constraint violated",
            Self::SerializationFailure => "could not serialize access due to concurrent update",
            Self::Query(message) => message,
        }
    }
}

/// Classify a Diesel error, logging its database detail at debug level.
pub(super) fn classify_diesel_error(error: &DieselError) -> DieselFailure {
    match error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => DieselFailure::Query("record not found"),
        DieselError::QueryBuilderError(_) => DieselFailure::Query("database query error"),
        DieselError::DatabaseError(kind, _) => match kind {
            DatabaseErrorKind::ClosedConnection => DieselFailure::Connection,
            DatabaseErrorKind::UniqueViolation => DieselFailure::UniqueViolation,
            DatabaseErrorKind::ForeignKeyViolation => DieselFailure::ForeignKeyViolation,
            DatabaseErrorKind::SerializationFailure => DieselFailure::SerializationFailure,
            _ => DieselFailure::Query("database error"),
        },
        _ => DieselFailure::Query("database error"),
    }
}
