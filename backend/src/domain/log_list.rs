//! Log lists: named, singly-owned collections of call records.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::access::Owned;
use super::ids::uuid_identifier;
use super::user::UserId;

uuid_identifier!(
    /// Stable log list identifier.
    LogListId,
    "log list"
);

/// Longest accepted log list name, in characters.
pub const LOG_LIST_NAME_MAX: usize = 100;

/// Validation errors raised by [`LogListName`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LogListValidationError {
    /// Name is blank after trimming.
    #[error("log list name must not be empty")]
    EmptyName,
    /// Name exceeds [`LOG_LIST_NAME_MAX`].
    #[error("log list name must be at most {max} characters")]
    NameTooLong {
        /// Upper bound, inclusive.
        max: usize,
    },
}

/// Log list name. Names may repeat across owners.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
#[schema(value_type = String, example = "Monday morning")]
pub struct LogListName(String);

impl LogListName {
    /// Trim and validate a list name.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, LogListValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(LogListValidationError::EmptyName);
        }
        if trimmed.chars().count() > LOG_LIST_NAME_MAX {
            return Err(LogListValidationError::NameTooLong {
                max: LOG_LIST_NAME_MAX,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for LogListName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LogListName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<LogListName> for String {
    fn from(value: LogListName) -> Self {
        value.0
    }
}

impl TryFrom<String> for LogListName {
    type Error = LogListValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// A named collection of call records owned by exactly one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct LogList {
    id: LogListId,
    name: LogListName,
    owner_id: UserId,
    created_at: DateTime<Utc>,
}

impl LogList {
    /// Assemble a list from stored or freshly minted parts.
    #[must_use]
    pub const fn new(
        id: LogListId,
        name: LogListName,
        owner_id: UserId,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            owner_id,
            created_at,
        }
    }

    /// Stable identifier.
    #[must_use]
    pub const fn id(&self) -> &LogListId {
        &self.id
    }

    /// Display name of the list.
    #[must_use]
    pub const fn name(&self) -> &LogListName {
        &self.name
    }

    /// The single owning user.
    #[must_use]
    pub const fn owner_id(&self) -> &UserId {
        &self.owner_id
    }

    /// Creation time.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl Owned for LogList {
    fn owner_id(&self) -> &UserId {
        &self.owner_id
    }
}
