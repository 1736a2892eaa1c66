//! User accounts and the values that describe them.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::ids::uuid_identifier;

uuid_identifier!(
    /// Stable user identifier.
    UserId,
    "user"
);

/// Validation errors raised by the user value types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    /// Username outside the allowed length range.
    #[error("username must be between {min} and {max} characters")]
    UsernameLength {
        /// Lower bound, inclusive.
        min: usize,
        /// Upper bound, inclusive.
        max: usize,
    },
    /// Username contains characters outside the allowed set.
    #[error("username may only contain letters, digits, '.', '_' or '-'")]
    UsernameCharacters,
    /// Display name is blank after trimming.
    #[error("display name must not be empty")]
    EmptyDisplayName,
    /// Display name exceeds [`DISPLAY_NAME_MAX`].
    #[error("display name must be at most {max} characters")]
    DisplayNameTooLong {
        /// Upper bound, inclusive.
        max: usize,
    },
    /// Role text is neither `ADMIN` nor `USER`.
    #[error("role must be ADMIN or USER")]
    UnknownRole,
}

/// Shortest accepted username, in characters.
pub const USERNAME_MIN: usize = 3;
/// Longest accepted username, in characters.
pub const USERNAME_MAX: usize = 50;
/// Longest accepted display name, in characters.
pub const DISPLAY_NAME_MAX: usize = 100;

static USERNAME_RE: OnceLock<Regex> = OnceLock::new();

fn username_regex() -> &'static Regex {
    USERNAME_RE.get_or_init(|| {
        // Length is enforced separately.
        Regex::new("^[A-Za-z0-9_.-]+$")
            .unwrap_or_else(|error| panic!("username regex failed to compile: {error}"))
    })
}

/// Login name. Unique across the system.
///
/// # Examples
/// ```
/// use callboard::domain::Username;
///
/// let name = Username::new("  ada.l ").expect("valid");
/// assert_eq!(name.as_ref(), "ada.l");
/// assert!(Username::new("no spaces").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
#[schema(value_type = String, example = "ada.l")]
pub struct Username(String);

impl Username {
    /// Trim and validate a login name.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = raw.as_ref().trim();
        let length = trimmed.chars().count();
        if !(USERNAME_MIN..=USERNAME_MAX).contains(&length) {
            return Err(UserValidationError::UsernameLength {
                min: USERNAME_MIN,
                max: USERNAME_MAX,
            });
        }
        if !username_regex().is_match(trimmed) {
            return Err(UserValidationError::UsernameCharacters);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

impl TryFrom<String> for Username {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Human readable name shown next to call statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
#[schema(value_type = String, example = "Ada Lovelace")]
pub struct DisplayName(String);

impl DisplayName {
    /// Trim and validate a display name.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyDisplayName);
        }
        if trimmed.chars().count() > DISPLAY_NAME_MAX {
            return Err(UserValidationError::DisplayNameTooLong {
                max: DISPLAY_NAME_MAX,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for DisplayName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<DisplayName> for String {
    fn from(value: DisplayName) -> Self {
        value.0
    }
}

impl TryFrom<String> for DisplayName {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// The single role a user holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    /// Manages users and sees every log list.
    Admin,
    /// Records calls against their own log lists.
    User,
}

impl Role {
    /// Wire and storage spelling of the role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::User => "USER",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UserValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ADMIN" => Ok(Self::Admin),
            "USER" => Ok(Self::User),
            _ => Err(UserValidationError::UnknownRole),
        }
    }
}

/// Application user.
///
/// ## Invariants
/// - exactly one [`Role`];
/// - an inactive user never resolves to a session;
/// - `created_by` is a plain id lookup and never drives cascades.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct User {
    id: UserId,
    username: Username,
    display_name: DisplayName,
    role: Role,
    is_active: bool,
    must_change_password: bool,
    #[serde(rename = "created_by_id")]
    #[schema(value_type = Option<String>)]
    created_by: Option<UserId>,
    created_at: DateTime<Utc>,
}

impl User {
    /// Build an active user with no pending password change.
    #[must_use]
    pub const fn new(
        id: UserId,
        username: Username,
        display_name: DisplayName,
        role: Role,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            username,
            display_name,
            role,
            is_active: true,
            must_change_password: false,
            created_by: None,
            created_at,
        }
    }

    /// Set whether the account may sign in.
    #[must_use]
    pub const fn with_active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }

    /// Flag the account for a forced password rotation.
    #[must_use]
    pub const fn with_must_change_password(mut self, must_change_password: bool) -> Self {
        self.must_change_password = must_change_password;
        self
    }

    /// Record the administrator that created the account.
    #[must_use]
    pub const fn with_created_by(mut self, created_by: Option<UserId>) -> Self {
        self.created_by = created_by;
        self
    }

    /// Replace the display name.
    #[must_use]
    pub fn with_display_name(mut self, display_name: DisplayName) -> Self {
        self.display_name = display_name;
        self
    }

    /// Replace the role.
    #[must_use]
    pub const fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    /// Stable identifier.
    #[must_use]
    pub const fn id(&self) -> &UserId {
        &self.id
    }

    /// Login name.
    #[must_use]
    pub const fn username(&self) -> &Username {
        &self.username
    }

    /// Name shown in reports.
    #[must_use]
    pub const fn display_name(&self) -> &DisplayName {
        &self.display_name
    }

    /// The role held by this user.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Whether the role is [`Role::Admin`].
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Whether the account may sign in.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.is_active
    }

    /// Whether the next request must rotate the password first.
    #[must_use]
    pub const fn must_change_password(&self) -> bool {
        self.must_change_password
    }

    /// Administrator that created the account, if any.
    #[must_use]
    pub const fn created_by(&self) -> Option<&UserId> {
        self.created_by.as_ref()
    }

    /// Creation time.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
