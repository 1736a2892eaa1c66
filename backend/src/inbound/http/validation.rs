//! Shared validation helpers for inbound HTTP adapters.
//!
//! Every failure is an `invalid_request` error whose details name the
//! offending field and a machine-readable code.

use std::str::FromStr;

use serde_json::json;

use crate::domain::{
    CredentialValidationError, DisplayName, Error, IdParseError, LogListName,
    LogListValidationError, Role, UserValidationError, Username,
};

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(self) -> &'static str {
        self.0
    }
}

pub(crate) const USERNAME: FieldName = FieldName::new("username");
pub(crate) const PASSWORD: FieldName = FieldName::new("password");
pub(crate) const NEW_PASSWORD: FieldName = FieldName::new("new_password");
pub(crate) const CURRENT_PASSWORD: FieldName = FieldName::new("current_password");
pub(crate) const DISPLAY_NAME: FieldName = FieldName::new("display_name");
pub(crate) const ROLE: FieldName = FieldName::new("role");
pub(crate) const NAME: FieldName = FieldName::new("name");
pub(crate) const ID: FieldName = FieldName::new("id");
pub(crate) const LOG_LIST_ID: FieldName = FieldName::new("log_list_id");

pub(crate) fn field_error(field: FieldName, code: &str, message: impl Into<String>) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "code": code,
    }))
}

pub(crate) fn invalid_uuid_error(field: FieldName, value: &str) -> Error {
    let field = field.as_str();
    Error::invalid_request(format!("{field} must be a valid UUID")).with_details(json!({
        "field": field,
        "value": value,
        "code": "invalid_uuid",
    }))
}

/// Parse a UUID-backed identifier from a path segment or body field.
pub(crate) fn parse_id<T>(raw: &str, field: FieldName) -> Result<T, Error>
where
    T: FromStr<Err = IdParseError>,
{
    raw.parse().map_err(|_| invalid_uuid_error(field, raw))
}

pub(crate) fn user_validation_error(field: FieldName, err: UserValidationError) -> Error {
    let code = match err {
        UserValidationError::UsernameLength { .. } => "username_length",
        UserValidationError::UsernameCharacters => "username_characters",
        UserValidationError::EmptyDisplayName => "empty_display_name",
        UserValidationError::DisplayNameTooLong { .. } => "display_name_too_long",
        UserValidationError::UnknownRole => "unknown_role",
    };
    field_error(field, code, err.to_string())
}

pub(crate) fn parse_username(raw: &str) -> Result<Username, Error> {
    Username::new(raw).map_err(|err| user_validation_error(USERNAME, err))
}

pub(crate) fn parse_display_name(raw: &str) -> Result<DisplayName, Error> {
    DisplayName::new(raw).map_err(|err| user_validation_error(DISPLAY_NAME, err))
}

pub(crate) fn parse_role(raw: &str) -> Result<Role, Error> {
    raw.trim()
        .to_ascii_uppercase()
        .parse()
        .map_err(|err| user_validation_error(ROLE, err))
}

pub(crate) fn parse_log_list_name(raw: &str) -> Result<LogListName, Error> {
    LogListName::new(raw).map_err(|err| {
        let code = match err {
            LogListValidationError::EmptyName => "empty_name",
            LogListValidationError::NameTooLong { .. } => "name_too_long",
        };
        field_error(NAME, code, err.to_string())
    })
}

/// Map credential shape errors. `password_field` names the field a password
/// failure is reported against.
pub(crate) fn credential_error(err: CredentialValidationError, password_field: FieldName) -> Error {
    match err {
        CredentialValidationError::EmptyUsername => {
            field_error(USERNAME, "empty_username", err.to_string())
        }
        CredentialValidationError::EmptyPassword => {
            field_error(password_field, "empty_password", err.to_string())
        }
        CredentialValidationError::PasswordTooShort { .. } => {
            field_error(NEW_PASSWORD, "password_too_short", err.to_string())
        }
        CredentialValidationError::PasswordUnchanged => {
            field_error(NEW_PASSWORD, "password_unchanged", err.to_string())
        }
    }
}
