//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. Conversions into domain types validate
//! stored values and report corrupt rows as query errors.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{call_logs, log_lists, users};

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub display_name: String,
    pub password_hash: String,
    pub role: String,
    pub is_active: bool,
    pub must_change_password: bool,
    pub created_by_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for creating new user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub username: &'a str,
    pub display_name: &'a str,
    pub password_hash: &'a str,
    pub role: &'a str,
    pub is_active: bool,
    pub must_change_password: bool,
    pub created_by_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Partial changeset for administrator edits; `None` fields are skipped.
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = users)]
pub(crate) struct UserChangeset<'a> {
    pub display_name: Option<&'a str>,
    pub role: Option<&'a str>,
    pub is_active: Option<bool>,
}

/// Changeset replacing a password digest and its rotation flag together.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = users)]
pub(crate) struct PasswordChangeset<'a> {
    pub password_hash: &'a str,
    pub must_change_password: bool,
}

/// Row struct for the log_lists table; also insertable as-is.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = log_lists)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct LogListRow {
    pub id: Uuid,
    pub name: String,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Row struct for the call_logs table; also insertable as-is.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = call_logs)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CallLogRow {
    pub id: Uuid,
    pub call_type: String,
    pub log_list_id: Uuid,
    pub timestamp: DateTime<Utc>,
}
