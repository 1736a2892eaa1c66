//! Port abstraction for user persistence adapters and their errors.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{DisplayName, PasswordDigest, Role, User, UserId, Username};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// The username is already taken.
        DuplicateUsername { username: String } => "username {username} is already taken",
        /// A bootstrap insert found an existing administrator.
        AdminExists => "an administrator already exists",
        /// A serializable transaction lost a race.
        Conflict { message: String } => "user repository conflict: {message}",
    }
}

/// A user together with the stored digest of their password.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    /// The account.
    pub user: User,
    /// Stored digest of the current password.
    pub password_digest: PasswordDigest,
}

/// Everything needed to insert a user row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    /// Identifier minted by the caller.
    pub id: UserId,
    /// Unique login name.
    pub username: Username,
    /// Name shown in reports.
    pub display_name: DisplayName,
    /// Role of the new account.
    pub role: Role,
    /// Digest of the initial password.
    pub password_digest: PasswordDigest,
    /// Whether the first sign-in must rotate the password.
    pub must_change_password: bool,
    /// Administrator that created the account.
    pub created_by: Option<UserId>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// Partial update applied by administrators. `None` leaves a field alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserUpdate {
    /// New display name.
    pub display_name: Option<DisplayName>,
    /// New role.
    pub role: Option<Role>,
    /// New active flag.
    pub is_active: Option<bool>,
}

impl UserUpdate {
    /// Whether the update changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.display_name.is_none() && self.role.is_none() && self.is_active.is_none()
    }
}

/// Offset pagination for user listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserPage {
    /// Rows to skip.
    pub skip: u32,
    /// Rows to return, at most [`UserPage::MAX_LIMIT`].
    pub limit: u32,
}

impl UserPage {
    /// Page size when the caller gives none.
    pub const DEFAULT_LIMIT: u32 = 100;
    /// Largest page a caller may request.
    pub const MAX_LIMIT: u32 = 500;

    /// Clamp `limit` to `1..=MAX_LIMIT`.
    #[must_use]
    pub fn new(skip: u32, limit: u32) -> Self {
        Self {
            skip,
            limit: limit.clamp(1, Self::MAX_LIMIT),
        }
    }
}

impl Default for UserPage {
    fn default() -> Self {
        Self::new(0, Self::DEFAULT_LIMIT)
    }
}

/// Outcome of a guarded user deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserDeletion {
    /// The user and everything they owned are gone.
    Deleted,
    /// At least one owned list still holds call records; nothing changed.
    HasCallLogs,
    /// No user has that id.
    NotFound,
}

/// Storage for user accounts and their digests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Load one account by id.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<UserRecord>, UserPersistenceError>;

    /// Load one account by exact login name.
    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<UserRecord>, UserPersistenceError>;

    /// Fetch the users with the given ids; unknown ids are skipped.
    async fn find_many(&self, ids: &[UserId]) -> Result<Vec<User>, UserPersistenceError>;

    /// List users ordered by creation time.
    async fn list(&self, page: UserPage) -> Result<Vec<User>, UserPersistenceError>;

    /// Insert a user, failing with `DuplicateUsername` on a taken name.
    async fn insert(&self, user: &NewUser) -> Result<User, UserPersistenceError>;

    /// Insert `admin` only if no administrator exists.
    ///
    /// The existence check and the insert share one serializable
    /// transaction. Fails with `AdminExists` when an administrator is
    /// already present and `Conflict` when a concurrent bootstrap wins.
    async fn insert_first_admin(&self, admin: &NewUser) -> Result<User, UserPersistenceError>;

    /// Apply `update`; `None` when the user is gone.
    async fn update(
        &self,
        id: &UserId,
        update: &UserUpdate,
    ) -> Result<Option<User>, UserPersistenceError>;

    /// Replace the stored digest and set the rotation flag in one statement.
    async fn set_password(
        &self,
        id: &UserId,
        digest: &PasswordDigest,
        must_change_password: bool,
    ) -> Result<Option<User>, UserPersistenceError>;

    /// Delete a user who owns no call records, cascading to their lists.
    ///
    /// The call-record check and the delete share one transaction.
    async fn delete_without_call_logs(
        &self,
        id: &UserId,
    ) -> Result<UserDeletion, UserPersistenceError>;
}
