//! Driving port for administrator account management.

use async_trait::async_trait;

use crate::domain::access::Identity;
use crate::domain::{DisplayName, Error, Role, Secret, User, UserId, Username};

use super::{UserPage, UserUpdate};

/// Validated input for [`UserAdministration::create_user`].
#[derive(Debug, Clone)]
pub struct CreateUserRequest {
    /// Login name.
    pub username: Username,
    /// Name shown in reports.
    pub display_name: DisplayName,
    /// Role of the new account.
    pub role: Role,
    /// When absent a temporary password is generated and the user must
    /// change it on first use.
    pub password: Option<Secret>,
}

/// Result of [`UserAdministration::create_user`].
#[derive(Debug, Clone)]
pub struct CreatedUser {
    /// The stored account.
    pub user: User,
    /// Present only when the system generated the password.
    pub temporary_password: Option<Secret>,
}

/// Result of [`UserAdministration::reset_password`].
#[derive(Debug, Clone)]
pub struct PasswordReset {
    /// The updated account.
    pub user: User,
    /// One-time password to hand to the user.
    pub temporary_password: Secret,
}

/// Every method requires an active administrator with a current password.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserAdministration: Send + Sync {
    /// Page through accounts by creation time.
    async fn list_users(&self, identity: &Identity, page: UserPage) -> Result<Vec<User>, Error>;

    /// Create an account; duplicate usernames are refused.
    async fn create_user(
        &self,
        identity: &Identity,
        request: CreateUserRequest,
    ) -> Result<CreatedUser, Error>;

    /// Administrators may not deactivate or demote themselves.
    async fn update_user(
        &self,
        identity: &Identity,
        id: &UserId,
        update: UserUpdate,
    ) -> Result<User, Error>;

    /// Switch an account on or off. Self-deactivation is refused.
    async fn set_active(&self, identity: &Identity, id: &UserId, active: bool)
    -> Result<User, Error>;

    /// Refuses self-deletion and users who still own call records.
    async fn delete_user(&self, identity: &Identity, id: &UserId) -> Result<(), Error>;

    /// Issue a temporary password and force a change on next use.
    async fn reset_password(&self, identity: &Identity, id: &UserId)
    -> Result<PasswordReset, Error>;
}
