//! Authorization checks over a resolved identity.
//!
//! A [`Guard`] runs its checks in a fixed order: active account, password
//! rotation, role. Ownership is checked per resource with [`ensure_access`]
//! once the resource has been loaded.

use super::error::detail;
use super::user::{Role, User, UserId};
use super::Error;

/// The user behind the current request.
///
/// Resolved per request; nothing caches the role between requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    user: User,
}

impl Identity {
    /// Wrap a freshly loaded user.
    #[must_use]
    pub const fn new(user: User) -> Self {
        Self { user }
    }

    /// The user behind the request.
    #[must_use]
    pub const fn user(&self) -> &User {
        &self.user
    }

    /// Shorthand for the user identifier.
    #[must_use]
    pub const fn id(&self) -> &UserId {
        self.user.id()
    }

    /// Whether the user holds [`Role::Admin`].
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.user.is_admin()
    }

    /// Give up the wrapper and keep the user.
    #[must_use]
    pub fn into_user(self) -> User {
        self.user
    }
}

/// Anything with a single owning user.
pub trait Owned {
    /// Identifier of the owning user.
    fn owner_id(&self) -> &UserId;
}

/// Administrators see everything; everyone else sees only what they own.
#[must_use]
pub fn can_access(user: &User, resource: &impl Owned) -> bool {
    user.is_admin() || resource.owner_id() == user.id()
}

/// [`can_access`] as a domain error.
pub fn ensure_access(identity: &Identity, resource: &impl Owned) -> Result<(), Error> {
    if can_access(identity.user(), resource) {
        Ok(())
    } else {
        Err(Error::forbidden("resource belongs to another user"))
    }
}

/// Composable pre-conditions for an operation.
///
/// # Examples
/// ```
/// use callboard::domain::access::{Guard, Identity};
/// use callboard::domain::{DisplayName, Role, User, UserId, Username};
///
/// let admin = User::new(
///     UserId::random(),
///     Username::new("root").unwrap(),
///     DisplayName::new("Root").unwrap(),
///     Role::Admin,
///     chrono::Utc::now(),
/// );
/// let identity = Identity::new(admin);
/// assert!(Guard::admin().check(&identity).is_ok());
/// assert!(Guard::member().check(&identity).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Guard {
    role: Option<Role>,
    rotation_exempt: bool,
}

impl Guard {
    /// Any active user whose password is current.
    #[must_use]
    pub const fn session() -> Self {
        Self {
            role: None,
            rotation_exempt: false,
        }
    }

    /// Any active user, even one with a pending password change.
    #[must_use]
    pub const fn rotation_exempt() -> Self {
        Self {
            role: None,
            rotation_exempt: true,
        }
    }

    /// Active administrators with a current password.
    #[must_use]
    pub const fn admin() -> Self {
        Self {
            role: Some(Role::Admin),
            rotation_exempt: false,
        }
    }

    /// Active regular users with a current password.
    #[must_use]
    pub const fn member() -> Self {
        Self {
            role: Some(Role::User),
            rotation_exempt: false,
        }
    }

    /// Apply the checks in order and report the first failure.
    pub fn check(&self, identity: &Identity) -> Result<(), Error> {
        let user = identity.user();
        if !user.is_active() {
            return Err(Error::unauthorized("account is inactive")
                .with_detail_code(detail::INACTIVE_ACCOUNT));
        }
        if !self.rotation_exempt && user.must_change_password() {
            return Err(Error::forbidden("password change required")
                .with_detail_code(detail::PASSWORD_CHANGE_REQUIRED));
        }
        match self.role {
            Some(Role::Admin) if !user.is_admin() => {
                Err(Error::forbidden("administrator role required"))
            }
            Some(Role::User) if user.is_admin() => {
                Err(Error::forbidden("administrators cannot perform this action"))
            }
            _ => Ok(()),
        }
    }
}
