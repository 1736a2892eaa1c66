//! Driving port for self-service account changes.

use async_trait::async_trait;

use crate::domain::access::Identity;
use crate::domain::{Error, PasswordChange};

/// Self-service account changes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountCommand: Send + Sync {
    /// Replace the caller's password and clear the rotation flag.
    ///
    /// Allowed while a rotation is pending; the current password must match.
    async fn change_password(&self, identity: &Identity, change: PasswordChange)
    -> Result<(), Error>;
}
