//! Driving port for creating the first administrator.

use async_trait::async_trait;

use crate::domain::{DisplayName, Error, Secret, User, Username};

/// Validated input for [`AdminBootstrap::init_admin`].
#[derive(Debug, Clone)]
pub struct BootstrapAdminRequest {
    /// Login name of the new administrator.
    pub username: Username,
    /// Name shown in reports.
    pub display_name: DisplayName,
    /// Chosen password; no rotation is forced.
    pub password: Secret,
}

/// First-administrator bootstrap.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AdminBootstrap: Send + Sync {
    /// Create an administrator when none exists.
    ///
    /// Fails with `InvalidRequest` (`details.code = "admin_exists"`) once any
    /// administrator is present.
    async fn init_admin(&self, request: BootstrapAdminRequest) -> Result<User, Error>;
}
