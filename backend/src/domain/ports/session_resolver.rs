//! Driving port turning a raw session token into an identity.

use async_trait::async_trait;

use crate::domain::Error;
use crate::domain::access::Identity;

/// Token to identity resolution.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionResolver: Send + Sync {
    /// Resolve `token` to an active user.
    ///
    /// A bad signature, an expired token, an unknown subject, and an
    /// inactive account all fail with `Unauthorized`.
    async fn resolve(&self, token: &str) -> Result<Identity, Error>;
}
