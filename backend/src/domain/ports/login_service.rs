//! Driving port for exchanging credentials for a session token.

use async_trait::async_trait;
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{Error, LoginCredentials};

/// A freshly issued session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct SessionGrant {
    /// Signed bearer token.
    pub access_token: String,
    /// Always [`SessionGrant::TOKEN_TYPE`].
    #[schema(value_type = String, example = "bearer")]
    pub token_type: &'static str,
    /// Seconds until the token expires.
    pub expires_in: i64,
    /// Set when the account holds a temporary password.
    pub must_change_password: bool,
}

impl SessionGrant {
    /// OAuth2 token type reported to clients.
    pub const TOKEN_TYPE: &'static str = "bearer";
}

/// Credential exchange.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Verify credentials and issue a token.
    ///
    /// Unknown usernames, wrong passwords, and inactive accounts all fail
    /// with the same `Unauthorized` error.
    async fn login(&self, credentials: &LoginCredentials) -> Result<SessionGrant, Error>;
}
