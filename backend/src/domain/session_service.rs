//! Session resolution service.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::access::Identity;
use super::error::detail;
use super::error_mapping::{map_token_error, map_user_error};
use super::ports::{SessionResolver, TokenService, UserRepository};
use super::Error;

/// Resolves bearer tokens to active users.
///
/// The user row is read on every request, so deactivation and role changes
/// take effect immediately rather than when the token expires.
#[derive(Clone)]
pub struct SessionService<U, T> {
    users: Arc<U>,
    tokens: Arc<T>,
}

impl<U, T> SessionService<U, T> {
    /// Wire the resolver to the user store and token verifier.
    pub fn new(users: Arc<U>, tokens: Arc<T>) -> Self {
        Self { users, tokens }
    }
}

#[async_trait]
impl<U, T> SessionResolver for SessionService<U, T>
where
    U: UserRepository,
    T: TokenService,
{
    async fn resolve(&self, token: &str) -> Result<Identity, Error> {
        let username = self.tokens.verify(token).map_err(map_token_error)?;
        let Some(record) = self
            .users
            .find_by_username(&username)
            .await
            .map_err(map_user_error)?
        else {
            debug!(reason = "unknown_subject", "session rejected");
            return Err(Error::unauthorized("invalid or expired session"));
        };
        if !record.user.is_active() {
            debug!(user_id = %record.user.id(), reason = "inactive", "session rejected");
            return Err(Error::unauthorized("account is inactive")
                .with_detail_code(detail::INACTIVE_ACCOUNT));
        }
        Ok(Identity::new(record.user))
    }
}
