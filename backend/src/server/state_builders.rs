//! Assembly of the HTTP port bundle from the production adapters.

use std::sync::Arc;

use chrono::TimeDelta;
use mockable::Clock;

use callboard::inbound::http::state::{DrivenPorts, HttpStatePorts};
use callboard::outbound::persistence::{
    DbPool, DieselCallLogRepository, DieselLogListRepository, DieselUserRepository,
};
use callboard::outbound::security::{Argon2PasswordHasher, JwtTokenService};

/// Signing material and lifetime for session tokens.
pub struct TokenKey<'a> {
    /// HMAC secret.
    pub key: &'a [u8],
    /// Lifetime of issued tokens.
    pub ttl: TimeDelta,
}

/// Wire the Diesel repositories, Argon2 hashing, and HS256 tokens into the
/// domain services.
pub fn build_http_state(pool: &DbPool, token: TokenKey<'_>, clock: Arc<dyn Clock>) -> HttpStatePorts {
    HttpStatePorts::from_driven(DrivenPorts {
        users: Arc::new(DieselUserRepository::new(pool.clone())),
        lists: Arc::new(DieselLogListRepository::new(pool.clone())),
        calls: Arc::new(DieselCallLogRepository::new(pool.clone())),
        hasher: Arc::new(Argon2PasswordHasher::new()),
        tokens: Arc::new(JwtTokenService::new(token.key, clock.clone())),
        clock,
        token_ttl: token.ttl,
    })
}
