//! Port for signed, time-limited session tokens.

use chrono::TimeDelta;

use crate::domain::Username;

use super::define_port_error;

define_port_error! {
    /// Token failures. Verification collapses every cause into
    /// `InvalidToken` so callers cannot distinguish forged from expired.
    pub enum TokenError {
        /// Bad signature, wrong algorithm, or past expiry.
        InvalidToken => "session token is invalid or expired",
        /// The signer could not produce a token.
        Signing { message: String } => "session token could not be signed: {message}",
    }
}

/// Signed, time-limited session tokens.
#[cfg_attr(test, mockall::automock)]
pub trait TokenService: Send + Sync {
    /// Sign `{sub, iat, exp = iat + ttl}` for `subject`.
    fn issue(&self, subject: &Username, ttl: TimeDelta) -> Result<String, TokenError>;

    /// Return the subject of a valid, unexpired token.
    fn verify(&self, token: &str) -> Result<Username, TokenError>;
}
