//! Credential adapters: password digests and signed session tokens.

mod argon2_password_hasher;
mod jwt_token_service;

pub use argon2_password_hasher::{Argon2PasswordHasher, TEMPORARY_PASSWORD_LENGTH};
pub use jwt_token_service::JwtTokenService;
