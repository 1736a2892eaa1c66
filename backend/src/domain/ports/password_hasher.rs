//! Port for one-way secret hashing.

use async_trait::async_trait;

use crate::domain::{PasswordDigest, Secret};

use super::define_port_error;

define_port_error! {
    /// Errors raised while producing a digest.
    pub enum PasswordHashError {
        /// The hashing backend rejected the input or its parameters.
        Hashing { message: String } => "password hashing failed: {message}",
    }
}

/// Salted, slow one-way hashing.
///
/// Hashing and verification are CPU-bound; adapters run them off the async
/// executor.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PasswordHasher: Send + Sync {
    /// Digest `secret` under a fresh salt.
    async fn hash(&self, secret: &Secret) -> Result<PasswordDigest, PasswordHashError>;

    /// Whether `secret` matches `digest`. A malformed digest is a mismatch,
    /// never an error.
    async fn verify(&self, secret: &Secret, digest: &PasswordDigest) -> bool;

    /// Spend the work of one failed [`Self::verify`] when there is no stored
    /// digest to check, so an unknown username costs as much as a wrong
    /// password.
    async fn verify_decoy(&self, secret: &Secret);

    /// A fresh system-generated secret for temporary passwords.
    fn generate_temporary(&self) -> Secret;
}
