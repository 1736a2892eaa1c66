//! Argon2id implementation of the `PasswordHasher` port.
//!
//! Digests are PHC strings carrying their own salt and parameters, so
//! parameter changes do not invalidate stored passwords. Every hash and
//! verification runs on tokio's blocking pool.

use std::sync::{Arc, OnceLock};

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{
    PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString,
};
use async_trait::async_trait;
use rand::seq::SliceRandom;
use tracing::warn;

use crate::domain::ports::{PasswordHashError, PasswordHasher};
use crate::domain::{PasswordDigest, Secret};

/// Length of system-generated temporary passwords.
pub const TEMPORARY_PASSWORD_LENGTH: usize = 12;

const TEMPORARY_ALPHABET: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789!@#$%^&*";

const DECOY_SECRET: &str = "callboard-decoy-secret";

/// Argon2id hasher with the crate's default parameters.
#[derive(Debug, Default, Clone)]
pub struct Argon2PasswordHasher {
    argon2: Argon2<'static>,
    decoy: Arc<OnceLock<PasswordDigest>>,
}

impl Argon2PasswordHasher {
    /// Argon2id with the crate defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn hash_with(argon2: &Argon2<'_>, secret: &Secret) -> Result<PasswordDigest, PasswordHashError> {
    let salt = SaltString::generate(&mut OsRng);
    let digest = argon2
        .hash_password(secret.expose().as_bytes(), &salt)
        .map_err(|err| PasswordHashError::hashing(err.to_string()))?;
    Ok(PasswordDigest::new(digest.to_string()))
}

fn verify_with(argon2: &Argon2<'_>, secret: &Secret, digest: &PasswordDigest) -> bool {
    let parsed = match PasswordHash::new(digest.as_ref()) {
        Ok(parsed) => parsed,
        Err(err) => {
            warn!(error = %err, "stored password digest is malformed");
            return false;
        }
    };
    argon2
        .verify_password(secret.expose().as_bytes(), &parsed)
        .is_ok()
}

async fn off_executor<R, F>(work: F) -> Result<R, PasswordHashError>
where
    R: Send + 'static,
    F: FnOnce() -> R + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|err| PasswordHashError::hashing(err.to_string()))
}

#[async_trait]
impl PasswordHasher for Argon2PasswordHasher {
    async fn hash(&self, secret: &Secret) -> Result<PasswordDigest, PasswordHashError> {
        let argon2 = self.argon2.clone();
        let secret = secret.clone();
        off_executor(move || hash_with(&argon2, &secret)).await?
    }

    async fn verify(&self, secret: &Secret, digest: &PasswordDigest) -> bool {
        let argon2 = self.argon2.clone();
        let secret = secret.clone();
        let digest = digest.clone();
        match off_executor(move || verify_with(&argon2, &secret, &digest)).await {
            Ok(matched) => matched,
            Err(err) => {
                warn!(error = %err, "password verification task failed");
                false
            }
        }
    }

    async fn verify_decoy(&self, secret: &Secret) {
        let argon2 = self.argon2.clone();
        let decoy = Arc::clone(&self.decoy);
        let secret = secret.clone();
        let outcome = off_executor(move || match decoy.get() {
            Some(digest) => {
                verify_with(&argon2, &secret, digest);
            }
            // The first call pays for minting the decoy digest instead.
            None => {
                if let Ok(digest) = hash_with(&argon2, &Secret::new(DECOY_SECRET)) {
                    decoy.get_or_init(|| digest);
                }
            }
        })
        .await;
        if let Err(err) = outcome {
            warn!(error = %err, "decoy verification task failed");
        }
    }

    fn generate_temporary(&self) -> Secret {
        let mut rng = rand::thread_rng();
        let password: String = (0..TEMPORARY_PASSWORD_LENGTH)
            .filter_map(|_| TEMPORARY_ALPHABET.choose(&mut rng).copied().map(char::from))
            .collect();
        Secret::new(password)
    }
}
