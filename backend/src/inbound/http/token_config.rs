//! Session token configuration parsing and validation.
//!
//! Loads the token signing key and lifetime from environment-driven settings
//! so the rules for debug and release builds are validated consistently and
//! can be tested in isolation.

use std::io;
use std::path::{Path, PathBuf};

use cap_std::{ambient_authority, fs::Dir};
use chrono::TimeDelta;
use mockable::Env;
use rand::RngCore;
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};
use tracing::warn;
use zeroize::Zeroizing;

use crate::domain::DEFAULT_TOKEN_TTL_MINUTES;

const TOKEN_KEY_DEFAULT_PATH: &str = "/var/run/secrets/token_key";
/// Minimum signing key length accepted in release builds.
pub const TOKEN_KEY_MIN_LEN: usize = 32;
const EPHEMERAL_KEY_LEN: usize = 64;
const FINGERPRINT_BYTES: usize = 8;
const KEY_FILE_ENV: &str = "TOKEN_KEY_FILE";
const ALLOW_EPHEMERAL_ENV: &str = "TOKEN_ALLOW_EPHEMERAL";
const TTL_ENV: &str = "TOKEN_TTL_MINUTES";
const BOOL_EXPECTED: &str = "1|0|true|false|yes|no|y|n";
const TTL_EXPECTED: &str = "a positive number of minutes";

/// Build mode for token configuration validation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    /// Debug builds tolerate missing keys and fall back to an ephemeral one.
    Debug,
    /// Release builds require a readable key file of sufficient length.
    Release,
}

impl BuildMode {
    /// Determine the build mode from `cfg!(debug_assertions)`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use callboard::inbound::http::token_config::BuildMode;
    ///
    /// let mode = BuildMode::from_debug_assertions();
    /// if cfg!(debug_assertions) {
    ///     assert_eq!(mode, BuildMode::Debug);
    /// } else {
    ///     assert_eq!(mode, BuildMode::Release);
    /// }
    /// ```
    #[must_use]
    pub fn from_debug_assertions() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }

    fn is_debug(self) -> bool {
        matches!(self, Self::Debug)
    }
}

/// Token settings derived from configuration.
pub struct TokenSettings {
    key: Zeroizing<Vec<u8>>,
    /// Truncated SHA-256 of the key, safe to log.
    pub fingerprint: String,
    /// True when the key was generated for this process only.
    pub ephemeral: bool,
    /// Lifetime of issued tokens.
    pub ttl: TimeDelta,
}

impl TokenSettings {
    /// Raw signing key material. Zeroized when the settings are dropped.
    #[must_use]
    pub fn key(&self) -> &[u8] {
        &self.key
    }
}

impl std::fmt::Debug for TokenSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSettings")
            .field("fingerprint", &self.fingerprint)
            .field("ephemeral", &self.ephemeral)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

/// Errors raised while validating token configuration.
#[derive(thiserror::Error, Debug)]
pub enum TokenConfigError {
    /// A variable is present but contains an invalid value.
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    InvalidEnv {
        /// Name of the environment variable.
        name: &'static str,
        /// Value that failed validation.
        value: String,
        /// Description of the accepted values.
        expected: &'static str,
    },
    /// Reading the key file failed.
    #[error("failed to read token key at {path}: {source}")]
    KeyRead {
        /// Path of the key file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The key file exists but is too short for release builds.
    #[error("token key at {path} too short: need >= {min_len} bytes, got {length}")]
    KeyTooShort {
        /// Path of the key file.
        path: PathBuf,
        /// Actual key length in bytes.
        length: usize,
        /// Minimum required key length in bytes.
        min_len: usize,
    },
    /// Release builds must not allow ephemeral keys.
    #[error("TOKEN_ALLOW_EPHEMERAL must be 0 in release builds")]
    EphemeralNotAllowed,
}

/// Build token settings from environment variables and build mode.
///
/// # Examples
///
/// ```rust
/// use callboard::inbound::http::token_config::{BuildMode, token_settings_from_env};
/// use mockable::MockEnv;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let key_path = std::env::temp_dir().join("token_key_example");
/// std::fs::write(&key_path, vec![b'k'; 32])?;
///
/// let key_path = key_path.to_str().expect("valid path").to_string();
/// let mut env = MockEnv::new();
/// env.expect_string().returning(move |name| match name {
///     "TOKEN_KEY_FILE" => Some(key_path.clone()),
///     _ => None,
/// });
///
/// let settings = token_settings_from_env(&env, BuildMode::Release)?;
/// assert!(!settings.ephemeral);
/// assert_eq!(settings.ttl.num_minutes(), 30);
/// # Ok(())
/// # }
/// ```
pub fn token_settings_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
) -> Result<TokenSettings, TokenConfigError> {
    let allow_ephemeral = allow_ephemeral_from_env(env, mode)?;
    let ttl = ttl_from_env(env, mode)?;
    let (key, ephemeral) = key_from_env(env, mode, allow_ephemeral)?;
    let fingerprint = key_fingerprint(&key);

    Ok(TokenSettings {
        key,
        fingerprint,
        ephemeral,
        ttl,
    })
}

fn allow_ephemeral_from_env<E: Env>(env: &E, mode: BuildMode) -> Result<bool, TokenConfigError> {
    let Some(value) = env.string(ALLOW_EPHEMERAL_ENV) else {
        return Ok(false);
    };
    match parse_bool(&value) {
        Some(true) if mode.is_debug() => Ok(true),
        Some(true) => Err(TokenConfigError::EphemeralNotAllowed),
        Some(false) => Ok(false),
        None if mode.is_debug() => {
            warn!(value = %value, "invalid TOKEN_ALLOW_EPHEMERAL; defaulting to disabled");
            Ok(false)
        }
        None => Err(TokenConfigError::InvalidEnv {
            name: ALLOW_EPHEMERAL_ENV,
            value,
            expected: BOOL_EXPECTED,
        }),
    }
}

fn ttl_from_env<E: Env>(env: &E, mode: BuildMode) -> Result<TimeDelta, TokenConfigError> {
    let default = TimeDelta::minutes(DEFAULT_TOKEN_TTL_MINUTES);
    let Some(value) = env.string(TTL_ENV) else {
        return Ok(default);
    };
    match value.trim().parse::<i64>() {
        Ok(minutes) if minutes > 0 => TimeDelta::try_minutes(minutes).ok_or_else(|| {
            TokenConfigError::InvalidEnv {
                name: TTL_ENV,
                value,
                expected: TTL_EXPECTED,
            }
        }),
        _ if mode.is_debug() => {
            warn!(value = %value, "invalid TOKEN_TTL_MINUTES; using default");
            Ok(default)
        }
        _ => Err(TokenConfigError::InvalidEnv {
            name: TTL_ENV,
            value,
            expected: TTL_EXPECTED,
        }),
    }
}

fn key_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
    allow_ephemeral: bool,
) -> Result<(Zeroizing<Vec<u8>>, bool), TokenConfigError> {
    let path = PathBuf::from(
        env.string(KEY_FILE_ENV)
            .unwrap_or_else(|| TOKEN_KEY_DEFAULT_PATH.to_owned()),
    );

    match read_key(&path) {
        Ok(bytes) => {
            let length = bytes.len();
            if length < TOKEN_KEY_MIN_LEN {
                if mode == BuildMode::Release {
                    return Err(TokenConfigError::KeyTooShort {
                        path,
                        length,
                        min_len: TOKEN_KEY_MIN_LEN,
                    });
                }
                warn!(path = %path.display(), length, "token key shorter than recommended");
            }
            Ok((bytes, false))
        }
        Err(error) if mode.is_debug() || allow_ephemeral => {
            warn!(
                path = %path.display(),
                error = %error,
                "using temporary token key (dev only)"
            );
            Ok((ephemeral_key(), true))
        }
        Err(error) => Err(TokenConfigError::KeyRead {
            path,
            source: error,
        }),
    }
}

fn read_key(path: &Path) -> io::Result<Zeroizing<Vec<u8>>> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    let file_name = path.file_name().ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "key path must name a file")
    })?;
    let directory = Dir::open_ambient_dir(parent, ambient_authority())?;
    directory.read(file_name).map(Zeroizing::new)
}

fn ephemeral_key() -> Zeroizing<Vec<u8>> {
    let mut key = Zeroizing::new(vec![0_u8; EPHEMERAL_KEY_LEN]);
    OsRng.fill_bytes(key.as_mut_slice());
    key
}

/// Truncated SHA-256 fingerprint of signing key material.
///
/// Returns the first 8 bytes of the hash as 16 lowercase hex characters, so
/// operators can tell which key is active without seeing it.
///
/// # Examples
///
/// ```rust
/// use callboard::inbound::http::token_config::key_fingerprint;
///
/// let fp = key_fingerprint(&[b'k'; 32]);
/// assert_eq!(fp.len(), 16);
/// assert!(fp.chars().all(|c| c.is_ascii_hexdigit()));
/// ```
#[must_use]
pub fn key_fingerprint(key: &[u8]) -> String {
    let digest = Sha256::digest(key);
    let prefix: Vec<u8> = digest.iter().copied().take(FINGERPRINT_BYTES).collect();
    hex::encode(prefix)
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" => Some(true),
        "0" | "false" | "no" | "n" => Some(false),
        _ => None,
    }
}
