//! Credentials, secrets, and password-change requests.
//!
//! Plaintext secrets live in [`Zeroizing`] buffers and never implement
//! `Serialize`; only [`PasswordDigest`] values reach persistence.

use std::fmt;

use zeroize::Zeroizing;

/// Shortest password accepted when a user picks their own.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Validation errors raised while building credentials or a password change.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialValidationError {
    /// Username is blank after trimming.
    #[error("username must not be empty")]
    EmptyUsername,
    /// Password is empty.
    #[error("password must not be empty")]
    EmptyPassword,
    /// Replacement password is shorter than [`MIN_PASSWORD_LENGTH`].
    #[error("new password must be at least {min} characters")]
    PasswordTooShort {
        /// Required length in characters.
        min: usize,
    },
    /// Replacement password equals the current one.
    #[error("new password must differ from the current password")]
    PasswordUnchanged,
}

/// A plaintext secret, wiped from memory on drop.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(Zeroizing<String>);

impl Secret {
    /// Take ownership of a plaintext secret.
    pub fn new(value: impl Into<String>) -> Self {
        Self(Zeroizing::new(value.into()))
    }

    /// Borrow the plaintext. Keep the borrow short.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }

    /// Length in characters, not bytes.
    #[must_use]
    pub fn char_count(&self) -> usize {
        self.0.chars().count()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(..)")
    }
}

/// Salted one-way digest of a secret in PHC string form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordDigest(String);

impl PasswordDigest {
    /// Wrap a stored PHC string without parsing it.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }
}

impl AsRef<str> for PasswordDigest {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Validated login credentials.
///
/// ## Invariants
/// - `username` is trimmed and non-empty.
/// - `password` is non-empty and keeps caller-provided whitespace.
///
/// # Examples
/// ```
/// use callboard::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" ada ", "hunter22").unwrap();
/// assert_eq!(creds.username(), "ada");
/// assert_eq!(creds.password().expose(), "hunter22");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    username: String,
    password: Secret,
}

impl LoginCredentials {
    /// Trim the username and reject empty fields.
    pub fn try_from_parts(
        username: &str,
        password: &str,
    ) -> Result<Self, CredentialValidationError> {
        let normalized = username.trim();
        if normalized.is_empty() {
            return Err(CredentialValidationError::EmptyUsername);
        }
        if password.is_empty() {
            return Err(CredentialValidationError::EmptyPassword);
        }
        Ok(Self {
            username: normalized.to_owned(),
            password: Secret::new(password),
        })
    }

    /// Trimmed login name.
    #[must_use]
    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    /// Submitted password, untrimmed.
    #[must_use]
    pub const fn password(&self) -> &Secret {
        &self.password
    }
}

/// A request to replace one's own password.
#[derive(Debug, Clone)]
pub struct PasswordChange {
    current: Secret,
    replacement: Secret,
}

impl PasswordChange {
    /// Validate the replacement against the length floor and the current
    /// password.
    pub fn try_new(current: &str, replacement: &str) -> Result<Self, CredentialValidationError> {
        if current.is_empty() {
            return Err(CredentialValidationError::EmptyPassword);
        }
        let replacement = Secret::new(replacement);
        if replacement.char_count() < MIN_PASSWORD_LENGTH {
            return Err(CredentialValidationError::PasswordTooShort {
                min: MIN_PASSWORD_LENGTH,
            });
        }
        if replacement.expose() == current {
            return Err(CredentialValidationError::PasswordUnchanged);
        }
        Ok(Self {
            current: Secret::new(current),
            replacement,
        })
    }

    /// Password the caller claims to hold now.
    #[must_use]
    pub const fn current(&self) -> &Secret {
        &self.current
    }

    /// Validated new password.
    #[must_use]
    pub const fn replacement(&self) -> &Secret {
        &self.replacement
    }
}
