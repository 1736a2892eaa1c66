//! Account domain service.
//!
//! Implements login, first-administrator bootstrap, self-service password
//! changes, and administrator account management over a [`UserRepository`].
//! Security-relevant outcomes are logged without secrets or digests.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::TimeDelta;
use mockable::Clock;
use tracing::{debug, info, warn};

use super::access::{Guard, Identity};
use super::error::detail;
use super::error_mapping::{map_hash_error, map_token_error, map_user_error};
use super::ports::{
    AccountCommand, AdminBootstrap, BootstrapAdminRequest, CreateUserRequest, CreatedUser,
    LoginService, NewUser, PasswordHasher, PasswordReset, SessionGrant, TokenService,
    UserAdministration, UserDeletion, UserPage, UserRecord, UserRepository, UserUpdate,
};
use super::{
    DisplayName, Error, LoginCredentials, MIN_PASSWORD_LENGTH, PasswordChange, PasswordDigest,
    Role, Secret, User, UserId, Username,
};

/// Default lifetime of an issued session token, in minutes.
pub const DEFAULT_TOKEN_TTL_MINUTES: i64 = 30;

/// Account service implementing the credential and administration ports.
#[derive(Clone)]
pub struct AccountService<U, H, T> {
    users: Arc<U>,
    hasher: Arc<H>,
    tokens: Arc<T>,
    clock: Arc<dyn Clock>,
    token_ttl: TimeDelta,
}

impl<U, H, T> AccountService<U, H, T> {
    /// Create a service issuing tokens valid for
    /// [`DEFAULT_TOKEN_TTL_MINUTES`].
    pub fn new(users: Arc<U>, hasher: Arc<H>, tokens: Arc<T>, clock: Arc<dyn Clock>) -> Self {
        Self {
            users,
            hasher,
            tokens,
            clock,
            token_ttl: TimeDelta::minutes(DEFAULT_TOKEN_TTL_MINUTES),
        }
    }

    /// Override the lifetime of issued tokens.
    #[must_use]
    pub fn with_token_ttl(mut self, token_ttl: TimeDelta) -> Self {
        self.token_ttl = token_ttl;
        self
    }
}

impl<U, H, T> AccountService<U, H, T>
where
    U: UserRepository,
    H: PasswordHasher,
    T: TokenService,
{
    fn invalid_credentials() -> Error {
        Error::unauthorized("incorrect username or password")
            .with_detail_code(detail::INVALID_CREDENTIALS)
    }

    fn ensure_password_length(secret: &Secret) -> Result<(), Error> {
        if secret.char_count() < MIN_PASSWORD_LENGTH {
            return Err(Error::invalid_request(format!(
                "password must be at least {MIN_PASSWORD_LENGTH} characters"
            )));
        }
        Ok(())
    }

    async fn load_record(&self, id: &UserId) -> Result<Option<UserRecord>, Error> {
        self.users.find_by_id(id).await.map_err(map_user_error)
    }

    async fn require_user(&self, id: &UserId) -> Result<User, Error> {
        self.load_record(id)
            .await?
            .map(|record| record.user)
            .ok_or_else(|| Error::not_found("user not found"))
    }

    fn new_user(
        &self,
        username: Username,
        display_name: DisplayName,
        role: Role,
        password_digest: PasswordDigest,
    ) -> NewUser {
        NewUser {
            id: UserId::random(),
            username,
            display_name,
            role,
            password_digest,
            must_change_password: false,
            created_by: None,
            created_at: self.clock.utc(),
        }
    }
}

#[async_trait]
impl<U, H, T> LoginService for AccountService<U, H, T>
where
    U: UserRepository,
    H: PasswordHasher,
    T: TokenService,
{
    async fn login(&self, credentials: &LoginCredentials) -> Result<SessionGrant, Error> {
        let Ok(username) = Username::new(credentials.username()) else {
            self.hasher.verify_decoy(credentials.password()).await;
            debug!(reason = "malformed_username", "login rejected");
            return Err(Self::invalid_credentials());
        };
        let Some(record) = self
            .users
            .find_by_username(&username)
            .await
            .map_err(map_user_error)?
        else {
            self.hasher.verify_decoy(credentials.password()).await;
            debug!(reason = "unknown_user", "login rejected");
            return Err(Self::invalid_credentials());
        };

        if !self
            .hasher
            .verify(credentials.password(), &record.password_digest)
            .await
        {
            info!(user_id = %record.user.id(), reason = "bad_password", "login rejected");
            return Err(Self::invalid_credentials());
        }
        if !record.user.is_active() {
            info!(user_id = %record.user.id(), reason = "inactive", "login rejected");
            return Err(Error::unauthorized("account is inactive")
                .with_detail_code(detail::INACTIVE_ACCOUNT));
        }

        let access_token = self
            .tokens
            .issue(record.user.username(), self.token_ttl)
            .map_err(map_token_error)?;
        info!(user_id = %record.user.id(), "session issued");
        Ok(SessionGrant {
            access_token,
            token_type: SessionGrant::TOKEN_TYPE,
            expires_in: self.token_ttl.num_seconds(),
            must_change_password: record.user.must_change_password(),
        })
    }
}

#[async_trait]
impl<U, H, T> AdminBootstrap for AccountService<U, H, T>
where
    U: UserRepository,
    H: PasswordHasher,
    T: TokenService,
{
    async fn init_admin(&self, request: BootstrapAdminRequest) -> Result<User, Error> {
        Self::ensure_password_length(&request.password)?;
        let digest = self
            .hasher
            .hash(&request.password)
            .await
            .map_err(map_hash_error)?;
        let admin = self.new_user(request.username, request.display_name, Role::Admin, digest);

        let user = self
            .users
            .insert_first_admin(&admin)
            .await
            .map_err(map_user_error)?;
        info!(user_id = %user.id(), "first administrator created");
        Ok(user)
    }
}

#[async_trait]
impl<U, H, T> AccountCommand for AccountService<U, H, T>
where
    U: UserRepository,
    H: PasswordHasher,
    T: TokenService,
{
    async fn change_password(&self, identity: &Identity, change: PasswordChange) -> Result<(), Error> {
        Guard::rotation_exempt().check(identity)?;
        let record = self
            .load_record(identity.id())
            .await?
            .ok_or_else(|| Error::unauthorized("account no longer exists"))?;

        if !self
            .hasher
            .verify(change.current(), &record.password_digest)
            .await
        {
            info!(user_id = %identity.id(), reason = "bad_current_password", "password change rejected");
            return Err(Error::invalid_request("current password is incorrect")
                .with_detail_code(detail::INVALID_CREDENTIALS));
        }

        let digest = self
            .hasher
            .hash(change.replacement())
            .await
            .map_err(map_hash_error)?;
        self.users
            .set_password(identity.id(), &digest, false)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::unauthorized("account no longer exists"))?;
        info!(user_id = %identity.id(), "password changed");
        Ok(())
    }
}

#[async_trait]
impl<U, H, T> UserAdministration for AccountService<U, H, T>
where
    U: UserRepository,
    H: PasswordHasher,
    T: TokenService,
{
    async fn list_users(&self, identity: &Identity, page: UserPage) -> Result<Vec<User>, Error> {
        Guard::admin().check(identity)?;
        self.users.list(page).await.map_err(map_user_error)
    }

    async fn create_user(
        &self,
        identity: &Identity,
        request: CreateUserRequest,
    ) -> Result<CreatedUser, Error> {
        Guard::admin().check(identity)?;
        let (password, generated) = match request.password {
            Some(password) => {
                Self::ensure_password_length(&password)?;
                (password, false)
            }
            None => (self.hasher.generate_temporary(), true),
        };
        let digest = self
            .hasher
            .hash(&password)
            .await
            .map_err(map_hash_error)?;

        let mut new_user =
            self.new_user(request.username, request.display_name, request.role, digest);
        new_user.must_change_password = generated;
        new_user.created_by = Some(*identity.id());

        let user = self.users.insert(&new_user).await.map_err(map_user_error)?;
        info!(
            admin_id = %identity.id(),
            user_id = %user.id(),
            role = user.role().as_str(),
            generated_password = generated,
            "user created"
        );
        Ok(CreatedUser {
            user,
            temporary_password: generated.then_some(password),
        })
    }

    async fn update_user(
        &self,
        identity: &Identity,
        id: &UserId,
        update: UserUpdate,
    ) -> Result<User, Error> {
        Guard::admin().check(identity)?;
        if id == identity.id() {
            if update.is_active == Some(false) {
                return Err(Error::integrity_violation("you cannot deactivate yourself")
                    .with_detail_code(detail::SELF_DEACTIVATION));
            }
            if update.role == Some(Role::User) {
                return Err(Error::integrity_violation("you cannot remove your own admin role")
                    .with_detail_code(detail::SELF_DEMOTION));
            }
        }
        if update.is_empty() {
            return self.require_user(id).await;
        }

        let user = self
            .users
            .update(id, &update)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::not_found("user not found"))?;
        info!(admin_id = %identity.id(), user_id = %id, "user updated");
        Ok(user)
    }

    async fn set_active(&self, identity: &Identity, id: &UserId, active: bool) -> Result<User, Error> {
        let update = UserUpdate {
            is_active: Some(active),
            ..UserUpdate::default()
        };
        self.update_user(identity, id, update).await
    }

    async fn delete_user(&self, identity: &Identity, id: &UserId) -> Result<(), Error> {
        Guard::admin().check(identity)?;
        if id == identity.id() {
            return Err(Error::integrity_violation("you cannot delete yourself")
                .with_detail_code(detail::SELF_DELETION));
        }

        match self
            .users
            .delete_without_call_logs(id)
            .await
            .map_err(map_user_error)?
        {
            UserDeletion::Deleted => {
                info!(admin_id = %identity.id(), user_id = %id, "user deleted");
                Ok(())
            }
            UserDeletion::HasCallLogs => {
                warn!(admin_id = %identity.id(), user_id = %id, "refused to delete user with call records");
                Err(Error::integrity_violation(
                    "cannot delete a user who has logged calls; deactivate the account instead",
                )
                .with_detail_code(detail::USER_HAS_CALL_LOGS))
            }
            UserDeletion::NotFound => Err(Error::not_found("user not found")),
        }
    }

    async fn reset_password(&self, identity: &Identity, id: &UserId) -> Result<PasswordReset, Error> {
        Guard::admin().check(identity)?;
        let temporary_password = self.hasher.generate_temporary();
        let digest = self
            .hasher
            .hash(&temporary_password)
            .await
            .map_err(map_hash_error)?;

        let user = self
            .users
            .set_password(id, &digest, true)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::not_found("user not found"))?;
        info!(admin_id = %identity.id(), user_id = %id, "password reset");
        Ok(PasswordReset {
            user,
            temporary_password,
        })
    }
}

#[cfg(test)]
#[path = "account_service_tests.rs"]
mod tests;
