//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.
//!
//! The first-administrator bootstrap and guarded deletion each run in one
//! serializable transaction, so concurrent requests cannot both pass the
//! existence check.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel_async::RunQueryDsl;
use diesel_async::scoped_futures::ScopedFutureExt;
use uuid::Uuid;

use crate::domain::ports::{
    NewUser, UserDeletion, UserPage, UserPersistenceError, UserRecord, UserRepository, UserUpdate,
};
use crate::domain::{DisplayName, PasswordDigest, Role, User, UserId, Username};

use super::diesel_error_mapping::{DieselFailure, classify_diesel_error, pool_error_message};
use super::models::{NewUserRow, PasswordChangeset, UserChangeset, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::{call_logs, log_lists, users};

/// Diesel-backed implementation of the `UserRepository` port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserPersistenceError {
    UserPersistenceError::connection(pool_error_message(error))
}

fn map_diesel_error(error: DieselError) -> UserPersistenceError {
    match classify_diesel_error(&error) {
        DieselFailure::Connection => UserPersistenceError::connection(DieselFailure::Connection.message()),
        DieselFailure::SerializationFailure => {
            UserPersistenceError::conflict(DieselFailure::SerializationFailure.message())
        }
        other => UserPersistenceError::query(other.message()),
    }
}

fn map_insert_error(error: DieselError, username: &Username) -> UserPersistenceError {
    if classify_diesel_error(&error) == DieselFailure::UniqueViolation {
        return UserPersistenceError::duplicate_username(username.as_ref());
    }
    map_diesel_error(error)
}

/// Convert a database row to a domain user, rejecting corrupt values.
fn row_to_user(row: UserRow) -> Result<UserRecord, UserPersistenceError> {
    let corrupt = |field: &str, err: &dyn std::fmt::Display| {
        UserPersistenceError::query(format!("stored user {} has invalid {field}: {err}", row.id))
    };
    let username = Username::new(&row.username).map_err(|err| corrupt("username", &err))?;
    let display_name =
        DisplayName::new(&row.display_name).map_err(|err| corrupt("display_name", &err))?;
    let role: Role = row.role.parse().map_err(|err| corrupt("role", &err))?;

    let user = User::new(
        UserId::from_uuid(row.id),
        username,
        display_name,
        role,
        row.created_at,
    )
    .with_active(row.is_active)
    .with_must_change_password(row.must_change_password)
    .with_created_by(row.created_by_id.map(UserId::from_uuid));
    Ok(UserRecord {
        user,
        password_digest: PasswordDigest::new(row.password_hash),
    })
}

fn new_user_row(user: &NewUser) -> NewUserRow<'_> {
    NewUserRow {
        id: *user.id.as_uuid(),
        username: user.username.as_ref(),
        display_name: user.display_name.as_ref(),
        password_hash: user.password_digest.as_ref(),
        role: user.role.as_str(),
        is_active: true,
        must_change_password: user.must_change_password,
        created_by_id: user.created_by.map(|id| *id.as_uuid()),
        created_at: user.created_at,
    }
}

fn into_users(rows: Vec<UserRow>) -> Result<Vec<User>, UserPersistenceError> {
    rows.into_iter()
        .map(|row| row_to_user(row).map(|record| record.user))
        .collect()
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<UserRecord>, UserPersistenceError> {
        let mut conn = self.pool.connection().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = users::table
            .find(id.as_uuid())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_user).transpose()
    }

    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<UserRecord>, UserPersistenceError> {
        let mut conn = self.pool.connection().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = users::table
            .filter(users::username.eq(username.as_ref()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_user).transpose()
    }

    async fn find_many(&self, ids: &[UserId]) -> Result<Vec<User>, UserPersistenceError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.pool.connection().await.map_err(map_pool_error)?;
        let uuids: Vec<Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();

        let rows: Vec<UserRow> = users::table
            .filter(users::id.eq_any(uuids))
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        into_users(rows)
    }

    async fn list(&self, page: UserPage) -> Result<Vec<User>, UserPersistenceError> {
        let mut conn = self.pool.connection().await.map_err(map_pool_error)?;

        let rows: Vec<UserRow> = users::table
            .select(UserRow::as_select())
            .order_by((users::created_at.asc(), users::id.asc()))
            .offset(i64::from(page.skip))
            .limit(i64::from(page.limit))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        into_users(rows)
    }

    async fn insert(&self, user: &NewUser) -> Result<User, UserPersistenceError> {
        let mut conn = self.pool.connection().await.map_err(map_pool_error)?;

        let row: UserRow = diesel::insert_into(users::table)
            .values(&new_user_row(user))
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|err| map_insert_error(err, &user.username))?;

        row_to_user(row).map(|record| record.user)
    }

    async fn insert_first_admin(&self, admin: &NewUser) -> Result<User, UserPersistenceError> {
        let mut conn = self.pool.connection().await.map_err(map_pool_error)?;

        let outcome: Result<Option<UserRow>, DieselError> = conn
            .build_transaction()
            .serializable()
            .run(|conn| {
                async move {
                    let admins: i64 = users::table
                        .filter(users::role.eq(Role::Admin.as_str()))
                        .count()
                        .get_result(conn)
                        .await?;
                    if admins > 0 {
                        return Ok(None);
                    }
                    let row = diesel::insert_into(users::table)
                        .values(&new_user_row(admin))
                        .returning(UserRow::as_returning())
                        .get_result(conn)
                        .await?;
                    Ok(Some(row))
                }
                .scope_boxed()
            })
            .await;

        match outcome.map_err(|err| map_insert_error(err, &admin.username))? {
            Some(row) => row_to_user(row).map(|record| record.user),
            None => Err(UserPersistenceError::admin_exists()),
        }
    }

    async fn update(
        &self,
        id: &UserId,
        update: &UserUpdate,
    ) -> Result<Option<User>, UserPersistenceError> {
        if update.is_empty() {
            return Ok(self.find_by_id(id).await?.map(|record| record.user));
        }
        let mut conn = self.pool.connection().await.map_err(map_pool_error)?;
        let changeset = UserChangeset {
            display_name: update.display_name.as_ref().map(AsRef::as_ref),
            role: update.role.map(Role::as_str),
            is_active: update.is_active,
        };

        let row: Option<UserRow> = diesel::update(users::table.find(id.as_uuid()))
            .set(&changeset)
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(|row| row_to_user(row).map(|record| record.user))
            .transpose()
    }

    async fn set_password(
        &self,
        id: &UserId,
        digest: &PasswordDigest,
        must_change_password: bool,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.connection().await.map_err(map_pool_error)?;
        let changeset = PasswordChangeset {
            password_hash: digest.as_ref(),
            must_change_password,
        };

        let row: Option<UserRow> = diesel::update(users::table.find(id.as_uuid()))
            .set(&changeset)
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(|row| row_to_user(row).map(|record| record.user))
            .transpose()
    }

    async fn delete_without_call_logs(
        &self,
        id: &UserId,
    ) -> Result<UserDeletion, UserPersistenceError> {
        let mut conn = self.pool.connection().await.map_err(map_pool_error)?;
        let user_id = *id.as_uuid();

        let outcome: Result<UserDeletion, DieselError> = conn
            .build_transaction()
            .serializable()
            .run(|conn| {
                async move {
                    let existing: Option<Uuid> = users::table
                        .find(user_id)
                        .select(users::id)
                        .first(conn)
                        .await
                        .optional()?;
                    if existing.is_none() {
                        return Ok(UserDeletion::NotFound);
                    }
                    let calls: i64 = call_logs::table
                        .inner_join(log_lists::table)
                        .filter(log_lists::owner_id.eq(user_id))
                        .count()
                        .get_result(conn)
                        .await?;
                    if calls > 0 {
                        return Ok(UserDeletion::HasCallLogs);
                    }
                    diesel::delete(users::table.find(user_id))
                        .execute(conn)
                        .await?;
                    Ok(UserDeletion::Deleted)
                }
                .scope_boxed()
            })
            .await;

        outcome.map_err(map_diesel_error)
    }
}
