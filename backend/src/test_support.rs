//! Test utilities for the callboard crate.
//!
//! Shared by unit tests in `src/` and the integration suites in `tests/`.
//! Compiled for tests and when the `test-support` feature is enabled.

pub mod clock {
    //! A controllable wall clock.

    use std::sync::{Mutex, PoisonError};

    use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
    use mockable::Clock;

    /// Clock that only moves when told to.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use callboard::test_support::clock::MutableClock;
    /// use chrono::TimeDelta;
    /// use mockable::Clock;
    ///
    /// let clock = MutableClock::default();
    /// let start = clock.utc();
    /// clock.advance(TimeDelta::minutes(31));
    /// assert_eq!(clock.utc() - start, TimeDelta::minutes(31));
    /// ```
    #[derive(Debug)]
    pub struct MutableClock {
        now: Mutex<DateTime<Utc>>,
    }

    impl MutableClock {
        /// Start the clock at `now`.
        pub fn new(now: DateTime<Utc>) -> Self {
            Self {
                now: Mutex::new(now),
            }
        }

        /// Move the clock forward.
        pub fn advance(&self, by: TimeDelta) {
            let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
            *now += by;
        }
    }

    impl Default for MutableClock {
        fn default() -> Self {
            let start = Utc
                .with_ymd_and_hms(2026, 1, 5, 9, 0, 0)
                .single()
                .unwrap_or_else(Utc::now);
            Self::new(start)
        }
    }

    impl Clock for MutableClock {
        fn local(&self) -> DateTime<Local> {
            self.utc().with_timezone(&Local)
        }

        fn utc(&self) -> DateTime<Utc> {
            *self.now.lock().unwrap_or_else(PoisonError::into_inner)
        }
    }
}

pub mod hasher {
    //! A password hasher without the Argon2 work factor.

    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;

    use crate::domain::ports::{PasswordHashError, PasswordHasher};
    use crate::domain::{PasswordDigest, Secret};

    const PREFIX: &str = "plain$";

    /// Stores secrets behind a marker prefix and mints numbered temporary
    /// passwords (`Temp-0001`, `Temp-0002`, ...).
    #[derive(Debug, Default)]
    pub struct FakePasswordHasher {
        issued: AtomicU32,
    }

    #[async_trait]
    impl PasswordHasher for FakePasswordHasher {
        async fn hash(&self, secret: &Secret) -> Result<PasswordDigest, PasswordHashError> {
            Ok(PasswordDigest::new(format!("{PREFIX}{}", secret.expose())))
        }

        async fn verify(&self, secret: &Secret, digest: &PasswordDigest) -> bool {
            digest
                .as_ref()
                .strip_prefix(PREFIX)
                .is_some_and(|stored| stored == secret.expose())
        }

        async fn verify_decoy(&self, _secret: &Secret) {}

        fn generate_temporary(&self) -> Secret {
            let n = self.issued.fetch_add(1, Ordering::Relaxed) + 1;
            Secret::new(format!("Temp-{n:04}"))
        }
    }
}

pub mod store {
    //! In-memory repositories sharing one table set.
    //!
    //! Mirrors the relational adapter's contract: usernames are unique,
    //! deleting a user removes their lists, deleting a list removes its
    //! calls, and listings come back in the same order.

    use std::sync::{Mutex, MutexGuard, PoisonError};

    use async_trait::async_trait;

    use crate::domain::ports::{
        CallLogRepository, CallLogRepositoryError, DeletionScope, LogListDeletion,
        LogListRepository, LogListRepositoryError, NewUser, UserDeletion, UserPage,
        UserPersistenceError, UserRecord, UserRepository, UserUpdate,
    };
    use crate::domain::{
        CallLog, CallLogId, LogList, LogListId, PasswordDigest, Role, User, UserId, Username,
    };

    #[derive(Debug, Default)]
    struct Tables {
        users: Vec<UserRecord>,
        lists: Vec<LogList>,
        calls: Vec<CallLog>,
    }

    /// Implements every repository port over shared in-memory tables.
    ///
    /// Wrap one store in an `Arc` and hand it to each port so lists and
    /// calls see the same users.
    #[derive(Debug, Default)]
    pub struct InMemoryStore {
        tables: Mutex<Tables>,
    }

    impl InMemoryStore {
        /// Empty tables.
        pub fn new() -> Self {
            Self::default()
        }

        fn tables(&self) -> MutexGuard<'_, Tables> {
            self.tables.lock().unwrap_or_else(PoisonError::into_inner)
        }

        /// Stored users.
        pub fn user_count(&self) -> usize {
            self.tables().users.len()
        }

        /// Stored call records.
        pub fn call_count(&self) -> usize {
            self.tables().calls.len()
        }
    }

    fn build_user(new: &NewUser) -> User {
        User::new(
            new.id,
            new.username.clone(),
            new.display_name.clone(),
            new.role,
            new.created_at,
        )
        .with_must_change_password(new.must_change_password)
        .with_created_by(new.created_by)
    }

    fn insert_record(tables: &mut Tables, new: &NewUser) -> Result<User, UserPersistenceError> {
        if tables
            .users
            .iter()
            .any(|record| record.user.username() == &new.username)
        {
            return Err(UserPersistenceError::duplicate_username(
                new.username.to_string(),
            ));
        }
        let user = build_user(new);
        tables.users.push(UserRecord {
            user: user.clone(),
            password_digest: new.password_digest.clone(),
        });
        Ok(user)
    }

    #[async_trait]
    impl UserRepository for InMemoryStore {
        async fn find_by_id(
            &self,
            id: &UserId,
        ) -> Result<Option<UserRecord>, UserPersistenceError> {
            Ok(self
                .tables()
                .users
                .iter()
                .find(|record| record.user.id() == id)
                .cloned())
        }

        async fn find_by_username(
            &self,
            username: &Username,
        ) -> Result<Option<UserRecord>, UserPersistenceError> {
            Ok(self
                .tables()
                .users
                .iter()
                .find(|record| record.user.username() == username)
                .cloned())
        }

        async fn find_many(&self, ids: &[UserId]) -> Result<Vec<User>, UserPersistenceError> {
            Ok(self
                .tables()
                .users
                .iter()
                .filter(|record| ids.contains(record.user.id()))
                .map(|record| record.user.clone())
                .collect())
        }

        async fn list(&self, page: UserPage) -> Result<Vec<User>, UserPersistenceError> {
            let mut users: Vec<User> = self
                .tables()
                .users
                .iter()
                .map(|record| record.user.clone())
                .collect();
            users.sort_by_key(|user| (user.created_at(), *user.id().as_uuid()));
            Ok(users
                .into_iter()
                .skip(page.skip as usize)
                .take(page.limit as usize)
                .collect())
        }

        async fn insert(&self, user: &NewUser) -> Result<User, UserPersistenceError> {
            insert_record(&mut self.tables(), user)
        }

        async fn insert_first_admin(&self, admin: &NewUser) -> Result<User, UserPersistenceError> {
            let mut tables = self.tables();
            if tables
                .users
                .iter()
                .any(|record| record.user.role() == Role::Admin)
            {
                return Err(UserPersistenceError::admin_exists());
            }
            insert_record(&mut tables, admin)
        }

        async fn update(
            &self,
            id: &UserId,
            update: &UserUpdate,
        ) -> Result<Option<User>, UserPersistenceError> {
            let mut tables = self.tables();
            let Some(record) = tables.users.iter_mut().find(|record| record.user.id() == id)
            else {
                return Ok(None);
            };
            let mut user = record.user.clone();
            if let Some(name) = &update.display_name {
                user = user.with_display_name(name.clone());
            }
            if let Some(role) = update.role {
                user = user.with_role(role);
            }
            if let Some(active) = update.is_active {
                user = user.with_active(active);
            }
            record.user = user.clone();
            Ok(Some(user))
        }

        async fn set_password(
            &self,
            id: &UserId,
            digest: &PasswordDigest,
            must_change_password: bool,
        ) -> Result<Option<User>, UserPersistenceError> {
            let mut tables = self.tables();
            let Some(record) = tables.users.iter_mut().find(|record| record.user.id() == id)
            else {
                return Ok(None);
            };
            record.user = record
                .user
                .clone()
                .with_must_change_password(must_change_password);
            record.password_digest = digest.clone();
            Ok(Some(record.user.clone()))
        }

        async fn delete_without_call_logs(
            &self,
            id: &UserId,
        ) -> Result<UserDeletion, UserPersistenceError> {
            let mut tables = self.tables();
            if !tables.users.iter().any(|record| record.user.id() == id) {
                return Ok(UserDeletion::NotFound);
            }
            let owned: Vec<LogListId> = tables
                .lists
                .iter()
                .filter(|list| list.owner_id() == id)
                .map(|list| *list.id())
                .collect();
            if tables
                .calls
                .iter()
                .any(|call| owned.contains(call.log_list_id()))
            {
                return Ok(UserDeletion::HasCallLogs);
            }
            tables.lists.retain(|list| list.owner_id() != id);
            tables.users.retain(|record| record.user.id() != id);
            Ok(UserDeletion::Deleted)
        }
    }

    #[async_trait]
    impl LogListRepository for InMemoryStore {
        async fn insert(&self, log_list: &LogList) -> Result<(), LogListRepositoryError> {
            let mut tables = self.tables();
            if !tables
                .users
                .iter()
                .any(|record| record.user.id() == log_list.owner_id())
            {
                return Err(LogListRepositoryError::owner_missing());
            }
            tables.lists.push(log_list.clone());
            Ok(())
        }

        async fn find_by_id(
            &self,
            id: &LogListId,
        ) -> Result<Option<LogList>, LogListRepositoryError> {
            Ok(self
                .tables()
                .lists
                .iter()
                .find(|list| list.id() == id)
                .cloned())
        }

        async fn list_all(&self) -> Result<Vec<LogList>, LogListRepositoryError> {
            let mut lists = self.tables().lists.clone();
            lists.sort_by_key(|list| (list.created_at(), *list.id().as_uuid()));
            Ok(lists)
        }

        async fn list_by_owner(
            &self,
            owner: &UserId,
        ) -> Result<Vec<LogList>, LogListRepositoryError> {
            let mut lists = self.list_all().await?;
            lists.retain(|list| list.owner_id() == owner);
            Ok(lists)
        }

        async fn delete_unless_last(
            &self,
            id: &LogListId,
            scope: DeletionScope,
        ) -> Result<LogListDeletion, LogListRepositoryError> {
            let mut tables = self.tables();
            let Some(owner) = tables
                .lists
                .iter()
                .find(|list| list.id() == id)
                .map(|list| *list.owner_id())
            else {
                return Ok(LogListDeletion::NotFound);
            };
            let in_scope = match scope {
                DeletionScope::OwnerLists => tables
                    .lists
                    .iter()
                    .filter(|list| list.owner_id() == &owner)
                    .count(),
                DeletionScope::System => tables.lists.len(),
            };
            if in_scope <= 1 {
                return Ok(LogListDeletion::LastRemaining);
            }
            tables.lists.retain(|list| list.id() != id);
            tables.calls.retain(|call| call.log_list_id() != id);
            Ok(LogListDeletion::Deleted)
        }
    }

    #[async_trait]
    impl CallLogRepository for InMemoryStore {
        async fn insert(&self, call: &CallLog) -> Result<(), CallLogRepositoryError> {
            let mut tables = self.tables();
            if !tables
                .lists
                .iter()
                .any(|list| list.id() == call.log_list_id())
            {
                return Err(CallLogRepositoryError::log_list_missing());
            }
            tables.calls.push(call.clone());
            Ok(())
        }

        async fn find_by_id(
            &self,
            id: &CallLogId,
        ) -> Result<Option<CallLog>, CallLogRepositoryError> {
            Ok(self
                .tables()
                .calls
                .iter()
                .find(|call| call.id() == id)
                .cloned())
        }

        async fn delete(&self, id: &CallLogId) -> Result<bool, CallLogRepositoryError> {
            let mut tables = self.tables();
            let before = tables.calls.len();
            tables.calls.retain(|call| call.id() != id);
            Ok(tables.calls.len() < before)
        }

        async fn list_for_log_lists(
            &self,
            log_lists: &[LogListId],
        ) -> Result<Vec<CallLog>, CallLogRepositoryError> {
            let mut calls: Vec<CallLog> = self
                .tables()
                .calls
                .iter()
                .filter(|call| log_lists.contains(call.log_list_id()))
                .cloned()
                .collect();
            calls.sort_by(|a, b| {
                b.timestamp()
                    .cmp(&a.timestamp())
                    .then_with(|| a.id().as_uuid().cmp(b.id().as_uuid()))
            });
            Ok(calls)
        }
    }
}
