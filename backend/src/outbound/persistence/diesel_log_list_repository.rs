//! PostgreSQL-backed `LogListRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel_async::RunQueryDsl;
use diesel_async::scoped_futures::ScopedFutureExt;
use uuid::Uuid;

use crate::domain::ports::{
    DeletionScope, LogListDeletion, LogListRepository, LogListRepositoryError,
};
use crate::domain::{LogList, LogListId, LogListName, UserId};

use super::diesel_error_mapping::{DieselFailure, classify_diesel_error, pool_error_message};
use super::models::LogListRow;
use super::pool::{DbPool, PoolError};
use super::schema::log_lists;

/// Diesel-backed implementation of the `LogListRepository` port.
#[derive(Clone)]
pub struct DieselLogListRepository {
    pool: DbPool,
}

impl DieselLogListRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> LogListRepositoryError {
    LogListRepositoryError::connection(pool_error_message(error))
}

fn map_diesel_error(error: DieselError) -> LogListRepositoryError {
    match classify_diesel_error(&error) {
        DieselFailure::Connection => {
            LogListRepositoryError::connection(DieselFailure::Connection.message())
        }
        DieselFailure::ForeignKeyViolation => LogListRepositoryError::owner_missing(),
        DieselFailure::SerializationFailure => {
            LogListRepositoryError::conflict(DieselFailure::SerializationFailure.message())
        }
        other => LogListRepositoryError::query(other.message()),
    }
}

fn row_to_log_list(row: LogListRow) -> Result<LogList, LogListRepositoryError> {
    let name = LogListName::new(&row.name).map_err(|err| {
        LogListRepositoryError::query(format!("stored log list {} has invalid name: {err}", row.id))
    })?;
    Ok(LogList::new(
        LogListId::from_uuid(row.id),
        name,
        UserId::from_uuid(row.owner_id),
        row.created_at,
    ))
}

fn into_log_lists(rows: Vec<LogListRow>) -> Result<Vec<LogList>, LogListRepositoryError> {
    rows.into_iter().map(row_to_log_list).collect()
}

#[async_trait]
impl LogListRepository for DieselLogListRepository {
    async fn insert(&self, log_list: &LogList) -> Result<(), LogListRepositoryError> {
        let mut conn = self.pool.connection().await.map_err(map_pool_error)?;
        let row = LogListRow {
            id: *log_list.id().as_uuid(),
            name: log_list.name().to_string(),
            owner_id: *log_list.owner_id().as_uuid(),
            created_at: log_list.created_at(),
        };

        diesel::insert_into(log_lists::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_by_id(&self, id: &LogListId) -> Result<Option<LogList>, LogListRepositoryError> {
        let mut conn = self.pool.connection().await.map_err(map_pool_error)?;

        let row: Option<LogListRow> = log_lists::table
            .find(id.as_uuid())
            .select(LogListRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_log_list).transpose()
    }

    async fn list_all(&self) -> Result<Vec<LogList>, LogListRepositoryError> {
        let mut conn = self.pool.connection().await.map_err(map_pool_error)?;

        let rows: Vec<LogListRow> = log_lists::table
            .select(LogListRow::as_select())
            .order_by((log_lists::created_at.asc(), log_lists::id.asc()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        into_log_lists(rows)
    }

    async fn list_by_owner(&self, owner: &UserId) -> Result<Vec<LogList>, LogListRepositoryError> {
        let mut conn = self.pool.connection().await.map_err(map_pool_error)?;

        let rows: Vec<LogListRow> = log_lists::table
            .filter(log_lists::owner_id.eq(owner.as_uuid()))
            .select(LogListRow::as_select())
            .order_by((log_lists::created_at.asc(), log_lists::id.asc()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        into_log_lists(rows)
    }

    async fn delete_unless_last(
        &self,
        id: &LogListId,
        scope: DeletionScope,
    ) -> Result<LogListDeletion, LogListRepositoryError> {
        let mut conn = self.pool.connection().await.map_err(map_pool_error)?;
        let list_id = *id.as_uuid();

        let outcome: Result<LogListDeletion, DieselError> = conn
            .build_transaction()
            .serializable()
            .run(|conn| {
                async move {
                    let owner: Option<Uuid> = log_lists::table
                        .find(list_id)
                        .select(log_lists::owner_id)
                        .first(conn)
                        .await
                        .optional()?;
                    let Some(owner) = owner else {
                        return Ok(LogListDeletion::NotFound);
                    };
                    let in_scope: i64 = match scope {
                        DeletionScope::OwnerLists => {
                            log_lists::table
                                .filter(log_lists::owner_id.eq(owner))
                                .count()
                                .get_result(conn)
                                .await?
                        }
                        DeletionScope::System => log_lists::table.count().get_result(conn).await?,
                    };
                    if in_scope <= 1 {
                        return Ok(LogListDeletion::LastRemaining);
                    }
                    diesel::delete(log_lists::table.find(list_id))
                        .execute(conn)
                        .await?;
                    Ok(LogListDeletion::Deleted)
                }
                .scope_boxed()
            })
            .await;

        outcome.map_err(map_diesel_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rstest::rstest;

    #[rstest]
    fn row_converts_to_domain_list() {
        let row = LogListRow {
            id: Uuid::new_v4(),
            name: "Morning shift".to_owned(),
            owner_id: Uuid::new_v4(),
            created_at: Utc::now(),
        };

        let list = row_to_log_list(row.clone()).expect("valid row");
        assert_eq!(list.id().as_uuid(), &row.id);
        assert_eq!(list.owner_id().as_uuid(), &row.owner_id);
        assert_eq!(list.name().as_ref(), "Morning shift");
    }

    #[rstest]
    fn blank_stored_name_is_a_query_error() {
        let row = LogListRow {
            id: Uuid::new_v4(),
            name: "   ".to_owned(),
            owner_id: Uuid::new_v4(),
            created_at: Utc::now(),
        };

        assert!(matches!(
            row_to_log_list(row),
            Err(LogListRepositoryError::Query { .. })
        ));
    }
}
