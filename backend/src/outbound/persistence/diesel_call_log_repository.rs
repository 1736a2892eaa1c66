//! PostgreSQL-backed `CallLogRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{CallLogRepository, CallLogRepositoryError};
use crate::domain::{CallLog, CallLogId, CallType, LogListId};

use super::diesel_error_mapping::{DieselFailure, classify_diesel_error, pool_error_message};
use super::models::CallLogRow;
use super::pool::{DbPool, PoolError};
use super::schema::call_logs;

/// Diesel-backed implementation of the `CallLogRepository` port.
#[derive(Clone)]
pub struct DieselCallLogRepository {
    pool: DbPool,
}

impl DieselCallLogRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> CallLogRepositoryError {
    CallLogRepositoryError::connection(pool_error_message(error))
}

fn map_diesel_error(error: DieselError) -> CallLogRepositoryError {
    match classify_diesel_error(&error) {
        DieselFailure::Connection => {
            CallLogRepositoryError::connection(DieselFailure::Connection.message())
        }
        DieselFailure::ForeignKeyViolation => CallLogRepositoryError::log_list_missing(),
        other => CallLogRepositoryError::query(other.message()),
    }
}

fn row_to_call_log(row: CallLogRow) -> Result<CallLog, CallLogRepositoryError> {
    let call_type = CallType::parse(&row.call_type).map_err(|err| {
        CallLogRepositoryError::query(format!("stored call log {}: {err}", row.id))
    })?;
    Ok(CallLog::new(
        CallLogId::from_uuid(row.id),
        call_type,
        LogListId::from_uuid(row.log_list_id),
        row.timestamp,
    ))
}

#[async_trait]
impl CallLogRepository for DieselCallLogRepository {
    async fn insert(&self, call: &CallLog) -> Result<(), CallLogRepositoryError> {
        let mut conn = self.pool.connection().await.map_err(map_pool_error)?;
        let row = CallLogRow {
            id: *call.id().as_uuid(),
            call_type: call.call_type().as_str().to_owned(),
            log_list_id: *call.log_list_id().as_uuid(),
            timestamp: call.timestamp(),
        };

        diesel::insert_into(call_logs::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_by_id(&self, id: &CallLogId) -> Result<Option<CallLog>, CallLogRepositoryError> {
        let mut conn = self.pool.connection().await.map_err(map_pool_error)?;

        let row: Option<CallLogRow> = call_logs::table
            .find(id.as_uuid())
            .select(CallLogRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_call_log).transpose()
    }

    async fn delete(&self, id: &CallLogId) -> Result<bool, CallLogRepositoryError> {
        let mut conn = self.pool.connection().await.map_err(map_pool_error)?;

        let deleted = diesel::delete(call_logs::table.find(id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(deleted > 0)
    }

    async fn list_for_log_lists(
        &self,
        log_lists: &[LogListId],
    ) -> Result<Vec<CallLog>, CallLogRepositoryError> {
        if log_lists.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.pool.connection().await.map_err(map_pool_error)?;
        let ids: Vec<Uuid> = log_lists.iter().map(|id| *id.as_uuid()).collect();

        let rows: Vec<CallLogRow> = call_logs::table
            .filter(call_logs::log_list_id.eq_any(ids))
            .select(CallLogRow::as_select())
            .order_by((call_logs::timestamp.desc(), call_logs::id.asc()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_call_log).collect()
    }
}
