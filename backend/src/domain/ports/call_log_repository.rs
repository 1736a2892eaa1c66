//! Port for call record persistence.

use async_trait::async_trait;

use crate::domain::{CallLog, CallLogId, LogListId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by call log repository adapters.
    pub enum CallLogRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "call log repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "call log repository query failed: {message}",
        /// The parent log list disappeared before the insert landed.
        LogListMissing => "parent log list does not exist",
    }
}

/// Storage for call records.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CallLogRepository: Send + Sync {
    /// Persist a new record.
    async fn insert(&self, call: &CallLog) -> Result<(), CallLogRepositoryError>;

    /// Load one record.
    async fn find_by_id(&self, id: &CallLogId) -> Result<Option<CallLog>, CallLogRepositoryError>;

    /// Delete a single record. Returns `false` if it was already gone.
    async fn delete(&self, id: &CallLogId) -> Result<bool, CallLogRepositoryError>;

    /// Calls belonging to any of `log_lists`, most recent first.
    async fn list_for_log_lists(
        &self,
        log_lists: &[LogListId],
    ) -> Result<Vec<CallLog>, CallLogRepositoryError>;
}
