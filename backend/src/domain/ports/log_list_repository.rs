//! Port for log list persistence.

use async_trait::async_trait;

use crate::domain::{LogList, LogListId, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by log list repository adapters.
    pub enum LogListRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "log list repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "log list repository query failed: {message}",
        /// The owning user does not exist.
        OwnerMissing => "log list owner does not exist",
        /// A serializable transaction lost a race.
        Conflict { message: String } => "log list repository conflict: {message}",
    }
}

/// The population that must keep at least one list after a deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletionScope {
    /// The lists owned by the target list's owner.
    OwnerLists,
    /// Every list in the system.
    System,
}

/// Outcome of a guarded log list deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogListDeletion {
    /// The list and its call records are gone.
    Deleted,
    /// The list is the last one in its scope; nothing changed.
    LastRemaining,
    /// No list has that id.
    NotFound,
}

/// Storage for log lists.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LogListRepository: Send + Sync {
    /// Persist a new list.
    async fn insert(&self, log_list: &LogList) -> Result<(), LogListRepositoryError>;

    /// Load one list.
    async fn find_by_id(&self, id: &LogListId) -> Result<Option<LogList>, LogListRepositoryError>;

    /// Every list, oldest first.
    async fn list_all(&self) -> Result<Vec<LogList>, LogListRepositoryError>;

    /// Lists owned by `owner`, oldest first.
    async fn list_by_owner(&self, owner: &UserId) -> Result<Vec<LogList>, LogListRepositoryError>;

    /// Delete a list unless it is the last one in `scope`.
    ///
    /// Counting and deleting share one serializable transaction; a lost race
    /// surfaces as `Conflict` with no rows changed. Call records cascade.
    async fn delete_unless_last(
        &self,
        id: &LogListId,
        scope: DeletionScope,
    ) -> Result<LogListDeletion, LogListRepositoryError>;
}
