//! Driving port for creating and deleting log lists.

use async_trait::async_trait;

use crate::domain::access::Identity;
use crate::domain::{Error, LogList, LogListId, LogListName};

/// Creating and deleting log lists.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LogListCommand: Send + Sync {
    /// Create a list owned by the caller. Administrators cannot own lists.
    async fn create(&self, identity: &Identity, name: LogListName) -> Result<LogList, Error>;

    /// Delete a list the caller owns, or any list for an administrator.
    ///
    /// Refuses to remove the last list in scope: the owner's lists for a
    /// regular user, every list for an administrator.
    async fn delete(&self, identity: &Identity, id: &LogListId) -> Result<(), Error>;
}
