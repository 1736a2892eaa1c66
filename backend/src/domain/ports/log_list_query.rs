//! Driving port for reading log lists.

use async_trait::async_trait;

use crate::domain::access::Identity;
use crate::domain::metrics::LogListDetail;
use crate::domain::{Error, LogList, LogListId};

/// Reading log lists.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LogListQuery: Send + Sync {
    /// All lists for an administrator, the caller's own otherwise.
    async fn list(&self, identity: &Identity) -> Result<Vec<LogList>, Error>;

    /// One list with its statistics and calls, newest first.
    async fn get(&self, identity: &Identity, id: &LogListId) -> Result<LogListDetail, Error>;
}
