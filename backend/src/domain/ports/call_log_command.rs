//! Driving port for recording and removing calls.

use async_trait::async_trait;

use crate::domain::access::Identity;
use crate::domain::{CallLog, CallLogId, Error, LogListId};

/// Recording and removing calls.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CallLogCommand: Send + Sync {
    /// Record a call against one of the caller's own lists.
    ///
    /// `call_type` is validated against the closed vocabulary; the timestamp
    /// comes from the server clock. Administrators are refused.
    async fn record(
        &self,
        identity: &Identity,
        log_list: &LogListId,
        call_type: &str,
    ) -> Result<CallLog, Error>;

    /// Delete a call from a list the caller owns, or any call for an
    /// administrator.
    async fn delete(&self, identity: &Identity, id: &CallLogId) -> Result<(), Error>;
}
