//! Log book domain service.
//!
//! Implements creation and deletion of log lists and call records. Every
//! operation resolves the target, checks ownership, then mutates; list
//! deletion delegates the last-list count to the repository so the check and
//! the delete run in one serializable transaction.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::info;

use super::access::{Guard, Identity, ensure_access};
use super::error::detail;
use super::error_mapping::{map_call_log_error, map_log_list_error};
use super::ports::{
    CallLogCommand, CallLogRepository, DeletionScope, LogListCommand, LogListDeletion,
    LogListRepository,
};
use super::{CallLog, CallLogId, CallType, Error, LogList, LogListId, LogListName};

/// Log book service implementing the list and call command ports.
#[derive(Clone)]
pub struct LogBookService<L, C> {
    lists: Arc<L>,
    calls: Arc<C>,
    clock: Arc<dyn Clock>,
}

impl<L, C> LogBookService<L, C> {
    /// Wire the service to its repositories and clock.
    pub fn new(lists: Arc<L>, calls: Arc<C>, clock: Arc<dyn Clock>) -> Self {
        Self {
            lists,
            calls,
            clock,
        }
    }
}

impl<L, C> LogBookService<L, C>
where
    L: LogListRepository,
    C: CallLogRepository,
{
    async fn accessible_list(&self, identity: &Identity, id: &LogListId) -> Result<LogList, Error> {
        let list = self
            .lists
            .find_by_id(id)
            .await
            .map_err(map_log_list_error)?
            .ok_or_else(|| Error::not_found("log list not found"))?;
        ensure_access(identity, &list)?;
        Ok(list)
    }

    fn parse_call_type(raw: &str) -> Result<CallType, Error> {
        CallType::parse(raw).map_err(|err| {
            Error::invalid_request(err.to_string()).with_details(json!({
                "code": detail::INVALID_CALL_TYPE,
                "field": "call_type",
            }))
        })
    }
}

#[async_trait]
impl<L, C> LogListCommand for LogBookService<L, C>
where
    L: LogListRepository,
    C: CallLogRepository,
{
    async fn create(&self, identity: &Identity, name: LogListName) -> Result<LogList, Error> {
        Guard::member().check(identity)?;
        let list = LogList::new(LogListId::random(), name, *identity.id(), self.clock.utc());
        self.lists.insert(&list).await.map_err(map_log_list_error)?;
        info!(user_id = %identity.id(), log_list_id = %list.id(), "log list created");
        Ok(list)
    }

    async fn delete(&self, identity: &Identity, id: &LogListId) -> Result<(), Error> {
        Guard::session().check(identity)?;
        self.accessible_list(identity, id).await?;
        let scope = if identity.is_admin() {
            DeletionScope::System
        } else {
            DeletionScope::OwnerLists
        };

        match self
            .lists
            .delete_unless_last(id, scope)
            .await
            .map_err(map_log_list_error)?
        {
            LogListDeletion::Deleted => {
                info!(user_id = %identity.id(), log_list_id = %id, "log list deleted");
                Ok(())
            }
            LogListDeletion::LastRemaining => {
                let message = match scope {
                    DeletionScope::OwnerLists => "cannot delete your last log list",
                    DeletionScope::System => "cannot delete the last log list in the system",
                };
                Err(Error::integrity_violation(message).with_detail_code(detail::LAST_LOG_LIST))
            }
            LogListDeletion::NotFound => Err(Error::not_found("log list not found")),
        }
    }
}

#[async_trait]
impl<L, C> CallLogCommand for LogBookService<L, C>
where
    L: LogListRepository,
    C: CallLogRepository,
{
    async fn record(
        &self,
        identity: &Identity,
        log_list: &LogListId,
        call_type: &str,
    ) -> Result<CallLog, Error> {
        Guard::member().check(identity)?;
        let call_type = Self::parse_call_type(call_type)?;
        self.accessible_list(identity, log_list).await?;

        let call = CallLog::new(CallLogId::random(), call_type, *log_list, self.clock.utc());
        self.calls.insert(&call).await.map_err(map_call_log_error)?;
        info!(
            user_id = %identity.id(),
            log_list_id = %log_list,
            call_type = call.call_type().as_str(),
            "call recorded"
        );
        Ok(call)
    }

    async fn delete(&self, identity: &Identity, id: &CallLogId) -> Result<(), Error> {
        Guard::session().check(identity)?;
        let call = self
            .calls
            .find_by_id(id)
            .await
            .map_err(map_call_log_error)?
            .ok_or_else(|| Error::not_found("call log not found"))?;
        self.accessible_list(identity, call.log_list_id()).await?;

        if !self.calls.delete(id).await.map_err(map_call_log_error)? {
            return Err(Error::not_found("call log not found"));
        }
        info!(user_id = %identity.id(), call_log_id = %id, "call deleted");
        Ok(())
    }
}

#[cfg(test)]
#[path = "log_book_service_tests.rs"]
mod tests;
