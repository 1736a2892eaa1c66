//! Read-side service for log lists and transfer-rate statistics.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use super::access::{Guard, Identity, ensure_access};
use super::error_mapping::{map_call_log_error, map_log_list_error, map_user_error};
use super::metrics::{LogListDetail, UserStats, detail_lists, roll_up};
use super::ports::{
    CallLogRepository, Dashboard, LogListQuery, LogListRepository, Overview, StatsQuery,
    UserDetails, UserRepository,
};
use super::{
    CallLog, Error, LogList, LogListId, OTHER_CALL_TYPES, SALE_CALL_TYPES, UserId, Username,
};

/// Reporting service implementing the list and statistics query ports.
#[derive(Clone)]
pub struct ReportingService<U, L, C> {
    users: Arc<U>,
    lists: Arc<L>,
    calls: Arc<C>,
}

impl<U, L, C> ReportingService<U, L, C> {
    /// Wire the service to its repositories.
    pub fn new(users: Arc<U>, lists: Arc<L>, calls: Arc<C>) -> Self {
        Self {
            users,
            lists,
            calls,
        }
    }
}

impl<U, L, C> ReportingService<U, L, C>
where
    U: UserRepository,
    L: LogListRepository,
    C: CallLogRepository,
{
    async fn lists_for(&self, identity: &Identity) -> Result<Vec<LogList>, Error> {
        let lists = if identity.is_admin() {
            self.lists.list_all().await
        } else {
            self.lists.list_by_owner(identity.id()).await
        };
        lists.map_err(map_log_list_error)
    }

    async fn calls_for(&self, lists: &[LogList]) -> Result<Vec<CallLog>, Error> {
        if lists.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<LogListId> = lists.iter().map(|list| *list.id()).collect();
        self.calls
            .list_for_log_lists(&ids)
            .await
            .map_err(map_call_log_error)
    }

    async fn owner_names(&self, lists: &[LogList]) -> Result<HashMap<UserId, Username>, Error> {
        let mut owner_ids: Vec<UserId> = lists.iter().map(|list| *list.owner_id()).collect();
        owner_ids.sort_unstable();
        owner_ids.dedup();
        if owner_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let owners = self
            .users
            .find_many(&owner_ids)
            .await
            .map_err(map_user_error)?;
        Ok(owners
            .into_iter()
            .map(|user| (*user.id(), user.username().clone()))
            .collect())
    }

    async fn details_for(&self, lists: &[LogList]) -> Result<Vec<LogListDetail>, Error> {
        let calls = self.calls_for(lists).await?;
        let owners = self.owner_names(lists).await?;
        Ok(detail_lists(lists, calls, &owners))
    }

    async fn accessible_detail(
        &self,
        identity: &Identity,
        id: &LogListId,
    ) -> Result<LogListDetail, Error> {
        let list = self
            .lists
            .find_by_id(id)
            .await
            .map_err(map_log_list_error)?
            .ok_or_else(|| Error::not_found("log list not found"))?;
        ensure_access(identity, &list)?;
        let mut details = self.details_for(std::slice::from_ref(&list)).await?;
        details
            .pop()
            .ok_or_else(|| Error::internal("log list detail missing"))
    }

    async fn build_overview(&self) -> Result<Overview, Error> {
        let lists = self.lists.list_all().await.map_err(map_log_list_error)?;
        let details = self.details_for(&lists).await?;
        let totals = roll_up(&details).into();
        Ok(Overview {
            totals,
            log_lists: details.into_iter().map(|detail| detail.summary).collect(),
        })
    }
}

#[async_trait]
impl<U, L, C> LogListQuery for ReportingService<U, L, C>
where
    U: UserRepository,
    L: LogListRepository,
    C: CallLogRepository,
{
    async fn list(&self, identity: &Identity) -> Result<Vec<LogList>, Error> {
        Guard::session().check(identity)?;
        self.lists_for(identity).await
    }

    async fn get(&self, identity: &Identity, id: &LogListId) -> Result<LogListDetail, Error> {
        Guard::session().check(identity)?;
        self.accessible_detail(identity, id).await
    }
}

#[async_trait]
impl<U, L, C> StatsQuery for ReportingService<U, L, C>
where
    U: UserRepository,
    L: LogListRepository,
    C: CallLogRepository,
{
    async fn overview(&self, identity: &Identity) -> Result<Overview, Error> {
        Guard::admin().check(identity)?;
        self.build_overview().await
    }

    async fn user_details(&self, identity: &Identity, id: &UserId) -> Result<UserDetails, Error> {
        Guard::admin().check(identity)?;
        let user = self
            .users
            .find_by_id(id)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::not_found("user not found"))?
            .user;
        let lists = self
            .lists
            .list_by_owner(id)
            .await
            .map_err(map_log_list_error)?;
        let details = self.details_for(&lists).await?;
        let stats = UserStats {
            stats: roll_up(&details).into(),
            log_lists_count: details.len(),
        };
        Ok(UserDetails {
            user,
            stats,
            log_lists: details,
        })
    }

    async fn dashboard(
        &self,
        identity: &Identity,
        selected: Option<LogListId>,
    ) -> Result<Dashboard, Error> {
        Guard::session().check(identity)?;
        let user = identity.user().clone();
        if identity.is_admin() {
            let overview = self.build_overview().await?;
            return Ok(Dashboard::Admin { user, overview });
        }

        let lists = self.lists_for(identity).await?;
        let details = self.details_for(&lists).await?;
        let log_lists = details.iter().map(|detail| detail.summary.clone()).collect();
        let selected = match selected {
            Some(id) => match details.into_iter().find(|detail| detail.summary.id == id) {
                Some(detail) => Some(detail),
                None => Some(self.accessible_detail(identity, &id).await?),
            },
            None => details.into_iter().next(),
        };
        Ok(Dashboard::Member {
            user,
            log_lists,
            selected,
            sale_call_types: SALE_CALL_TYPES.to_vec(),
            other_call_types: OTHER_CALL_TYPES.to_vec(),
        })
    }
}

#[cfg(test)]
#[path = "reporting_service_tests.rs"]
mod tests;
