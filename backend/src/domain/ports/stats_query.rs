//! Driving port for transfer-rate views.

use async_trait::async_trait;
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::access::Identity;
use crate::domain::metrics::{CallStats, LogListDetail, LogListSummary, UserStats};
use crate::domain::{Error, LogListId, User, UserId};

/// Every list in the system with global totals.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Overview {
    /// Totals across every list.
    pub totals: CallStats,
    /// Each list with its own statistics.
    pub log_lists: Vec<LogListSummary>,
}

/// One user's profile, aggregate statistics, and lists with calls.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct UserDetails {
    /// The inspected user.
    pub user: User,
    /// Totals across the user's lists.
    pub stats: UserStats,
    /// Each of the user's lists with its calls.
    pub log_lists: Vec<LogListDetail>,
}

/// Landing view, shaped by the caller's role.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum Dashboard {
    /// Regular user: own lists and the call-type picker.
    Member {
        /// The caller.
        user: User,
        /// The caller's lists.
        log_lists: Vec<LogListSummary>,
        /// The requested list, or the caller's first list.
        selected: Option<LogListDetail>,
        /// Call types that count towards the transfer rate.
        #[schema(value_type = Vec<String>)]
        sale_call_types: Vec<&'static str>,
        /// Call types logged without counting.
        #[schema(value_type = Vec<String>)]
        other_call_types: Vec<&'static str>,
    },
    /// Administrator: the global overview.
    Admin {
        /// The caller.
        user: User,
        /// Every list in the system.
        overview: Overview,
    },
}

/// Transfer-rate views.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StatsQuery: Send + Sync {
    /// Administrator overview of every list.
    async fn overview(&self, identity: &Identity) -> Result<Overview, Error>;

    /// Administrator drill-down into one user.
    async fn user_details(&self, identity: &Identity, id: &UserId) -> Result<UserDetails, Error>;

    /// Role-shaped landing view. `selected` is ignored for administrators.
    async fn dashboard(
        &self,
        identity: &Identity,
        selected: Option<LogListId>,
    ) -> Result<Dashboard, Error>;
}
