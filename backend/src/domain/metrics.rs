//! Transfer-rate statistics.
//!
//! The transfer rate is the share of logged calls whose type indicates a
//! potential sale, as a percentage rounded to two decimals. Per-user and
//! global figures sum the raw counts across lists before dividing; they never
//! average per-list rates.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::call_log::CallLog;
use super::log_list::{LogList, LogListId, LogListName};
use super::user::{UserId, Username};

/// `100 * potential / total`, rounded to two decimals; `0.0` when `total` is 0.
///
/// # Examples
/// ```
/// use callboard::domain::metrics::transfer_rate;
///
/// assert_eq!(transfer_rate(2, 4), 50.0);
/// assert_eq!(transfer_rate(1, 3), 33.33);
/// assert_eq!(transfer_rate(0, 0), 0.0);
/// ```
#[must_use]
pub fn transfer_rate(potential: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let potential = potential.min(total);
    #[expect(
        clippy::cast_precision_loss,
        reason = "call counts stay far below 2^52"
    )]
    let rate = (potential as f64) * 100.0 / (total as f64);
    (rate * 100.0).round() / 100.0
}

/// Running call counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallTally {
    total: u64,
    potential: u64,
}

impl CallTally {
    /// Tally an iterator of calls.
    #[must_use]
    pub fn of<'a>(calls: impl IntoIterator<Item = &'a CallLog>) -> Self {
        calls.into_iter().fold(Self::default(), |mut tally, call| {
            tally.record(call);
            tally
        })
    }

    /// Count one more call.
    pub fn record(&mut self, call: &CallLog) {
        self.total += 1;
        if call.is_potential_sale() {
            self.potential += 1;
        }
    }

    /// Add two tallies.
    #[must_use]
    pub const fn merge(self, other: Self) -> Self {
        Self {
            total: self.total + other.total,
            potential: self.potential + other.potential,
        }
    }

    /// Calls counted.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.total
    }

    /// Calls counted as potential sales.
    #[must_use]
    pub const fn potential(&self) -> u64 {
        self.potential
    }

    /// See [`transfer_rate`].
    #[must_use]
    pub fn transfer_rate(&self) -> f64 {
        transfer_rate(self.potential, self.total)
    }
}

/// Serialisable form of a [`CallTally`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct CallStats {
    /// Calls logged.
    pub total_calls: u64,
    /// Calls whose type indicates a potential sale.
    pub potential_calls: u64,
    /// Percentage, two decimals.
    #[schema(example = 50.0)]
    pub transfer_rate: f64,
}

impl From<CallTally> for CallStats {
    fn from(tally: CallTally) -> Self {
        Self {
            total_calls: tally.total(),
            potential_calls: tally.potential(),
            transfer_rate: tally.transfer_rate(),
        }
    }
}

/// One log list with its statistics.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct LogListSummary {
    /// List identifier.
    pub id: LogListId,
    /// List name.
    pub name: LogListName,
    /// Owning user.
    pub owner_id: UserId,
    /// Owner login name, when the owner could be loaded.
    pub owner_username: Option<Username>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Counts and rate for this list.
    #[serde(flatten)]
    pub stats: CallStats,
    /// Timestamp of the newest call, if any.
    pub latest_call: Option<DateTime<Utc>>,
}

/// One log list with its statistics and calls, most recent first.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct LogListDetail {
    /// Identity and statistics.
    #[serde(flatten)]
    pub summary: LogListSummary,
    /// Calls, newest first.
    pub calls: Vec<CallLog>,
}

impl LogListDetail {
    /// Sorts `calls` newest first before summarising them.
    #[must_use]
    pub fn build(list: &LogList, owner_username: Option<Username>, mut calls: Vec<CallLog>) -> Self {
        calls.sort_by(|a, b| b.timestamp().cmp(&a.timestamp()));
        let tally = CallTally::of(&calls);
        let summary = LogListSummary {
            id: *list.id(),
            name: list.name().clone(),
            owner_id: *list.owner_id(),
            owner_username,
            created_at: list.created_at(),
            stats: tally.into(),
            latest_call: calls.first().map(CallLog::timestamp),
        };
        Self { summary, calls }
    }

    /// Recover the raw counts, for summing across lists.
    #[must_use]
    pub const fn tally(&self) -> CallTally {
        CallTally {
            total: self.summary.stats.total_calls,
            potential: self.summary.stats.potential_calls,
        }
    }
}

/// Per-user statistics summed across every owned list.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct UserStats {
    /// Counts and rate summed across lists.
    #[serde(flatten)]
    pub stats: CallStats,
    /// Number of lists the user owns.
    pub log_lists_count: usize,
}

/// Build one [`LogListDetail`] per list, attaching each list's calls and the
/// owner's username where known. Output follows the input list order.
#[must_use]
pub fn detail_lists(
    lists: &[LogList],
    calls: Vec<CallLog>,
    owners: &HashMap<UserId, Username>,
) -> Vec<LogListDetail> {
    let mut by_list: HashMap<LogListId, Vec<CallLog>> = HashMap::new();
    for call in calls {
        by_list.entry(*call.log_list_id()).or_default().push(call);
    }
    lists
        .iter()
        .map(|list| {
            let calls = by_list.remove(list.id()).unwrap_or_default();
            LogListDetail::build(list, owners.get(list.owner_id()).cloned(), calls)
        })
        .collect()
}

/// Sum the tallies of `details`.
#[must_use]
pub fn roll_up(details: &[LogListDetail]) -> CallTally {
    details
        .iter()
        .map(LogListDetail::tally)
        .fold(CallTally::default(), CallTally::merge)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CallLogId, CallType};
    use chrono::{Duration, TimeZone};
    use rstest::rstest;

    fn call(list: LogListId, call_type: &str, minutes: i64) -> CallLog {
        let base = Utc
            .with_ymd_and_hms(2026, 2, 2, 8, 0, 0)
            .single()
            .expect("fixture timestamp");
        CallLog::new(
            CallLogId::random(),
            CallType::parse(call_type).expect("vocabulary member"),
            list,
            base + Duration::minutes(minutes),
        )
    }

    fn list(owner: UserId, name: &str) -> LogList {
        LogList::new(
            LogListId::random(),
            LogListName::new(name).expect("list name"),
            owner,
            Utc::now(),
        )
    }

    #[rstest]
    #[case(0, 0, 0.0)]
    #[case(0, 5, 0.0)]
    #[case(5, 5, 100.0)]
    #[case(2, 4, 50.0)]
    #[case(2, 3, 66.67)]
    #[case(1, 7, 14.29)]
    fn transfer_rate_rounds_to_two_decimals(
        #[case] potential: u64,
        #[case] total: u64,
        #[case] expected: f64,
    ) {
        assert!((transfer_rate(potential, total) - expected).abs() < f64::EPSILON);
    }

    #[rstest]
    fn transfer_rate_stays_within_bounds() {
        for total in 0..40_u64 {
            for potential in 0..=total + 2 {
                let rate = transfer_rate(potential, total);
                assert!((0.0..=100.0).contains(&rate), "{potential}/{total} -> {rate}");
            }
        }
    }

    #[rstest]
    fn mixed_list_yields_fifty_percent() {
        let id = LogListId::random();
        let calls = [
            call(id, "AOD", 0),
            call(id, "INVALID", 1),
            call(id, "APPOINTMENT", 2),
            call(id, "BROKER", 3),
        ];
        let tally = CallTally::of(&calls);
        assert_eq!(tally.total(), 4);
        assert_eq!(tally.potential(), 2);
        assert!((tally.transfer_rate() - 50.0).abs() < f64::EPSILON);
    }

    #[rstest]
    fn roll_up_sums_counts_rather_than_averaging_rates() {
        let owner = UserId::random();
        let first = list(owner, "first");
        let second = list(owner, "second");
        // 1/1 and 0/3: averaged rates would give 50, summed counts give 25.
        let calls = vec![
            call(*first.id(), "T2", 0),
            call(*second.id(), "U65", 1),
            call(*second.id(), "U65", 2),
            call(*second.id(), "SEMINAR", 3),
        ];
        let details = detail_lists(&[first, second], calls, &HashMap::new());
        let tally = roll_up(&details);
        assert_eq!(tally.total(), 4);
        assert!((tally.transfer_rate() - 25.0).abs() < f64::EPSILON);
    }

    #[rstest]
    fn detail_orders_calls_newest_first_and_tracks_latest() {
        let owner = UserId::random();
        let target = list(owner, "ordered");
        let calls = vec![
            call(*target.id(), "HPA", 5),
            call(*target.id(), "LOYALTY", 30),
            call(*target.id(), "AFCT2", 10),
        ];
        let latest = calls[1].timestamp();
        let mut owners = HashMap::new();
        owners.insert(owner, Username::new("owner").expect("username"));

        let details = detail_lists(std::slice::from_ref(&target), calls, &owners);
        let detail = details.first().expect("one detail");
        assert_eq!(detail.summary.latest_call, Some(latest));
        assert_eq!(detail.calls.first().map(CallLog::timestamp), Some(latest));
        assert_eq!(
            detail.summary.owner_username.as_ref().map(AsRef::as_ref),
            Some("owner")
        );
    }

    #[rstest]
    fn empty_list_reports_zero_rate_and_no_latest_call() {
        let target = list(UserId::random(), "empty");
        let detail = LogListDetail::build(&target, None, Vec::new());
        assert_eq!(detail.summary.stats.total_calls, 0);
        assert!(detail.summary.stats.transfer_rate.abs() < f64::EPSILON);
        assert!(detail.summary.latest_call.is_none());
    }
}
