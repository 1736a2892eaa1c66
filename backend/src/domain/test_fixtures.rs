//! Shared fixtures for domain service unit tests.

use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;

use super::access::Identity;
use super::ports::UserRecord;
use super::{
    CallLog, CallLogId, CallType, DisplayName, LogList, LogListId, LogListName, PasswordDigest,
    Role, User, UserId, Username,
};

pub(crate) fn fixture_timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0)
        .single()
        .expect("valid fixture timestamp")
}

struct FixtureClock {
    utc_now: DateTime<Utc>,
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc_now.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.utc_now
    }
}

pub(crate) fn fixture_clock() -> Arc<dyn Clock> {
    Arc::new(FixtureClock {
        utc_now: fixture_timestamp(),
    })
}

pub(crate) fn user(name: &str, role: Role) -> User {
    User::new(
        UserId::random(),
        Username::new(name).expect("fixture username"),
        DisplayName::new(name).expect("fixture display name"),
        role,
        fixture_timestamp(),
    )
}

pub(crate) fn identity(name: &str, role: Role) -> Identity {
    Identity::new(user(name, role))
}

pub(crate) fn record(user: User) -> UserRecord {
    UserRecord {
        user,
        password_digest: PasswordDigest::new("digest"),
    }
}

pub(crate) fn log_list(owner: &UserId, name: &str) -> LogList {
    LogList::new(
        LogListId::random(),
        LogListName::new(name).expect("fixture list name"),
        *owner,
        fixture_timestamp(),
    )
}

pub(crate) fn call(list: &LogList, call_type: &str, minutes_ago: i64) -> CallLog {
    CallLog::new(
        CallLogId::random(),
        CallType::parse(call_type).expect("fixture call type"),
        *list.id(),
        fixture_timestamp() - chrono::Duration::minutes(minutes_ago),
    )
}
