//! Call records and the closed call-type vocabulary.
//!
//! The vocabulary is two disjoint sets. A call whose type is in
//! [`SALE_CALL_TYPES`] counts towards the transfer rate; everything in
//! [`OTHER_CALL_TYPES`] is logged but does not.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use utoipa::ToSchema;

use super::ids::uuid_identifier;
use super::log_list::LogListId;

uuid_identifier!(
    /// Stable call record identifier.
    CallLogId,
    "call log"
);

/// Call types that indicate a potential sale.
pub const SALE_CALL_TYPES: &[&str] = &[
    "AOD",
    "APPOINTMENT",
    "T2",
    "HPA",
    "AFCT2",
    "AFCAPPOINTMENT",
    "NON-MED",
];

/// Accepted call types that do not indicate a sale.
pub const OTHER_CALL_TYPES: &[&str] = &[
    "CUSTOMER SERVICE",
    "INVALID",
    "PROVIDER",
    "BROKER",
    "U65",
    "LOYALTY",
    "CALLBLUE",
    "SEMINAR",
];

/// Raised when text is outside the call-type vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("call type '{raw}' is not recognised")]
pub struct InvalidCallType {
    /// The rejected input, verbatim.
    pub raw: String,
}

/// A member of the call-type vocabulary.
///
/// Only [`CallType::parse`] creates values, so holding a `CallType` proves
/// membership. Matching is exact: no trimming, no case folding.
///
/// # Examples
/// ```
/// use callboard::domain::CallType;
///
/// assert!(CallType::parse("AOD").unwrap().is_potential_sale());
/// assert!(!CallType::parse("BROKER").unwrap().is_potential_sale());
/// assert!(CallType::parse("aod").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallType {
    name: &'static str,
    potential_sale: bool,
}

impl CallType {
    /// Look up `raw` in the vocabulary.
    pub fn parse(raw: &str) -> Result<Self, InvalidCallType> {
        if let Some(name) = SALE_CALL_TYPES.iter().copied().find(|name| *name == raw) {
            return Ok(Self {
                name,
                potential_sale: true,
            });
        }
        OTHER_CALL_TYPES
            .iter()
            .copied()
            .find(|name| *name == raw)
            .map(|name| Self {
                name,
                potential_sale: false,
            })
            .ok_or_else(|| InvalidCallType {
                raw: raw.to_owned(),
            })
    }

    /// Canonical spelling.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        self.name
    }

    /// Whether this type belongs to the sale set.
    #[must_use]
    pub const fn is_potential_sale(&self) -> bool {
        self.potential_sale
    }
}

impl fmt::Display for CallType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl Serialize for CallType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name)
    }
}

/// One logged call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct CallLog {
    id: CallLogId,
    #[schema(value_type = String, example = "APPOINTMENT")]
    call_type: CallType,
    log_list_id: LogListId,
    timestamp: DateTime<Utc>,
    is_potential_sale: bool,
}

impl CallLog {
    /// Record a call; the sale flag follows from the type.
    #[must_use]
    pub const fn new(
        id: CallLogId,
        call_type: CallType,
        log_list_id: LogListId,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            call_type,
            log_list_id,
            timestamp,
            is_potential_sale: call_type.is_potential_sale(),
        }
    }

    /// Stable identifier.
    #[must_use]
    pub const fn id(&self) -> &CallLogId {
        &self.id
    }

    /// What kind of call this was.
    #[must_use]
    pub const fn call_type(&self) -> CallType {
        self.call_type
    }

    /// The list the call belongs to.
    #[must_use]
    pub const fn log_list_id(&self) -> &LogListId {
        &self.log_list_id
    }

    /// When the call was logged.
    #[must_use]
    pub const fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Whether the call counts towards the transfer rate.
    #[must_use]
    pub const fn is_potential_sale(&self) -> bool {
        self.is_potential_sale
    }
}
