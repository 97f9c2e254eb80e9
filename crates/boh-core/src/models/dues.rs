//! Monthly dues entries.
//!
//! The backend stores a member's dues as a map of year → list of month
//! entries, where an entry is either a plain boolean (older records), `null`,
//! or an object carrying a `status` string plus free-form metadata. The wire
//! shape is normalized into [`DuesMonth`] during deserialization so nothing
//! downstream has to re-inspect JSON.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Display status of one dues month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuesStatus {
    Paid,
    Late,
    #[default]
    Unpaid,
}

impl DuesStatus {
    pub const ALL: [DuesStatus; 3] = [DuesStatus::Paid, DuesStatus::Late, DuesStatus::Unpaid];

    pub fn as_str(&self) -> &'static str {
        match self {
            DuesStatus::Paid => "paid",
            DuesStatus::Late => "late",
            DuesStatus::Unpaid => "unpaid",
        }
    }

    /// Classify a status string from a structured entry. Anything other than
    /// `paid` or `late` is treated as unpaid.
    pub fn from_wire(status: &str) -> Self {
        match status {
            "paid" => DuesStatus::Paid,
            "late" => DuesStatus::Late,
            _ => DuesStatus::Unpaid,
        }
    }
}

impl fmt::Display for DuesStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Extra fields recorded alongside a structured paid entry (payment date,
/// recorder, notes...). Kept opaque.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DuesMeta(pub Map<String, Value>);

/// One normalized month of dues.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "RawDuesEntry", into = "RawDuesEntry")]
pub enum DuesMonth {
    #[default]
    Unpaid,
    Paid,
    Late,
    PaidStructured(DuesMeta),
}

impl DuesMonth {
    pub fn status(&self) -> DuesStatus {
        match self {
            DuesMonth::Unpaid => DuesStatus::Unpaid,
            DuesMonth::Paid | DuesMonth::PaidStructured(_) => DuesStatus::Paid,
            DuesMonth::Late => DuesStatus::Late,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct DuesDetail {
    #[serde(default)]
    status: Option<String>,
    #[serde(flatten)]
    meta: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawDuesEntry {
    Flag(bool),
    Missing,
    Detail(DuesDetail),
    Other(Value),
}

impl From<RawDuesEntry> for DuesMonth {
    fn from(raw: RawDuesEntry) -> Self {
        match raw {
            RawDuesEntry::Flag(true) => DuesMonth::Paid,
            RawDuesEntry::Flag(false) | RawDuesEntry::Missing => DuesMonth::Unpaid,
            RawDuesEntry::Detail(detail) => {
                match DuesStatus::from_wire(detail.status.as_deref().unwrap_or_default()) {
                    DuesStatus::Paid => DuesMonth::PaidStructured(DuesMeta(detail.meta)),
                    DuesStatus::Late => DuesMonth::Late,
                    DuesStatus::Unpaid => DuesMonth::Unpaid,
                }
            }
            RawDuesEntry::Other(value) => {
                tracing::debug!(%value, "Unrecognized dues entry, treating as unpaid");
                DuesMonth::Unpaid
            }
        }
    }
}

impl From<DuesMonth> for RawDuesEntry {
    fn from(month: DuesMonth) -> Self {
        match month {
            DuesMonth::Unpaid => RawDuesEntry::Flag(false),
            DuesMonth::Paid => RawDuesEntry::Flag(true),
            DuesMonth::Late => RawDuesEntry::Detail(DuesDetail {
                status: Some("late".to_string()),
                meta: Map::new(),
            }),
            DuesMonth::PaidStructured(meta) => RawDuesEntry::Detail(DuesDetail {
                status: Some("paid".to_string()),
                meta: meta.0,
            }),
        }
    }
}
