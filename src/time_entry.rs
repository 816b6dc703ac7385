use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Tag marking an entry's duration as chargeable.
pub const BILLABLE_TAG: &str = "Billable";

/// One recorded time span as returned by the detailed report endpoint.
///
/// Entries are read-only after deserialization. `project` and `tags` may be
/// absent in the wire format and default to empty.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct TimeEntry {
    pub uid: u64,
    #[serde(default)]
    pub project: String,
    /// Duration in milliseconds.
    pub dur: i64,
    #[serde(default)]
    pub tags: Vec<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default)]
    pub description: String,
}

impl TimeEntry {
    /// An entry is billable iff its tag set contains the billable marker.
    pub fn is_billable(&self) -> bool {
        self.tags.iter().any(|tag| tag == BILLABLE_TAG)
    }
}
