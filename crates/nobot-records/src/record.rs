//! Per-group record type and its persisted shape.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Serialize, Serializer};

/// Second-resolution local timestamp.
pub type Timestamp = NaiveDateTime;

/// Format used for timestamps in the persisted document.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// The full persisted mapping: group id to its record.
pub type Snapshot = BTreeMap<String, GroupRecord>;

/// State kept for one group.
///
/// Serializes to the nested schema:
///
/// ```json
/// { "bot_records": { "10001": "2024-03-01 12:00:00" }, "monitoring": false, "ban": true }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GroupRecord {
    /// Tagged account id -> last time it was seen speaking.
    #[serde(rename = "bot_records", serialize_with = "serialize_timestamps")]
    pub(crate) tagged: BTreeMap<String, Timestamp>,
    /// A detection probe is running in this group.
    pub(crate) monitoring: bool,
    /// Tagged accounts are throttled in this group.
    #[serde(rename = "ban")]
    pub(crate) enforcement: bool,
}

impl GroupRecord {
    /// Build a record from its parts.
    pub fn new(tagged: BTreeMap<String, Timestamp>, monitoring: bool, enforcement: bool) -> Self {
        Self {
            tagged,
            monitoring,
            enforcement,
        }
    }

    /// Whether `account` is tagged in this group.
    pub fn is_tagged(&self, account: &str) -> bool {
        self.tagged.contains_key(account)
    }

    /// Last-seen timestamp of a tagged account.
    pub fn last_seen(&self, account: &str) -> Option<Timestamp> {
        self.tagged.get(account).copied()
    }

    /// Tagged account ids in sorted order.
    pub fn tagged_ids(&self) -> impl Iterator<Item = &str> {
        self.tagged.keys().map(String::as_str)
    }

    /// Number of tagged accounts.
    pub fn tagged_count(&self) -> usize {
        self.tagged.len()
    }

    /// Whether a detection probe is marked as running.
    pub fn monitoring(&self) -> bool {
        self.monitoring
    }

    /// Whether enforcement is enabled.
    pub fn enforcement(&self) -> bool {
        self.enforcement
    }
}

fn serialize_timestamps<S>(map: &BTreeMap<String, Timestamp>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_map(
        map.iter()
            .map(|(account, seen)| (account, seen.format(TIMESTAMP_FORMAT).to_string())),
    )
}
