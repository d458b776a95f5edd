//! Decoding of persisted snapshots, including legacy layouts.
//!
//! Two per-group layouts exist in the wild:
//!
//! ```text
//! nested (current):  { "g": { "bot_records": { "u": "2024-03-01 12:00:00" }, "monitoring": false, "ban": true } }
//! flat (legacy):     { "g": { "u": "2024-03-01 12:00:00" } }
//! ```
//!
//! Flat groups are migrated to the nested form on load. The host's
//! `{ "bot_data_list": [ { ... } ] }` wrapper is unwrapped first.
//! Decoding is lenient: malformed groups or timestamps are logged and
//! skipped or defaulted, never fatal.

use std::collections::BTreeMap;

use chrono::{DateTime, Local, NaiveDateTime};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::StoreError;
use crate::record::{GroupRecord, Snapshot, Timestamp, TIMESTAMP_FORMAT};

/// Host configuration key wrapping the snapshot in a one-element list.
const WRAPPER_KEY: &str = "bot_data_list";

/// Result of decoding a persisted document.
#[derive(Debug, Default)]
pub struct Decoded {
    /// The decoded group records.
    pub snapshot: Snapshot,
    /// Groups that were stored in the legacy flat layout.
    pub migrated: Vec<String>,
    /// Groups dropped because their value was not an object.
    pub skipped: usize,
    /// The document used the host layout: wrapped in `bot_data_list` or
    /// with flat groups. Such records never carried an enforcement flag of
    /// their own, so `ban` in them is meaningless.
    pub legacy_layout: bool,
}

impl Decoded {
    /// Whether the document should be rewritten in the nested layout.
    pub fn needs_rewrite(&self) -> bool {
        self.legacy_layout || self.skipped > 0
    }
}

/// Decode a persisted document into a [`Snapshot`].
///
/// Only a non-object top level is an error; everything below it degrades
/// to defaults.
pub fn decode_snapshot(doc: &Value) -> Result<Decoded, StoreError> {
    let (groups, wrapped) = unwrap_host_wrapper(doc)?;
    let mut decoded = Decoded {
        legacy_layout: wrapped,
        ..Decoded::default()
    };

    for (group_id, value) in groups {
        let Some(fields) = value.as_object() else {
            warn!(group = %group_id, "Skipping group record that is not an object");
            decoded.skipped += 1;
            continue;
        };

        let record = if is_nested(fields) {
            decode_nested(group_id, fields)
        } else {
            debug!(group = %group_id, "Migrating flat group record");
            decoded.migrated.push(group_id.clone());
            decoded.legacy_layout = true;
            GroupRecord::new(decode_timestamps(group_id, fields), false, false)
        };
        decoded.snapshot.insert(group_id.clone(), record);
    }

    Ok(decoded)
}

/// The group map, and whether it was wrapped.
fn unwrap_host_wrapper(doc: &Value) -> Result<(&Map<String, Value>, bool), StoreError> {
    static EMPTY: std::sync::OnceLock<Map<String, Value>> = std::sync::OnceLock::new();

    let top = doc
        .as_object()
        .ok_or_else(|| StoreError::Schema(format!("expected object, found {}", kind(doc))))?;

    match top.get(WRAPPER_KEY) {
        Some(Value::Array(list)) => match list.first() {
            Some(Value::Object(inner)) => Ok((inner, true)),
            Some(other) => Err(StoreError::Schema(format!(
                "{WRAPPER_KEY}[0] must be an object, found {}",
                kind(other)
            ))),
            None => Ok((EMPTY.get_or_init(Map::new), true)),
        },
        Some(Value::Object(inner)) => Ok((inner, true)),
        _ => Ok((top, false)),
    }
}

fn is_nested(fields: &Map<String, Value>) -> bool {
    fields.contains_key("bot_records") || fields.contains_key("monitoring") || fields.contains_key("ban")
}

fn decode_nested(group_id: &str, fields: &Map<String, Value>) -> GroupRecord {
    let tagged = match fields.get("bot_records") {
        Some(Value::Object(records)) => decode_timestamps(group_id, records),
        Some(other) => {
            warn!(group = %group_id, found = kind(other), "bot_records is not an object; treating as empty");
            BTreeMap::new()
        }
        None => BTreeMap::new(),
    };
    let monitoring = fields.get("monitoring").and_then(Value::as_bool).unwrap_or(false);
    let enforcement = fields.get("ban").and_then(Value::as_bool).unwrap_or(false);
    GroupRecord::new(tagged, monitoring, enforcement)
}

fn decode_timestamps(group_id: &str, entries: &Map<String, Value>) -> BTreeMap<String, Timestamp> {
    entries
        .iter()
        .map(|(account, raw)| {
            let seen = parse_timestamp(raw).unwrap_or_else(|| {
                warn!(group = %group_id, account = %account, "Unreadable last-seen timestamp; resetting");
                Timestamp::default()
            });
            (account.clone(), seen)
        })
        .collect()
}

/// Parse a persisted timestamp: formatted string or unix seconds.
fn parse_timestamp(raw: &Value) -> Option<Timestamp> {
    match raw {
        Value::String(s) => NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT).ok(),
        Value::Number(n) => n
            .as_i64()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .map(|utc| utc.with_timezone(&Local).naive_local()),
        _ => None,
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decodes_nested_groups() {
        let doc = json!({
            "100": { "bot_records": { "u1": "2024-03-01 12:00:00" }, "monitoring": false, "ban": true }
        });
        let decoded = decode_snapshot(&doc).unwrap();

        let group = &decoded.snapshot["100"];
        assert!(group.is_tagged("u1"));
        assert!(group.enforcement());
        assert!(!decoded.legacy_layout);
        assert!(!decoded.needs_rewrite());
    }

    #[test]
    fn test_migrates_flat_groups() {
        let doc = json!({
            "100": { "u1": "2024-03-01 12:00:00", "u2": "2024-03-01 12:05:00" },
            "200": { "bot_records": {}, "ban": false }
        });
        let decoded = decode_snapshot(&doc).unwrap();

        assert_eq!(decoded.migrated, vec!["100".to_string()]);
        assert_eq!(decoded.snapshot["100"].tagged_count(), 2);
        assert!(!decoded.snapshot["100"].enforcement());
        assert!(decoded.legacy_layout);
        assert!(decoded.needs_rewrite());
    }

    #[test]
    fn test_unwraps_host_list_wrapper() {
        let doc = json!({ "bot_data_list": [ { "100": { "bot_records": { "u1": "2024-03-01 12:00:00" } } } ] });
        let decoded = decode_snapshot(&doc).unwrap();
        assert!(decoded.snapshot["100"].is_tagged("u1"));
        assert!(decoded.legacy_layout);
        assert!(decoded.needs_rewrite());

        let empty = decode_snapshot(&json!({ "bot_data_list": [] })).unwrap();
        assert!(empty.snapshot.is_empty());
    }

    #[test]
    fn test_malformed_entries_degrade() {
        let doc = json!({
            "100": "not a group",
            "200": { "bot_records": { "u1": "yesterday", "u2": 1_700_000_000 } }
        });
        let decoded = decode_snapshot(&doc).unwrap();

        assert_eq!(decoded.skipped, 1);
        let group = &decoded.snapshot["200"];
        assert_eq!(group.last_seen("u1"), Some(Timestamp::default()));
        assert!(group.last_seen("u2").unwrap() > Timestamp::default());
    }

    #[test]
    fn test_non_object_document_is_error() {
        let err = decode_snapshot(&json!([1, 2, 3])).unwrap_err();
        assert_eq!(err.error_code(), "schema");
    }
}
