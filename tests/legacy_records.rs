//! Integration tests for opening the record store from files written by
//! the host plugin layout, together with configured enforcement groups.

mod common;
use common::{GROUP, config};
use nobot::records::ManualClock;
use nobot::storage;
use std::fs;
use std::sync::Arc;

fn clock() -> Arc<ManualClock> {
    let start = chrono::NaiveDate::from_ymd_opt(2024, 5, 1)
        .unwrap()
        .and_hms_opt(9, 0, 0)
        .unwrap();
    Arc::new(ManualClock::new(start))
}

#[test]
fn host_layout_groups_follow_enabled_groups() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("records.json");
    fs::write(
        &path,
        r#"{"bot_data_list": [ {
            "G1": { "bot_records": { "u1": "2024-05-01 08:00:00" }, "monitoring": true, "ban": false },
            "G2": { "u2": "2024-05-01 08:30:00" },
            "G3": { "bot_records": {}, "ban": false }
        } ]}"#,
    )
    .unwrap();

    let mut config = config();
    config.storage.path = path.to_string_lossy().into_owned();
    config.enforcement.enabled_groups = vec![GROUP.into(), "G2".into()];
    let store = storage::open(&config, clock());

    {
        let store = store.lock();
        assert!(store.is_tagged(GROUP, "u1"));
        assert!(store.is_enforcement_enabled(GROUP));
        assert!(!store.is_monitoring(GROUP));
        assert!(store.is_enforcement_enabled("G2"));
        assert!(store.is_tagged("G2", "u2"));
        assert!(!store.is_enforcement_enabled("G3"));
    }

    let saved: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert!(saved.get("bot_data_list").is_none());
    assert_eq!(saved[GROUP]["ban"], true);
    assert_eq!(saved["G2"]["bot_records"]["u2"], "2024-05-01 08:30:00");
}

#[test]
fn native_layout_keeps_admin_choice() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("records.json");
    fs::write(
        &path,
        r#"{ "G1": { "bot_records": { "u1": "2024-05-01 08:00:00" }, "monitoring": false, "ban": false } }"#,
    )
    .unwrap();

    let mut config = config();
    config.storage.path = path.to_string_lossy().into_owned();
    config.enforcement.enabled_groups = vec![GROUP.into(), "G9".into()];
    let store = storage::open(&config, clock());

    let store = store.lock();
    assert!(!store.is_enforcement_enabled(GROUP));
    assert!(store.is_enforcement_enabled("G9"));
}

#[test]
fn unreadable_file_starts_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("records.json");
    fs::write(&path, "not json").unwrap();

    let mut config = config();
    config.storage.path = path.to_string_lossy().into_owned();
    let store = storage::open(&config, clock());

    assert!(store.lock().groups_with_records().is_empty());
}
