//! Integration test common infrastructure.
//!
//! Provides a recording platform fake and a harness that wires a
//! [`Moderator`] to it with an in-memory record store and a manual clock.

pub mod platform;

use chrono::NaiveDate;
use nobot::config::Config;
use nobot::event::{GroupMessage, Role};
use nobot::records::{ManualClock, MemoryPersistence, RecordStore, Snapshot};
use nobot::{Moderator, SharedStore};
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

#[allow(unused_imports)]
pub use platform::{Action, RecordingPlatform};

pub const GROUP: &str = "G1";
pub const SELF_ID: &str = "nobot";

pub struct Harness {
    pub moderator: Arc<Moderator>,
    pub platform: Arc<RecordingPlatform>,
    pub store: SharedStore,
    pub clock: Arc<ManualClock>,
    pub persistence: Arc<MemoryPersistence>,
    next_id: AtomicU64,
}

#[allow(dead_code)]
impl Harness {
    pub fn new(config: Config) -> Self {
        let start = NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let clock = Arc::new(ManualClock::new(start));
        let persistence = Arc::new(MemoryPersistence::default());
        let store = RecordStore::new(Snapshot::new(), persistence.clone(), clock.clone())
            .with_default_enforcement(config.enforcement.default_enabled);
        let store: SharedStore = Arc::new(Mutex::new(store));
        let platform = Arc::new(RecordingPlatform::default());
        let moderator = Arc::new(Moderator::new(&config, store.clone(), platform.clone()));
        Self {
            moderator,
            platform,
            store,
            clock,
            persistence,
            next_id: AtomicU64::new(1),
        }
    }

    /// A message from a regular member of [`GROUP`].
    pub fn message(&self, sender: &str, text: &str) -> GroupMessage {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        GroupMessage::new(GROUP, sender, text)
            .with_message_id(format!("m{id}"))
            .with_self_id(SELF_ID)
    }

    /// A message from an admin of [`GROUP`].
    pub fn admin(&self, text: &str) -> GroupMessage {
        self.message("admin", text).with_role(Role::Admin)
    }
}

/// Config with the moderator id set, otherwise defaults.
#[allow(dead_code)]
pub fn config() -> Config {
    let mut config = Config::default();
    config.platform.self_id = SELF_ID.to_string();
    config
}
