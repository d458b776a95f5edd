//! Opening the record store at startup.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{info, warn};

use crate::SharedStore;
use crate::config::Config;
use crate::records::{Clock, Decoded, JsonFilePersistence, RecordStore};

/// Load records from `storage.path`, apply configured enforcement groups
/// and wrap the store for sharing.
///
/// An unreadable file is logged and replaced by an empty store. Records in
/// the host layout take their enforcement flag from `enabled_groups`.
pub fn open(config: &Config, clock: Arc<dyn Clock>) -> SharedStore {
    let persistence = Arc::new(JsonFilePersistence::new(&config.storage.path));
    let decoded = persistence.load().unwrap_or_else(|e| {
        warn!(error = %e, path = %config.storage.path, "Failed to load records; starting empty");
        Decoded::default()
    });
    info!(
        groups = decoded.snapshot.len(),
        migrated = decoded.migrated.len(),
        legacy_layout = decoded.legacy_layout,
        "Loaded group records"
    );

    let mut store = RecordStore::new(decoded.snapshot, persistence, clock)
        .with_default_enforcement(config.enforcement.default_enabled);
    store.seed_enforcement(&config.enforcement.enabled_groups, decoded.legacy_layout);
    Arc::new(Mutex::new(store))
}
