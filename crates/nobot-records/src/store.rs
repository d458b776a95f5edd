//! The per-group record store.
//!
//! Reads never create records. Records are created lazily by [`RecordStore::tag`],
//! [`RecordStore::ensure_group`] and [`RecordStore::set_enforcement`], and are
//! never removed: untagging the last account leaves an empty record behind.
//!
//! Structural mutations (tag, untag, group creation, enforcement toggle) are
//! written through to the [`Persistence`] collaborator immediately. A failed
//! write is logged and the in-memory state is kept. Monitoring flags and
//! last-seen refreshes are runtime state and ride along with the next write.

use std::sync::Arc;

use chrono::Duration;
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::persist::Persistence;
use crate::record::{GroupRecord, Snapshot, Timestamp};

/// Owner of all group records.
pub struct RecordStore {
    groups: Snapshot,
    persistence: Arc<dyn Persistence>,
    clock: Arc<dyn Clock>,
    default_enforcement: bool,
}

impl std::fmt::Debug for RecordStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordStore")
            .field("groups", &self.groups)
            .field("default_enforcement", &self.default_enforcement)
            .finish_non_exhaustive()
    }
}

impl RecordStore {
    /// Build a store from a loaded snapshot.
    ///
    /// Monitoring flags are cleared: a probe cannot survive a restart.
    pub fn new(mut snapshot: Snapshot, persistence: Arc<dyn Persistence>, clock: Arc<dyn Clock>) -> Self {
        for (group_id, record) in snapshot.iter_mut() {
            if record.monitoring {
                debug!(group = %group_id, "Clearing stale monitoring flag");
                record.monitoring = false;
            }
        }
        Self {
            groups: snapshot,
            persistence,
            clock,
            default_enforcement: false,
        }
    }

    /// Enforcement state reported for groups without a record.
    pub fn with_default_enforcement(mut self, enabled: bool) -> Self {
        self.default_enforcement = enabled;
        self
    }

    // ========================================================================
    // Tagging
    // ========================================================================

    /// Tag `account` in `group` with the current time.
    ///
    /// Returns `false` without touching the existing timestamp if the
    /// account is already tagged.
    pub fn tag(&mut self, group: &str, account: &str) -> bool {
        let now = self.clock.now();
        let record = self.group_mut(group);
        if record.tagged.contains_key(account) {
            return false;
        }
        record.tagged.insert(account.to_string(), now);
        info!(group = %group, account = %account, "Tagged account as bot");
        self.flush();
        true
    }

    /// Remove the tag of `account` in `group`.
    pub fn untag(&mut self, group: &str, account: &str) -> bool {
        let removed = self
            .groups
            .get_mut(group)
            .is_some_and(|record| record.tagged.remove(account).is_some());
        if removed {
            info!(group = %group, account = %account, "Removed bot tag");
            self.flush();
        }
        removed
    }

    /// Whether `account` is tagged in `group`.
    pub fn is_tagged(&self, group: &str, account: &str) -> bool {
        self.groups.get(group).is_some_and(|record| record.is_tagged(account))
    }

    /// Tagged account ids in `group`, sorted. Empty for unknown groups.
    pub fn tagged_account_ids(&self, group: &str) -> Vec<String> {
        self.groups
            .get(group)
            .map(|record| record.tagged_ids().map(str::to_string).collect())
            .unwrap_or_default()
    }

    /// Last-seen time of a tagged account.
    pub fn last_seen(&self, group: &str, account: &str) -> Option<Timestamp> {
        self.groups.get(group).and_then(|record| record.last_seen(account))
    }

    // ========================================================================
    // Groups and flags
    // ========================================================================

    /// Ids of all groups that have a record.
    pub fn groups_with_records(&self) -> Vec<String> {
        self.groups.keys().cloned().collect()
    }

    /// Read-only view of one group.
    pub fn group(&self, group: &str) -> Option<&GroupRecord> {
        self.groups.get(group)
    }

    /// Create the record for `group` if it does not exist yet.
    ///
    /// Returns `true` if a record was created.
    pub fn ensure_group(&mut self, group: &str) -> bool {
        if self.groups.contains_key(group) {
            return false;
        }
        self.group_mut(group);
        self.flush();
        true
    }

    /// Set the monitoring flag. No-op for groups without a record.
    pub fn set_monitoring(&mut self, group: &str, active: bool) {
        if let Some(record) = self.groups.get_mut(group) {
            record.monitoring = active;
            debug!(group = %group, active, "Monitoring flag updated");
        }
    }

    /// Whether a probe is running in `group`. `false` for unknown groups.
    pub fn is_monitoring(&self, group: &str) -> bool {
        self.groups.get(group).is_some_and(GroupRecord::monitoring)
    }

    /// Enable or disable enforcement, creating the record if needed.
    pub fn set_enforcement(&mut self, group: &str, enabled: bool) {
        self.group_mut(group).enforcement = enabled;
        info!(group = %group, enabled, "Enforcement toggled");
        self.flush();
    }

    /// Whether enforcement is on for `group`, or the default for unknown groups.
    pub fn is_enforcement_enabled(&self, group: &str) -> bool {
        self.groups
            .get(group)
            .map_or(self.default_enforcement, GroupRecord::enforcement)
    }

    /// Enable enforcement for configured groups.
    ///
    /// Groups without a record are created with enforcement on. Existing
    /// records keep their persisted flag unless `override_persisted` is
    /// set, which is the case for records loaded from the host layout
    /// (their `ban` flag was never written by an admin). Returns the number
    /// of groups changed.
    pub fn seed_enforcement<I, S>(&mut self, groups: I, override_persisted: bool) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seeded = 0;
        for group in groups {
            let group = group.as_ref();
            let changed = match self.groups.get_mut(group) {
                Some(record) if override_persisted && !record.enforcement => {
                    record.enforcement = true;
                    true
                }
                Some(_) => false,
                None => {
                    self.group_mut(group).enforcement = true;
                    true
                }
            };
            if changed {
                seeded += 1;
            }
        }
        if seeded > 0 {
            info!(count = seeded, override_persisted, "Seeded enforcement groups from configuration");
            self.flush();
        }
        seeded
    }

    // ========================================================================
    // Throttling
    // ========================================================================

    /// Report whether `account` spoke again within `threshold_secs` and
    /// refresh its last-seen time.
    ///
    /// The timestamp is set to now on every call, violating or not. An
    /// account without a prior timestamp is never in violation. Unknown
    /// groups report `false` and are not created.
    pub fn check_and_update_speak_interval(&mut self, group: &str, account: &str, threshold_secs: u64) -> bool {
        let now = self.clock.now();
        let Some(record) = self.groups.get_mut(group) else {
            debug!(group = %group, "Speak check for group without records");
            return false;
        };

        let prior = record.tagged.insert(account.to_string(), now);
        let threshold_secs = i64::try_from(threshold_secs).unwrap_or(i64::MAX).min(i64::MAX / 1000);
        let threshold = Duration::seconds(threshold_secs);
        match prior {
            Some(prior) => now.signed_duration_since(prior) < threshold,
            None => false,
        }
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    /// Copy of the full mapping, as handed to the persistence collaborator.
    pub fn snapshot(&self) -> Snapshot {
        self.groups.clone()
    }

    fn group_mut(&mut self, group: &str) -> &mut GroupRecord {
        let enforcement = self.default_enforcement;
        self.groups.entry(group.to_string()).or_insert_with(|| GroupRecord {
            enforcement,
            ..GroupRecord::default()
        })
    }

    fn flush(&self) {
        if let Err(e) = self.persistence.persist(&self.groups) {
            warn!(error = %e, code = e.error_code(), "Failed to persist records");
        }
    }
}
