//! Enforcement on tagged accounts.
//!
//! Runs for every group message, independently of probing. A message from
//! a tagged, non-elevated sender in a group with enforcement on is checked
//! for length first, then for frequency. Either violation optionally
//! deletes the message and mutes the sender. Only the frequency violation
//! stops the event from reaching later handlers.
//!
//! Messages that open with a reply or a mention of the moderator are held
//! for the grace period before being judged, and are re-checked afterwards.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::SharedStore;
use crate::config::EnforcementConfig;
use crate::event::GroupMessage;
use crate::platform::{self, Platform};

pub const NOTICE_TOO_LONG: &str = "Why send such a long message!";

/// Why a message was not judged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    NotTagged,
    EnforcementDisabled,
    Elevated,
}

/// What enforcement did with one message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnforcementOutcome {
    /// Not subject to enforcement.
    Ignored(IgnoreReason),
    /// Checked and let through; the last-seen time was refreshed.
    Allowed,
    /// Too long: warned, muted.
    MutedForLength,
    /// Too soon after the previous message: muted, event stopped.
    MutedForFrequency,
}

impl EnforcementOutcome {
    /// Whether later handlers must not see the event.
    pub fn stops_event(self) -> bool {
        matches!(self, Self::MutedForFrequency)
    }
}

/// Applies length and frequency limits to tagged accounts.
pub struct Enforcer {
    store: SharedStore,
    platform: Arc<dyn Platform>,
    config: EnforcementConfig,
}

impl Enforcer {
    pub fn new(store: SharedStore, platform: Arc<dyn Platform>, config: &EnforcementConfig) -> Self {
        Self {
            store,
            platform,
            config: config.clone(),
        }
    }

    /// Judge one group message.
    pub async fn enforce(&self, event: &GroupMessage) -> EnforcementOutcome {
        if let Some(reason) = self.exemption(event) {
            return EnforcementOutcome::Ignored(reason);
        }

        if event.addresses_bot() && self.config.grace_period > 0 {
            debug!(
                group = %event.group_id,
                account = %event.sender_id,
                grace_secs = self.config.grace_period,
                "Holding message addressed at the moderator"
            );
            tokio::time::sleep(Duration::from_secs(self.config.grace_period)).await;
            if let Some(reason) = self.exemption(event) {
                return EnforcementOutcome::Ignored(reason);
            }
        }

        if event.text_len() > self.config.max_length {
            info!(
                group = %event.group_id,
                account = %event.sender_id,
                length = event.text_len(),
                max_length = self.config.max_length,
                "Tagged account sent an overlong message"
            );
            platform::notify(self.platform.as_ref(), event, NOTICE_TOO_LONG).await;
            self.punish(event, "length").await;
            return EnforcementOutcome::MutedForLength;
        }

        let violated = self.store.lock().check_and_update_speak_interval(
            &event.group_id,
            &event.sender_id,
            self.config.speak_threshold,
        );
        if violated {
            info!(
                group = %event.group_id,
                account = %event.sender_id,
                threshold_secs = self.config.speak_threshold,
                "Tagged account spoke too often"
            );
            self.punish(event, "frequency").await;
            return EnforcementOutcome::MutedForFrequency;
        }

        EnforcementOutcome::Allowed
    }

    fn exemption(&self, event: &GroupMessage) -> Option<IgnoreReason> {
        {
            let store = self.store.lock();
            if !store.is_tagged(&event.group_id, &event.sender_id) {
                return Some(IgnoreReason::NotTagged);
            }
            if !store.is_enforcement_enabled(&event.group_id) {
                return Some(IgnoreReason::EnforcementDisabled);
            }
        }
        if self.platform.is_elevated_role(event) {
            return Some(IgnoreReason::Elevated);
        }
        None
    }

    async fn punish(&self, event: &GroupMessage, reason: &'static str) {
        if self.config.delete_on_ban {
            platform::delete(self.platform.as_ref(), event).await;
        }
        if platform::mute(self.platform.as_ref(), event, &event.sender_id, self.config.ban_duration).await {
            crate::metrics::record_mute(reason);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{PlatformError, PlatformResult};
    use crate::event::{Role, Segment};
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use nobot_records::{ManualClock, MemoryPersistence, RecordStore, Snapshot};
    use parking_lot::Mutex;

    #[derive(Default)]
    struct Calls {
        log: Mutex<Vec<String>>,
        fail_mute: bool,
    }

    #[async_trait]
    impl Platform for Calls {
        async fn resolve_display_name(&self, _event: &GroupMessage, _account: &str) -> Option<String> {
            None
        }
        async fn set_mute(&self, _event: &GroupMessage, account: &str, secs: u64) -> PlatformResult {
            if self.fail_mute {
                return Err(PlatformError::Rejected {
                    call: "set_mute",
                    reason: "no permission".into(),
                });
            }
            self.log.lock().push(format!("mute {account} {secs}"));
            Ok(())
        }
        async fn delete_message(&self, event: &GroupMessage) -> PlatformResult {
            self.log.lock().push(format!("delete {}", event.message_id));
            Ok(())
        }
        fn is_elevated_role(&self, event: &GroupMessage) -> bool {
            event.sender_role.is_elevated()
        }
        async fn emit(&self, _event: &GroupMessage, text: &str) -> PlatformResult {
            self.log.lock().push(format!("emit {text}"));
            Ok(())
        }
    }

    struct Fixture {
        enforcer: Enforcer,
        calls: Arc<Calls>,
        store: SharedStore,
        clock: Arc<ManualClock>,
    }

    fn fixture(calls: Calls) -> Fixture {
        let start = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        let clock = Arc::new(ManualClock::new(start));
        let store = Arc::new(Mutex::new(RecordStore::new(
            Snapshot::new(),
            Arc::new(MemoryPersistence::default()),
            clock.clone(),
        )));
        let calls = Arc::new(calls);
        let config = EnforcementConfig {
            max_length: 10,
            grace_period: 3,
            ..EnforcementConfig::default()
        };
        let enforcer = Enforcer::new(store.clone(), calls.clone(), &config);
        Fixture {
            enforcer,
            calls,
            store,
            clock,
        }
    }

    fn tagged(f: &Fixture) {
        let mut store = f.store.lock();
        store.tag("g", "u1");
        store.set_enforcement("g", true);
    }

    #[tokio::test]
    async fn test_untagged_sender_is_ignored() {
        let f = fixture(Calls::default());
        f.store.lock().set_enforcement("g", true);

        let long = GroupMessage::new("g", "u1", "x".repeat(500));
        assert_eq!(
            f.enforcer.enforce(&long).await,
            EnforcementOutcome::Ignored(IgnoreReason::NotTagged)
        );
        assert!(f.calls.log.lock().is_empty());
    }

    #[tokio::test]
    async fn test_disabled_group_and_elevated_sender_are_ignored() {
        let f = fixture(Calls::default());
        f.store.lock().tag("g", "u1");
        let msg = GroupMessage::new("g", "u1", "hi");
        assert_eq!(
            f.enforcer.enforce(&msg).await,
            EnforcementOutcome::Ignored(IgnoreReason::EnforcementDisabled)
        );

        f.store.lock().set_enforcement("g", true);
        let admin = msg.with_role(Role::Admin);
        assert_eq!(
            f.enforcer.enforce(&admin).await,
            EnforcementOutcome::Ignored(IgnoreReason::Elevated)
        );
    }

    #[tokio::test]
    async fn test_length_boundary() {
        let f = fixture(Calls::default());
        tagged(&f);
        f.clock.advance(100);

        let exact = GroupMessage::new("g", "u1", "x".repeat(10)).with_message_id("m1");
        assert_eq!(f.enforcer.enforce(&exact).await, EnforcementOutcome::Allowed);

        f.clock.advance(100);
        let over = GroupMessage::new("g", "u1", "x".repeat(11)).with_message_id("m2");
        let outcome = f.enforcer.enforce(&over).await;
        assert_eq!(outcome, EnforcementOutcome::MutedForLength);
        assert!(!outcome.stops_event());
        assert_eq!(
            *f.calls.log.lock(),
            vec![
                format!("emit {NOTICE_TOO_LONG}"),
                "delete m2".to_string(),
                "mute u1 1800".to_string()
            ]
        );
    }

    #[tokio::test]
    async fn test_frequency_violation_stops_event() {
        let f = fixture(Calls::default());
        tagged(&f);

        f.clock.advance(5);
        let msg = GroupMessage::new("g", "u1", "hi").with_message_id("m1");
        let outcome = f.enforcer.enforce(&msg).await;
        assert_eq!(outcome, EnforcementOutcome::MutedForFrequency);
        assert!(outcome.stops_event());
        assert_eq!(*f.calls.log.lock(), vec!["delete m1", "mute u1 1800"]);
    }

    #[tokio::test]
    async fn test_mute_failure_is_swallowed() {
        let f = fixture(Calls {
            fail_mute: true,
            ..Calls::default()
        });
        tagged(&f);

        let msg = GroupMessage::new("g", "u1", "hi").with_message_id("m1");
        assert_eq!(f.enforcer.enforce(&msg).await, EnforcementOutcome::MutedForFrequency);
        assert_eq!(*f.calls.log.lock(), vec!["delete m1"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_grace_window_rechecks_tag() {
        let f = fixture(Calls::default());
        tagged(&f);
        let msg = GroupMessage::new("g", "u1", "hi")
            .with_self_id("bot")
            .with_segments(vec![Segment::Mention("bot".into()), Segment::Text("hi".into())]);

        let store = f.store.clone();
        let untag = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            store.lock().untag("g", "u1");
        });

        let started = tokio::time::Instant::now();
        assert_eq!(
            f.enforcer.enforce(&msg).await,
            EnforcementOutcome::Ignored(IgnoreReason::NotTagged)
        );
        assert!(started.elapsed() >= Duration::from_secs(3));
        untag.await.unwrap();
    }
}
