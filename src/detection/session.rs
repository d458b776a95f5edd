//! Probe sessions.
//!
//! A group is either [`ProbeState::Idle`] or [`ProbeState::Probing`]. The
//! detect command starts a probe when idle and cancels it when probing.
//! A running probe emits the configured commands one by one, pausing
//! `probe_interval` seconds after each, and polls for cancellation before
//! every emission. A pause in progress is never cut short.
//!
//! Every started probe gets a generation number. A loop only keeps going
//! while its generation is still the current one for its group, so a probe
//! that was cancelled and replaced by a new one stops at its next boundary
//! even though the group is monitoring again.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use dashmap::DashMap;
use tracing::{Instrument, debug, info};

use super::classify::{Classification, Classifier};
use crate::SharedStore;
use crate::config::{DetectionConfig, EnforcementConfig};
use crate::event::GroupMessage;
use crate::platform::{self, Platform};

pub const NOTICE_CANCELLED: &str = "Bot detection cancelled";
pub const NOTICE_FINISHED: &str = "Bot detection finished";
pub const NOTICE_TIMED_OUT: &str = "Bot detection timed out";

/// Whether a group is being probed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeState {
    Idle,
    Probing,
}

/// How one invocation of the detect command ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// Every probe command was sent.
    Completed,
    /// This invocation cancelled a running probe.
    Cancelled,
    /// This probe noticed it had been cancelled and stopped early.
    Aborted,
    /// The probe overran its time budget.
    TimedOut,
}

impl ProbeOutcome {
    pub fn label(self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Aborted => "aborted",
            Self::TimedOut => "timed_out",
        }
    }
}

/// A reply classified while probing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub classification: Classification,
    /// The sender was not tagged before this message.
    pub newly_tagged: bool,
}

/// Runs probes and classifies replies for every group.
pub struct Detector {
    store: SharedStore,
    platform: Arc<dyn Platform>,
    config: DetectionConfig,
    classifier: Classifier,
    /// Generation of the probe currently allowed to run, per group.
    generations: DashMap<String, u64>,
    next_generation: AtomicU64,
}

impl Detector {
    pub fn new(
        store: SharedStore,
        platform: Arc<dyn Platform>,
        detection: &DetectionConfig,
        enforcement: &EnforcementConfig,
    ) -> Self {
        Self {
            store,
            platform,
            classifier: Classifier::new(
                enforcement.max_length,
                &detection.bot_words,
                detection.tag_forwarded_replies,
            ),
            config: detection.clone(),
            generations: DashMap::new(),
            next_generation: AtomicU64::new(0),
        }
    }

    /// Current probe state of `group`.
    pub fn state(&self, group: &str) -> ProbeState {
        if self.store.lock().is_monitoring(group) {
            ProbeState::Probing
        } else {
            ProbeState::Idle
        }
    }

    /// Handle the detect command: cancel a running probe, or run a new one
    /// to completion.
    pub async fn invoke(&self, event: &GroupMessage) -> ProbeOutcome {
        let group = event.group_id.as_str();

        let Some(generation) = self.begin(group) else {
            info!(group = %group, "Probe cancelled by re-trigger");
            platform::notify(self.platform.as_ref(), event, NOTICE_CANCELLED).await;
            crate::metrics::record_probe_outcome(ProbeOutcome::Cancelled.label());
            return ProbeOutcome::Cancelled;
        };

        let ceiling = Duration::from_secs(self.config.session_ceiling_secs().max(1));
        let span = crate::telemetry::spans::probe(group, generation);
        let outcome = match tokio::time::timeout(ceiling, self.run_probes(event, generation))
            .instrument(span)
            .await
        {
            Ok(outcome) => outcome,
            Err(_) => {
                info!(group = %group, generation, ceiling_secs = ceiling.as_secs(), "Probe timed out");
                if self.finish(group, generation) {
                    platform::notify(self.platform.as_ref(), event, NOTICE_TIMED_OUT).await;
                }
                ProbeOutcome::TimedOut
            }
        };

        crate::metrics::record_probe_outcome(outcome.label());
        outcome
    }

    /// Classify a reply if `event`'s group is being probed, tagging the
    /// sender and posting a notice on a hit.
    pub async fn classify_reply(&self, event: &GroupMessage) -> Option<Verdict> {
        if !self.store.lock().is_monitoring(&event.group_id) {
            return None;
        }
        let verdict = self.classifier.classify(event)?;

        let newly_tagged = self.store.lock().tag(&event.group_id, &event.sender_id);
        if newly_tagged {
            crate::metrics::record_tag("probe");
        }
        info!(
            group = %event.group_id,
            account = %event.sender_id,
            rule = verdict.label(),
            newly_tagged,
            "Reply classified as bot"
        );

        let name = platform::display_name(self.platform.as_ref(), event, &event.sender_id).await;
        platform::notify(self.platform.as_ref(), event, &verdict.notice(&name)).await;
        Some(Verdict {
            classification: verdict,
            newly_tagged,
        })
    }

    /// Flip `group` into probing, or cancel the running probe.
    ///
    /// Returns the new generation when a probe should start.
    fn begin(&self, group: &str) -> Option<u64> {
        let mut store = self.store.lock();
        if store.is_monitoring(group) {
            store.set_monitoring(group, false);
            if self.generations.remove(group).is_some() {
                crate::metrics::adjust_active_probes(-1);
            }
            return None;
        }

        store.ensure_group(group);
        store.set_monitoring(group, true);
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed) + 1;
        if self.generations.insert(group.to_string(), generation).is_none() {
            crate::metrics::adjust_active_probes(1);
        }
        Some(generation)
    }

    async fn run_probes(&self, event: &GroupMessage, generation: u64) -> ProbeOutcome {
        let group = event.group_id.as_str();
        let interval = Duration::from_secs(self.config.probe_interval);
        info!(group = %group, commands = self.config.probe_commands.len(), "Probe started");

        for (index, command) in self.config.probe_commands.iter().enumerate() {
            if !self.is_current(group, generation) {
                debug!(group = %group, sent = index, "Probe stopped at loop boundary");
                return ProbeOutcome::Aborted;
            }
            platform::notify(self.platform.as_ref(), event, command).await;
            tokio::time::sleep(interval).await;
        }

        if !self.finish(group, generation) {
            debug!(group = %group, "Probe cancelled during final pause");
            return ProbeOutcome::Aborted;
        }
        info!(group = %group, "Probe finished");
        platform::notify(self.platform.as_ref(), event, NOTICE_FINISHED).await;
        ProbeOutcome::Completed
    }

    fn is_current(&self, group: &str, generation: u64) -> bool {
        let current = self.generations.get(group).is_some_and(|g| *g == generation);
        current && self.store.lock().is_monitoring(group)
    }

    /// End the probe `generation` if it is still the current one.
    fn finish(&self, group: &str, generation: u64) -> bool {
        let mut store = self.store.lock();
        let removed = self
            .generations
            .remove_if(group, |_, g| *g == generation)
            .is_some();
        if !removed || !store.is_monitoring(group) {
            if removed {
                crate::metrics::adjust_active_probes(-1);
            }
            return false;
        }
        store.set_monitoring(group, false);
        crate::metrics::adjust_active_probes(-1);
        true
    }
}
