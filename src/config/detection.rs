//! Detection probe configuration.

use serde::Deserialize;

use super::defaults::{default_probe_commands, default_probe_interval};

/// Settings for the probe sequence and reply classification.
#[derive(Debug, Clone, Deserialize)]
pub struct DetectionConfig {
    /// Commands sent into the group, in order, to provoke automated replies.
    #[serde(default = "default_probe_commands", alias = "test_cmds")]
    pub probe_commands: Vec<String>,
    /// Seconds to wait after each probe command.
    #[serde(default = "default_probe_interval", alias = "test_interval")]
    pub probe_interval: u64,
    /// Substrings that mark a reply as bot-like while probing.
    #[serde(default)]
    pub bot_words: Vec<String>,
    /// Also tag senders whose message starts with a reply/quote segment.
    #[serde(default)]
    pub tag_forwarded_replies: bool,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            probe_commands: default_probe_commands(),
            probe_interval: default_probe_interval(),
            bot_words: Vec::new(),
            tag_forwarded_replies: false,
        }
    }
}

impl DetectionConfig {
    /// Upper bound on one probe run: `interval * (commands + 1)` seconds.
    pub fn session_ceiling_secs(&self) -> u64 {
        let slots = u64::try_from(self.probe_commands.len()).unwrap_or(u64::MAX);
        self.probe_interval.saturating_mul(slots.saturating_add(1))
    }
}
