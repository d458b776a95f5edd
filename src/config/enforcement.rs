//! Enforcement configuration for tagged accounts.

use serde::Deserialize;

use super::defaults::{
    default_ban_duration, default_grace_period, default_max_length, default_speak_threshold,
    default_true,
};

/// Throttling and mute settings applied to tagged accounts.
#[derive(Debug, Clone, Deserialize)]
pub struct EnforcementConfig {
    /// Minimum seconds between two messages of a tagged account.
    #[serde(default = "default_speak_threshold")]
    pub speak_threshold: u64,
    /// Longest message (in characters) allowed. Also used while probing.
    #[serde(default = "default_max_length")]
    pub max_length: usize,
    /// Mute duration in seconds.
    #[serde(default = "default_ban_duration")]
    pub ban_duration: u64,
    /// Delete the offending message before muting.
    #[serde(default = "default_true", alias = "is_delete_msg")]
    pub delete_on_ban: bool,
    /// Seconds to wait before judging a message addressed at the bot.
    #[serde(default = "default_grace_period", alias = "ban_sleep")]
    pub grace_period: u64,
    /// Groups with enforcement switched on at startup.
    #[serde(default, alias = "monitoring_groups")]
    pub enabled_groups: Vec<String>,
    /// Enforcement state of groups that have no record yet.
    #[serde(default)]
    pub default_enabled: bool,
}

impl Default for EnforcementConfig {
    fn default() -> Self {
        Self {
            speak_threshold: default_speak_threshold(),
            max_length: default_max_length(),
            ban_duration: default_ban_duration(),
            delete_on_ban: true,
            grace_period: default_grace_period(),
            enabled_groups: Vec::new(),
            default_enabled: false,
        }
    }
}
