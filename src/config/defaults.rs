//! Default value functions for configuration.
//!
//! Separated into its own module for clarity and reuse.

/// Returns `true` (for serde defaults).
pub fn default_true() -> bool {
    true
}

// =============================================================================
// Detection Defaults
// =============================================================================

pub fn default_probe_commands() -> Vec<String> {
    vec!["/help".to_string()]
}

pub fn default_probe_interval() -> u64 {
    2
}

// =============================================================================
// Enforcement Defaults
// =============================================================================

pub fn default_speak_threshold() -> u64 {
    20
}

pub fn default_max_length() -> usize {
    150
}

pub fn default_ban_duration() -> u64 {
    1800
}

pub fn default_grace_period() -> u64 {
    3
}

// =============================================================================
// Command Word Defaults
// =============================================================================

pub fn default_detect_command() -> String {
    "/findbots".to_string()
}

pub fn default_tag_command() -> String {
    "/tagbot".to_string()
}

pub fn default_untag_command() -> String {
    "/untagbot".to_string()
}

pub fn default_list_command() -> String {
    "/botlist".to_string()
}

pub fn default_enable_command() -> String {
    "/nobot on".to_string()
}

pub fn default_disable_command() -> String {
    "/nobot off".to_string()
}

// =============================================================================
// Runtime Defaults
// =============================================================================

pub fn default_storage_path() -> String {
    "nobot-records.json".to_string()
}

pub fn default_self_id() -> String {
    "nobot".to_string()
}
