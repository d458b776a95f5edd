//! Command words recognized in group messages.

use serde::Deserialize;

use super::defaults::{
    default_detect_command, default_disable_command, default_enable_command, default_list_command,
    default_tag_command, default_untag_command,
};

/// Text of each admin command, matched against the start of a message.
#[derive(Debug, Clone, Deserialize)]
pub struct CommandsConfig {
    /// Start (or cancel) a detection probe.
    #[serde(default = "default_detect_command")]
    pub detect: String,
    /// Tag the mentioned accounts.
    #[serde(default = "default_tag_command")]
    pub tag: String,
    /// Remove the tag of the mentioned accounts.
    #[serde(default = "default_untag_command")]
    pub untag: String,
    /// List tagged accounts.
    #[serde(default = "default_list_command")]
    pub list: String,
    /// Switch enforcement on for the group.
    #[serde(default = "default_enable_command")]
    pub enable: String,
    /// Switch enforcement off for the group.
    #[serde(default = "default_disable_command")]
    pub disable: String,
    /// Messages that are swallowed when sent by non-elevated members.
    #[serde(default, alias = "ignored_commands", alias = "ignore_cmds")]
    pub ignored: Vec<String>,
}

impl Default for CommandsConfig {
    fn default() -> Self {
        Self {
            detect: default_detect_command(),
            tag: default_tag_command(),
            untag: default_untag_command(),
            list: default_list_command(),
            enable: default_enable_command(),
            disable: default_disable_command(),
            ignored: Vec::new(),
        }
    }
}
