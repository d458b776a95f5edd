//! Admin commands recognized in group messages.
//!
//! Command words come from [`CommandsConfig`]. A message is a command when
//! its trimmed text equals the command word or starts with it followed by
//! whitespace; the longest matching word wins. Accounts to act on are taken
//! from the message's mentions.

use crate::config::CommandsConfig;

/// A parsed admin command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupCommand {
    /// Start, or cancel, a probe in the group.
    Detect,
    /// Tag the mentioned accounts.
    Tag,
    /// Untag (and unmute) the mentioned accounts.
    Untag,
    /// List tagged accounts by display name.
    List,
    /// Switch enforcement on.
    Enable,
    /// Switch enforcement off.
    Disable,
}

impl GroupCommand {
    const ALL: [GroupCommand; 6] = [
        Self::Detect,
        Self::Tag,
        Self::Untag,
        Self::List,
        Self::Enable,
        Self::Disable,
    ];

    /// Parse `text` against the configured command words.
    pub fn parse(text: &str, words: &CommandsConfig) -> Option<Self> {
        let text = text.trim();
        Self::ALL
            .into_iter()
            .filter_map(|command| {
                let word = command.word(words);
                matches_word(text, word).then_some((word.len(), command))
            })
            .max_by_key(|(len, _)| *len)
            .map(|(_, command)| command)
    }

    /// Everything except listing needs an owner or admin.
    pub fn requires_elevation(self) -> bool {
        !matches!(self, Self::List)
    }

    /// Static name for logs and metrics.
    pub fn name(self) -> &'static str {
        match self {
            Self::Detect => "detect",
            Self::Tag => "tag",
            Self::Untag => "untag",
            Self::List => "list",
            Self::Enable => "enable",
            Self::Disable => "disable",
        }
    }

    fn word(self, words: &CommandsConfig) -> &str {
        match self {
            Self::Detect => &words.detect,
            Self::Tag => &words.tag,
            Self::Untag => &words.untag,
            Self::List => &words.list,
            Self::Enable => &words.enable,
            Self::Disable => &words.disable,
        }
    }
}

fn matches_word(text: &str, word: &str) -> bool {
    if word.is_empty() {
        return false;
    }
    match text.strip_prefix(word) {
        Some(rest) => rest.is_empty() || rest.starts_with(char::is_whitespace),
        None => false,
    }
}

/// Whether `text` is one of the ignored commands.
pub fn is_ignored(text: &str, words: &CommandsConfig) -> bool {
    let text = text.trim();
    !text.is_empty() && words.ignored.iter().any(|ignored| ignored == text)
}
