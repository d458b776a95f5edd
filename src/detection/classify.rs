//! Reply classification while a probe is running.
//!
//! Rules are checked in order and the first hit wins:
//! 1. quoted reply as first segment (only with `tag_forwarded_replies`)
//! 2. message longer than `max_length` characters
//! 3. message containing a configured bot word
//!
//! Anything else is left alone.

use aho_corasick::AhoCorasick;
use tracing::warn;

use crate::event::GroupMessage;

/// Why a reply got its sender tagged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// The reply quoted or forwarded another message.
    ForwardedReply,
    /// The reply was longer than the length limit.
    TooTalkative,
    /// The reply contained a bot signature word.
    BotSignature(String),
}

impl Classification {
    /// Notice posted in the group after tagging `name`.
    pub fn notice(&self, name: &str) -> String {
        match self {
            Self::ForwardedReply => format!("[{name}] forwarded a message and has been tagged as a bot"),
            Self::TooTalkative => format!("[{name}] talks too much and has been tagged as a bot"),
            Self::BotSignature(_) => format!("[{name}] speaks with a bot signature and has been tagged as a bot"),
        }
    }

    /// Short label for logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::ForwardedReply => "forwarded_reply",
            Self::TooTalkative => "too_talkative",
            Self::BotSignature(_) => "bot_signature",
        }
    }
}

/// Substring matcher over the configured bot words.
#[derive(Debug, Clone)]
pub struct SignatureMatcher {
    /// Aho-Corasick automaton; `None` when no words are configured.
    matcher: Option<AhoCorasick>,
    words: Vec<String>,
}

impl SignatureMatcher {
    /// Build a matcher. Empty words are dropped: they would match every message.
    pub fn new(words: &[String]) -> Self {
        let words: Vec<String> = words.iter().filter(|w| !w.is_empty()).cloned().collect();
        if words.is_empty() {
            return Self { matcher: None, words };
        }

        let matcher = match AhoCorasick::new(&words) {
            Ok(matcher) => Some(matcher),
            Err(err) => {
                warn!(error = ?err, "Failed to build bot word matcher; signature matching disabled");
                None
            }
        };
        Self { matcher, words }
    }

    /// First configured word found in `text`.
    pub fn find(&self, text: &str) -> Option<&str> {
        let matcher = self.matcher.as_ref()?;
        let hit = matcher.find(text)?;
        self.words.get(hit.pattern().as_usize()).map(String::as_str)
    }
}

/// Reply classifier.
#[derive(Debug, Clone)]
pub struct Classifier {
    max_length: usize,
    signatures: SignatureMatcher,
    tag_forwarded_replies: bool,
}

impl Classifier {
    pub fn new(max_length: usize, bot_words: &[String], tag_forwarded_replies: bool) -> Self {
        Self {
            max_length,
            signatures: SignatureMatcher::new(bot_words),
            tag_forwarded_replies,
        }
    }

    /// Classify one reply received while probing.
    pub fn classify(&self, event: &GroupMessage) -> Option<Classification> {
        if self.tag_forwarded_replies && event.starts_with_reply() {
            return Some(Classification::ForwardedReply);
        }
        if event.text_len() > self.max_length {
            return Some(Classification::TooTalkative);
        }
        if event.text.is_empty() {
            return None;
        }
        self.signatures
            .find(&event.text)
            .map(|word| Classification::BotSignature(word.to_string()))
    }
}
