//! Line-based event input for the `nobotd` binary.
//!
//! Each non-empty line is one of:
//!
//! ```text
//! # comment
//! sleep <seconds>                      pause reading input (fractions allowed)
//! name <account> <display name...>     register a display name
//! <group> <sender>[:role] <message...> a group message
//! ```
//!
//! In a message, `@id` tokens become mentions and a leading `>id` token
//! makes the message a reply to message `id`. The remaining tokens form the
//! plain text. Roles are `member`, `admin` or `owner`.

use std::time::Duration;
use thiserror::Error;

use crate::event::{GroupMessage, Role, Segment};

/// Errors for malformed input lines.
#[derive(Debug, Error, PartialEq)]
pub enum ScriptError {
    #[error("line {0}: expected '<group> <sender> <message>'")]
    MissingSender(usize),
    #[error("line {line}: {reason}")]
    BadRole { line: usize, reason: String },
    #[error("line {0}: sleep needs a non-negative number of seconds")]
    BadSleep(usize),
    #[error("line {0}: name needs an account and a display name")]
    BadName(usize),
}

/// One parsed input line.
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptLine {
    Blank,
    Sleep(Duration),
    Name { account: String, display: String },
    Message(GroupMessage),
}

/// Turns input lines into events, numbering messages as it goes.
#[derive(Debug)]
pub struct ScriptReader {
    self_id: String,
    line_no: usize,
    next_message_id: u64,
}

impl ScriptReader {
    pub fn new(self_id: impl Into<String>) -> Self {
        Self {
            self_id: self_id.into(),
            line_no: 0,
            next_message_id: 1,
        }
    }

    /// Parse the next input line.
    pub fn parse_line(&mut self, line: &str) -> Result<ScriptLine, ScriptError> {
        self.line_no += 1;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(ScriptLine::Blank);
        }

        let mut words = line.split_whitespace();
        match words.next() {
            Some("sleep") => {
                let secs = words
                    .next()
                    .and_then(|s| s.parse::<f64>().ok())
                    .filter(|s| s.is_finite() && *s >= 0.0)
                    .ok_or(ScriptError::BadSleep(self.line_no))?;
                Ok(ScriptLine::Sleep(Duration::from_secs_f64(secs)))
            }
            Some("name") => {
                let account = words.next().ok_or(ScriptError::BadName(self.line_no))?;
                let display = words.collect::<Vec<_>>().join(" ");
                if display.is_empty() {
                    return Err(ScriptError::BadName(self.line_no));
                }
                Ok(ScriptLine::Name {
                    account: account.to_string(),
                    display,
                })
            }
            Some(group) => {
                let sender = words.next().ok_or(ScriptError::MissingSender(self.line_no))?;
                let (sender, role) = match sender.split_once(':') {
                    Some((id, role)) => {
                        let role = role.parse::<Role>().map_err(|reason| ScriptError::BadRole {
                            line: self.line_no,
                            reason,
                        })?;
                        (id, role)
                    }
                    None => (sender, Role::Member),
                };
                Ok(ScriptLine::Message(self.message(group, sender, role, words)))
            }
            None => Ok(ScriptLine::Blank),
        }
    }

    fn message<'a>(
        &mut self,
        group: &str,
        sender: &str,
        role: Role,
        words: impl Iterator<Item = &'a str>,
    ) -> GroupMessage {
        let mut segments = Vec::new();
        let mut text = Vec::new();
        for (index, word) in words.enumerate() {
            if let Some(id) = word.strip_prefix('@').filter(|id| !id.is_empty()) {
                segments.push(Segment::Mention(id.to_string()));
            } else if let Some(id) = word.strip_prefix('>').filter(|id| index == 0 && !id.is_empty()) {
                segments.push(Segment::Reply(id.to_string()));
            } else {
                text.push(word);
            }
        }
        let text = text.join(" ");
        if !text.is_empty() {
            segments.push(Segment::Text(text.clone()));
        }

        let message_id = self.next_message_id.to_string();
        self.next_message_id += 1;
        GroupMessage::new(group, sender, text)
            .with_role(role)
            .with_message_id(message_id)
            .with_self_id(self.self_id.clone())
            .with_segments(segments)
    }
}
