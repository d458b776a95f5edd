//! Incoming group message model.
//!
//! A [`GroupMessage`] is what the platform adapter hands to the moderator
//! for every message posted in a group. `text` is the plain-text part of
//! the message (mentions and media are only present as segments).

/// Role of the sender inside the group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Role {
    #[default]
    Member,
    Admin,
    Owner,
}

impl Role {
    /// Owners and admins are never judged and may run admin commands.
    pub fn is_elevated(self) -> bool {
        matches!(self, Self::Admin | Self::Owner)
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "member" => Ok(Self::Member),
            "admin" => Ok(Self::Admin),
            "owner" => Ok(Self::Owner),
            other => Err(format!("unknown role '{other}'")),
        }
    }
}

/// One component of a rich message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Plain text.
    Text(String),
    /// Mention of an account.
    Mention(String),
    /// Quote/reply of an earlier message, by message id.
    Reply(String),
    /// Any media or forwarded content.
    Media,
}

/// A message posted in a group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupMessage {
    pub group_id: String,
    pub sender_id: String,
    pub sender_role: Role,
    pub message_id: String,
    /// Account id of the moderator on this platform.
    pub self_id: String,
    pub segments: Vec<Segment>,
    pub text: String,
}

impl GroupMessage {
    /// Plain-text message from a regular member.
    pub fn new(group_id: impl Into<String>, sender_id: impl Into<String>, text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            group_id: group_id.into(),
            sender_id: sender_id.into(),
            sender_role: Role::Member,
            message_id: String::new(),
            self_id: String::new(),
            segments: vec![Segment::Text(text.clone())],
            text,
        }
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.sender_role = role;
        self
    }

    pub fn with_message_id(mut self, id: impl Into<String>) -> Self {
        self.message_id = id.into();
        self
    }

    pub fn with_self_id(mut self, id: impl Into<String>) -> Self {
        self.self_id = id.into();
        self
    }

    /// Replace the segments; `text` is left as is.
    pub fn with_segments(mut self, segments: Vec<Segment>) -> Self {
        self.segments = segments;
        self
    }

    /// Message length in characters.
    pub fn text_len(&self) -> usize {
        self.text.chars().count()
    }

    /// Accounts mentioned in the message, excluding the moderator itself.
    pub fn mentions(&self) -> Vec<String> {
        self.segments
            .iter()
            .filter_map(|seg| match seg {
                Segment::Mention(id) if *id != self.self_id => Some(id.clone()),
                _ => None,
            })
            .collect()
    }

    /// Whether the message opens with a reply or with a mention of the moderator.
    pub fn addresses_bot(&self) -> bool {
        match self.segments.first() {
            Some(Segment::Reply(_)) => true,
            Some(Segment::Mention(id)) => *id == self.self_id,
            _ => false,
        }
    }

    /// Whether the first segment quotes another message.
    pub fn starts_with_reply(&self) -> bool {
        matches!(self.segments.first(), Some(Segment::Reply(_)))
    }

    /// Whether the moderator sent this message itself.
    pub fn is_from_self(&self) -> bool {
        !self.self_id.is_empty() && self.sender_id == self.self_id
    }
}
