//! Conversation transcript
//!
//! Ordered, append-only log of the messages exchanged in one widget session.

use crate::resolver::Reply;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// Stable identifier for one message, strictly increasing in append order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct MessageId(pub u64);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "msg-{}", self.0)
    }
}

/// Per-session monotonic allocator for message ids
#[derive(Debug, Default)]
pub struct MessageIds {
    next: u64,
}

impl MessageIds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&mut self) -> MessageId {
        self.next += 1;
        MessageId(self.next)
    }
}

/// Who produced a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    User,
    Assistant,
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sender::User => write!(f, "user"),
            Sender::Assistant => write!(f, "assistant"),
        }
    }
}

/// User input that passed the submission guard: trimmed and non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission(String);

impl Submission {
    /// Returns `None` for empty or whitespace-only input.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Content typed by the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserContent {
    pub text: String,
}

impl From<Submission> for UserContent {
    fn from(submission: Submission) -> Self {
        Self { text: submission.0 }
    }
}

/// Content produced by the assistant
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssistantContent {
    pub text: String,
}

impl From<Reply> for AssistantContent {
    fn from(reply: Reply) -> Self {
        Self {
            text: reply.into_text(),
        }
    }
}

/// Message content, tagged by sender
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "sender", rename_all = "snake_case")]
pub enum MessageContent {
    User(UserContent),
    Assistant(AssistantContent),
}

impl MessageContent {
    pub fn user(submission: Submission) -> Self {
        MessageContent::User(submission.into())
    }

    pub fn assistant(reply: Reply) -> Self {
        MessageContent::Assistant(reply.into())
    }

    pub fn sender(&self) -> Sender {
        match self {
            MessageContent::User(_) => Sender::User,
            MessageContent::Assistant(_) => Sender::Assistant,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            MessageContent::User(u) => &u.text,
            MessageContent::Assistant(a) => &a.text,
        }
    }
}

/// One turn in the conversation. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    pub id: MessageId,
    #[serde(flatten)]
    pub content: MessageContent,
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Build a message stamped with the current time
    pub fn new(id: MessageId, content: MessageContent) -> Self {
        Self {
            id,
            content,
            created_at: Utc::now(),
        }
    }

    pub fn sender(&self) -> Sender {
        self.content.sender()
    }

    pub fn text(&self) -> &str {
        self.content.text()
    }
}

/// Append-only, oldest-first message log
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a message to the end. Ids must be strictly increasing.
    pub fn append(&mut self, message: Message) {
        debug_assert!(
            self.messages.last().map_or(true, |last| last.id < message.id),
            "message ids must be strictly increasing"
        );
        self.messages.push(message);
    }

    /// Read-only view, oldest first
    pub fn all(&self) -> &[Message] {
        &self.messages
    }

    /// Most recently appended message
    pub fn latest(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn size(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
