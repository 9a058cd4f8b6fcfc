//! Exchange state types

use serde::Serialize;
use std::fmt;

/// Coordinator state. Cycles `Idle ⇄ AwaitingReply` for the life of the session.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExchangeState {
    /// Ready for user input, no reply in flight
    #[default]
    Idle,

    /// User message appended, reply being resolved
    AwaitingReply,
}

impl ExchangeState {
    /// A reply is in flight; submission is disabled and the typing indicator shown
    pub fn is_pending(self) -> bool {
        matches!(self, ExchangeState::AwaitingReply)
    }
}

impl fmt::Display for ExchangeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExchangeState::Idle => write!(f, "idle"),
            ExchangeState::AwaitingReply => write!(f, "awaiting_reply"),
        }
    }
}

/// Context for a session (immutable configuration)
#[derive(Debug, Clone)]
pub struct ExchangeContext {
    pub session_id: String,
}

impl ExchangeContext {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
        }
    }
}
