//! Effects produced by state transitions

use crate::resolver::Reply;
use crate::transcript::{MessageContent, Submission};

/// Effects to be executed, in order, after a state transition
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Append a message to the transcript and scroll to it
    AppendMessage { content: MessageContent },

    /// Empty the input buffer
    ClearInput,

    /// Publish the new state (typing indicator, submit control)
    PublishState,

    /// Start resolving a reply in the background
    RequestReply { submission: Submission },
}

impl Effect {
    pub fn append_user(submission: Submission) -> Self {
        Effect::AppendMessage {
            content: MessageContent::user(submission),
        }
    }

    pub fn append_assistant(reply: Reply) -> Self {
        Effect::AppendMessage {
            content: MessageContent::assistant(reply),
        }
    }
}
