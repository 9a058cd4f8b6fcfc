//! Events that can occur during an exchange

use crate::resolver::{Reply, ResolutionFailure};

/// Events that trigger state transitions
#[derive(Debug, Clone)]
pub enum Event {
    // User events
    Submit {
        text: String,
    },

    // Resolver events
    ReplyResolved {
        reply: Reply,
    },
    ResolutionFailed {
        error: ResolutionFailure,
    },
}

impl Event {
    pub fn submit(text: impl Into<String>) -> Self {
        Event::Submit { text: text.into() }
    }
}
