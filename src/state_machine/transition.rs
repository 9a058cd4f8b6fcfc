//! Pure state transition function

use super::{Effect, Event, ExchangeContext, ExchangeState};
use crate::resolver::Reply;
use crate::transcript::Submission;
use thiserror::Error;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: ExchangeState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: ExchangeState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Errors that can occur during transition. All of them leave the state untouched.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Message is empty")]
    EmptySubmission,
    #[error("A reply is still being prepared")]
    ReplyInFlight,
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

/// Pure transition function
///
/// Given the same inputs it always produces the same outputs, with no I/O.
/// The user message effect always precedes the reply request, so the
/// transcript shows the question before any answer can arrive.
pub fn transition(
    state: &ExchangeState,
    _context: &ExchangeContext,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match (state, event) {
        // Blank input is rejected regardless of state
        (_, Event::Submit { text }) if Submission::parse(&text).is_none() => {
            Err(TransitionError::EmptySubmission)
        }

        // Idle + Submit -> AwaitingReply
        (ExchangeState::Idle, Event::Submit { text }) => {
            let submission = Submission::parse(&text).ok_or(TransitionError::EmptySubmission)?;
            Ok(TransitionResult::new(ExchangeState::AwaitingReply)
                .with_effect(Effect::append_user(submission.clone()))
                .with_effect(Effect::ClearInput)
                .with_effect(Effect::PublishState)
                .with_effect(Effect::RequestReply { submission }))
        }

        // AwaitingReply + Submit -> reject, submission is disabled
        (ExchangeState::AwaitingReply, Event::Submit { .. }) => {
            Err(TransitionError::ReplyInFlight)
        }

        // AwaitingReply + ReplyResolved -> Idle
        (ExchangeState::AwaitingReply, Event::ReplyResolved { reply }) => {
            Ok(TransitionResult::new(ExchangeState::Idle)
                .with_effect(Effect::append_assistant(reply))
                .with_effect(Effect::PublishState))
        }

        // AwaitingReply + ResolutionFailed -> Idle, apology in place of the reply
        (ExchangeState::AwaitingReply, Event::ResolutionFailed { .. }) => {
            Ok(TransitionResult::new(ExchangeState::Idle)
                .with_effect(Effect::append_assistant(Reply::apology()))
                .with_effect(Effect::PublishState))
        }

        (state, event) => Err(TransitionError::InvalidTransition(format!(
            "No transition from {state:?} with event {event:?}"
        ))),
    }
}
