//! Resolution error types

use thiserror::Error;

/// A resolver call that did not produce a reply
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ResolutionFailure {
    pub kind: ResolutionFailureKind,
    pub message: String,
}

impl ResolutionFailure {
    pub fn new(kind: ResolutionFailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ResolutionFailureKind::Internal, message)
    }

    pub fn timed_out(message: impl Into<String>) -> Self {
        Self::new(ResolutionFailureKind::TimedOut, message)
    }
}

/// Failure classification, used for logging only
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionFailureKind {
    /// The resolver itself faulted
    Internal,
    /// No reply arrived within the configured timeout
    TimedOut,
}
