//! Reply resolution
//!
//! Maps free-text user input to an assistant reply. Resolution is
//! asynchronous; failures are returned to the caller, which is expected to
//! absorb them (see `Reply::apology`).

mod error;
mod keyword;
pub mod rules;

pub use error::ResolutionFailure;
pub use keyword::{KeywordResolver, DEFAULT_REPLY_DELAY};

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

/// Reply text produced for the assistant side of the transcript
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply(String);

impl Reply {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// Opening message appended when the widget is first shown
    pub fn greeting() -> Self {
        Self::new(rules::GREETING)
    }

    /// Fixed text substituted for a failed resolution
    pub fn apology() -> Self {
        Self::new(rules::APOLOGY)
    }

    pub fn text(&self) -> &str {
        &self.0
    }

    pub fn into_text(self) -> String {
        self.0
    }
}

/// Common interface for reply resolvers
#[async_trait]
pub trait ReplyResolver: Send + Sync {
    /// Resolve user input to a reply
    async fn resolve(&self, input: &str) -> Result<Reply, ResolutionFailure>;
}

#[async_trait]
impl<T: ReplyResolver + ?Sized> ReplyResolver for Arc<T> {
    async fn resolve(&self, input: &str) -> Result<Reply, ResolutionFailure> {
        (**self).resolve(input).await
    }
}

/// Bounds every resolution by a timeout
pub struct TimedResolver<R> {
    inner: R,
    limit: Duration,
}

impl<R: ReplyResolver> TimedResolver<R> {
    pub fn new(inner: R, limit: Duration) -> Self {
        Self { inner, limit }
    }
}

#[async_trait]
impl<R: ReplyResolver> ReplyResolver for TimedResolver<R> {
    async fn resolve(&self, input: &str) -> Result<Reply, ResolutionFailure> {
        match timeout(self.limit, self.inner.resolve(input)).await {
            Ok(result) => result,
            Err(_) => Err(ResolutionFailure::timed_out(format!(
                "no reply within {}ms",
                self.limit.as_millis()
            ))),
        }
    }
}

/// Logging wrapper for resolvers
pub struct LoggingResolver {
    inner: Arc<dyn ReplyResolver>,
}

impl LoggingResolver {
    pub fn new(inner: Arc<dyn ReplyResolver>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl ReplyResolver for LoggingResolver {
    async fn resolve(&self, input: &str) -> Result<Reply, ResolutionFailure> {
        let start = std::time::Instant::now();
        let result = self.inner.resolve(input).await;
        let duration = start.elapsed();

        match &result {
            Ok(reply) => {
                tracing::info!(
                    duration_ms = %duration.as_millis(),
                    input_chars = input.chars().count(),
                    reply_chars = reply.text().chars().count(),
                    "Reply resolved"
                );
            }
            Err(e) => {
                tracing::error!(
                    duration_ms = %duration.as_millis(),
                    error = %e.message,
                    kind = ?e.kind,
                    "Reply resolution failed"
                );
            }
        }

        result
    }
}

/// Build the production resolver stack from configuration
pub fn build_resolver(delay: Duration, limit: Option<Duration>) -> Arc<dyn ReplyResolver> {
    let keyword = KeywordResolver::new(delay);
    let inner: Arc<dyn ReplyResolver> = match limit {
        Some(limit) => Arc::new(TimedResolver::new(keyword, limit)),
        None => Arc::new(keyword),
    };
    Arc::new(LoggingResolver::new(inner))
}
