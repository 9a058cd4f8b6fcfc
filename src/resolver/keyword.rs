//! Keyword-rule resolver with simulated latency

use super::rules::{match_rule_in, ReplyRule, RULES};
use super::{Reply, ReplyResolver, ResolutionFailure};
use async_trait::async_trait;
use std::time::Duration;

/// Default simulated latency before a reply is produced
pub const DEFAULT_REPLY_DELAY: Duration = Duration::from_secs(1);

/// Resolves replies by ordered keyword matching
pub struct KeywordResolver {
    rules: &'static [ReplyRule],
    delay: Duration,
}

impl KeywordResolver {
    pub fn new(delay: Duration) -> Self {
        Self {
            rules: RULES,
            delay,
        }
    }

    /// Use a custom rule table instead of the built-in one
    #[cfg(test)]
    pub fn with_rules(mut self, rules: &'static [ReplyRule]) -> Self {
        self.rules = rules;
        self
    }
}

impl Default for KeywordResolver {
    fn default() -> Self {
        Self::new(DEFAULT_REPLY_DELAY)
    }
}

#[async_trait]
impl ReplyResolver for KeywordResolver {
    async fn resolve(&self, input: &str) -> Result<Reply, ResolutionFailure> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let rule = match_rule_in(self.rules, input);
        tracing::debug!(topic = ?rule.topic, "Matched reply rule");
        Ok(Reply::new(rule.reply))
    }
}
