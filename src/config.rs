//! Service configuration

use crate::resolver::DEFAULT_REPLY_DELAY;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(30 * 60);

/// Configuration for the assistant service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssistantConfig {
    pub port: u16,
    /// Simulated latency before each reply
    pub reply_delay: Duration,
    /// Upper bound on a single resolution; `None` waits indefinitely
    pub reply_timeout: Option<Duration>,
    /// Sessions untouched for this long are ended; `None` keeps them forever
    pub session_ttl: Option<Duration>,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            reply_delay: DEFAULT_REPLY_DELAY,
            reply_timeout: None,
            session_ttl: Some(DEFAULT_SESSION_TTL),
        }
    }
}

impl AssistantConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unparsable values fall back to defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let millis = |key: &str| {
            lookup(key)
                .and_then(|v| v.trim().parse::<u64>().ok())
                .map(Duration::from_millis)
        };

        Self {
            port: lookup("CARE_ASSISTANT_PORT")
                .and_then(|p| p.trim().parse().ok())
                .unwrap_or(defaults.port),
            reply_delay: millis("CARE_ASSISTANT_REPLY_DELAY_MS").unwrap_or(defaults.reply_delay),
            reply_timeout: millis("CARE_ASSISTANT_REPLY_TIMEOUT_MS").filter(|d| !d.is_zero()),
            session_ttl: match lookup("CARE_ASSISTANT_SESSION_TTL_SECS")
                .and_then(|v| v.trim().parse::<u64>().ok())
            {
                Some(0) => None,
                Some(secs) => Some(Duration::from_secs(secs)),
                None => defaults.session_ttl,
            },
        }
    }
}
