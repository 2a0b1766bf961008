//! Client configuration.

use crate::retry::RetryPolicy;

/// Default number of cards requested per session.
pub const DEFAULT_SESSION_LIMIT: usize = 50;

/// Settings for talking to the review backend.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub backend_url: String,
    /// Bearer token identifying the learner.
    pub token: String,
    pub session_limit: usize,
    pub retry: RetryPolicy,
}

impl ClientConfig {
    pub fn new(backend_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            backend_url: backend_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
            session_limit: DEFAULT_SESSION_LIMIT,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_session_limit(mut self, limit: usize) -> Self {
        self.session_limit = limit;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}
