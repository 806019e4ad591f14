//! Low-level model client abstraction and the retry policy applied around it.
//!
//! Providers implement [`LowLevelClient::ask_raw`]; everything above that
//! (prompting, JSON extraction, validation) lives in [`crate::generator`].

use crate::error::AIError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt::Debug;
use std::time::Duration;

/// Low-level model client abstraction.
///
/// Implementors provide `ask_raw`, which executes a prompt and returns the raw
/// model text.
#[async_trait]
pub trait LowLevelClient: Send + Sync + Debug {
    /// The only method that implementations must provide
    async fn ask_raw(&self, prompt: String) -> Result<String, AIError>;

    /// Clone this client into a boxed trait object
    fn clone_box(&self) -> Box<dyn LowLevelClient>;
}

impl Clone for Box<dyn LowLevelClient> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

#[async_trait]
impl LowLevelClient for Box<dyn LowLevelClient> {
    async fn ask_raw(&self, prompt: String) -> Result<String, AIError> {
        self.as_ref().ask_raw(prompt).await
    }

    fn clone_box(&self) -> Box<dyn LowLevelClient> {
        self.as_ref().clone_box()
    }
}

/// Per-category retry budgets plus the timeout and backoff used for every
/// model call.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_retries: HashMap<String, usize>,
    pub default_max_retries: usize,
    pub request_timeout: Duration,
    /// Delay before the first retry; grows linearly with the attempt number.
    pub backoff: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        let mut max_retries = HashMap::new();
        max_retries.insert("rate_limit".to_string(), 1);
        max_retries.insert("api_error".to_string(), 1);
        max_retries.insert("http_error".to_string(), 1);
        max_retries.insert("timeout".to_string(), 1);
        max_retries.insert("json_parse_error".to_string(), 2);

        Self {
            max_retries,
            default_max_retries: 1,
            request_timeout: Duration::from_secs(60),
            backoff: Duration::from_millis(500),
        }
    }
}

impl RetryConfig {
    /// A config that never retries, useful for tests and one-shot tools.
    pub fn no_retries() -> Self {
        Self {
            max_retries: HashMap::new(),
            default_max_retries: 0,
            ..Self::default()
        }
    }

    /// Same budget for every category.
    pub fn uniform(retries: usize) -> Self {
        let mut config = Self::default();
        for budget in config.max_retries.values_mut() {
            *budget = retries;
        }
        config.default_max_retries = retries;
        config
    }

    pub fn max_retries_for(&self, kind: &str) -> usize {
        self.max_retries
            .get(kind)
            .copied()
            .unwrap_or(self.default_max_retries)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    /// Backoff before retry number `attempt` (1-based).
    pub fn delay_for(&self, attempt: usize) -> Duration {
        self.backoff.saturating_mul(attempt as u32)
    }
}
