//! Connection settings for the model service.

use std::time::Duration;

/// Default address of a locally running Ollama server.
pub const DEFAULT_HOST: &str = "http://localhost:11434";

/// Default chat model.
pub const DEFAULT_MODEL: &str = "gemma2:2b";

/// Default upper bound on a single model call.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Where to reach the model and how long to wait for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmConfig {
    pub host: String,
    pub model: String,
    pub timeout: Duration,
}

impl LlmConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Chat endpoint URL, tolerating a trailing slash on the host.
    pub fn chat_url(&self) -> String {
        format!("{}/api/chat", self.host.trim_end_matches('/'))
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}
