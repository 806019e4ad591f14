use crate::clients::{ClaudeClient, DeepSeekClient, MockClient, MockHandle, OpenAIClient};
use crate::config::KeyFromEnv;
use crate::core::LowLevelClient;
use crate::error::{AIError, ConfigError};
use async_trait::async_trait;
use clap::ValueEnum;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, warn};

/// Which language model backend to talk to.
#[derive(Debug, Clone, PartialEq, Eq, ValueEnum)]
pub enum ClientType {
    Claude,
    #[value(name = "openai")]
    OpenAI,
    #[value(name = "deepseek")]
    DeepSeek,
    Mock,
}

impl ClientType {
    /// Pick a real provider from the API keys in the environment.
    /// The mock is never chosen implicitly.
    pub fn detect() -> Result<Self, ConfigError> {
        Self::from_available_keys(ClaudeClient::has_key(), OpenAIClient::has_key(), DeepSeekClient::has_key())
    }

    fn from_available_keys(claude: bool, openai: bool, deepseek: bool) -> Result<Self, ConfigError> {
        match (claude, openai, deepseek) {
            (true, _, _) => Ok(Self::Claude),
            (false, true, _) => Ok(Self::OpenAI),
            (false, false, true) => Ok(Self::DeepSeek),
            (false, false, false) => Err(ConfigError::NoProviderKey),
        }
    }
}

impl FromStr for ClientType {
    type Err = String;

    /// Parse client type from string (case insensitive)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "claude" => Ok(Self::Claude),
            "openai" => Ok(Self::OpenAI),
            "deepseek" => Ok(Self::DeepSeek),
            "mock" => Ok(Self::Mock),
            _ => Err(format!("Unknown client type: '{}'. Supported: claude, openai, deepseek, mock", s)),
        }
    }
}

impl fmt::Display for ClientType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientType::Claude => write!(f, "Claude"),
            ClientType::OpenAI => write!(f, "OpenAI"),
            ClientType::DeepSeek => write!(f, "DeepSeek"),
            ClientType::Mock => write!(f, "Mock"),
        }
    }
}

/// Client chosen at runtime, shared cheaply between handlers.
#[derive(Debug, Clone)]
pub struct FlexibleClient {
    inner: Arc<dyn LowLevelClient>,
}

impl FlexibleClient {
    /// Create a new FlexibleClient wrapping the given client
    pub fn new(client: Box<dyn LowLevelClient>) -> Self {
        Self { inner: Arc::from(client) }
    }

    /// Build the client for `client_type`, reading its key from the environment.
    pub fn from_type(client_type: &ClientType, model: Option<String>) -> Result<Self, ConfigError> {
        info!(client = %client_type, "Selecting language model client");
        let client: Box<dyn LowLevelClient> = match client_type {
            ClientType::Claude => Box::new(ClaudeClient::from_env(model)?),
            ClientType::OpenAI => Box::new(OpenAIClient::from_env(model)?),
            ClientType::DeepSeek => Box::new(DeepSeekClient::from_env(model)?),
            ClientType::Mock => {
                warn!("Serving the canned mock quiz for every request");
                Box::new(MockClient::without_prompt_log().0)
            }
        };
        Ok(Self::new(client))
    }

    /// Create a FlexibleClient with a mock and return the handle for configuration
    pub fn mock() -> (Self, Arc<MockHandle>) {
        let (mock_client, handle) = MockClient::new();
        (Self::new(Box::new(mock_client)), handle)
    }
}

#[async_trait]
impl LowLevelClient for FlexibleClient {
    async fn ask_raw(&self, prompt: String) -> Result<String, AIError> {
        self.inner.ask_raw(prompt).await
    }

    fn clone_box(&self) -> Box<dyn LowLevelClient> {
        Box::new(self.clone())
    }
}
