use crate::config::KeyFromEnv;
use crate::core::LowLevelClient;
use crate::error::{AIError, ConfigError, DeepSeekError};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};

mod models;
pub use models::DeepSeekModel;

const DEFAULT_BASE_URL: &str = "https://api.deepseek.com";

/// Steers chat models toward a bare JSON reply.
const QUIZ_SYSTEM_PROMPT: &str =
    "You write multiple-choice quizzes. Reply with the JSON array only, no commentary.";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    /// The reasoner rejects sampling parameters, so this is left out for it.
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
    /// Chain of thought from `deepseek-reasoner`; never part of the answer.
    #[serde(default)]
    reasoning_content: Option<String>,
}

#[derive(Debug, Clone)]
pub struct DeepSeekConfig {
    pub api_key: String,
    pub model: DeepSeekModel,
    pub base_url: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for DeepSeekConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: DeepSeekModel::default(),
            base_url: DEFAULT_BASE_URL.to_string(),
            max_tokens: 4096,
            temperature: 0.3,
        }
    }
}

#[derive(Clone, Debug)]
pub struct DeepSeekClient {
    config: DeepSeekConfig,
    client: Client,
}

impl KeyFromEnv for DeepSeekClient {
    const KEY_NAME: &'static str = "DEEPSEEK_API_KEY";
}

impl DeepSeekClient {
    pub fn new(config: DeepSeekConfig) -> Self {
        info!(model = %config.model.id(), base_url = %config.base_url, "Creating new DeepSeek client");
        Self { config, client: Client::new() }
    }

    /// Key from `DEEPSEEK_API_KEY`; `DEEPSEEK_BASE_URL` points at a compatible gateway.
    pub fn from_env(model: Option<String>) -> Result<Self, ConfigError> {
        let mut config = DeepSeekConfig { api_key: Self::require_key()?, ..DeepSeekConfig::default() };
        if let Some(model) = model {
            config.model = DeepSeekModel::from_id(&model);
        }
        if let Some(base_url) = std::env::var("DEEPSEEK_BASE_URL").ok().filter(|u| !u.trim().is_empty()) {
            config.base_url = base_url.trim_end_matches('/').to_string();
        }
        Ok(Self::new(config))
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url)
    }

    fn chat_request<'a>(&'a self, prompt: &'a str) -> ChatRequest<'a> {
        let temperature = match self.config.model {
            DeepSeekModel::Reasoner => None,
            _ => Some(self.config.temperature),
        };
        ChatRequest {
            model: self.config.model.id(),
            messages: vec![
                ChatMessage { role: "system", content: QUIZ_SYSTEM_PROMPT },
                ChatMessage { role: "user", content: prompt },
            ],
            max_tokens: self.config.max_tokens,
            temperature,
        }
    }
}

fn status_error(status: StatusCode, body: String) -> DeepSeekError {
    match status {
        StatusCode::TOO_MANY_REQUESTS => DeepSeekError::RateLimit,
        StatusCode::UNAUTHORIZED => DeepSeekError::Authentication,
        // Insufficient balance; retrying will not help but it is not a key problem either.
        StatusCode::PAYMENT_REQUIRED => DeepSeekError::Api(format!("account balance exhausted: {body}")),
        _ => DeepSeekError::Api(format!("{status}: {body}")),
    }
}

fn answer_text(response: ChatResponse) -> Result<String, DeepSeekError> {
    let reply = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| DeepSeekError::Api("No choices in response".to_string()))?
        .message;
    if let Some(reasoning) = &reply.reasoning_content {
        debug!(reasoning_len = reasoning.len(), "Discarding reasoner chain of thought");
    }
    reply
        .content
        .filter(|text| !text.trim().is_empty())
        .ok_or_else(|| DeepSeekError::Api("Empty message content".to_string()))
}

#[async_trait]
impl LowLevelClient for DeepSeekClient {
    #[instrument(skip(self, prompt), fields(prompt_len = prompt.len(), model = %self.config.model.id()))]
    async fn ask_raw(&self, prompt: String) -> Result<String, AIError> {
        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&self.chat_request(&prompt))
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "HTTP request failed");
                DeepSeekError::Http(e.to_string())
            })?;

        let status = response.status();
        debug!(status = %status, "Received response from DeepSeek API");
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = status_error(status, body);
            warn!(error = %err, "DeepSeek API call failed");
            return Err(err.into());
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| DeepSeekError::Http(e.to_string()))?;
        let text = answer_text(parsed)?;
        info!(response_len = text.len(), "Successfully received DeepSeek response");
        Ok(text)
    }

    fn clone_box(&self) -> Box<dyn LowLevelClient> {
        Box::new(self.clone())
    }
}
