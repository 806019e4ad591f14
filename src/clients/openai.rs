use crate::config::KeyFromEnv;
use crate::core::LowLevelClient;
use crate::error::{AIError, ConfigError, OpenAIError};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{info, instrument, warn};

mod models;
pub use models::OpenAIModel;

#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    pub api_key: String,
    pub model: OpenAIModel,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for OpenAIConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: OpenAIModel::default(),
            max_tokens: 2048,
            temperature: 0.2,
        }
    }
}

#[derive(Clone, Debug)]
pub struct OpenAIClient {
    config: OpenAIConfig,
    http: reqwest::Client,
}

impl KeyFromEnv for OpenAIClient {
    const KEY_NAME: &'static str = "OPENAI_API_KEY";
}

impl OpenAIClient {
    pub fn new(config: OpenAIConfig) -> Self {
        info!(model = %config.model.id(), "Creating new OpenAI client");
        Self { config, http: reqwest::Client::new() }
    }

    pub fn from_env(model: Option<String>) -> Result<Self, ConfigError> {
        let mut config = OpenAIConfig { api_key: Self::require_key()?, ..OpenAIConfig::default() };
        if let Some(model) = model {
            config.model = OpenAIModel::from_id(&model);
        }
        Ok(Self::new(config))
    }

    fn messages_body(&self, prompt: String) -> serde_json::Value {
        serde_json::json!({
            "model": self.config.model.id(),
            "max_tokens": self.config.max_tokens,
            "temperature": self.config.temperature,
            "messages": [
                {"role": "user", "content": prompt}
            ]
        })
    }
}

#[async_trait]
impl LowLevelClient for OpenAIClient {
    #[instrument(skip(self, prompt), fields(prompt_len = prompt.len(), model = %self.config.model.id()))]
    async fn ask_raw(&self, prompt: String) -> Result<String, AIError> {
        let body = self.messages_body(prompt);
        let resp = self.http
            .post("https://api.openai.com/v1/chat/completions")
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send().await
            .map_err(|e| AIError::OpenAI(OpenAIError::Http(e.to_string())))?;

        if resp.status() == 401 { return Err(AIError::OpenAI(OpenAIError::Authentication)); }
        if resp.status() == 429 {
            warn!("OpenAI API rate limit exceeded");
            return Err(AIError::OpenAI(OpenAIError::RateLimit));
        }
        if !resp.status().is_success() {
            let txt = resp.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AIError::OpenAI(OpenAIError::Api(txt)));
        }

        #[derive(Deserialize)]
        struct Choices { choices: Vec<Choice> }
        #[derive(Deserialize)]
        struct Choice { message: Msg }
        #[derive(Deserialize)]
        struct Msg { content: String }

        let parsed: Choices = resp.json().await
            .map_err(|e| AIError::OpenAI(OpenAIError::Http(e.to_string())))?;
        let content = parsed.choices.into_iter().next()
            .map(|c| c.message.content)
            .ok_or_else(|| AIError::OpenAI(OpenAIError::Api("No choices".into())))?;
        info!(response_len = content.len(), "Successfully received OpenAI response");
        Ok(content)
    }

    fn clone_box(&self) -> Box<dyn LowLevelClient> { Box::new(self.clone()) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_carries_prompt_and_model() {
        let client = OpenAIClient::new(OpenAIConfig { api_key: "k".into(), ..OpenAIConfig::default() });
        let body = client.messages_body("hello".into());
        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["messages"][0]["content"], "hello");
    }

    #[test]
    fn known_model_ids_map_to_variants() {
        assert_eq!(OpenAIModel::from_id("gpt-4.1"), OpenAIModel::Gpt41);
        assert_eq!(OpenAIModel::from_id("gpt-4o").id(), "gpt-4o");
        assert_eq!(OpenAIModel::from_id("o3-mini"), OpenAIModel::Override("o3-mini".into()));
    }
}
