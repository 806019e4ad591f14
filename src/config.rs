use crate::clients::ClientType;
use crate::core::RetryConfig;
use crate::error::ConfigError;
use crate::generator::GeneratorConfig;
use crate::service::ServiceConfig;
use clap::Parser;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Trait for types that can retrieve their configuration key from environment variables
pub trait KeyFromEnv {
    /// The environment variable name for this client's API key
    const KEY_NAME: &'static str;

    /// Find the API key by checking environment variables first, then .env file
    fn find_key() -> Option<String> {
        // First try to load .env file (silently fail if not found)
        let _ = dotenvy::dotenv();

        env::var(Self::KEY_NAME).ok().filter(|key| !key.trim().is_empty())
    }

    /// Like [`KeyFromEnv::find_key`], but a missing key is an error.
    fn require_key() -> Result<String, ConfigError> {
        Self::find_key().ok_or(ConfigError::MissingKey(Self::KEY_NAME))
    }

    /// Whether a key is available without reading it.
    fn has_key() -> bool {
        Self::find_key().is_some()
    }
}

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Quiz generation and scoring service", long_about = None)]
#[command(after_help = "ENVIRONMENT VARIABLES:
    ANTHROPIC_API_KEY  API key for the Claude client
    OPENAI_API_KEY     API key for the OpenAI client
    DEEPSEEK_API_KEY   API key for the DeepSeek client
    RUST_LOG           Log filter [default: info]")]
pub struct ServerConfig {
    /// Address to listen on
    #[arg(long, env = "QUIZ_BIND", default_value = "0.0.0.0:8000")]
    pub bind: String,

    /// Language model backend [default: auto-detect from available keys; mock only when named]
    #[arg(short, long, env = "LLM_CLIENT", value_enum)]
    pub client: Option<ClientType>,

    /// Override the provider's default model id
    #[arg(long, env = "LLM_MODEL")]
    pub model: Option<String>,

    /// Persist quizzes as JSON files here instead of in memory
    #[arg(long, env = "QUIZ_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Record every prompt/response transcript in this directory
    #[arg(long, env = "QUIZ_TRANSCRIPT_DIR")]
    pub transcript_dir: Option<PathBuf>,

    /// Timeout for a single model call, in seconds
    #[arg(long, env = "LLM_TIMEOUT_SECS", default_value_t = 60)]
    pub timeout_secs: u64,

    /// Retries per failure category for model calls
    #[arg(long, env = "LLM_MAX_RETRIES", default_value_t = 1)]
    pub max_retries: usize,

    /// Accepted difficulty levels; pass an empty string to accept any
    #[arg(long, env = "QUIZ_DIFFICULTIES", value_delimiter = ',', default_value = "easy,medium,hard")]
    pub difficulties: Vec<String>,

    /// Append the question JSON schema to the prompt
    #[arg(long)]
    pub schema_guidance: bool,

    /// Accept any parseable question list, skipping count/option/answer checks
    #[arg(long)]
    pub lax_validation: bool,
}

impl ServerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bind.trim().is_empty() {
            return Err(ConfigError::Invalid("bind address is empty".to_string()));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid("timeout must be at least one second".to_string()));
        }
        Ok(())
    }

    /// The configured backend, or one detected from API keys. Fails when
    /// nothing is configured and no key is present.
    pub fn client_type(&self) -> Result<ClientType, ConfigError> {
        match &self.client {
            Some(client) => Ok(client.clone()),
            None => ClientType::detect(),
        }
    }

    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig::uniform(self.max_retries).with_timeout(Duration::from_secs(self.timeout_secs))
    }

    pub fn generator_config(&self) -> GeneratorConfig {
        GeneratorConfig {
            retry: self.retry_config(),
            schema_guidance: self.schema_guidance,
            strict: !self.lax_validation,
        }
    }

    pub fn service_config(&self) -> ServiceConfig {
        ServiceConfig {
            difficulties: self
                .difficulties
                .iter()
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty())
                .collect(),
        }
    }
}
