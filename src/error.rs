use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

/// Failure surfaced at the request boundary.
#[derive(Error, Debug)]
pub enum QuizError {
    #[error("Invalid request: {0}")]
    Validation(String),
    #[error("Quiz generation failed: {0}")]
    Generation(#[from] GenerationError),
    #[error("Quiz not found: {0}")]
    NotFound(String),
    #[error("Store error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for QuizError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => QuizError::NotFound(id),
            other => QuizError::Store(other),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    detail: String,
}

impl ResponseError for QuizError {
    fn status_code(&self) -> StatusCode {
        match self {
            QuizError::Validation(_) => StatusCode::BAD_REQUEST,
            QuizError::NotFound(_) => StatusCode::NOT_FOUND,
            QuizError::Generation(_) | QuizError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody { detail: self.to_string() })
    }
}

/// The model produced nothing usable, or could not be reached.
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("AI error: {0}")]
    Upstream(#[from] AIError),
    #[error("No JSON array found in model response")]
    NoJsonArray,
    #[error("Model response contains {0} candidate question arrays")]
    AmbiguousJson(usize),
    #[error("JSON deserialization error: {0}. Raw response: {1}")]
    MalformedJson(#[source] serde_json::Error, String),
    #[error("Expected {expected} questions, model returned {actual}")]
    WrongQuestionCount { expected: usize, actual: usize },
    #[error("Question {index} is invalid: {reason}")]
    InvalidQuestion { index: usize, reason: String },
}

impl GenerationError {
    /// Retry budget category for this failure, `None` when retrying cannot help.
    pub fn retry_kind(&self) -> Option<&'static str> {
        match self {
            GenerationError::Upstream(e) => e.retry_kind(),
            _ => Some("json_parse_error"),
        }
    }
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("document {0} not found")]
    NotFound(String),
    #[error("invalid document id: {0:?}")]
    InvalidId(String),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("environment variable {0} is not set")]
    MissingKey(&'static str),
    #[error("no language model API key found; set ANTHROPIC_API_KEY, OPENAI_API_KEY or DEEPSEEK_API_KEY, or pass --client mock")]
    NoProviderKey,
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Error, Debug)]
pub enum AIError {
    #[error("Claude API error: {0}")]
    Claude(#[from] ClaudeError),
    #[error("OpenAI API error: {0}")]
    OpenAI(#[from] OpenAIError),
    #[error("DeepSeek API error: {0}")]
    DeepSeek(#[from] DeepSeekError),
    #[error("Mock error: {0}")]
    Mock(String),
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),
}

impl AIError {
    pub fn retry_kind(&self) -> Option<&'static str> {
        match self {
            AIError::Claude(e) => e.retry_kind(),
            AIError::OpenAI(e) => e.retry_kind(),
            AIError::DeepSeek(e) => e.retry_kind(),
            AIError::Mock(_) => Some("api_error"),
            AIError::Timeout(_) => Some("timeout"),
        }
    }
}

#[derive(Error, Debug)]
pub enum ClaudeError {
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("API error: {0}")]
    Api(String),
    #[error("Rate limit exceeded")]
    RateLimit,
    #[error("Authentication failed")]
    Authentication,
}

#[derive(Error, Debug)]
pub enum OpenAIError {
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("API error: {0}")]
    Api(String),
    #[error("Rate limit exceeded")]
    RateLimit,
    #[error("Authentication failed")]
    Authentication,
}

#[derive(Error, Debug)]
pub enum DeepSeekError {
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("API error: {0}")]
    Api(String),
    #[error("Rate limit exceeded")]
    RateLimit,
    #[error("Authentication failed")]
    Authentication,
}

macro_rules! provider_retry_kind {
    ($($ty:ident),*) => {
        $(
            impl $ty {
                pub fn retry_kind(&self) -> Option<&'static str> {
                    match self {
                        $ty::Http(_) => Some("http_error"),
                        $ty::Api(_) => Some("api_error"),
                        $ty::RateLimit => Some("rate_limit"),
                        $ty::Authentication => None,
                    }
                }
            }
        )*
    };
}

provider_retry_kind!(ClaudeError, OpenAIError, DeepSeekError);
