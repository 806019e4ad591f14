//! Quiz generation: prompt the model, pull the question array out of its
//! reply, validate it and mint question ids.

use crate::core::{LowLevelClient, RetryConfig};
use crate::error::{AIError, GenerationError};
use crate::interceptors::Interceptor;
use crate::json_utils::{extract_single_array, ArrayExtraction};
use crate::model::{ClientQuestion, GeneratedQuestion, Question, OPTIONS_PER_QUESTION, QUESTIONS_PER_QUIZ};
use crate::prompt;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub retry: RetryConfig,
    /// Append the question JSON schema to the prompt.
    pub schema_guidance: bool,
    /// Reject replies that do not contain exactly five well-formed questions.
    pub strict: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            retry: RetryConfig::default(),
            schema_guidance: false,
            strict: true,
        }
    }
}

/// Full and redacted views of one freshly generated question set.
#[derive(Debug, Clone)]
pub struct GeneratedQuiz {
    pub questions: Vec<Question>,
    pub client_questions: Vec<ClientQuestion>,
}

impl GeneratedQuiz {
    fn from_questions(questions: Vec<Question>) -> Self {
        let client_questions = questions.iter().map(Question::client_view).collect();
        Self { questions, client_questions }
    }
}

#[derive(Debug, Clone)]
pub struct QuizGenerator<C: LowLevelClient> {
    client: C,
    config: GeneratorConfig,
    interceptor: Option<Arc<dyn Interceptor>>,
}

impl<C: LowLevelClient> QuizGenerator<C> {
    pub fn new(client: C, config: GeneratorConfig) -> Self {
        info!(strict = config.strict, schema_guidance = config.schema_guidance, "Creating new QuizGenerator");
        Self { client, config, interceptor: None }
    }

    pub fn with_interceptor(mut self, interceptor: Arc<dyn Interceptor>) -> Self {
        self.interceptor = Some(interceptor);
        self
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generate a quiz for `topic` at `difficulty`, retrying transient and
    /// unusable replies within the configured budgets.
    #[instrument(target = "quizsmith::generator", skip(self))]
    pub async fn generate(&self, topic: &str, difficulty: &str) -> Result<GeneratedQuiz, GenerationError> {
        let prompt = if self.config.schema_guidance {
            prompt::render_with_schema(topic, difficulty)
        } else {
            prompt::render(topic, difficulty)
        };

        let mut used: HashMap<&'static str, usize> = HashMap::new();
        loop {
            let err = match self.attempt(&prompt).await {
                Ok(quiz) => {
                    info!(questions = quiz.questions.len(), "Quiz generated");
                    return Ok(quiz);
                }
                Err(err) => err,
            };

            let Some(kind) = err.retry_kind() else {
                warn!(error = %err, "Generation failed, not retryable");
                return Err(err);
            };
            let attempt = used.entry(kind).or_insert(0);
            if *attempt >= self.config.retry.max_retries_for(kind) {
                warn!(error = %err, kind, retries = *attempt, "Generation failed, retries exhausted");
                return Err(err);
            }
            *attempt += 1;
            let delay = self.config.retry.delay_for(*attempt);
            warn!(error = %err, kind, attempt = *attempt, delay_ms = delay.as_millis() as u64, "Generation failed, retrying");
            tokio::time::sleep(delay).await;
        }
    }

    async fn attempt(&self, prompt: &str) -> Result<GeneratedQuiz, GenerationError> {
        let timeout = self.config.retry.request_timeout;
        let raw = tokio::time::timeout(timeout, self.client.ask_raw(prompt.to_string()))
            .await
            .map_err(|_| AIError::Timeout(timeout))??;
        debug!(response_len = raw.len(), "Model replied");

        if let Some(interceptor) = &self.interceptor {
            if let Err(e) = interceptor.save(prompt, &raw).await {
                warn!(error = %e, "Failed to record transcript");
            }
        }

        let parsed = parse_questions(&raw)?;
        if self.config.strict {
            validate_questions(&parsed)?;
        }

        let questions = parsed
            .into_iter()
            .map(|q| Question::from_generated(Uuid::new_v4().to_string(), q))
            .collect();
        Ok(GeneratedQuiz::from_questions(questions))
    }
}

/// Pull the single question array out of a free-text model reply.
pub fn parse_questions(raw: &str) -> Result<Vec<GeneratedQuestion>, GenerationError> {
    match extract_single_array::<GeneratedQuestion>(raw) {
        ArrayExtraction::Found(questions) => Ok(questions),
        ArrayExtraction::NoArray => Err(GenerationError::NoJsonArray),
        ArrayExtraction::Malformed(e) => Err(GenerationError::MalformedJson(e, raw.to_string())),
        ArrayExtraction::Ambiguous(n) => Err(GenerationError::AmbiguousJson(n)),
    }
}

/// Structural checks: question count, option count, answer among options.
pub fn validate_questions(questions: &[GeneratedQuestion]) -> Result<(), GenerationError> {
    if questions.len() != QUESTIONS_PER_QUIZ {
        return Err(GenerationError::WrongQuestionCount {
            expected: QUESTIONS_PER_QUIZ,
            actual: questions.len(),
        });
    }

    for (index, q) in questions.iter().enumerate() {
        let invalid = |reason: String| GenerationError::InvalidQuestion { index, reason };
        if q.question.trim().is_empty() {
            return Err(invalid("empty question text".to_string()));
        }
        if q.options.len() != OPTIONS_PER_QUESTION {
            return Err(invalid(format!(
                "expected {} options, got {}",
                OPTIONS_PER_QUESTION,
                q.options.len()
            )));
        }
        if !q.options.contains(&q.correct_answer) {
            return Err(invalid(format!("correct answer {:?} is not one of the options", q.correct_answer)));
        }
    }
    Ok(())
}
