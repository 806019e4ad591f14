//! Request-level composition of generator, store and scorer.

use crate::core::LowLevelClient;
use crate::error::QuizError;
use crate::generator::QuizGenerator;
use crate::model::{GenerateQuizResponse, QuizRecord, QuizRequest, QuizSubmission, ScoreReport};
use crate::scorer::QuizScorer;
use crate::store::QuizStore;
use tracing::{info, instrument, warn};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Accepted difficulty levels, compared case-insensitively. Empty accepts any.
    pub difficulties: Vec<String>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            difficulties: vec!["easy".to_string(), "medium".to_string(), "hard".to_string()],
        }
    }
}

impl ServiceConfig {
    fn accepts_difficulty(&self, difficulty: &str) -> bool {
        self.difficulties.is_empty()
            || self
                .difficulties
                .iter()
                .any(|allowed| allowed.eq_ignore_ascii_case(difficulty.trim()))
    }
}

/// Long-lived handle shared by every request handler.
#[derive(Debug, Clone)]
pub struct QuizService<C: LowLevelClient> {
    generator: QuizGenerator<C>,
    store: QuizStore,
    scorer: QuizScorer,
    config: ServiceConfig,
}

impl<C: LowLevelClient> QuizService<C> {
    pub fn new(generator: QuizGenerator<C>, store: QuizStore, config: ServiceConfig) -> Self {
        let scorer = QuizScorer::new(store.clone());
        Self { generator, store, scorer, config }
    }

    pub fn store(&self) -> &QuizStore {
        &self.store
    }

    pub fn generator(&self) -> &QuizGenerator<C> {
        &self.generator
    }

    fn validate_request(&self, request: &QuizRequest) -> Result<(), QuizError> {
        if request.topic.trim().is_empty() {
            return Err(QuizError::Validation("topic must not be empty".to_string()));
        }
        if request.user_id.trim().is_empty() {
            return Err(QuizError::Validation("user_id must not be empty".to_string()));
        }
        if !self.config.accepts_difficulty(&request.difficulty) {
            return Err(QuizError::Validation(format!(
                "unknown difficulty {:?}, expected one of: {}",
                request.difficulty,
                self.config.difficulties.join(", ")
            )));
        }
        Ok(())
    }

    /// Generate, persist, and return the redacted quiz.
    #[instrument(target = "quizsmith::service", skip(self, request), fields(user_id = %request.user_id, topic = %request.topic))]
    pub async fn generate_quiz(&self, request: QuizRequest) -> Result<GenerateQuizResponse, QuizError> {
        self.validate_request(&request)?;

        let quiz = self.generator.generate(&request.topic, &request.difficulty).await?;

        let quiz_id = Uuid::new_v4().to_string();
        let record = QuizRecord::new(
            quiz_id.clone(),
            request.user_id,
            request.topic,
            request.difficulty,
            quiz.questions,
        );
        self.store.save(&quiz_id, &record).await?;

        info!(quiz_id = %quiz_id, "Quiz created");
        Ok(GenerateQuizResponse { quiz_id, questions: quiz.client_questions })
    }

    /// Grade a submission and record the score.
    #[instrument(target = "quizsmith::service", skip(self, submission), fields(user_id = %submission.user_id, quiz_id = %submission.quiz_id))]
    pub async fn submit_quiz(&self, submission: &QuizSubmission) -> Result<ScoreReport, QuizError> {
        if submission.quiz_id.trim().is_empty() {
            return Err(QuizError::Validation("quiz_id must not be empty".to_string()));
        }
        if submission.user_id.trim().is_empty() {
            return Err(QuizError::Validation("user_id must not be empty".to_string()));
        }

        let report = self.scorer.score(&submission.quiz_id, &submission.responses).await;
        if let Err(e) = &report {
            warn!(error = %e, "Submission failed");
        }
        Ok(report?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn difficulty_matching_ignores_case_and_padding() {
        let config = ServiceConfig::default();
        assert!(config.accepts_difficulty("Easy"));
        assert!(config.accepts_difficulty(" hard "));
        assert!(!config.accepts_difficulty("impossible"));
        assert!(ServiceConfig { difficulties: vec![] }.accepts_difficulty("anything"));
    }
}
