use crate::error::StoreError;
use crate::model::{Question, ScoreReport};
use crate::store::QuizStore;
use chrono::Utc;
use std::collections::HashMap;
use tracing::{info, instrument};

/// Count questions whose submitted answer equals the stored answer exactly.
/// Missing answers count as wrong; keys that match no question are ignored.
pub fn tally(questions: &[Question], responses: &HashMap<String, String>) -> u32 {
    questions
        .iter()
        .filter(|q| responses.get(&q.id) == Some(&q.correct_answer))
        .count() as u32
}

/// Grades submissions against stored answer keys.
#[derive(Debug, Clone)]
pub struct QuizScorer {
    store: QuizStore,
}

impl QuizScorer {
    pub fn new(store: QuizStore) -> Self {
        Self { store }
    }

    /// Grade `responses` for `quiz_id` and persist the result.
    ///
    /// Fetch and update are separate store calls: two concurrent submissions
    /// for the same quiz both succeed and the later write wins.
    #[instrument(target = "quizsmith::scorer", skip(self, responses), fields(responses = responses.len()))]
    pub async fn score(&self, quiz_id: &str, responses: &HashMap<String, String>) -> Result<ScoreReport, StoreError> {
        let mut record = self.store.fetch(quiz_id).await?;

        let score = tally(&record.questions, responses);
        let total = record.questions.len() as u32;
        if record.completed {
            info!(previous = ?record.score, "Overwriting earlier submission");
        }

        record.score = Some(score);
        record.completed = true;
        record.completed_at = Some(Utc::now());
        self.store.update(quiz_id, &record).await?;

        info!(score, total, "Quiz scored");
        Ok(ScoreReport { score, total })
    }
}
