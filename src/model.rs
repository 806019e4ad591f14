//! Quiz data model: what the model returns, what is stored, what clients see.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Number of questions in every generated quiz.
pub const QUESTIONS_PER_QUIZ: usize = 5;
/// Number of answer options per question.
pub const OPTIONS_PER_QUESTION: usize = 4;

/// A question as the language model emits it.
///
/// Any `id` the model supplies is ignored during deserialization; ids are
/// always minted by the generator.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, JsonSchema)]
#[schemars(title = "Quiz Question", description = "One multiple-choice question")]
pub struct GeneratedQuestion {
    /// The question text
    pub question: String,
    /// Exactly four answer options
    pub options: Vec<String>,
    /// Must equal one of `options`, verbatim
    pub correct_answer: String,
}

/// A stored question, answer included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: String,
}

impl Question {
    pub fn from_generated(id: String, generated: GeneratedQuestion) -> Self {
        Self {
            id,
            question: generated.question,
            options: generated.options,
            correct_answer: generated.correct_answer,
        }
    }

    /// Redacted view for the learner.
    pub fn client_view(&self) -> ClientQuestion {
        ClientQuestion {
            id: self.id.clone(),
            question: self.question.clone(),
            options: self.options.clone(),
            correct_answer: None,
        }
    }
}

/// Question as returned to callers before grading. `correct_answer` always
/// serializes as `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientQuestion {
    pub id: String,
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: Option<String>,
}

/// Server-side record of one generated quiz.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizRecord {
    pub quiz_id: String,
    pub user_id: String,
    pub topic: String,
    pub difficulty: String,
    pub questions: Vec<Question>,
    #[serde(default)]
    pub score: Option<u32>,
    #[serde(default)]
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl QuizRecord {
    pub fn new(
        quiz_id: String,
        user_id: String,
        topic: String,
        difficulty: String,
        questions: Vec<Question>,
    ) -> Self {
        Self {
            quiz_id,
            user_id,
            topic,
            difficulty,
            questions,
            score: None,
            completed: false,
            created_at: Utc::now(),
            completed_at: None,
        }
    }
}

/// Body of `POST /generate-quiz`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizRequest {
    pub topic: String,
    pub difficulty: String,
    pub user_id: String,
}

/// Body of `POST /submit-quiz`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizSubmission {
    pub user_id: String,
    pub quiz_id: String,
    #[serde(default)]
    pub responses: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateQuizResponse {
    pub quiz_id: String,
    pub questions: Vec<ClientQuestion>,
}

/// Result of grading one submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreReport {
    pub score: u32,
    pub total: u32,
}
