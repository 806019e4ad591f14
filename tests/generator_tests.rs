
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use quizsmith::clients::{MockClient, MockResponse};
use quizsmith::core::{LowLevelClient, RetryConfig};
use quizsmith::error::{AIError, ClaudeError};
use quizsmith::interceptors::Interceptor;
use quizsmith::{GenerationError, GeneratorConfig, QuizGenerator};

use crate::test_utils::{quiz_reply, test_generator_config};

fn retrying_config(retries: usize) -> GeneratorConfig {
    GeneratorConfig {
        retry: RetryConfig::uniform(retries)
            .with_backoff(Duration::from_millis(1))
            .with_timeout(Duration::from_millis(200)),
        ..test_generator_config()
    }
}

#[tokio::test]
async fn generates_five_questions_with_fresh_ids() {
    let (client, handle) = MockClient::with_responses(vec![MockResponse::Text(quiz_reply(5))]);
    let generator = QuizGenerator::new(client, test_generator_config());

    let quiz = generator.generate("Rust", "medium").await.unwrap();

    assert_eq!(quiz.questions.len(), 5);
    assert_eq!(quiz.client_questions.len(), 5);
    let ids: HashSet<_> = quiz.questions.iter().map(|q| q.id.clone()).collect();
    assert_eq!(ids.len(), 5);
    assert!(quiz.questions.iter().all(|q| !q.id.is_empty() && q.id != "uuid"));
    assert!(quiz.client_questions.iter().all(|q| q.correct_answer.is_none()));
    for (full, client) in quiz.questions.iter().zip(&quiz.client_questions) {
        assert_eq!(full.id, client.id);
        assert_eq!(full.options, client.options);
    }

    let prompts = handle.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("Generate 5 medium multiple-choice questions about Rust."));
}

#[tokio::test]
async fn quiz_wrapped_in_object_is_accepted() {
    let questions: Vec<_> = (1..=5).map(test_utils::question_json).collect();
    let reply = format!("{{\"questions\": {}}}", serde_json::to_string(&questions).unwrap());
    let (client, handle) = MockClient::with_responses(vec![MockResponse::Text(reply)]);
    let generator = QuizGenerator::new(client, test_generator_config());

    let quiz = generator.generate("Rust", "easy").await.unwrap();

    assert_eq!(quiz.questions.len(), 5);
    assert_eq!(quiz.questions[2].correct_answer, "B3");
    assert_eq!(handle.call_count(), 1);
}

#[tokio::test]
async fn schema_guidance_extends_prompt() {
    let (client, handle) = MockClient::new();
    let config = GeneratorConfig { schema_guidance: true, ..test_generator_config() };
    QuizGenerator::new(client, config).generate("Rust", "easy").await.unwrap();
    assert!(handle.prompts()[0].contains("## Response Format"));
}

#[tokio::test]
async fn malformed_reply_without_retries_fails() {
    let (client, _handle) = MockClient::with_responses(vec![MockResponse::Text("no quiz today".into())]);
    let generator = QuizGenerator::new(client, test_generator_config());
    assert!(matches!(generator.generate("Rust", "easy").await, Err(GenerationError::NoJsonArray)));
}

#[tokio::test]
async fn unusable_reply_is_retried() {
    let (client, handle) = MockClient::with_responses(vec![
        MockResponse::Text(quiz_reply(3)),
        MockResponse::Text(quiz_reply(5)),
    ]);
    let generator = QuizGenerator::new(client, retrying_config(1));

    let quiz = generator.generate("Rust", "easy").await.unwrap();
    assert_eq!(quiz.questions.len(), 5);
    assert_eq!(handle.call_count(), 2);
}

#[tokio::test]
async fn retries_are_bounded_per_category() {
    let (client, handle) = MockClient::with_responses(vec![
        MockResponse::Error("overloaded".into()),
        MockResponse::Error("overloaded".into()),
        MockResponse::Error("overloaded".into()),
    ]);
    let generator = QuizGenerator::new(client, retrying_config(1));

    let result = generator.generate("Rust", "easy").await;
    assert!(matches!(result, Err(GenerationError::Upstream(AIError::Mock(_)))));
    assert_eq!(handle.call_count(), 2);
    assert_eq!(handle.remaining(), 1);
}

#[tokio::test]
async fn slow_model_times_out_then_recovers() {
    let (client, handle) = MockClient::with_responses(vec![
        MockResponse::Slow { delay: Duration::from_secs(2), text: quiz_reply(5) },
        MockResponse::Text(quiz_reply(5)),
    ]);
    let generator = QuizGenerator::new(client, retrying_config(1));

    let quiz = generator.generate("Rust", "easy").await.unwrap();
    assert_eq!(quiz.questions.len(), 5);
    assert_eq!(handle.call_count(), 2);
}

#[tokio::test]
async fn lax_mode_accepts_short_quizzes() {
    let (client, _handle) = MockClient::with_responses(vec![MockResponse::Text(quiz_reply(2))]);
    let config = GeneratorConfig { strict: false, ..test_generator_config() };
    let quiz = QuizGenerator::new(client, config).generate("Rust", "easy").await.unwrap();
    assert_eq!(quiz.questions.len(), 2);
}

#[derive(Debug, Clone)]
struct RejectingClient {
    calls: Arc<Mutex<usize>>,
}

#[async_trait]
impl LowLevelClient for RejectingClient {
    async fn ask_raw(&self, _prompt: String) -> Result<String, AIError> {
        *self.calls.lock().unwrap() += 1;
        Err(AIError::Claude(ClaudeError::Authentication))
    }

    fn clone_box(&self) -> Box<dyn LowLevelClient> {
        Box::new(self.clone())
    }
}

#[tokio::test]
async fn authentication_errors_are_not_retried() {
    let calls = Arc::new(Mutex::new(0));
    let generator = QuizGenerator::new(RejectingClient { calls: calls.clone() }, retrying_config(3));

    let result = generator.generate("Rust", "easy").await;
    assert!(matches!(
        result,
        Err(GenerationError::Upstream(AIError::Claude(ClaudeError::Authentication)))
    ));
    assert_eq!(*calls.lock().unwrap(), 1);
}

#[derive(Debug, Default)]
struct RecordingInterceptor {
    seen: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl Interceptor for RecordingInterceptor {
    async fn save(&self, prompt: &str, response: &str) -> std::io::Result<()> {
        self.seen.lock().unwrap().push((prompt.to_string(), response.to_string()));
        Ok(())
    }
}

#[tokio::test]
async fn interceptor_sees_every_exchange() {
    let (client, _handle) = MockClient::with_responses(vec![
        MockResponse::Text("garbage".into()),
        MockResponse::Text(quiz_reply(5)),
    ]);
    let interceptor = Arc::new(RecordingInterceptor::default());
    let generator = QuizGenerator::new(client, retrying_config(1)).with_interceptor(interceptor.clone());

    generator.generate("History", "hard").await.unwrap();

    let seen = interceptor.seen.lock().unwrap();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0].1, "garbage");
    assert!(seen[1].0.contains("about History"));
}
