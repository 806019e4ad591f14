use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::debug;

use crate::{core::LowLevelClient, error::AIError};

/// One scripted reply from [`MockClient`].
#[derive(Debug, Clone)]
pub enum MockResponse {
    Text(String),
    Error(String),
    /// Reply with `text` after sleeping for `delay`.
    Slow { delay: Duration, text: String },
}

/// Shared control surface for a [`MockClient`]: queue replies, inspect prompts.
#[derive(Debug)]
pub struct MockHandle {
    responses: Mutex<VecDeque<MockResponse>>,
    prompts: Mutex<Vec<String>>,
    calls: AtomicUsize,
    record_prompts: bool,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockHandle {
    fn new(record_prompts: bool) -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            prompts: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
            record_prompts,
        }
    }

    pub fn push(&self, response: MockResponse) {
        lock(&self.responses).push_back(response);
    }

    pub fn push_text(&self, text: impl Into<String>) {
        self.push(MockResponse::Text(text.into()));
    }

    pub fn push_error(&self, message: impl Into<String>) {
        self.push(MockResponse::Error(message.into()));
    }

    /// Every prompt received so far, oldest first. Empty when prompt
    /// recording is off.
    pub fn prompts(&self) -> Vec<String> {
        lock(&self.prompts).clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn remaining(&self) -> usize {
        lock(&self.responses).len()
    }

    fn next(&self, prompt: String) -> Option<MockResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.record_prompts {
            lock(&self.prompts).push(prompt);
        }
        lock(&self.responses).pop_front()
    }
}

/// Scripted model client. Once the queue is empty it answers with
/// [`SAMPLE_QUIZ_RESPONSE`].
#[derive(Debug, Clone)]
pub struct MockClient {
    handle: Arc<MockHandle>,
}

impl MockClient {
    pub fn new() -> (Self, Arc<MockHandle>) {
        Self::build(true)
    }

    /// Like [`MockClient::new`] but prompts are only counted, not kept.
    /// Used when the mock serves a long-running process.
    pub fn without_prompt_log() -> (Self, Arc<MockHandle>) {
        Self::build(false)
    }

    fn build(record_prompts: bool) -> (Self, Arc<MockHandle>) {
        let handle = Arc::new(MockHandle::new(record_prompts));
        (Self { handle: handle.clone() }, handle)
    }

    pub fn with_responses(responses: Vec<MockResponse>) -> (Self, Arc<MockHandle>) {
        let (client, handle) = Self::new();
        for response in responses {
            handle.push(response);
        }
        (client, handle)
    }
}

#[async_trait]
impl LowLevelClient for MockClient {
    async fn ask_raw(&self, prompt: String) -> Result<String, AIError> {
        match self.handle.next(prompt) {
            Some(MockResponse::Text(text)) => Ok(text),
            Some(MockResponse::Error(message)) => Err(AIError::Mock(message)),
            Some(MockResponse::Slow { delay, text }) => {
                tokio::time::sleep(delay).await;
                Ok(text)
            }
            None => {
                debug!("Mock queue empty, returning sample quiz");
                Ok(SAMPLE_QUIZ_RESPONSE.to_string())
            }
        }
    }

    fn clone_box(&self) -> Box<dyn LowLevelClient> {
        Box::new(self.clone())
    }
}

/// A well-formed five question reply wrapped in chatter, the way real models answer.
pub const SAMPLE_QUIZ_RESPONSE: &str = r#"Sure! Here are your questions:

[
  {"id": "uuid", "question": "Which pigment absorbs light for photosynthesis?", "options": ["Chlorophyll", "Melanin", "Keratin", "Hemoglobin"], "correct_answer": "Chlorophyll"},
  {"id": "uuid", "question": "Which gas do plants take in during photosynthesis?", "options": ["Oxygen", "Carbon dioxide", "Nitrogen", "Helium"], "correct_answer": "Carbon dioxide"},
  {"id": "uuid", "question": "Where in the cell does photosynthesis happen?", "options": ["Mitochondria", "Nucleus", "Chloroplast", "Ribosome"], "correct_answer": "Chloroplast"},
  {"id": "uuid", "question": "Which sugar is produced by photosynthesis?", "options": ["Sucrose", "Glucose", "Lactose", "Maltose"], "correct_answer": "Glucose"},
  {"id": "uuid", "question": "What is released as a by-product?", "options": ["Oxygen", "Methane", "Ammonia", "Carbon monoxide"], "correct_answer": "Oxygen"}
]

Good luck!"#;
