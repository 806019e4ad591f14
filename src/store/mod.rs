//! Persistence of quiz records on top of a generic keyed document store.

use crate::error::StoreError;
use crate::model::QuizRecord;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;
use tracing::{debug, instrument};

pub mod file;
pub mod memory;

pub use file::FileDocumentStore;
pub use memory::MemoryDocumentStore;

/// Keyed JSON document store.
#[async_trait]
pub trait DocumentStore: Send + Sync + Debug {
    /// Create or replace the document under `id`.
    async fn upsert(&self, id: &str, document: Value) -> Result<(), StoreError>;

    /// Fetch several documents; absent ids are simply missing from the map.
    async fn fetch(&self, ids: &[&str]) -> Result<HashMap<String, Value>, StoreError>;

    /// Merge `fields` into the top level of an existing document.
    /// Fails with [`StoreError::NotFound`] if there is no such document.
    async fn update(&self, id: &str, fields: Map<String, Value>) -> Result<(), StoreError>;
}

/// Merge top-level `fields` into `document`, which must be a JSON object.
pub(crate) fn merge_fields(document: &mut Value, fields: Map<String, Value>) -> Result<(), StoreError> {
    match document {
        Value::Object(map) => {
            map.extend(fields);
            Ok(())
        }
        _ => Err(StoreError::Serialization(serde::de::Error::custom("stored document is not an object"))),
    }
}

/// Quiz records keyed by quiz id.
#[derive(Debug, Clone)]
pub struct QuizStore {
    backend: Arc<dyn DocumentStore>,
}

impl QuizStore {
    pub fn new(backend: Arc<dyn DocumentStore>) -> Self {
        Self { backend }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryDocumentStore::default()))
    }

    pub fn backend(&self) -> &Arc<dyn DocumentStore> {
        &self.backend
    }

    /// Persist the full record, answers included.
    #[instrument(target = "quizsmith::store", skip(self, record), fields(questions = record.questions.len()))]
    pub async fn save(&self, quiz_id: &str, record: &QuizRecord) -> Result<(), StoreError> {
        let document = serde_json::to_value(record)?;
        self.backend.upsert(quiz_id, document).await?;
        debug!("Quiz saved");
        Ok(())
    }

    #[instrument(target = "quizsmith::store", skip(self))]
    pub async fn fetch(&self, quiz_id: &str) -> Result<QuizRecord, StoreError> {
        let mut found = self.backend.fetch(&[quiz_id]).await?;
        let document = found
            .remove(quiz_id)
            .ok_or_else(|| StoreError::NotFound(quiz_id.to_string()))?;
        Ok(serde_json::from_value(document)?)
    }

    /// Write back the grading fields of `record`; questions are never rewritten.
    #[instrument(target = "quizsmith::store", skip(self, record), fields(score = ?record.score, completed = record.completed))]
    pub async fn update(&self, quiz_id: &str, record: &QuizRecord) -> Result<(), StoreError> {
        let mut fields = Map::new();
        fields.insert("score".to_string(), serde_json::to_value(record.score)?);
        fields.insert("completed".to_string(), Value::Bool(record.completed));
        fields.insert("completed_at".to_string(), serde_json::to_value(record.completed_at)?);
        self.backend.update(quiz_id, fields).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Question;

    fn record(id: &str) -> QuizRecord {
        QuizRecord::new(
            id.to_string(),
            "user-1".to_string(),
            "Rust".to_string(),
            "easy".to_string(),
            vec![Question {
                id: "q1".into(),
                question: "Borrow checker?".into(),
                options: vec!["yes".into(), "no".into(), "maybe".into(), "never".into()],
                correct_answer: "yes".into(),
            }],
        )
    }

    #[tokio::test]
    async fn save_then_fetch_round_trips() {
        let store = QuizStore::in_memory();
        let original = record("quiz-1");
        store.save("quiz-1", &original).await.unwrap();
        assert_eq!(store.fetch("quiz-1").await.unwrap(), original);
    }

    #[tokio::test]
    async fn fetch_missing_is_not_found() {
        let store = QuizStore::in_memory();
        assert!(matches!(store.fetch("nope").await, Err(StoreError::NotFound(id)) if id == "nope"));
    }

    #[tokio::test]
    async fn update_only_touches_grading_fields() {
        let store = QuizStore::in_memory();
        let original = record("quiz-2");
        store.save("quiz-2", &original).await.unwrap();

        let mut graded = original.clone();
        graded.questions.clear();
        graded.topic = "changed".into();
        graded.score = Some(1);
        graded.completed = true;
        store.update("quiz-2", &graded).await.unwrap();

        let stored = store.fetch("quiz-2").await.unwrap();
        assert_eq!(stored.questions, original.questions);
        assert_eq!(stored.topic, "Rust");
        assert_eq!(stored.score, Some(1));
        assert!(stored.completed);
    }

    #[tokio::test]
    async fn update_missing_is_not_found() {
        let store = QuizStore::in_memory();
        let result = store.update("ghost", &record("ghost")).await;
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }
}
