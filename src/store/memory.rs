use super::{merge_fields, DocumentStore};
use crate::error::StoreError;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Process-local store; contents are lost on restart.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    documents: RwLock<HashMap<String, Value>>,
}

impl MemoryDocumentStore {
    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn upsert(&self, id: &str, document: Value) -> Result<(), StoreError> {
        self.documents.write().await.insert(id.to_string(), document);
        Ok(())
    }

    async fn fetch(&self, ids: &[&str]) -> Result<HashMap<String, Value>, StoreError> {
        let documents = self.documents.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| documents.get(*id).map(|doc| (id.to_string(), doc.clone())))
            .collect())
    }

    async fn update(&self, id: &str, fields: Map<String, Value>) -> Result<(), StoreError> {
        let mut documents = self.documents.write().await;
        let document = documents
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        merge_fields(document, fields)
    }
}
