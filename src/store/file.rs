use super::{merge_fields, DocumentStore};
use crate::error::StoreError;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// One pretty-printed JSON file per document under a base directory.
#[derive(Debug)]
pub struct FileDocumentStore {
    base_path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    write_lock: Mutex<()>,
}

fn valid_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= 128
        && id.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

impl FileDocumentStore {
    /// Open (creating if needed) a store rooted at `base_path`.
    pub async fn open(base_path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let base_path = base_path.into();
        fs::create_dir_all(&base_path).await?;
        info!(path = %base_path.display(), "Opened file document store");
        Ok(Self { base_path, write_lock: Mutex::new(()) })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn path_for(&self, id: &str) -> PathBuf {
        self.base_path.join(format!("{id}.json"))
    }

    async fn read(&self, id: &str) -> Result<Option<Value>, StoreError> {
        if !valid_id(id) {
            return Ok(None);
        }
        match fs::read(self.path_for(id)).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Write to a temp file first so readers never see a half-written document.
    /// The temp file is removed if any step fails.
    async fn write(&self, id: &str, document: &Value) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(document)?;
        let tmp = self.base_path.join(format!(".{id}.{}.tmp", Uuid::new_v4().simple()));
        if let Err(e) = self.replace_with(&tmp, id, &bytes).await {
            if let Err(cleanup) = fs::remove_file(&tmp).await {
                if cleanup.kind() != ErrorKind::NotFound {
                    warn!(path = %tmp.display(), error = %cleanup, "Failed to remove temp file");
                }
            }
            return Err(e.into());
        }
        debug!(id, bytes = bytes.len(), "Document written");
        Ok(())
    }

    async fn replace_with(&self, tmp: &Path, id: &str, bytes: &[u8]) -> std::io::Result<()> {
        let mut file = fs::File::create(tmp).await?;
        file.write_all(bytes).await?;
        file.sync_all().await?;
        drop(file);
        fs::rename(tmp, self.path_for(id)).await
    }
}

#[async_trait]
impl DocumentStore for FileDocumentStore {
    async fn upsert(&self, id: &str, document: Value) -> Result<(), StoreError> {
        if !valid_id(id) {
            return Err(StoreError::InvalidId(id.to_string()));
        }
        let _guard = self.write_lock.lock().await;
        self.write(id, &document).await
    }

    async fn fetch(&self, ids: &[&str]) -> Result<HashMap<String, Value>, StoreError> {
        let mut found = HashMap::new();
        for id in ids {
            if let Some(document) = self.read(id).await? {
                found.insert(id.to_string(), document);
            }
        }
        Ok(found)
    }

    async fn update(&self, id: &str, fields: Map<String, Value>) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut document = self
            .read(id)
            .await?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        merge_fields(&mut document, fields)?;
        self.write(id, &document).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn temp_store() -> FileDocumentStore {
        let dir = std::env::temp_dir().join(format!("quizsmith-store-{}", Uuid::new_v4()));
        FileDocumentStore::open(dir).await.unwrap()
    }

    #[test]
    fn id_validation() {
        assert!(valid_id("3f2a-9c_01"));
        assert!(!valid_id(""));
        assert!(!valid_id("../etc/passwd"));
        assert!(!valid_id("a.json"));
    }

    #[tokio::test]
    async fn upsert_fetch_update_cycle() {
        let store = temp_store().await;
        store.upsert("doc-1", json!({"score": null, "topic": "t"})).await.unwrap();

        let mut fields = Map::new();
        fields.insert("score".into(), json!(3));
        store.update("doc-1", fields).await.unwrap();

        let found = store.fetch(&["doc-1", "doc-2"]).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found["doc-1"], json!({"score": 3, "topic": "t"}));

        fs::remove_dir_all(store.base_path()).await.unwrap();
    }

    #[tokio::test]
    async fn invalid_ids_are_never_found() {
        let store = temp_store().await;
        assert!(matches!(
            store.upsert("../escape", json!({})).await,
            Err(StoreError::InvalidId(_))
        ));
        assert!(store.fetch(&["../escape"]).await.unwrap().is_empty());
        assert!(matches!(
            store.update("../escape", Map::new()).await,
            Err(StoreError::NotFound(_))
        ));
        fs::remove_dir_all(store.base_path()).await.unwrap();
    }

    #[tokio::test]
    async fn failed_write_leaves_no_temp_file() {
        let store = temp_store().await;
        // A non-empty directory where the document should go makes the rename fail.
        let blocker = store.base_path().join("doc-1.json");
        fs::create_dir_all(blocker.join("inner")).await.unwrap();

        assert!(matches!(store.upsert("doc-1", json!({"a": 1})).await, Err(StoreError::Io(_))));

        let mut entries = fs::read_dir(store.base_path()).await.unwrap();
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await.unwrap() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        assert_eq!(names, vec!["doc-1.json"]);
        fs::remove_dir_all(store.base_path()).await.unwrap();
    }
}
