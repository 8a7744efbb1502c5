//! Document status persistence
//!
//! The ingestion workflow only ever writes the `status` attribute of a
//! document, unconditionally. Stores implement that single update plus
//! reads for inspection.

use crate::error::{Error, Result};
use crate::types::{Document, DocumentKey, DocumentStatus};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::{Mutex, RwLock};

/// Storage backend for document status
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Set the status of a document, creating the record if absent
    async fn set_status(&self, key: &DocumentKey, status: DocumentStatus) -> Result<Document>;

    /// Load a document
    async fn get(&self, key: &DocumentKey) -> Result<Option<Document>>;

    /// List documents of a workspace, ordered by document id
    async fn list(&self, workspace_id: &str) -> Result<Vec<Document>>;

    /// Store name (e.g., "memory", "file")
    fn name(&self) -> &str;
}

// ============================================================================
// In-Memory Store
// ============================================================================

/// In-memory document store for testing and single-process use
#[derive(Default)]
pub struct MemoryDocumentStore {
    documents: RwLock<HashMap<DocumentKey, Document>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn set_status(&self, key: &DocumentKey, status: DocumentStatus) -> Result<Document> {
        let document = Document {
            key: key.clone(),
            status,
            updated_at: Utc::now(),
        };
        let mut documents = self.documents.write().await;
        documents.insert(key.clone(), document.clone());
        Ok(document)
    }

    async fn get(&self, key: &DocumentKey) -> Result<Option<Document>> {
        let documents = self.documents.read().await;
        Ok(documents.get(key).cloned())
    }

    async fn list(&self, workspace_id: &str) -> Result<Vec<Document>> {
        let documents = self.documents.read().await;
        let mut result: Vec<Document> = documents
            .values()
            .filter(|d| d.key.workspace_id == workspace_id)
            .cloned()
            .collect();
        result.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(result)
    }

    fn name(&self) -> &str {
        "memory"
    }
}

// ============================================================================
// File-based Store
// ============================================================================

/// JSON file document store
///
/// Keeps all documents in one pretty-printed JSON array. Writes go to a
/// temp file that is renamed over the store file.
pub struct FileDocumentStore {
    path: PathBuf,
    /// Serializes read-modify-write cycles within the process
    write_lock: Mutex<()>,
}

impl FileDocumentStore {
    /// Open a store at `path`, creating parent directories
    pub async fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await.map_err(|e| {
                    Error::Storage(format!(
                        "Failed to create store directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        Ok(Self {
            path,
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        self.path.with_extension("json.tmp")
    }

    async fn load_all(&self) -> Result<Vec<Document>> {
        if !fs::try_exists(&self.path).await? {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&self.path).await?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_json::from_str(&content).map_err(|e| {
            Error::Storage(format!(
                "Failed to parse store file {}: {}",
                self.path.display(),
                e
            ))
        })
    }

    async fn save_all(&self, documents: &[Document]) -> Result<()> {
        let json = serde_json::to_string_pretty(documents)?;

        let tmp_path = self.tmp_path();
        if let Err(e) = write_synced(&tmp_path, json.as_bytes()).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(e.into());
        }
        fs::rename(&tmp_path, &self.path).await?;

        tracing::debug!(path = %self.path.display(), count = documents.len(), "Documents saved");
        Ok(())
    }
}

async fn write_synced(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(path).await?;
    file.write_all(contents).await?;
    file.sync_all().await
}

#[async_trait]
impl DocumentStore for FileDocumentStore {
    async fn set_status(&self, key: &DocumentKey, status: DocumentStatus) -> Result<Document> {
        let _guard = self.write_lock.lock().await;
        let mut documents = self.load_all().await?;

        let document = Document {
            key: key.clone(),
            status,
            updated_at: Utc::now(),
        };

        if let Some(existing) = documents.iter_mut().find(|d| &d.key == key) {
            *existing = document.clone();
        } else {
            documents.push(document.clone());
        }

        self.save_all(&documents).await?;
        Ok(document)
    }

    async fn get(&self, key: &DocumentKey) -> Result<Option<Document>> {
        let documents = self.load_all().await?;
        Ok(documents.into_iter().find(|d| &d.key == key))
    }

    async fn list(&self, workspace_id: &str) -> Result<Vec<Document>> {
        let mut documents: Vec<Document> = self
            .load_all()
            .await?
            .into_iter()
            .filter(|d| d.key.workspace_id == workspace_id)
            .collect();
        documents.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(documents)
    }

    fn name(&self) -> &str {
        "file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    // ========================================================================
    // MemoryDocumentStore Tests
    // ========================================================================

    #[tokio::test]
    async fn test_memory_store_set_and_get() {
        let store = MemoryDocumentStore::new();
        let key = DocumentKey::new("ws", "doc");

        assert!(store.get(&key).await.unwrap().is_none());

        store.set_status(&key, DocumentStatus::Processing).await.unwrap();
        let doc = store.get(&key).await.unwrap().unwrap();
        assert_eq!(doc.status, DocumentStatus::Processing);
    }

    #[tokio::test]
    async fn test_memory_store_overwrites_unconditionally() {
        let store = MemoryDocumentStore::new();
        let key = DocumentKey::new("ws", "doc");

        store.set_status(&key, DocumentStatus::Processed).await.unwrap();
        store.set_status(&key, DocumentStatus::Processing).await.unwrap();

        let doc = store.get(&key).await.unwrap().unwrap();
        assert_eq!(doc.status, DocumentStatus::Processing);
    }

    #[tokio::test]
    async fn test_memory_store_list_by_workspace() {
        let store = MemoryDocumentStore::new();
        for doc in ["b", "a", "c"] {
            store
                .set_status(&DocumentKey::new("ws-1", doc), DocumentStatus::Processed)
                .await
                .unwrap();
        }
        store
            .set_status(&DocumentKey::new("ws-2", "x"), DocumentStatus::Error)
            .await
            .unwrap();

        let docs = store.list("ws-1").await.unwrap();
        let ids: Vec<&str> = docs.iter().map(|d| d.key.document_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(store.list("ws-2").await.unwrap().len(), 1);
    }

    // ========================================================================
    // FileDocumentStore Tests
    // ========================================================================

    #[tokio::test]
    async fn test_file_store_persistence() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("documents.json");
        let key = DocumentKey::new("ws", "doc");

        {
            let store = FileDocumentStore::new(&path).await.unwrap();
            store.set_status(&key, DocumentStatus::Processing).await.unwrap();
            store.set_status(&key, DocumentStatus::Processed).await.unwrap();
        }

        let store = FileDocumentStore::new(&path).await.unwrap();
        let doc = store.get(&key).await.unwrap().unwrap();
        assert_eq!(doc.status, DocumentStatus::Processed);
        assert_eq!(store.list("ws").await.unwrap().len(), 1);

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"status\": \"processed\""));
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn test_file_store_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let store = FileDocumentStore::new(dir.path().join("none.json")).await.unwrap();
        assert!(store.list("ws").await.unwrap().is_empty());
        assert!(store
            .get(&DocumentKey::new("ws", "doc"))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_file_store_corrupt_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("documents.json");
        std::fs::write(&path, "{not json").unwrap();

        let store = FileDocumentStore::new(&path).await.unwrap();
        let err = store.list("ws").await.unwrap_err();
        assert!(matches!(err, Error::Storage(_)));
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn test_file_store_failed_write_leaves_no_temp_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("documents.json");
        let store = FileDocumentStore::new(&path).await.unwrap();

        // Writes through /dev/full fail with ENOSPC after the open succeeds
        std::os::unix::fs::symlink("/dev/full", store.tmp_path()).unwrap();

        let err = store
            .set_status(&DocumentKey::new("ws", "doc"), DocumentStatus::Processing)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Io(_)));
        assert!(std::fs::symlink_metadata(store.tmp_path()).is_err());
        assert!(!path.exists());
    }
}
