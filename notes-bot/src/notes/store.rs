//! Whole-document load/save of note-files.
//!
//! Every call goes to the backend: nothing is cached, and a save replaces the
//! entire document. Two overlapping read-modify-write cycles on the same file
//! can lose one of the updates.

use super::file::NoteFile;
use crate::storage::{ObjectStorage, StorageError};
use std::sync::Arc;

#[derive(Clone)]
pub struct NoteStore {
    storage: Arc<dyn ObjectStorage>,
}

impl NoteStore {
    pub fn new(storage: Arc<dyn ObjectStorage>) -> Self {
        Self { storage }
    }

    pub async fn exists(&self, name: &str) -> Result<bool, StorageError> {
        self.storage.exists(name).await
    }

    /// Load and parse a note-file. `Ok(None)` when it does not exist.
    pub async fn load(&self, name: &str) -> Result<Option<NoteFile>, StorageError> {
        let Some(bytes) = self.storage.get(name).await? else {
            return Ok(None);
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| StorageError::new(format!("Note file {} is not valid JSON: {}", name, e)))
    }

    pub async fn save(&self, name: &str, file: &NoteFile) -> Result<(), StorageError> {
        let bytes = serde_json::to_vec_pretty(file)
            .map_err(|e| StorageError::new(format!("Failed to serialize {}: {}", name, e)))?;
        self.storage.put(name, bytes).await?;
        if file.is_empty() {
            log::debug!("Notes: Saved {} (no entries)", name);
        } else {
            log::debug!("Notes: Saved {} ({} entries)", name, file.len());
        }
        Ok(())
    }

    pub async fn list_files(&self) -> Result<Vec<String>, StorageError> {
        self.storage.list().await
    }

    pub fn describe(&self) -> String {
        self.storage.describe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::MemoryStorage;

    #[tokio::test]
    async fn test_load_missing() {
        let store = NoteStore::new(Arc::new(MemoryStorage::new()));
        assert!(store.load("notes.json").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let memory = Arc::new(MemoryStorage::new());
        let store = NoteStore::new(memory.clone());

        let mut file = NoteFile::default();
        file.set("jan-m", "https://example.com/m");
        store.save("notes.json", &file).await.unwrap();

        assert!(store.exists("notes.json").await.unwrap());
        assert_eq!(store.load("notes.json").await.unwrap(), Some(file));

        let raw: serde_json::Value =
            serde_json::from_slice(&memory.raw("notes.json").unwrap()).unwrap();
        assert_eq!(raw["jan-m"], "https://example.com/m");
    }

    #[tokio::test]
    async fn test_corrupt_document_is_storage_error() {
        let memory = Arc::new(MemoryStorage::new());
        memory.insert_raw("broken.json", b"{not json");
        let store = NoteStore::new(memory);
        let err = store.load("broken.json").await.unwrap_err();
        assert!(err.message.contains("broken.json"));
    }
}
