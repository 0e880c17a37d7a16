//! Byte-level object storage backing the note-files.
//!
//! A backend only knows keys and bytes. Mapping note-file names onto keys and
//! (de)serializing documents is the job of `notes::store`.

mod local;
mod s3;
mod sigv4;

#[cfg(test)]
pub mod memory;

pub use local::LocalStorage;
pub use s3::S3Storage;

use crate::config::StorageConfig;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

/// Storage failure with the HTTP status when the backend is remote
#[derive(Debug, Clone)]
pub struct StorageError {
    pub message: String,
    pub status_code: Option<u16>,
}

impl StorageError {
    pub fn new(message: impl Into<String>) -> Self {
        StorageError {
            message: message.into(),
            status_code: None,
        }
    }

    pub fn with_status(message: impl Into<String>, status_code: u16) -> Self {
        StorageError {
            message: message.into(),
            status_code: Some(status_code),
        }
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(code) = self.status_code {
            write!(f, "[HTTP {}] {}", code, self.message)
        } else {
            write!(f, "{}", self.message)
        }
    }
}

impl std::error::Error for StorageError {}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        StorageError::new(format!("I/O error: {}", e))
    }
}

impl From<reqwest::Error> for StorageError {
    fn from(e: reqwest::Error) -> Self {
        match e.status() {
            Some(status) => StorageError::with_status(e.to_string(), status.as_u16()),
            None => StorageError::new(e.to_string()),
        }
    }
}

/// Whole-object get/put/exists/list by key
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Fetch an object. `Ok(None)` when the key does not exist.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;

    /// Create or fully replace an object
    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<(), StorageError>;

    async fn exists(&self, key: &str) -> Result<bool, StorageError>;

    /// Names of every object in the backend's namespace, relative to it
    async fn list(&self) -> Result<Vec<String>, StorageError>;

    /// Short label for logs
    fn describe(&self) -> String;
}

/// Build the backend selected in the config
pub fn from_config(config: &StorageConfig) -> Result<Arc<dyn ObjectStorage>, StorageError> {
    match config {
        StorageConfig::Local { dir } => Ok(Arc::new(LocalStorage::open(dir)?)),
        StorageConfig::S3(s3) => Ok(Arc::new(S3Storage::new(s3.clone()))),
    }
}
