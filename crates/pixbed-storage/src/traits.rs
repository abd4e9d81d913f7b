//! Storage abstraction trait
//!
//! This module defines the Storage trait that storage backends implement.

use crate::keys::StorageKey;
use async_trait::async_trait;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Unsupported content type: {0}")]
    UnsupportedContentType(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage abstraction trait
///
/// Backends store one immutable object per storage key. The pipelines never
/// mutate an object after [`Storage::put`]; removal happens only through
/// [`Storage::delete`].
#[async_trait]
pub trait Storage: Send + Sync {
    /// Write an object at the given key. The parent shard directory is
    /// created on demand; creation races with concurrent writers are not
    /// errors. A write that fails partway must not leave a partial object
    /// behind.
    async fn put(&self, key: &StorageKey, data: Vec<u8>) -> StorageResult<()>;

    /// Read the full object at the given key.
    async fn get(&self, key: &str) -> StorageResult<Vec<u8>>;

    /// Remove the object at the given key. Removing a missing object is not
    /// an error (deletes tolerate a file that is already gone).
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// Whether an object exists at the given key.
    async fn exists(&self, key: &str) -> StorageResult<bool>;

    /// Size in bytes of the object at the given key.
    async fn len(&self, key: &str) -> StorageResult<u64>;
}
