//! Storage abstraction trait
//!
//! This module defines the Storage trait that all storage backends must implement.

use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("Operation not supported: {0}")]
    Unsupported(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage abstraction trait
///
/// A storage instance is bound to one destination container (bucket). Object
/// operations address that container; the container probes take an explicit name
/// so provisioning can be checked independently of where objects are written.
///
/// Writes are upserts: putting the same key twice replaces the object.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Name of the container objects are written to
    fn container(&self) -> &str;

    /// Write `data` under `key` and return the stored key
    async fn put_object(&self, key: &str, data: Bytes, content_type: &str) -> StorageResult<String>;

    /// Public URL for a stored key. Pure string derivation, no network call.
    fn public_url(&self, key: &str) -> String;

    /// Delete an object. Deleting a missing object is not an error.
    async fn delete_object(&self, key: &str) -> StorageResult<()>;

    /// Check if an object exists
    async fn exists(&self, key: &str) -> StorageResult<bool>;

    /// Probe whether a container exists.
    ///
    /// An `Err` means the probe was inconclusive (e.g. insufficient credentials),
    /// not that the container is missing.
    async fn container_exists(&self, name: &str) -> StorageResult<bool>;

    /// Create a container if missing. Returns `true` when the container is usable afterwards.
    async fn create_container(&self, name: &str) -> StorageResult<bool>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
