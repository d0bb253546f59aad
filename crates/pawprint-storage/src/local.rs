use crate::traits::{Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Local filesystem storage implementation
///
/// Containers are directories directly under `base_path`; objects live at
/// `{base_path}/{container}/{key}` and are served from `{base_url}/{container}/{key}`.
#[derive(Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
    container: String,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// # Arguments
    /// * `base_path` - Root directory for containers (e.g., "/var/lib/pawprint/storage")
    /// * `base_url` - Base URL for serving files (e.g., "http://localhost:3000/storage")
    /// * `container` - Container objects are written to
    ///
    /// The container directory itself is not created here; that is the provisioner's job.
    pub async fn new(
        base_path: impl Into<PathBuf>,
        base_url: String,
        container: String,
    ) -> StorageResult<Self> {
        let base_path = base_path.into();

        validate_container_name(&container)?;

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage {
            base_path,
            base_url,
            container,
        })
    }

    /// Convert storage key to filesystem path with security validation
    ///
    /// Rejects keys that could escape the container directory.
    fn key_to_path(&self, storage_key: &str) -> StorageResult<PathBuf> {
        if storage_key.is_empty()
            || storage_key.contains("..")
            || storage_key.starts_with('/')
            || storage_key.contains('\\')
        {
            return Err(StorageError::InvalidKey(format!(
                "Storage key contains invalid characters: {}",
                storage_key
            )));
        }

        Ok(self.base_path.join(&self.container).join(storage_key))
    }

    fn container_path(&self, name: &str) -> StorageResult<PathBuf> {
        validate_container_name(name)?;
        Ok(self.base_path.join(name))
    }

    /// Ensure parent directory exists
    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }
}

fn validate_container_name(name: &str) -> StorageResult<()> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
        && !name.contains("..");
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(format!(
            "Invalid container name: {}",
            name
        )))
    }
}

#[async_trait]
impl Storage for LocalStorage {
    fn container(&self) -> &str {
        &self.container
    }

    async fn put_object(&self, key: &str, data: Bytes, _content_type: &str) -> StorageResult<String> {
        let path = self.key_to_path(key)?;
        let size = data.len();

        self.ensure_parent_dir(&path).await?;

        let start = std::time::Instant::now();

        let mut file = fs::File::create(&path).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to create file {}: {}", path.display(), e))
        })?;

        file.write_all(&data).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to write file {}: {}", path.display(), e))
        })?;

        file.sync_all().await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to sync file {}: {}", path.display(), e))
        })?;

        tracing::info!(
            path = %path.display(),
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage upload successful"
        );

        Ok(key.to_string())
    }

    fn public_url(&self, key: &str) -> String {
        format!(
            "{}/{}/{}",
            self.base_url.trim_end_matches('/'),
            self.container,
            key
        )
    }

    async fn delete_object(&self, key: &str) -> StorageResult<()> {
        let path = self.key_to_path(key)?;

        match fs::remove_file(&path).await {
            Ok(()) => {
                tracing::info!(key = %key, "Local storage delete successful");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::DeleteFailed(format!(
                "Failed to delete file {}: {}",
                path.display(),
                e
            ))),
        }
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        let path = self.key_to_path(key)?;
        Ok(fs::try_exists(&path).await?)
    }

    async fn container_exists(&self, name: &str) -> StorageResult<bool> {
        let path = self.container_path(name)?;
        match fs::metadata(&path).await {
            Ok(meta) => Ok(meta.is_dir()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StorageError::IoError(e)),
        }
    }

    async fn create_container(&self, name: &str) -> StorageResult<bool> {
        let path = self.container_path(name)?;
        fs::create_dir_all(&path).await.map_err(|e| {
            StorageError::BackendError(format!(
                "Failed to create container {}: {}",
                path.display(),
                e
            ))
        })?;

        tracing::info!(container = %name, path = %path.display(), "Local container created");
        Ok(true)
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn storage(dir: &tempfile::TempDir) -> LocalStorage {
        LocalStorage::new(
            dir.path(),
            "http://localhost:3000/storage/".to_string(),
            "uploads".to_string(),
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_put_and_delete_object() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage(&dir).await;

        let key = storage
            .put_object("pets/public/rex-1-00000001.jpg", Bytes::from_static(b"abc"), "image/jpeg")
            .await
            .unwrap();
        assert_eq!(key, "pets/public/rex-1-00000001.jpg");
        assert!(storage.exists(&key).await.unwrap());
        assert_eq!(
            std::fs::read(dir.path().join("uploads").join(&key)).unwrap(),
            b"abc"
        );

        storage.delete_object(&key).await.unwrap();
        assert!(!storage.exists(&key).await.unwrap());
        // Deleting twice is fine
        storage.delete_object(&key).await.unwrap();
    }

    #[tokio::test]
    async fn test_public_url() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage(&dir).await;
        assert_eq!(
            storage.public_url("avatars/u1/me-1-00000001.png"),
            "http://localhost:3000/storage/uploads/avatars/u1/me-1-00000001.png"
        );
    }

    #[tokio::test]
    async fn test_rejects_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage(&dir).await;
        let result = storage
            .put_object("../escape.jpg", Bytes::from_static(b"x"), "image/jpeg")
            .await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));
        assert!(storage.container_exists("../etc").await.is_err());
    }

    #[tokio::test]
    async fn test_container_lifecycle() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage(&dir).await;

        assert!(!storage.container_exists("uploads").await.unwrap());
        assert!(storage.create_container("uploads").await.unwrap());
        assert!(storage.container_exists("uploads").await.unwrap());
        // Idempotent
        assert!(storage.create_container("uploads").await.unwrap());
    }
}
