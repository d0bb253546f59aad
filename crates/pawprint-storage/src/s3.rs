use crate::traits::{Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path;
use object_store::Error as ObjectStoreError;
use object_store::{
    Attribute, Attributes, ObjectStoreExt, PutOptions, PutPayload, Result as ObjectResult,
};

/// S3 storage implementation
#[derive(Clone)]
pub struct S3Storage {
    store: AmazonS3,
    bucket: String,
    region: String,
    endpoint_url: Option<String>, // Custom endpoint for S3-compatible providers
}

impl S3Storage {
    /// Create a new S3Storage instance
    ///
    /// # Arguments
    /// * `bucket` - S3 bucket name objects are written to
    /// * `region` - AWS region (or region identifier for S3-compatible providers)
    /// * `endpoint_url` - Optional custom endpoint URL for S3-compatible providers
    ///   (e.g., "http://localhost:9000" for MinIO)
    pub fn new(bucket: String, region: String, endpoint_url: Option<String>) -> StorageResult<Self> {
        let store = Self::build_store(&bucket, &region, endpoint_url.as_deref())?;

        Ok(S3Storage {
            store,
            bucket,
            region,
            endpoint_url,
        })
    }

    /// Build an AmazonS3 object store from environment credentials and explicit settings.
    fn build_store(bucket: &str, region: &str, endpoint: Option<&str>) -> StorageResult<AmazonS3> {
        let mut builder = AmazonS3Builder::from_env()
            .with_region(region)
            .with_bucket_name(bucket);

        if let Some(endpoint) = endpoint {
            let allow_http = endpoint.starts_with("http://");
            builder = builder.with_endpoint(endpoint).with_allow_http(allow_http);
        }

        builder
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))
    }

    /// Generate public URL for S3 object
    ///
    /// For AWS S3, uses the standard format: https://{bucket}.s3.{region}.amazonaws.com/{key}
    /// For S3-compatible providers, uses path-style `{endpoint}/{bucket}/{key}`
    fn generate_url(&self, key: &str) -> String {
        if let Some(ref endpoint) = self.endpoint_url {
            let base_url = endpoint.trim_end_matches('/');
            format!("{}/{}/{}", base_url, self.bucket, key)
        } else {
            format!(
                "https://{}.s3.{}.amazonaws.com/{}",
                self.bucket, self.region, key
            )
        }
    }
}

#[async_trait]
impl Storage for S3Storage {
    fn container(&self) -> &str {
        &self.bucket
    }

    async fn put_object(&self, key: &str, data: Bytes, content_type: &str) -> StorageResult<String> {
        let size = data.len() as u64;
        let location = Path::from(key.to_string());
        let start = std::time::Instant::now();

        let mut attributes = Attributes::new();
        attributes.insert(Attribute::ContentType, content_type.to_string().into());
        let options = PutOptions {
            attributes,
            ..Default::default()
        };

        let result: ObjectResult<_> =
            object_store::ObjectStore::put_opts(&self.store, &location, PutPayload::from(data), options)
                .await;

        result.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %self.bucket,
                key = %key,
                size_bytes = size,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "S3 upload failed"
            );
            StorageError::UploadFailed(e.to_string())
        })?;

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 upload successful"
        );

        Ok(key.to_string())
    }

    fn public_url(&self, key: &str) -> String {
        self.generate_url(key)
    }

    async fn delete_object(&self, key: &str) -> StorageResult<()> {
        let start = std::time::Instant::now();
        let location = Path::from(key.to_string());

        let result: ObjectResult<_> = self.store.delete(&location).await;

        match result {
            Ok(()) | Err(ObjectStoreError::NotFound { .. }) => {
                tracing::info!(
                    bucket = %self.bucket,
                    key = %key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 delete successful"
                );
                Ok(())
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    key = %key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 delete failed"
                );
                Err(StorageError::DeleteFailed(e.to_string()))
            }
        }
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        let location = Path::from(key.to_string());
        match self.store.head(&location).await {
            Ok(_) => Ok(true),
            Err(ObjectStoreError::NotFound { .. }) => Ok(false),
            Err(e) => Err(StorageError::BackendError(e.to_string())),
        }
    }

    async fn container_exists(&self, name: &str) -> StorageResult<bool> {
        // object_store has no bucket-level HEAD; a delimiter listing on the bucket root
        // succeeds only when the bucket exists and we may read it.
        let store = if name == self.bucket {
            self.store.clone()
        } else {
            Self::build_store(name, &self.region, self.endpoint_url.as_deref())?
        };

        match object_store::ObjectStore::list_with_delimiter(&store, None).await {
            Ok(_) => Ok(true),
            Err(ObjectStoreError::NotFound { .. }) => Ok(false),
            Err(e) => Err(StorageError::BackendError(e.to_string())),
        }
    }

    async fn create_container(&self, name: &str) -> StorageResult<bool> {
        // Bucket provisioning is not exposed by object_store; buckets are created by
        // infrastructure tooling.
        Err(StorageError::Unsupported(format!(
            "create_container({}) is not supported; provision S3 buckets via infrastructure",
            name
        )))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_url_aws() {
        let storage = S3Storage::new("bucket".to_string(), "sa-east-1".to_string(), None).unwrap();
        assert_eq!(
            storage.public_url("pets/public/a.jpg"),
            "https://bucket.s3.sa-east-1.amazonaws.com/pets/public/a.jpg"
        );
    }

    #[test]
    fn test_generate_url_custom_endpoint() {
        let storage = S3Storage::new(
            "bucket".to_string(),
            "us-east-1".to_string(),
            Some("http://localhost:9000/".to_string()),
        )
        .unwrap();
        assert_eq!(
            storage.public_url("pets/public/a.jpg"),
            "http://localhost:9000/bucket/pets/public/a.jpg"
        );
    }

    #[tokio::test]
    async fn test_create_container_unsupported() {
        let storage = S3Storage::new("bucket".to_string(), "us-east-1".to_string(), None).unwrap();
        assert!(matches!(
            storage.create_container("bucket").await,
            Err(StorageError::Unsupported(_))
        ));
    }
}
