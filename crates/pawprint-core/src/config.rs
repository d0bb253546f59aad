//! Configuration module
//!
//! Environment-driven configuration for the storage backend, upload timeout and
//! slug resolution. `.env` files are honoured through `dotenvy`.

use std::env;
use std::time::Duration;

use crate::error::AppError;
use crate::storage_types::StorageBackend;

const UPLOAD_TIMEOUT_SECS: u64 = 30;
const SLUG_MAX_ATTEMPTS: u32 = 100;
const DEFAULT_BUCKET: &str = "pawprint-assets";
const DEFAULT_LOCAL_STORAGE_PATH: &str = "./data/storage";
const DEFAULT_LOCAL_STORAGE_BASE_URL: &str = "http://localhost:3000/storage";

#[derive(Clone, Debug)]
pub struct PawprintConfig {
    pub environment: String,
    pub storage_backend: StorageBackend,
    /// Destination container (bucket) for every upload
    pub storage_bucket: String,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>, // Custom endpoint for S3-compatible providers (MinIO, Supabase, ...)
    pub local_storage_path: String,
    pub local_storage_base_url: String,
    pub database_url: Option<String>,
    pub upload_timeout_secs: u64,
    pub slug_max_attempts: u32,
    pub log_json: bool,
}

impl PawprintConfig {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = lookup("ENVIRONMENT")
            .or_else(|| lookup("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let storage_backend = match lookup("STORAGE_BACKEND") {
            Some(s) => s.parse()?,
            None => StorageBackend::Local,
        };

        let upload_timeout_secs = match lookup("UPLOAD_TIMEOUT_SECS") {
            Some(s) => s.trim().parse().map_err(|_| {
                AppError::Config("UPLOAD_TIMEOUT_SECS must be a valid number".to_string())
            })?,
            None => UPLOAD_TIMEOUT_SECS,
        };

        let slug_max_attempts = match lookup("SLUG_MAX_ATTEMPTS") {
            Some(s) => s.trim().parse().map_err(|_| {
                AppError::Config("SLUG_MAX_ATTEMPTS must be a valid number".to_string())
            })?,
            None => SLUG_MAX_ATTEMPTS,
        };

        let mut config = PawprintConfig {
            environment,
            storage_backend,
            storage_bucket: lookup("STORAGE_BUCKET")
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_BUCKET.to_string()),
            s3_region: lookup("S3_REGION").or_else(|| lookup("AWS_REGION")),
            s3_endpoint: lookup("S3_ENDPOINT"),
            local_storage_path: lookup("LOCAL_STORAGE_PATH")
                .unwrap_or_else(|| DEFAULT_LOCAL_STORAGE_PATH.to_string()),
            local_storage_base_url: lookup("LOCAL_STORAGE_BASE_URL")
                .unwrap_or_else(|| DEFAULT_LOCAL_STORAGE_BASE_URL.to_string()),
            database_url: lookup("DATABASE_URL"),
            upload_timeout_secs,
            slug_max_attempts,
            log_json: false,
        };

        // Production logs default to JSON unless LOG_FORMAT says otherwise
        config.log_json = match lookup("LOG_FORMAT") {
            Some(format) => format.eq_ignore_ascii_case("json"),
            None => config.is_production(),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.upload_timeout_secs == 0 {
            return Err(AppError::Config(
                "UPLOAD_TIMEOUT_SECS must be greater than zero".to_string(),
            ));
        }
        if self.slug_max_attempts == 0 {
            return Err(AppError::Config(
                "SLUG_MAX_ATTEMPTS must be greater than zero".to_string(),
            ));
        }
        if self.storage_backend == StorageBackend::S3 && self.s3_region.is_none() {
            return Err(AppError::Config(
                "S3_REGION or AWS_REGION must be set for the s3 backend".to_string(),
            ));
        }
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn upload_timeout(&self) -> Duration {
        Duration::from_secs(self.upload_timeout_secs)
    }

    pub fn database_url(&self) -> Result<&str, AppError> {
        self.database_url
            .as_deref()
            .ok_or_else(|| AppError::Config("DATABASE_URL must be set".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<PawprintConfig, AppError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        PawprintConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.storage_backend, StorageBackend::Local);
        assert_eq!(config.storage_bucket, DEFAULT_BUCKET);
        assert_eq!(config.upload_timeout(), Duration::from_secs(30));
        assert_eq!(config.slug_max_attempts, 100);
        assert!(!config.is_production());
        assert!(config.database_url().is_err());
    }

    #[test]
    fn test_s3_requires_region() {
        assert!(config_from(&[("STORAGE_BACKEND", "s3")]).is_err());
        let config = config_from(&[("STORAGE_BACKEND", "s3"), ("AWS_REGION", "sa-east-1")]).unwrap();
        assert_eq!(config.s3_region.as_deref(), Some("sa-east-1"));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        assert!(config_from(&[("UPLOAD_TIMEOUT_SECS", "0")]).is_err());
        assert!(config_from(&[("UPLOAD_TIMEOUT_SECS", "abc")]).is_err());
    }

    #[test]
    fn test_invalid_backend_rejected() {
        assert!(matches!(
            config_from(&[("STORAGE_BACKEND", "nfs")]),
            Err(AppError::Config(_))
        ));
    }

    #[test]
    fn test_production_defaults_to_json_logs() {
        let config = config_from(&[("ENVIRONMENT", "Production")]).unwrap();
        assert!(config.is_production());
        assert!(config.log_json);

        let config = config_from(&[("APP_ENV", "prod"), ("LOG_FORMAT", "text")]).unwrap();
        assert!(!config.log_json);

        let config = config_from(&[("LOG_FORMAT", "JSON")]).unwrap();
        assert!(!config.is_production());
        assert!(config.log_json);
    }
}
