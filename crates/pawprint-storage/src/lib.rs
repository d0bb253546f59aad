//! Pawprint Storage Library
//!
//! This crate provides the storage abstraction consumed by the upload pipeline,
//! its S3 and local filesystem implementations, object key generation and
//! idempotent container provisioning.
//!
//! # Storage key format
//!
//! Every uploaded object lives at
//! `{category}/{owner_id|public}/{clean_name}-{unix_millis}-{8 hex}.{extension}`.
//! Keys never contain `..` or a leading `/`. Key generation is centralized in the
//! `keys` module so all backends stay consistent.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(any(test, feature = "test-utils"))]
pub mod memory;
pub mod provisioner;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
pub use keys::generate_object_key;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(any(test, feature = "test-utils"))]
pub use memory::MemoryStorage;
pub use pawprint_core::StorageBackend;
pub use provisioner::{BucketProvisioner, ProvisionOutcome};
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{Storage, StorageError, StorageResult};
