//! Pawprint Core Library
//!
//! This crate provides the domain models, upload policies, configuration and error
//! types shared by the storage, processing and slug crates.

pub mod category;
pub mod config;
pub mod error;
pub mod models;
pub mod policy;
pub mod storage_types;

// Re-export commonly used types
pub use category::Category;
pub use config::PawprintConfig;
pub use error::AppError;
pub use models::{EntityKind, SlugAttributes, StorageObject, UploadRequest, UploadedAsset};
pub use policy::{PolicyTable, UploadPolicy};
pub use storage_types::StorageBackend;
