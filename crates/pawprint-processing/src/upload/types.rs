//! Types for the upload pipeline.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::time::Duration;

use pawprint_core::{AppError, StorageObject, UploadedAsset};
use pawprint_storage::StorageError;

use super::state::UploadState;
use crate::validator::ValidationError;

/// Non-fatal degradation observed during a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadWarning {
    /// Destination container could not be confirmed; the upload was attempted anyway
    Provision { reason: String },
    /// Resize failed; the original bytes were uploaded
    Transform { reason: String },
}

impl Display for UploadWarning {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            UploadWarning::Provision { reason } => write!(f, "provision: {}", reason),
            UploadWarning::Transform { reason } => write!(f, "transform: {}", reason),
        }
    }
}

/// Successful upload
#[derive(Debug, Clone)]
pub struct UploadReport {
    pub object: StorageObject,
    pub warnings: Vec<UploadWarning>,
    /// (from, to) dimensions when the image was downscaled
    pub resized: Option<((u32, u32), (u32, u32))>,
    pub states: Vec<UploadState>,
}

impl UploadReport {
    pub fn asset(&self) -> UploadedAsset {
        UploadedAsset::from(&self.object)
    }

    pub fn is_degraded(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Terminal upload failures
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Invalid upload policy: {0}")]
    Policy(#[from] AppError),

    #[error("Upload timed out after {}s", .0.as_secs_f64())]
    Timeout(Duration),

    #[error("Upload cancelled")]
    Cancelled,

    #[error("Storage backend error: {0}")]
    Backend(#[from] StorageError),
}

impl UploadError {
    /// Only timeouts are worth offering a retry for
    pub fn is_retryable(&self) -> bool {
        matches!(self, UploadError::Timeout(_))
    }

    pub fn terminal_state(&self) -> UploadState {
        match self {
            UploadError::Cancelled => UploadState::Cancelled,
            _ => UploadState::Failed,
        }
    }

    /// Machine-readable error code
    pub fn error_code(&self) -> &'static str {
        match self {
            UploadError::Validation(e) => e.code(),
            UploadError::Policy(e) => e.error_code(),
            UploadError::Timeout(_) => "timeout",
            UploadError::Cancelled => "cancelled",
            UploadError::Backend(_) => "backend",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_only_for_timeout() {
        assert!(UploadError::Timeout(Duration::from_secs(30)).is_retryable());
        assert!(!UploadError::Cancelled.is_retryable());
        assert!(!UploadError::Backend(StorageError::UploadFailed("x".into())).is_retryable());
        assert!(!UploadError::Validation(ValidationError::TooLarge { size: 2, max: 1 }).is_retryable());
    }

    #[test]
    fn test_terminal_state() {
        assert_eq!(UploadError::Cancelled.terminal_state(), UploadState::Cancelled);
        assert_eq!(
            UploadError::Timeout(Duration::from_secs(1)).terminal_state(),
            UploadState::Failed
        );
    }
}
