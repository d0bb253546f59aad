//! Error types module
//!
//! Configuration and policy errors shared across Pawprint crates. Pipeline-specific
//! failures (validation, upload, slug resolution) live next to the code that raises them.

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Unknown upload category: {0}")]
    UnknownCategory(String),

    #[error("Invalid upload policy for {category}: {reason}")]
    InvalidPolicy { category: String, reason: String },

    #[error("Missing upload policy for category: {0}")]
    MissingPolicy(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl AppError {
    /// Machine-readable error code
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::UnknownCategory(_) => "UNKNOWN_CATEGORY",
            AppError::InvalidPolicy { .. } => "INVALID_POLICY",
            AppError::MissingPolicy(_) => "MISSING_POLICY",
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::InvalidInput(_) => "INVALID_INPUT",
        }
    }
}
