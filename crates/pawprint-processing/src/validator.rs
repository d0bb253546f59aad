use pawprint_core::UploadPolicy;

/// Upload validation errors
///
/// Both variants are raised before any network call and are fully recoverable by
/// the caller (pick another file).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Unsupported file type: {content_type} (allowed: {allowed:?})")]
    UnsupportedType {
        content_type: String,
        allowed: Vec<String>,
    },

    #[error("File too large: {size} bytes (max: {max} bytes)")]
    TooLarge { size: usize, max: usize },
}

impl ValidationError {
    /// Machine-readable code for form-level messages
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::UnsupportedType { .. } => "unsupported-type",
            ValidationError::TooLarge { .. } => "too-large",
        }
    }
}

/// Upload validator
///
/// Pure check of a declared type and size against one category policy.
pub struct UploadValidator<'a> {
    policy: &'a UploadPolicy,
}

impl<'a> UploadValidator<'a> {
    pub fn new(policy: &'a UploadPolicy) -> Self {
        Self { policy }
    }

    /// Validate content type
    pub fn validate_content_type(&self, content_type: &str) -> Result<(), ValidationError> {
        if !self.policy.allows(content_type) {
            return Err(ValidationError::UnsupportedType {
                content_type: content_type.to_string(),
                allowed: self.policy.allowed_types.clone(),
            });
        }
        Ok(())
    }

    /// Validate file size. `max_size` itself is accepted.
    pub fn validate_file_size(&self, size: usize) -> Result<(), ValidationError> {
        if size > self.policy.max_size {
            return Err(ValidationError::TooLarge {
                size,
                max: self.policy.max_size,
            });
        }
        Ok(())
    }

    /// Type first, so a disallowed type is reported regardless of size
    pub fn validate(&self, content_type: &str, size: usize) -> Result<(), ValidationError> {
        self.validate_content_type(content_type)?;
        self.validate_file_size(size)?;
        Ok(())
    }
}
