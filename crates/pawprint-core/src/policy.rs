//! Per-category upload policies
//!
//! The policy table is closed: every [`Category`] has exactly one policy and the
//! table is validated once at startup. Allowed types are mime subtypes (`jpeg`,
//! `png`, `svg`, ...) rather than full mime strings.

use std::collections::HashMap;

use crate::category::Category;
use crate::error::AppError;

const MB: usize = 1024 * 1024;

/// Size, type, dimension and quality limits for one category
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct UploadPolicy {
    /// Maximum payload size in bytes (inclusive)
    pub max_size: usize,
    pub allowed_types: Vec<String>,
    pub max_width: u32,
    pub max_height: u32,
    /// Re-encode quality in `(0, 1]`
    pub quality: f32,
}

impl UploadPolicy {
    pub fn new(
        max_size: usize,
        allowed_types: &[&str],
        max_width: u32,
        max_height: u32,
        quality: f32,
    ) -> Self {
        Self {
            max_size,
            allowed_types: allowed_types.iter().map(|t| t.to_string()).collect(),
            max_width,
            max_height,
            quality,
        }
    }

    /// Default policy bound to a category
    pub fn for_category(category: Category) -> Self {
        match category {
            Category::Pets => Self::new(5 * MB, &["jpeg", "jpg", "png", "webp"], 1200, 1200, 0.8),
            Category::Events => {
                Self::new(8 * MB, &["jpeg", "jpg", "png", "webp"], 1920, 1080, 0.85)
            }
            Category::Avatars => Self::new(2 * MB, &["jpeg", "jpg", "png"], 400, 400, 0.9),
            Category::Ongs => Self::new(3 * MB, &["jpeg", "jpg", "png", "svg"], 800, 800, 0.9),
            Category::Temp => Self::new(10 * MB, &["jpeg", "jpg", "png", "webp"], 2000, 2000, 0.8),
        }
    }

    /// Whether the declared content type is one of the allowed subtypes
    pub fn allows(&self, content_type: &str) -> bool {
        let subtype = mime_subtype(content_type);
        !subtype.is_empty() && self.allowed_types.iter().any(|t| *t == subtype)
    }

    /// Check the policy's own invariants
    pub fn validate(&self, category: Category) -> Result<(), AppError> {
        let invalid = |reason: &str| AppError::InvalidPolicy {
            category: category.to_string(),
            reason: reason.to_string(),
        };

        if self.max_size == 0 {
            return Err(invalid("max_size must be greater than zero"));
        }
        if self.allowed_types.is_empty() {
            return Err(invalid("allowed_types must not be empty"));
        }
        if self.allowed_types.iter().any(|t| t.trim().is_empty()) {
            return Err(invalid("allowed_types must not contain blank entries"));
        }
        if self.max_width == 0 || self.max_height == 0 {
            return Err(invalid("max dimensions must be greater than zero"));
        }
        if !(self.quality > 0.0 && self.quality <= 1.0) {
            return Err(invalid("quality must be in (0, 1]"));
        }

        Ok(())
    }
}

/// Extract the normalized subtype from a mime string.
///
/// `image/svg+xml; charset=utf-8` becomes `svg`, `IMAGE/JPEG` becomes `jpeg`.
pub fn mime_subtype(content_type: &str) -> String {
    let essence = content_type.split(';').next().unwrap_or("").trim();
    let subtype = essence.split_once('/').map(|(_, s)| s).unwrap_or("");
    let subtype = subtype.split('+').next().unwrap_or("");
    subtype.trim().to_lowercase()
}

/// Mime type for a file extension, for sources that carry no declared type
pub fn content_type_for_extension(extension: &str) -> Option<&'static str> {
    match extension.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        "svg" => Some("image/svg+xml"),
        _ => None,
    }
}

/// Closed category → policy table
#[derive(Debug, Clone)]
pub struct PolicyTable {
    policies: HashMap<Category, UploadPolicy>,
}

impl Default for PolicyTable {
    fn default() -> Self {
        let policies = Category::ALL
            .iter()
            .map(|c| (*c, UploadPolicy::for_category(*c)))
            .collect();
        Self { policies }
    }
}

impl PolicyTable {
    /// Build the default table and validate it
    pub fn load() -> Result<Self, AppError> {
        let table = Self::default();
        table.validate()?;
        Ok(table)
    }

    /// Replace the policy for one category, validating the replacement first
    pub fn with_policy(mut self, category: Category, policy: UploadPolicy) -> Result<Self, AppError> {
        policy.validate(category)?;
        self.policies.insert(category, policy);
        Ok(self)
    }

    /// Every category must be present and every policy must be well-formed
    pub fn validate(&self) -> Result<(), AppError> {
        for category in Category::ALL {
            self.get(category)?.validate(category)?;
        }
        Ok(())
    }

    pub fn get(&self, category: Category) -> Result<&UploadPolicy, AppError> {
        self.policies
            .get(&category)
            .ok_or_else(|| AppError::MissingPolicy(category.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table_is_valid() {
        let table = PolicyTable::load().unwrap();
        let avatars = table.get(Category::Avatars).unwrap();
        assert_eq!(avatars.max_size, 2 * MB);
        assert_eq!((avatars.max_width, avatars.max_height), (400, 400));
        assert_eq!(avatars.quality, 0.9);

        let events = table.get(Category::Events).unwrap();
        assert_eq!((events.max_width, events.max_height), (1920, 1080));
    }

    #[test]
    fn test_mime_subtype() {
        assert_eq!(mime_subtype("image/jpeg"), "jpeg");
        assert_eq!(mime_subtype("IMAGE/PNG"), "png");
        assert_eq!(mime_subtype("image/svg+xml"), "svg");
        assert_eq!(mime_subtype("image/webp; q=1"), "webp");
        assert_eq!(mime_subtype("garbage"), "");
    }

    #[test]
    fn test_content_type_for_extension() {
        assert_eq!(content_type_for_extension("JPG"), Some("image/jpeg"));
        assert_eq!(content_type_for_extension("svg"), Some("image/svg+xml"));
        assert_eq!(content_type_for_extension("exe"), None);
        assert_eq!(
            mime_subtype(content_type_for_extension("svg").unwrap()),
            "svg"
        );
    }

    #[test]
    fn test_allows() {
        let ongs = UploadPolicy::for_category(Category::Ongs);
        assert!(ongs.allows("image/svg+xml"));
        assert!(!ongs.allows("image/webp"));

        let avatars = UploadPolicy::for_category(Category::Avatars);
        assert!(avatars.allows("image/jpg"));
        assert!(!avatars.allows("image/gif"));
        assert!(!avatars.allows(""));
    }

    #[test]
    fn test_invalid_override_rejected() {
        let bad = UploadPolicy::new(0, &["png"], 10, 10, 0.5);
        let result = PolicyTable::default().with_policy(Category::Temp, bad);
        assert!(matches!(result, Err(AppError::InvalidPolicy { .. })));

        let bad_quality = UploadPolicy::new(10, &["png"], 10, 10, 1.5);
        assert!(bad_quality.validate(Category::Temp).is_err());
    }

    #[test]
    fn test_valid_override_replaces_policy() {
        let custom = UploadPolicy::new(1024, &["png"], 64, 64, 0.7);
        let table = PolicyTable::default()
            .with_policy(Category::Temp, custom.clone())
            .unwrap();
        assert_eq!(table.get(Category::Temp).unwrap(), &custom);
    }
}
