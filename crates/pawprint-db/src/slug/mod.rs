//! Slugs: human-readable, URL-safe identifiers for persisted records.
//!
//! A slug is built deterministically from the record's attributes and id
//! ([`build_slug`]) and then made unique within its table by appending `-1`, `-2`, ...
//! ([`UniquenessResolver`]). Uniqueness is per table, never global.

pub mod builder;
pub mod normalize;
pub mod repository;
pub mod resolver;

pub use builder::build_slug;
pub use normalize::normalize_segment;
pub use repository::SlugRepository;
pub use resolver::{SlugLookup, SlugTable, UniquenessResolver};

/// Slug construction and resolution errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SlugError {
    #[error("Slug lookup on {table} failed: {message}")]
    ProbeFailed { table: String, message: String },

    #[error("No free slug for {candidate} in {table} after {attempts} attempts")]
    CollisionExhausted {
        candidate: String,
        table: String,
        attempts: u32,
    },

    #[error("Slug candidate is empty")]
    EmptyCandidate,
}

impl SlugError {
    /// A failed probe says nothing about the slug, so the whole resolution may be retried
    pub fn is_retryable(&self) -> bool {
        matches!(self, SlugError::ProbeFailed { .. })
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            SlugError::ProbeFailed { .. } => "SLUG_PROBE_FAILED",
            SlugError::CollisionExhausted { .. } => "SLUG_COLLISION_EXHAUSTED",
            SlugError::EmptyCandidate => "SLUG_EMPTY",
        }
    }
}
