use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use std::sync::Arc;

use pawprint_core::{AppError, EntityKind, SlugAttributes};
use uuid::Uuid;

use super::builder::build_slug;
use super::SlugError;

/// Tables that own a slug column. Slugs are unique per table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlugTable {
    Pets,
    Ongs,
    Events,
    Partners,
}

impl SlugTable {
    pub fn as_str(&self) -> &'static str {
        match self {
            SlugTable::Pets => "pets",
            SlugTable::Ongs => "ongs",
            SlugTable::Events => "events",
            SlugTable::Partners => "partners",
        }
    }

    pub fn for_kind(kind: EntityKind) -> Self {
        match kind {
            EntityKind::Pet => SlugTable::Pets,
            EntityKind::Ong => SlugTable::Ongs,
            EntityKind::Event => SlugTable::Events,
            EntityKind::Partner => SlugTable::Partners,
        }
    }
}

impl Display for SlugTable {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for SlugTable {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pets" => Ok(SlugTable::Pets),
            "ongs" => Ok(SlugTable::Ongs),
            "events" => Ok(SlugTable::Events),
            "partners" => Ok(SlugTable::Partners),
            _ => Err(AppError::InvalidInput(format!("Unknown slug table: {}", s))),
        }
    }
}

/// Probe for a live record holding `slug`, ignoring the record `exclude_id`
#[async_trait::async_trait]
pub trait SlugLookup: Send + Sync {
    async fn slug_exists(
        &self,
        table: SlugTable,
        slug: &str,
        exclude_id: Option<Uuid>,
    ) -> Result<bool, SlugError>;
}

/// Disambiguates candidate slugs by appending `-1`, `-2`, ... until one is free.
///
/// Resolution is bounded by `max_attempts` suffixed probes after the bare candidate.
/// It does not reserve the slug: two concurrent resolutions of the same candidate can
/// both succeed, and the table's unique constraint is the final arbiter.
#[derive(Clone)]
pub struct UniquenessResolver {
    lookup: Arc<dyn SlugLookup>,
    max_attempts: u32,
}

impl UniquenessResolver {
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 100;

    pub fn new(lookup: Arc<dyn SlugLookup>) -> Self {
        Self {
            lookup,
            max_attempts: Self::DEFAULT_MAX_ATTEMPTS,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Return `candidate` if free in `table`, otherwise the first free `candidate-n`
    #[tracing::instrument(skip(self), fields(slug.table = %table))]
    pub async fn resolve_unique_slug(
        &self,
        candidate: &str,
        table: SlugTable,
        exclude_id: Option<Uuid>,
    ) -> Result<String, SlugError> {
        if candidate.trim().is_empty() {
            return Err(SlugError::EmptyCandidate);
        }

        if !self.lookup.slug_exists(table, candidate, exclude_id).await? {
            return Ok(candidate.to_string());
        }

        for n in 1..=self.max_attempts {
            let attempt = format!("{}-{}", candidate, n);
            if !self.lookup.slug_exists(table, &attempt, exclude_id).await? {
                tracing::debug!(slug = %attempt, collisions = n, "Resolved slug collision");
                return Ok(attempt);
            }
        }

        tracing::warn!(
            candidate = %candidate,
            attempts = self.max_attempts,
            "Slug collision limit reached"
        );
        Err(SlugError::CollisionExhausted {
            candidate: candidate.to_string(),
            table: table.to_string(),
            attempts: self.max_attempts,
        })
    }

    /// Build and resolve the slug for a record that is not yet persisted
    pub async fn generate_slug(
        &self,
        kind: EntityKind,
        attributes: &SlugAttributes,
        entity_id: Uuid,
    ) -> Result<String, SlugError> {
        let candidate = build_slug(kind, attributes, &entity_id.to_string())?;
        self.resolve_unique_slug(&candidate, SlugTable::for_kind(kind), None)
            .await
    }

    /// Rebuild the slug after identifying attributes changed.
    ///
    /// The record's own row is excluded so it never collides with its previous slug.
    pub async fn regenerate_slug(
        &self,
        kind: EntityKind,
        attributes: &SlugAttributes,
        entity_id: Uuid,
    ) -> Result<String, SlugError> {
        let candidate = build_slug(kind, attributes, &entity_id.to_string())?;
        self.resolve_unique_slug(&candidate, SlugTable::for_kind(kind), Some(entity_id))
            .await
    }
}
