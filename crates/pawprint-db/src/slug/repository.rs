use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use super::resolver::{SlugLookup, SlugTable};
use super::SlugError;

/// PostgreSQL slug lookup. Every slug-bearing table has `id UUID` and `slug TEXT`.
#[derive(Clone)]
pub struct SlugRepository {
    pool: PgPool,
}

impl SlugRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl SlugLookup for SlugRepository {
    #[tracing::instrument(skip(self), fields(db.table = %table, db.operation = "select"))]
    async fn slug_exists(
        &self,
        table: SlugTable,
        slug: &str,
        exclude_id: Option<Uuid>,
    ) -> Result<bool, SlugError> {
        // Table names come from the closed SlugTable set, never from input
        let query = format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE slug = $1 AND ($2::uuid IS NULL OR id <> $2))",
            table.as_str()
        );

        sqlx::query_scalar::<Postgres, bool>(&query)
            .bind(slug)
            .bind(exclude_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Slug probe failed");
                SlugError::ProbeFailed {
                    table: table.to_string(),
                    message: e.to_string(),
                }
            })
    }
}
