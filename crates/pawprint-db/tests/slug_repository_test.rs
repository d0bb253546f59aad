//! SlugRepository against a real PostgreSQL container.
//!
//! Skipped when no Docker daemon is reachable.

use std::sync::Arc;

use pawprint_db::{SlugLookup, SlugRepository, SlugTable, UniquenessResolver};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use testcontainers::runners::AsyncRunner;
use testcontainers::ContainerAsync;
use testcontainers_modules::postgres::Postgres;
use uuid::Uuid;

const REX_SLUG: &str = "rex-lost-sao-paulo-sp-2024-a1b2c";

struct TestDatabase {
    pool: PgPool,
    _container: ContainerAsync<Postgres>,
}

async fn setup_database() -> Option<TestDatabase> {
    let container = match Postgres::default().start().await {
        Ok(container) => container,
        Err(e) => {
            eprintln!("Skipping PostgreSQL test, container unavailable: {}", e);
            return None;
        }
    };

    let host = container.get_host().await.expect("container host");
    let port = container
        .get_host_port_ipv4(5432)
        .await
        .expect("container port");
    let url = format!("postgresql://postgres:postgres@{}:{}/postgres", host, port);

    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&url)
        .await
        .expect("connect to test database");

    for table in ["pets", "ongs", "events", "partners"] {
        sqlx::query(&format!(
            "CREATE TABLE {} (id UUID PRIMARY KEY, slug TEXT NOT NULL UNIQUE)",
            table
        ))
        .execute(&pool)
        .await
        .expect("create table");
    }

    Some(TestDatabase {
        pool,
        _container: container,
    })
}

async fn insert(pool: &PgPool, table: SlugTable, id: Uuid, slug: &str) {
    sqlx::query(&format!("INSERT INTO {} (id, slug) VALUES ($1, $2)", table))
        .bind(id)
        .bind(slug)
        .execute(pool)
        .await
        .expect("insert row");
}

#[tokio::test]
async fn test_existing_slug_resolves_to_first_suffix() {
    let Some(db) = setup_database().await else {
        return;
    };
    insert(&db.pool, SlugTable::Pets, Uuid::new_v4(), REX_SLUG).await;

    let resolver = UniquenessResolver::new(Arc::new(SlugRepository::new(db.pool.clone())));
    let slug = resolver
        .resolve_unique_slug(REX_SLUG, SlugTable::Pets, None)
        .await
        .unwrap();

    assert_eq!(slug, format!("{}-1", REX_SLUG));
}

#[tokio::test]
async fn test_suffixes_skip_taken_numbers() {
    let Some(db) = setup_database().await else {
        return;
    };
    insert(&db.pool, SlugTable::Pets, Uuid::new_v4(), REX_SLUG).await;
    insert(&db.pool, SlugTable::Pets, Uuid::new_v4(), &format!("{}-1", REX_SLUG)).await;

    let resolver = UniquenessResolver::new(Arc::new(SlugRepository::new(db.pool.clone())));
    let slug = resolver
        .resolve_unique_slug(REX_SLUG, SlugTable::Pets, None)
        .await
        .unwrap();

    assert_eq!(slug, format!("{}-2", REX_SLUG));
}

#[tokio::test]
async fn test_own_row_is_excluded() {
    let Some(db) = setup_database().await else {
        return;
    };
    let rex_id = Uuid::new_v4();
    insert(&db.pool, SlugTable::Pets, rex_id, REX_SLUG).await;

    let repository = SlugRepository::new(db.pool.clone());
    assert!(repository
        .slug_exists(SlugTable::Pets, REX_SLUG, None)
        .await
        .unwrap());
    assert!(!repository
        .slug_exists(SlugTable::Pets, REX_SLUG, Some(rex_id))
        .await
        .unwrap());
    assert!(repository
        .slug_exists(SlugTable::Pets, REX_SLUG, Some(Uuid::new_v4()))
        .await
        .unwrap());

    let resolver = UniquenessResolver::new(Arc::new(repository));
    let slug = resolver
        .resolve_unique_slug(REX_SLUG, SlugTable::Pets, Some(rex_id))
        .await
        .unwrap();
    assert_eq!(slug, REX_SLUG);
}

#[tokio::test]
async fn test_tables_are_checked_independently() {
    let Some(db) = setup_database().await else {
        return;
    };
    insert(&db.pool, SlugTable::Pets, Uuid::new_v4(), "sunset-fair-2024-abcde").await;

    let repository = SlugRepository::new(db.pool.clone());
    assert!(!repository
        .slug_exists(SlugTable::Events, "sunset-fair-2024-abcde", None)
        .await
        .unwrap());

    let resolver = UniquenessResolver::new(Arc::new(repository));
    let slug = resolver
        .resolve_unique_slug("sunset-fair-2024-abcde", SlugTable::Events, None)
        .await
        .unwrap();
    assert_eq!(slug, "sunset-fair-2024-abcde");
}

#[tokio::test]
async fn test_missing_table_is_reported_as_lookup_failure() {
    let Some(db) = setup_database().await else {
        return;
    };
    sqlx::query("DROP TABLE partners")
        .execute(&db.pool)
        .await
        .expect("drop table");

    let repository = SlugRepository::new(db.pool.clone());
    let err = repository
        .slug_exists(SlugTable::Partners, "acme-pet-shop-abcde", None)
        .await
        .unwrap_err();

    assert!(err.is_retryable());
}
