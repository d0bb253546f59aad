mod helpers;

use std::sync::Arc;

use chrono::NaiveDate;
use helpers::InMemorySlugLookup;
use pawprint_core::{EntityKind, SlugAttributes};
use pawprint_db::{build_slug, SlugError, SlugTable, UniquenessResolver};
use uuid::Uuid;

const REX_ID: &str = "a1b2c3d4-0000-4000-8000-000000000001";

fn rex() -> SlugAttributes {
    SlugAttributes::named("Rex")
        .with_kind("lost")
        .with_location("São Paulo", "SP")
        .with_date(NaiveDate::from_ymd_opt(2024, 5, 17).unwrap())
}

fn setup() -> (UniquenessResolver, Arc<InMemorySlugLookup>) {
    let lookup = Arc::new(InMemorySlugLookup::default());
    (UniquenessResolver::new(lookup.clone()), lookup)
}

#[test]
fn test_lost_pet_candidate() {
    let slug = build_slug(EntityKind::Pet, &rex(), REX_ID).unwrap();
    assert_eq!(slug, "rex-lost-sao-paulo-sp-2024-a1b2c");
}

#[tokio::test]
async fn test_colliding_slug_gets_numeric_suffix() {
    let (resolver, lookup) = setup();
    lookup.insert(SlugTable::Pets, Uuid::new_v4(), "rex-lost-sao-paulo-sp-2024-a1b2c");

    let slug = resolver
        .resolve_unique_slug("rex-lost-sao-paulo-sp-2024-a1b2c", SlugTable::Pets, None)
        .await
        .unwrap();

    assert_eq!(slug, "rex-lost-sao-paulo-sp-2024-a1b2c-1");
    assert_eq!(lookup.probes(), 2);
}

#[tokio::test]
async fn test_uniqueness_is_per_table() {
    let (resolver, lookup) = setup();
    lookup.insert(SlugTable::Events, Uuid::new_v4(), "patas-unidas");

    let slug = resolver
        .resolve_unique_slug("patas-unidas", SlugTable::Ongs, None)
        .await
        .unwrap();
    assert_eq!(slug, "patas-unidas");
}

#[tokio::test]
async fn test_regenerate_keeps_own_slug() {
    let (resolver, lookup) = setup();
    let id = Uuid::parse_str(REX_ID).unwrap();
    lookup.insert(SlugTable::Pets, id, "rex-lost-sao-paulo-sp-2024-a1b2c");

    let slug = resolver
        .regenerate_slug(EntityKind::Pet, &rex(), id)
        .await
        .unwrap();
    assert_eq!(slug, "rex-lost-sao-paulo-sp-2024-a1b2c");

    // A different record may not take it
    let fresh = resolver
        .generate_slug(EntityKind::Pet, &rex(), id)
        .await
        .unwrap();
    assert_eq!(fresh, "rex-lost-sao-paulo-sp-2024-a1b2c-1");
}

#[tokio::test]
async fn test_regenerate_after_rename() {
    let (resolver, lookup) = setup();
    let id = Uuid::parse_str(REX_ID).unwrap();
    lookup.insert(SlugTable::Pets, id, "rex-lost-sao-paulo-sp-2024-a1b2c");
    lookup.insert(SlugTable::Pets, Uuid::new_v4(), "rex-found-sao-paulo-sp-2024-a1b2c");

    let found = rex().with_kind("found");
    let slug = resolver
        .regenerate_slug(EntityKind::Pet, &found, id)
        .await
        .unwrap();
    assert_eq!(slug, "rex-found-sao-paulo-sp-2024-a1b2c-1");
}

#[tokio::test]
async fn test_exhaustion_is_reported() {
    let (resolver, lookup) = setup();
    let resolver = resolver.with_max_attempts(3);
    for slug in ["luna", "luna-1", "luna-2", "luna-3"] {
        lookup.insert(SlugTable::Pets, Uuid::new_v4(), slug);
    }

    let err = resolver
        .resolve_unique_slug("luna", SlugTable::Pets, None)
        .await
        .unwrap_err();

    assert!(matches!(err, SlugError::CollisionExhausted { attempts: 3, .. }));
    assert_eq!(lookup.probes(), 4);
}

#[tokio::test]
async fn test_probe_failure_is_not_treated_as_free() {
    let (resolver, lookup) = setup();
    lookup.fail_probes(true);

    let err = resolver
        .resolve_unique_slug("luna", SlugTable::Pets, None)
        .await
        .unwrap_err();
    assert!(err.is_retryable());
    assert_eq!(err.error_code(), "SLUG_PROBE_FAILED");

    lookup.fail_probes(false);
    let slug = resolver
        .resolve_unique_slug("luna", SlugTable::Pets, None)
        .await
        .unwrap();
    assert_eq!(slug, "luna");
}

#[tokio::test]
async fn test_concurrent_resolutions_are_independent() {
    let (resolver, lookup) = setup();
    lookup.insert(SlugTable::Events, Uuid::new_v4(), "feira");

    let candidates = ["feira", "bazar", "feira"];
    let results = futures::future::join_all(
        candidates
            .iter()
            .map(|c| resolver.resolve_unique_slug(c, SlugTable::Events, None)),
    )
    .await;

    let slugs: Vec<String> = results.into_iter().map(Result::unwrap).collect();
    assert_eq!(slugs, vec!["feira-1", "bazar", "feira-1"]);
}
