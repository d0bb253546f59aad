//! Pawprint database layer
//!
//! Slug construction and the uniqueness resolver that disambiguates a candidate slug
//! against the records already persisted in its owning table.

pub mod slug;

pub use slug::{
    build_slug, normalize_segment, SlugError, SlugLookup, SlugRepository, SlugTable,
    UniquenessResolver,
};
