//! Shared key generation for storage backends.
//!
//! Key format: `{category}/{owner_id|public}/{clean_name}-{unix_millis}-{8 hex}.{extension}`.
//! Uniqueness comes from the millisecond timestamp plus 32 random bits, so no
//! existence check against the backend is made before writing.

use pawprint_core::Category;

const MAX_NAME_LEN: usize = 20;
const DEFAULT_EXTENSION: &str = "jpg";
const PUBLIC_OWNER: &str = "public";

/// Generate a fresh storage key for an upload attempt.
pub fn generate_object_key(category: Category, owner_id: Option<&str>, filename: &str) -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let entropy: u32 = rand::random();
    object_key_with_entropy(category, owner_id, filename, millis, entropy)
}

/// Deterministic part of key generation, with time and randomness supplied by the caller.
pub fn object_key_with_entropy(
    category: Category,
    owner_id: Option<&str>,
    filename: &str,
    unix_millis: i64,
    entropy: u32,
) -> String {
    let (base, extension) = split_filename(filename);
    let owner = owner_id
        .map(sanitize_owner)
        .filter(|o| !o.is_empty())
        .unwrap_or_else(|| PUBLIC_OWNER.to_string());

    format!(
        "{}/{}/{}-{}-{:08x}.{}",
        category,
        owner,
        clean_name(base),
        unix_millis,
        entropy,
        extension
    )
}

/// Split a filename into (base, lowercased extension), defaulting the extension to `jpg`.
fn split_filename(filename: &str) -> (&str, String) {
    // Only the final path component counts
    let name = filename.rsplit(['/', '\\']).next().unwrap_or(filename);

    match name.rsplit_once('.') {
        Some((base, ext)) if !base.is_empty() => {
            let ext: String = ext
                .chars()
                .filter(|c| c.is_ascii_alphanumeric())
                .collect::<String>()
                .to_lowercase();
            if ext.is_empty() {
                (base, DEFAULT_EXTENSION.to_string())
            } else {
                (base, ext)
            }
        }
        _ => (name, DEFAULT_EXTENSION.to_string()),
    }
}

/// Lowercase alphanumerics and hyphens, at most 20 chars.
fn clean_name(base: &str) -> String {
    let mapped: String = base
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();

    let collapsed = mapped
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-");

    let truncated: String = collapsed.chars().take(MAX_NAME_LEN).collect();
    let trimmed = truncated.trim_matches('-');

    if trimmed.is_empty() {
        "file".to_string()
    } else {
        trimmed.to_string()
    }
}

fn sanitize_owner(owner: &str) -> String {
    owner
        .trim()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect()
}
