use pawprint_core::{EntityKind, SlugAttributes};

use super::normalize::normalize_segment;
use super::SlugError;

/// Number of id characters appended to every slug
const ID_PREFIX_LEN: usize = 5;

/// Compose the candidate slug for an entity.
///
/// Segments, in order and skipping empty ones: name, type, city, state, date and a
/// short prefix of the entity id. Events carry the full `YYYY-MM-DD` date, every
/// other kind only the year. The function is pure.
pub fn build_slug(
    kind: EntityKind,
    attributes: &SlugAttributes,
    entity_id: &str,
) -> Result<String, SlugError> {
    let date = attributes.date.map(|date| match kind {
        EntityKind::Event => date.format("%Y-%m-%d").to_string(),
        EntityKind::Pet | EntityKind::Ong | EntityKind::Partner => {
            date.format("%Y").to_string()
        }
    });

    let segments = [
        attributes.name.as_deref(),
        attributes.kind.as_deref(),
        attributes.city.as_deref(),
        attributes.state.as_deref(),
        date.as_deref(),
    ];

    let mut parts: Vec<String> = segments
        .into_iter()
        .flatten()
        .map(normalize_segment)
        .filter(|s| !s.is_empty())
        .collect();

    if parts.is_empty() {
        return Err(SlugError::EmptyCandidate);
    }

    let id_prefix = id_prefix(entity_id);
    if !id_prefix.is_empty() {
        parts.push(id_prefix);
    }

    Ok(parts.join("-"))
}

fn id_prefix(entity_id: &str) -> String {
    entity_id
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .take(ID_PREFIX_LEN)
        .collect::<String>()
        .to_ascii_lowercase()
}
