use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Normalize free text into a slug segment.
///
/// Decomposes, strips diacritics, lowercases, drops everything outside `[a-z0-9 -]`,
/// turns whitespace into hyphens and collapses/trims hyphens.
/// `normalize_segment(normalize_segment(s)) == normalize_segment(s)`.
pub fn normalize_segment(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());

    let chars = input
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase);

    for c in chars {
        let c = if c.is_whitespace() { '-' } else { c };
        match c {
            'a'..='z' | '0'..='9' => slug.push(c),
            '-' if !slug.is_empty() && !slug.ends_with('-') => slug.push('-'),
            _ => {}
        }
    }

    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}
