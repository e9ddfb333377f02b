//! Slug derivation for public menu URLs.
//!
//! A slug is the path segment under `/menu/` that identifies a published
//! menu. Slugs are lowercase ASCII letters, digits, and single hyphens, with
//! no leading or trailing hyphen.

use rand::Rng;

/// Maximum slug length in bytes.
pub const MAX_SLUG_LEN: usize = 128;

/// Upper bound (inclusive) of the random collision suffix.
pub const MAX_SUFFIX: u16 = 999;

/// Convert a business name into a URL-safe slug.
///
/// Lowercases, replaces every character that is not an ASCII letter or digit
/// with a hyphen, collapses runs of hyphens, and trims hyphens from both ends.
/// `"Café Roma!!"` becomes `"caf-roma"`.
pub fn slugify(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut prev_was_hyphen = true; // skips leading hyphens
    for c in text.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_alphanumeric() {
            result.push(c);
            prev_was_hyphen = false;
        } else if !prev_was_hyphen {
            result.push('-');
            prev_was_hyphen = true;
        }
    }

    while result.ends_with('-') {
        result.pop();
    }

    if result.len() > MAX_SLUG_LEN {
        // Pure ASCII, so any byte index is a char boundary.
        let truncated = &result[..MAX_SLUG_LEN];
        return match truncated.rfind('-') {
            Some(last_hyphen) => truncated[..last_hyphen].to_string(),
            None => truncated.to_string(),
        };
    }

    result
}

/// Return `true` when `value` is a well-formed slug.
pub fn is_valid_slug(value: &str) -> bool {
    !value.is_empty()
        && value.len() <= MAX_SLUG_LEN + 4
        && !value.starts_with('-')
        && !value.ends_with('-')
        && !value.contains("--")
        && value
            .chars()
            .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-')
}

/// Append a random `-N` suffix (0 to 999) to a base slug.
pub fn with_random_suffix(base: &str) -> String {
    let n = rand::thread_rng().gen_range(0..=MAX_SUFFIX);
    format!("{base}-{n}")
}

/// Public URL for a slug under `origin`.
pub fn public_url(origin: &str, slug: &str) -> String {
    format!("{}/menu/{slug}", origin.trim_end_matches('/'))
}
