//! URL slug generation utilities.
//!
//! Converts display names into URL-safe slugs and resolves collisions against
//! the set of slugs already in use. Both functions are pure: uniqueness is
//! decided entirely by the caller-provided slug set.

use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

static NON_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w-]").unwrap());
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static REPEATED_HYPHENS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-{2,}").unwrap());

/// Converts a display name into a URL-safe slug.
///
/// Lowercases, trims, collapses whitespace runs into single hyphens, strips
/// everything that is not a word character or hyphen, collapses repeated
/// hyphens, and trims leading/trailing hyphens.
///
/// # Examples
///
/// ```
/// use course_categories::utils::slug::slugify;
///
/// assert_eq!(slugify("Web Development"), "web-development");
/// assert_eq!(slugify("  C++ & Rust!  "), "c-rust");
/// ```
pub fn slugify(name: &str) -> String {
    let lowered = name.trim().to_lowercase();
    let hyphenated = WHITESPACE.replace_all(&lowered, "-");
    let stripped = NON_WORD.replace_all(&hyphenated, "");
    let collapsed = REPEATED_HYPHENS.replace_all(&stripped, "-");

    collapsed.trim_matches('-').to_string()
}

/// Resolves a base slug against the set of slugs already in use.
///
/// Returns `base` unchanged when it is free; otherwise appends `-1`, `-2`, …
/// until an unused slug is found.
pub fn uniquify(base: &str, existing: &HashSet<String>) -> String {
    if !existing.contains(base) {
        return base.to_string();
    }

    let mut counter = 1;
    loop {
        let candidate = format!("{}-{}", base, counter);
        if !existing.contains(&candidate) {
            return candidate;
        }
        counter += 1;
    }
}
