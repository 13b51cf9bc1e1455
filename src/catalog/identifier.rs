//! Group identifiers and their ordering
//!
//! Group files are named after the catalog page they came from, e.g.
//! `Teilliste_A.json` or `Teilliste_1.json`. The trailing letter or number is the
//! group identifier; letters sort before numbers, numbers sort by value, and names
//! without an identifier sort last.

use regex::Regex;
use std::cmp::Ordering;
use std::sync::LazyLock;

static IDENTIFIER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"_(\d+|[A-Za-z])\.json$").expect("identifier pattern is a valid regex")
});

/// Sort key for a group storage name
///
/// Variant order is the rank: alphabetic identifiers first, numeric identifiers
/// second, unmatched names last.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OrderKey {
    /// Single-letter identifier, ordered lexicographically
    Alphabetic(String),

    /// Numeric identifier, ordered by value
    Numeric(u128),

    /// No identifier could be extracted
    Unmatched,
}

/// Extracts the group identifier from a storage file name
///
/// Returns `None` for names that do not end in `_<letter>.json` or `_<digits>.json`.
///
/// # Examples
///
/// ```
/// use statute_harvest::catalog::extract_identifier;
///
/// assert_eq!(extract_identifier("Teilliste_A.json"), Some("A".to_string()));
/// assert_eq!(extract_identifier("Teilliste_12.json"), Some("12".to_string()));
/// assert_eq!(extract_identifier("full_laws_list.json"), None);
/// ```
pub fn extract_identifier(name: &str) -> Option<String> {
    IDENTIFIER_PATTERN
        .captures(name)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Computes the ordering key for a storage file name
pub fn order_key(name: &str) -> OrderKey {
    match extract_identifier(name) {
        Some(id) if id.chars().all(|c| c.is_ascii_alphabetic()) => OrderKey::Alphabetic(id),
        Some(id) => match id.parse::<u128>() {
            Ok(value) => OrderKey::Numeric(value),
            Err(_) => {
                tracing::trace!("Identifier '{}' in '{}' is out of range", id, name);
                OrderKey::Unmatched
            }
        },
        None => OrderKey::Unmatched,
    }
}

/// Compares two storage names by identifier, falling back to the name itself
pub fn compare_names(a: &str, b: &str) -> Ordering {
    order_key(a).cmp(&order_key(b)).then_with(|| a.cmp(b))
}

/// Sorts storage names in catalog order
pub fn sort_names(names: &mut [String]) {
    names.sort_by(|a, b| compare_names(a, b));
}
