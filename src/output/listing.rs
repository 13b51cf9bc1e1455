//! Catalog listing
//!
//! Renders persisted groups as a plain-text listing: one `== <label> ==` header per
//! group followed by a numbered line per record.

use crate::catalog::Group;
use std::fmt::Write;

/// Longest description shown per record
const DESCRIPTION_WIDTH: usize = 80;

/// Formats groups as a listing
///
/// # Arguments
///
/// * `groups` - Groups in the order they should appear
///
/// # Returns
///
/// The listing text, one line per header and per record
pub fn format_catalog(groups: &[Group]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Title \t\t Description");

    for group in groups {
        let _ = writeln!(out, "== {} ==", group.label());
        for (index, record) in group.records.iter().enumerate() {
            let _ = writeln!(
                out,
                "{} - {}      {}",
                index + 1,
                record.title,
                truncate(&record.description, DESCRIPTION_WIDTH)
            );
        }
    }

    out
}

/// Prints groups as a listing to stdout
pub fn print_catalog(groups: &[Group]) {
    print!("{}", format_catalog(groups));
}

fn truncate(text: &str, width: usize) -> &str {
    match text.char_indices().nth(width) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}
