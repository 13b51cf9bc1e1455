//! Catalog data model
//!
//! This module holds the value types produced by the crawler and consumed by the
//! downloader, and the identifier ordering used to process groups deterministically.

pub mod identifier;
mod records;

pub use identifier::{compare_names, extract_identifier, order_key, sort_names, OrderKey};
pub use records::{flatten_catalog, sort_groups, DocumentRecord, Group, LinkRecord};
