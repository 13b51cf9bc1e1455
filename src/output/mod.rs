//! Output module for terminal listings and run reports
//!
//! This module handles:
//! - Listing the persisted catalog group by group
//! - Summarizing the crawl and the download run

mod listing;
pub mod stats;

pub use listing::{format_catalog, print_catalog};
pub use stats::{
    format_crawl_summary, format_download_report, print_crawl_summary, print_download_report,
};

use crate::storage::{load_groups, Storage};
use crate::Result;

/// Prints every persisted group in catalog order
///
/// # Arguments
///
/// * `storage` - The storage holding the group files
///
/// # Returns
///
/// * `Ok(usize)` - Number of groups listed
/// * `Err(HarvestError)` - The group directory could not be read
pub fn list_catalog(storage: &dyn Storage) -> Result<usize> {
    let groups = load_groups(storage)?;
    if groups.is_empty() {
        tracing::warn!("No stored groups found; run the details stage first");
    }
    print_catalog(&groups);
    Ok(groups.len())
}
