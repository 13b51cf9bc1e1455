//! Crawler module for catalog page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - The transport seam and HTTP fetching
//! - The document capability interface over parsed HTML
//! - Link and record extraction
//! - Overall stage coordination

mod coordinator;
pub mod document;
mod fetcher;
mod parser;

pub use coordinator::{run_harvest, CrawlSummary, HarvestOutcome, Harvester, Stage};
pub use document::{Document, Element, HtmlPage};
pub use fetcher::{
    build_http_client, decode_body, fetch_document, fetch_text, FetchError, HttpResponse,
    HttpTransport, Transport, TransportError, TransportErrorKind,
};
pub use parser::{extract_detail_records, extract_links};

use crate::config::Config;
use crate::Result;

/// Runs a complete harvest
///
/// This is the main entry point for a harvest. It will:
/// 1. Extract the index links from the site root
/// 2. Extract the group links
/// 3. Fetch every group page and build the catalog
/// 4. Download the linked artifacts
///
/// # Arguments
///
/// * `config` - The harvester configuration
///
/// # Returns
///
/// * `Ok(HarvestOutcome)` - Crawl summary and download report
/// * `Err(HarvestError)` - A fatal stage failure
pub async fn harvest(config: Config) -> Result<HarvestOutcome> {
    run_harvest(config).await
}
