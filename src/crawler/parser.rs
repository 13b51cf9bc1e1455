//! Record extraction from catalog pages
//!
//! Two extractors work on any [`Document`]:
//! - [`extract_links`] collects raw `{text, href}` links from a container; hrefs are
//!   left exactly as they appear on the page
//! - [`extract_detail_records`] turns the entries of a group page into
//!   [`DocumentRecord`]s with absolute links

use crate::catalog::{DocumentRecord, LinkRecord};
use crate::config::SiteConfig;
use crate::crawler::document::{walk_container, Document, Element};
use crate::url::resolve_href;
use crate::HarvestError;
use url::Url;

/// Extracts navigational links from a container
///
/// Each item matching `item_selector` contributes its first anchor (or itself, when
/// the item is an anchor). Anchors without an `href` are skipped.
///
/// # Arguments
///
/// * `document` - The parsed page
/// * `page_url` - URL of the page, for error reporting
/// * `container` - Container path walked from the document root
/// * `item_selector` - Selector for the items inside the container
///
/// # Returns
///
/// * `Ok(Vec<LinkRecord>)` - Links in page order
/// * `Err(HarvestError::StructureNotFound)` - A container step is missing
pub fn extract_links<D: Document>(
    document: &D,
    page_url: &str,
    container: &[String],
    item_selector: &str,
) -> Result<Vec<LinkRecord>, HarvestError> {
    let root = locate(document, page_url, container)?;

    let links: Vec<LinkRecord> = root
        .find_all(item_selector)
        .into_iter()
        .filter_map(|item| {
            let anchor = match item.tag_name().as_str() {
                "a" => item,
                _ => item.find("a")?,
            };
            let href = anchor.attr("href")?;
            Some(LinkRecord::new(anchor.text().trim(), href))
        })
        .collect();

    tracing::debug!("Extracted {} links from {}", links.len(), page_url);
    Ok(links)
}

/// Extracts one record per entry of a group page
///
/// For every item:
/// - the first anchor with an `href` gives the webpage link and the title;
///   items without one are skipped
/// - the annotation element's `title` gives the description (empty if absent)
/// - a later anchor whose `title` contains the artifact marker gives the PDF link
///
/// All links are resolved against `base`.
pub fn extract_detail_records<D: Document>(
    document: &D,
    page_url: &str,
    base: &Url,
    site: &SiteConfig,
) -> Result<Vec<DocumentRecord>, HarvestError> {
    let root = locate(document, page_url, &site.detail_container)?;

    let mut records = Vec::new();
    for item in root.find_all(&site.detail_item) {
        if let Some(record) = extract_record(&item, base, site) {
            records.push(record);
        }
    }

    tracing::debug!("Extracted {} records from {}", records.len(), page_url);
    Ok(records)
}

fn extract_record<E: Element>(item: &E, base: &Url, site: &SiteConfig) -> Option<DocumentRecord> {
    let primary = item.find("a[href]")?;
    let href = primary.attr("href")?;

    let Some(webpage_link) = resolve_href(base, &href) else {
        tracing::debug!("Skipping entry with unusable href '{}'", href);
        return None;
    };

    let description = primary
        .find(&site.annotation_tag)
        .or_else(|| item.find(&site.annotation_tag))
        .and_then(|annotation| annotation.attr("title"))
        .unwrap_or_default();

    let pdf_link = item
        .find_all("a[href]")
        .into_iter()
        .skip(1)
        .find(|anchor| {
            anchor
                .attr("title")
                .is_some_and(|title| title.contains(&site.artifact_marker))
        })
        .and_then(|anchor| anchor.attr("href"))
        .and_then(|href| resolve_href(base, &href));

    Some(DocumentRecord {
        webpage_link,
        title: primary.text().trim().to_string(),
        description,
        pdf_link,
    })
}

fn locate<'d, D: Document>(
    document: &'d D,
    page_url: &str,
    container: &[String],
) -> Result<D::Element<'d>, HarvestError> {
    walk_container(document, container).map_err(|selector| HarvestError::StructureNotFound {
        url: page_url.to_string(),
        selector,
    })
}
