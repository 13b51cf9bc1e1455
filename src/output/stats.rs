//! Run statistics
//!
//! Formats the crawl summary and the download report for the terminal.

use crate::crawler::CrawlSummary;
use crate::download::DownloadReport;
use std::fmt::Write;

/// Formats the outcome of the details stage
pub fn format_crawl_summary(summary: &CrawlSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== Crawl Summary ===\n");
    let _ = writeln!(
        out,
        "  Groups: {} of {} fetched",
        summary.groups_succeeded, summary.groups_attempted
    );
    let _ = writeln!(out, "  Records: {}", summary.records_found);
    let _ = writeln!(out, "  With artifact link: {}", summary.artifacts_linked);

    if !summary.failed_groups.is_empty() {
        let _ = writeln!(out, "\nFailed Groups ({}):", summary.groups_failed());
        for name in &summary.failed_groups {
            let _ = writeln!(out, "  - {}", name);
        }
    }

    out
}

/// Prints the crawl summary to stdout
pub fn print_crawl_summary(summary: &CrawlSummary) {
    println!("{}", format_crawl_summary(summary));
}

/// Formats a download report
///
/// # Arguments
///
/// * `report` - The report returned by the downloader
///
/// # Returns
///
/// Totals, a line per group, and every permanent failure with its URL
pub fn format_download_report(report: &DownloadReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== Download Report ===\n");
    let _ = writeln!(out, "  Saved: {}", report.total_succeeded());
    let _ = writeln!(out, "  Failed: {}", report.total_failed());
    let _ = writeln!(out, "  Without artifact: {}", report.total_skipped());
    let _ = writeln!(out, "  Groups: {}", report.groups.len());

    if !report.groups.is_empty() {
        let _ = writeln!(out, "\nBy Group:");
        for group in &report.groups {
            let _ = writeln!(
                out,
                "  {}: {} saved, {} failed, {} skipped",
                group.label,
                group.succeeded,
                group.failed(),
                group.skipped
            );
        }
    }

    if !report.is_clean() {
        let _ = writeln!(out, "\nFailures ({}):", report.total_failed());
        for failure in report.failures() {
            let _ = writeln!(
                out,
                "  - {} -> {} ({} attempt(s)): {}",
                failure.source_url,
                failure.destination.display(),
                failure.attempts,
                failure.reason
            );
        }
    }

    out
}

/// Prints a download report to stdout
pub fn print_download_report(report: &DownloadReport) {
    println!("{}", format_download_report(report));
}
