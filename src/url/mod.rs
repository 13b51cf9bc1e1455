//! URL handling module for Statute-Harvest
//!
//! This module resolves catalog hrefs against the site base and derives the
//! storage and artifact file names used on disk.

use url::Url;

/// Parses the configured base URL, making sure its path ends in `/`
///
/// Without the trailing slash `Url::join` would drop the last path segment of the
/// base when resolving relative hrefs.
///
/// # Examples
///
/// ```
/// use statute_harvest::url::site_base;
///
/// let base = site_base("https://laws.example.org/catalog").unwrap();
/// assert_eq!(base.as_str(), "https://laws.example.org/catalog/");
/// ```
pub fn site_base(base_url: &str) -> Result<Url, url::ParseError> {
    let mut url = Url::parse(base_url)?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Resolves an href against the site base
///
/// Returns None if the link should be excluded:
/// - empty or fragment-only hrefs
/// - javascript:, mailto:, tel: and data: schemes
/// - hrefs that cannot be resolved to an http(s) URL
pub fn resolve_href(base: &Url, href: &str) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    match base.join(href) {
        Ok(absolute) if absolute.scheme() == "http" || absolute.scheme() == "https" => {
            Some(absolute.to_string())
        }
        Ok(absolute) => {
            tracing::debug!("Ignoring non-HTTP link {}", absolute);
            None
        }
        Err(e) => {
            tracing::debug!("Failed to resolve href '{}': {}", href, e);
            None
        }
    }
}

/// Removes leading `./` segments from a relative href
pub fn strip_relative_prefix(href: &str) -> &str {
    let mut href = href.trim();
    while let Some(rest) = href.strip_prefix("./") {
        href = rest;
    }
    href
}

/// Derives the storage name of a group from its page URL
///
/// The last path segment with its `.html` suffix removed, e.g.
/// `https://site/Teilliste_A.html` becomes `Teilliste_A`.
pub fn group_storage_name(url: &str) -> String {
    let without_query = url.split(['?', '#']).next().unwrap_or(url);
    let segment = without_query
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(without_query);
    let stem = segment.strip_suffix(".html").unwrap_or(segment);
    sanitize_filename(stem)
}

/// Makes a record title safe to use as a single file name
///
/// Path separators and control characters become `_`; surrounding whitespace is
/// trimmed. Returns an empty string when nothing usable remains.
pub fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    match cleaned.as_str() {
        "." | ".." => cleaned.replace('.', "_"),
        _ => cleaned,
    }
}

/// Builds the artifact file name for a record
///
/// Uses the sanitized title; falls back to the last segment of the artifact URL
/// when the title is empty.
pub fn artifact_file_name(title: &str, artifact_url: &str, extension: &str) -> String {
    let mut stem = sanitize_filename(title);
    if stem.is_empty() {
        let segment = artifact_url.rsplit('/').next().unwrap_or_default();
        let segment = segment
            .rsplit_once('.')
            .map(|(stem, _)| stem)
            .unwrap_or(segment);
        stem = sanitize_filename(segment);
    }
    if stem.is_empty() {
        stem = "untitled".to_string();
    }
    format!("{}.{}", stem, extension)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        site_base("https://www.gesetze-im-internet.de/").unwrap()
    }

    #[test]
    fn test_site_base_adds_trailing_slash() {
        let base = site_base("http://127.0.0.1:4000").unwrap();
        assert_eq!(base.as_str(), "http://127.0.0.1:4000/");

        let nested = site_base("https://example.com/catalog").unwrap();
        assert_eq!(
            resolve_href(&nested, "Teilliste_A.html").unwrap(),
            "https://example.com/catalog/Teilliste_A.html"
        );
    }

    #[test]
    fn test_resolve_relative_href() {
        assert_eq!(
            resolve_href(&base(), "bgb/index.html").unwrap(),
            "https://www.gesetze-im-internet.de/bgb/index.html"
        );
        assert_eq!(
            resolve_href(&base(), "./bgb/BGB.pdf").unwrap(),
            "https://www.gesetze-im-internet.de/bgb/BGB.pdf"
        );
    }

    #[test]
    fn test_resolve_absolute_href() {
        assert_eq!(
            resolve_href(&base(), "https://other.example/x.pdf").unwrap(),
            "https://other.example/x.pdf"
        );
    }

    #[test]
    fn test_skip_special_hrefs() {
        assert_eq!(resolve_href(&base(), ""), None);
        assert_eq!(resolve_href(&base(), "#top"), None);
        assert_eq!(resolve_href(&base(), "javascript:void(0)"), None);
        assert_eq!(resolve_href(&base(), "mailto:info@example.com"), None);
        assert_eq!(resolve_href(&base(), "ftp://example.com/file"), None);
    }

    #[test]
    fn test_strip_relative_prefix() {
        assert_eq!(strip_relative_prefix("./Teilliste_A.html"), "Teilliste_A.html");
        assert_eq!(strip_relative_prefix("././x.html"), "x.html");
        assert_eq!(strip_relative_prefix("x.html"), "x.html");
        assert_eq!(strip_relative_prefix("../x.html"), "../x.html");
    }

    #[test]
    fn test_group_storage_name() {
        assert_eq!(
            group_storage_name("https://www.gesetze-im-internet.de/Teilliste_A.html"),
            "Teilliste_A"
        );
        assert_eq!(
            group_storage_name("https://example.com/lists/Teilliste_1.html?x=1"),
            "Teilliste_1"
        );
        assert_eq!(group_storage_name("https://example.com/misc/"), "misc");
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("AO 1977"), "AO 1977");
        assert_eq!(sanitize_filename("EWG/EG-Verordnung"), "EWG_EG-Verordnung");
        assert_eq!(sanitize_filename("a\\b"), "a_b");
        assert_eq!(sanitize_filename("  padded \n"), "padded");
        assert_eq!(sanitize_filename(".."), "__");
    }

    #[test]
    fn test_artifact_file_name() {
        assert_eq!(
            artifact_file_name("BGB", "https://example.com/bgb/BGB.pdf", "pdf"),
            "BGB.pdf"
        );
        assert_eq!(
            artifact_file_name("  ", "https://example.com/bgb/BGB.pdf", "pdf"),
            "BGB.pdf"
        );
        assert_eq!(artifact_file_name("", "", "pdf"), "untitled.pdf");
    }
}
