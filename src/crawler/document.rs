//! Page structure access
//!
//! Extractors only see the narrow [`Document`] / [`Element`] interface below, never
//! the concrete parser. Selectors are single steps: `#id`, `tag` or `tag[attr]`.
//! [`HtmlPage`] implements the interface on top of `scraper`.

use scraper::{ElementRef, Html, Selector};

/// An element of a parsed page
pub trait Element: Sized {
    /// First descendant matching the selector
    fn find(&self, selector: &str) -> Option<Self>;

    /// All descendants matching the selector, in document order
    fn find_all(&self, selector: &str) -> Vec<Self>;

    /// Attribute value, if present
    fn attr(&self, name: &str) -> Option<String>;

    /// Concatenated text content
    fn text(&self) -> String;

    /// Lowercase tag name
    fn tag_name(&self) -> String;
}

/// A parsed page
pub trait Document {
    type Element<'a>: Element
    where
        Self: 'a;

    /// First element in the page matching the selector
    fn find(&self, selector: &str) -> Option<Self::Element<'_>>;

    /// All elements in the page matching the selector, in document order
    fn find_all(&self, selector: &str) -> Vec<Self::Element<'_>>;
}

/// An HTML page parsed with `scraper`
///
/// `scraper::Html` is not `Send`; parse and extract without holding the page
/// across an `.await`.
pub struct HtmlPage {
    html: Html,
}

impl HtmlPage {
    pub fn parse(body: &str) -> Self {
        Self {
            html: Html::parse_document(body),
        }
    }
}

impl Document for HtmlPage {
    type Element<'a> = HtmlElement<'a>;

    fn find(&self, selector: &str) -> Option<HtmlElement<'_>> {
        let selector = compile(selector)?;
        self.html.select(&selector).next().map(HtmlElement)
    }

    fn find_all(&self, selector: &str) -> Vec<HtmlElement<'_>> {
        match compile(selector) {
            Some(selector) => self.html.select(&selector).map(HtmlElement).collect(),
            None => Vec::new(),
        }
    }
}

/// An element of an [`HtmlPage`]
#[derive(Debug, Clone, Copy)]
pub struct HtmlElement<'a>(ElementRef<'a>);

impl<'a> Element for HtmlElement<'a> {
    fn find(&self, selector: &str) -> Option<Self> {
        let selector = compile(selector)?;
        self.0
            .select(&selector)
            .find(|el| el.id() != self.0.id())
            .map(HtmlElement)
    }

    fn find_all(&self, selector: &str) -> Vec<Self> {
        match compile(selector) {
            Some(selector) => self
                .0
                .select(&selector)
                .filter(|el| el.id() != self.0.id())
                .map(HtmlElement)
                .collect(),
            None => Vec::new(),
        }
    }

    fn attr(&self, name: &str) -> Option<String> {
        self.0.value().attr(name).map(str::to_string)
    }

    fn text(&self) -> String {
        self.0.text().collect()
    }

    fn tag_name(&self) -> String {
        self.0.value().name().to_ascii_lowercase()
    }
}

fn compile(selector: &str) -> Option<Selector> {
    match Selector::parse(selector) {
        Ok(selector) => Some(selector),
        Err(e) => {
            tracing::debug!("Invalid selector '{}': {:?}", selector, e);
            None
        }
    }
}

/// Walks a container path, one `find` per step
///
/// Returns the selector of the first missing step on failure.
pub fn walk_container<'d, D: Document>(
    document: &'d D,
    path: &[String],
) -> Result<D::Element<'d>, String> {
    let (first, rest) = path.split_first().ok_or_else(String::new)?;
    let mut current = document.find(first).ok_or_else(|| first.clone())?;
    for step in rest {
        current = current.find(step).ok_or_else(|| step.clone())?;
    }
    Ok(current)
}
