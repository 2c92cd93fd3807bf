//! HTML parser for extracting page content and links
//!
//! This module handles parsing HTML content to extract:
//! - The `<body>` markup handed to the Markdown converter
//! - Links to follow or download (from `<a href>` tags)

use scraper::{Html, Selector};
use url::Url;

/// Extracted information from an HTML page
#[derive(Debug, Clone)]
pub struct ParsedPage {
    /// Inner HTML of the `<body>` element
    pub body_html: String,

    /// All links found on the page (absolute URLs, in document order)
    pub links: Vec<Url>,
}

/// Parses HTML content and extracts the body and links
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href="...">` tags anywhere in the document, including those with
///   a `download` attribute (PDFs are often linked that way)
///
/// **Exclude:**
/// - `javascript:`, `mailto:`, `tel:` links
/// - Data URIs
/// - Fragment-only links
/// - Anything that doesn't resolve to an HTTP(S) URL
///
/// # Example
///
/// ```
/// use site_mirror::crawler::parse_html;
/// use url::Url;
///
/// let html = r#"<html><body><p>Hi</p><a href="/page">Link</a></body></html>"#;
/// let base_url = Url::parse("https://example.com/").unwrap();
/// let parsed = parse_html(html, &base_url);
/// assert_eq!(parsed.links[0].as_str(), "https://example.com/page");
/// assert!(parsed.body_html.contains("<p>Hi</p>"));
/// ```
pub fn parse_html(html: &str, base_url: &Url) -> ParsedPage {
    let document = Html::parse_document(html);

    ParsedPage {
        body_html: extract_body(&document),
        links: extract_links(&document, base_url),
    }
}

/// Returns the inner HTML of `<body>`, or the whole document if there is none
fn extract_body(document: &Html) -> String {
    Selector::parse("body")
        .ok()
        .and_then(|selector| document.select(&selector).next().map(|b| b.inner_html()))
        .unwrap_or_else(|| document.root_element().html())
}

/// Extracts all valid links from the HTML document
fn extract_links(document: &Html, base_url: &Url) -> Vec<Url> {
    let mut links = Vec::new();

    if let Ok(a_selector) = Selector::parse("a[href]") {
        for element in document.select(&a_selector) {
            if let Some(href) = element.value().attr("href") {
                if let Some(absolute_url) = resolve_link(href, base_url) {
                    links.push(absolute_url);
                }
            }
        }
    }

    links
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded.
fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lower = href.to_ascii_lowercase();
    if ["javascript:", "mailto:", "tel:", "data:"]
        .iter()
        .any(|scheme| lower.starts_with(scheme))
    {
        return None;
    }

    let absolute_url = base_url.join(href).ok()?;
    match absolute_url.scheme() {
        "http" | "https" => Some(absolute_url),
        _ => None,
    }
}
