//! URL extraction for every content type the mirror understands
//!
//! Extraction is a union of two sources:
//! - a structured extractor chosen once from the declared content type
//!   ([`ContentKind`]): markup, stylesheet, script or XML
//! - a generic pattern scan over the raw text that catches what the structured
//!   pass missed (malformed markup, inline handlers, unknown types)
//!
//! Every raw token is resolved against the document's URL. Unparseable content
//! never fails extraction, it only yields fewer URLs.

mod css;
mod fallback;
mod html;
mod script;
mod xml;

pub use css::extract_from_stylesheet;
pub use fallback::{scan_for_paths, scan_markup_for_paths};
pub use html::{extract_from_markup, REFERENCE_ATTRIBUTES};
pub use script::extract_from_script;
pub use xml::extract_from_xml;

use crate::url::resolve_reference;
use std::collections::BTreeSet;
use url::Url;

/// Broad category of a fetched resource, derived from its Content-Type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentKind {
    /// HTML and XHTML documents
    Markup,
    /// CSS stylesheets
    Stylesheet,
    /// JavaScript sources
    Script,
    /// Any other XML document (sitemaps, feeds, SVG)
    StructuredXml,
    /// Everything else (images, fonts, binaries)
    Other,
}

impl ContentKind {
    /// Classifies a declared Content-Type header value
    ///
    /// Parameters after `;` are ignored and the match is case-insensitive. The
    /// most specific kind wins: `application/xhtml+xml` is markup, not XML.
    ///
    /// # Examples
    ///
    /// ```
    /// use sumi_mirror::ContentKind;
    ///
    /// assert_eq!(ContentKind::from_content_type("text/html; charset=utf-8"), ContentKind::Markup);
    /// assert_eq!(ContentKind::from_content_type("image/svg+xml"), ContentKind::StructuredXml);
    /// assert_eq!(ContentKind::from_content_type("image/png"), ContentKind::Other);
    /// ```
    pub fn from_content_type(content_type: &str) -> Self {
        let normalized = media_type(content_type);

        if normalized.contains("html") {
            Self::Markup
        } else if normalized.contains("css") {
            Self::Stylesheet
        } else if normalized.contains("javascript") || normalized.contains("ecmascript") {
            Self::Script
        } else if normalized.contains("xml") {
            Self::StructuredXml
        } else {
            Self::Other
        }
    }

    /// Returns true for documents the reference rewriter operates on
    pub fn is_markup(&self) -> bool {
        matches!(self, Self::Markup)
    }
}

/// Strips parameters from a Content-Type value and lowercases it
pub fn media_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase()
}

/// Extracts every absolute URL referenced by a resource
///
/// # Arguments
///
/// * `content` - Raw response body
/// * `base_url` - URL the body was fetched from
/// * `content_type` - Declared Content-Type header value (may be empty)
///
/// # Returns
///
/// The resolved, fragment-free HTTP(S) URLs, deduplicated and ordered.
///
/// # Example
///
/// ```
/// use sumi_mirror::extract_urls;
/// use url::Url;
///
/// let base = Url::parse("http://example.test/index.html").unwrap();
/// let urls = extract_urls(br#"<img src="a.png">"#, &base, "text/html");
/// assert!(urls.contains(&Url::parse("http://example.test/a.png").unwrap()));
/// ```
pub fn extract_urls(content: &[u8], base_url: &Url, content_type: &str) -> BTreeSet<Url> {
    let text = String::from_utf8_lossy(content);
    let kind = ContentKind::from_content_type(content_type);

    let mut tokens = match kind {
        ContentKind::Markup => extract_from_markup(&text, base_url),
        ContentKind::Stylesheet => extract_from_stylesheet(&text),
        ContentKind::Script => extract_from_script(&text),
        ContentKind::StructuredXml => extract_from_xml(&text, base_url),
        ContentKind::Other => Vec::new(),
    };
    if kind.is_markup() {
        tokens.extend(scan_markup_for_paths(&text));
    } else {
        tokens.extend(scan_for_paths(&text));
    }

    let urls: BTreeSet<Url> = tokens
        .iter()
        .filter_map(|token| resolve_reference(token, base_url))
        .collect();

    tracing::trace!(
        "Extracted {} URLs from {} ({:?})",
        urls.len(),
        base_url,
        kind
    );

    urls
}
