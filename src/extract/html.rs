//! Markup extraction
//!
//! Collects every reference-carrying attribute on every element, then recurses
//! into embedded `<style>` bodies, inline `style` attributes and embedded
//! `<script>` bodies.

use super::css::extract_from_stylesheet;
use super::script::extract_from_script;
use scraper::{Html, Selector};
use url::Url;

/// Attributes whose values are treated as resource references
pub const REFERENCE_ATTRIBUTES: &[&str] = &["src", "href", "data", "poster"];

/// Extracts raw reference tokens from an HTML document
///
/// # Arguments
///
/// * `html` - The HTML content to parse
/// * `base_url` - URL of the document, used only for logging
///
/// # Returns
///
/// The unresolved attribute values and embedded style/script tokens, in
/// document order.
///
/// # Example
///
/// ```
/// use sumi_mirror::extract::extract_from_markup;
/// use url::Url;
///
/// let base = Url::parse("https://example.com/").unwrap();
/// let tokens = extract_from_markup(r#"<img src="a.png"><style>p { background: url(b.png) }</style>"#, &base);
/// assert_eq!(tokens, vec!["a.png".to_string(), "b.png".to_string()]);
/// ```
pub fn extract_from_markup(html: &str, base_url: &Url) -> Vec<String> {
    let document = Html::parse_document(html);

    if !document.errors.is_empty() {
        tracing::warn!(
            "Markup from {} parsed with {} recoverable errors",
            base_url,
            document.errors.len()
        );
    }

    let mut tokens = Vec::new();

    tokens.extend(extract_attribute_values(&document));
    tokens.extend(extract_inline_styles(&document));
    tokens.extend(extract_embedded(&document, "style", extract_from_stylesheet));
    tokens.extend(extract_embedded(&document, "script", extract_from_script));

    tokens
}

/// Extracts the values of all reference attributes on all elements
fn extract_attribute_values(document: &Html) -> Vec<String> {
    let mut values = Vec::new();

    let Ok(all) = Selector::parse("*") else {
        return values;
    };

    for element in document.select(&all) {
        for attr in REFERENCE_ATTRIBUTES {
            if let Some(value) = element.value().attr(attr) {
                values.push(value.to_string());
            }
        }
    }

    values
}

/// Runs the stylesheet extractor over `style="..."` attributes
fn extract_inline_styles(document: &Html) -> Vec<String> {
    let Ok(styled) = Selector::parse("[style]") else {
        return Vec::new();
    };

    document
        .select(&styled)
        .filter_map(|element| element.value().attr("style"))
        .flat_map(extract_from_stylesheet)
        .collect()
}

/// Runs a text extractor over the bodies of every element named `tag`
fn extract_embedded(document: &Html, tag: &str, extractor: fn(&str) -> Vec<String>) -> Vec<String> {
    let Ok(selector) = Selector::parse(tag) else {
        return Vec::new();
    };

    document
        .select(&selector)
        .map(|element| element.text().collect::<String>())
        .filter(|body| !body.trim().is_empty())
        .flat_map(|body| extractor(&body))
        .collect()
}
