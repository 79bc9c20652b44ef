//! Stylesheet extraction
//!
//! Only declarations whose property carries a resource reference are scanned:
//! `background`, `background-image` and `content`. Anything else written as
//! `url(...)` is left to the generic pattern scan.

use once_cell::sync::Lazy;
use regex::Regex;

static COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)/\*.*?\*/").expect("valid regex"));

static DECLARATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:^|[;{\s])(background-image|background|content)\s*:\s*([^;{}]*)")
        .expect("valid regex")
});

static URL_FUNCTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)url\(\s*['"]?([^'"()]+?)['"]?\s*\)"#).expect("valid regex")
});

/// Extracts raw `url(...)` tokens from resource-carrying declarations
///
/// Works on whole stylesheets as well as on the body of a `style` attribute.
/// Quotes around the token are stripped; the token is not resolved.
pub fn extract_from_stylesheet(css: &str) -> Vec<String> {
    let css = COMMENT.replace_all(css, " ");

    let mut tokens = Vec::new();
    for declaration in DECLARATION.captures_iter(&css) {
        let value = &declaration[2];
        for url in URL_FUNCTION.captures_iter(value) {
            let token = url[1].trim();
            if !token.is_empty() {
                tokens.push(token.to_string());
            }
        }
    }

    tokens
}
