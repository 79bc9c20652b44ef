use crate::url::looks_like_path;
use once_cell::sync::Lazy;
use regex::Regex;

static CANDIDATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?:url\(|['"])\s*([^'"()<>\s]+)\s*(?:\)|['"])"#).expect("valid regex")
});

/// Generic pattern scan applied to every resource regardless of its type
///
/// Finds `url(...)` tokens and quoted tokens in raw text and keeps the ones that
/// look like paths. This is what recovers references from malformed markup,
/// inline event handlers and content types without a structured extractor.
pub fn scan_for_paths(text: &str) -> Vec<String> {
    scan(text, false)
}

/// Pattern scan over markup source
///
/// Same as [`scan_for_paths`], but HTML entities in each token are decoded
/// first, so `a.png?x=1&#38;y=2` yields the URL the attribute actually holds.
pub fn scan_markup_for_paths(text: &str) -> Vec<String> {
    scan(text, true)
}

fn scan(text: &str, decode_entities: bool) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut start = 0;

    // Resume at the end of each token, not of the match, so a closing quote
    // can open the next candidate (`onclick="go='/next.html'"`).
    while let Some(captures) = CANDIDATE.captures_at(text, start) {
        let Some(token) = captures.get(1) else {
            break;
        };
        start = token.end();

        let value = if decode_entities {
            html_escape::decode_html_entities(token.as_str())
        } else {
            token.as_str().into()
        };
        let value = value.trim();
        if looks_like_path(value) {
            tokens.push(value.to_string());
        }
    }

    tokens
}
