//! Script extraction
//!
//! Scripts are never executed. The scanner walks string literals (single,
//! double and template quoted) and `url(...)` wrappers and keeps the ones that
//! look like resource paths.

use crate::url::looks_like_path;
use once_cell::sync::Lazy;
use regex::Regex;

static LITERAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#""((?:[^"\\\n]|\\.)*)"|'((?:[^'\\\n]|\\.)*)'|`((?:[^`\\]|\\.)*)`|url\(\s*([^'"()\s]+)\s*\)"#,
    )
    .expect("valid regex")
});

/// Extracts path-like string literals from script source
///
/// Escaped forward slashes (`\/`) are unescaped so JSON-style paths are found.
/// Template literals containing interpolation are skipped.
pub fn extract_from_script(js: &str) -> Vec<String> {
    let mut tokens = Vec::new();

    for captures in LITERAL.captures_iter(js) {
        let Some(raw) = (1..=4).find_map(|group| captures.get(group)) else {
            continue;
        };

        let value = raw.as_str();
        if value.contains("${") {
            continue;
        }

        let value = value.replace("\\/", "/");
        if looks_like_path(&value) {
            tokens.push(value.trim().to_string());
        }
    }

    tokens
}
