use crate::UrlError;
use url::Url;

/// Schemes that never point at a downloadable resource
const SKIPPED_SCHEMES: &[&str] = &["javascript:", "mailto:", "tel:", "data:"];

/// Parses and validates the seed URL of a crawl
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed or relative
/// 2. Require an HTTP or HTTPS scheme
/// 3. Require a host
/// 4. Remove the fragment (fragments never affect file identity)
///
/// # Examples
///
/// ```
/// use sumi_mirror::url::normalize_seed;
///
/// let url = normalize_seed("http://example.test/index.html#top").unwrap();
/// assert_eq!(url.as_str(), "http://example.test/index.html");
/// ```
pub fn normalize_seed(url_str: &str) -> Result<Url, UrlError> {
    let mut url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingHost);
    }

    url.set_fragment(None);
    Ok(url)
}

/// Resolves a raw reference against a base URL
///
/// Returns None if the reference should be ignored:
/// - empty or fragment-only references
/// - javascript:, mailto:, tel: and data: references
/// - references that do not resolve to an HTTP(S) URL
///
/// The fragment of the resolved URL is always stripped.
pub fn resolve_reference(raw: &str, base: &Url) -> Option<Url> {
    let raw = raw.trim();

    if raw.is_empty() || raw.starts_with('#') {
        return None;
    }

    let lowered = raw.to_ascii_lowercase();
    if SKIPPED_SCHEMES.iter().any(|scheme| lowered.starts_with(scheme)) {
        return None;
    }

    let mut resolved = base.join(raw).ok()?;
    if resolved.scheme() != "http" && resolved.scheme() != "https" {
        return None;
    }
    if resolved.host_str().is_none() {
        return None;
    }

    resolved.set_fragment(None);
    Some(resolved)
}

/// Returns true if a bare token found by pattern scanning resembles a path
///
/// A token qualifies when it has no whitespace, is not one of the skipped
/// schemes, and either looks explicitly like a location (`/x`, `./x`, `../x`,
/// `//host/x`, `http(s)://...`) or its last path segment carries a short
/// alphanumeric file extension.
pub fn looks_like_path(token: &str) -> bool {
    let token = token.trim();

    if token.is_empty() || token.len() > 2048 {
        return false;
    }
    if token.chars().any(|c| c.is_whitespace() || c == '<' || c == '>' || c == '\\') {
        return false;
    }

    let lowered = token.to_ascii_lowercase();
    if SKIPPED_SCHEMES.iter().any(|scheme| lowered.starts_with(scheme)) || token.starts_with('#') {
        return false;
    }

    if token.starts_with('/')
        || token.starts_with("./")
        || token.starts_with("../")
        || lowered.starts_with("http://")
        || lowered.starts_with("https://")
    {
        return true;
    }

    has_file_extension(token)
}

/// Checks whether the last path segment ends in a 2-5 character extension
fn has_file_extension(token: &str) -> bool {
    let path = token.split(['?', '#']).next().unwrap_or("");
    let segment = path.rsplit('/').next().unwrap_or("");

    match segment.rsplit_once('.') {
        Some((stem, ext)) => {
            !stem.is_empty()
                && (2..=5).contains(&ext.len())
                && ext.chars().all(|c| c.is_ascii_alphanumeric())
                && ext.chars().any(|c| c.is_ascii_alphabetic())
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_url() -> Url {
        Url::parse("https://example.com/docs/page.html").unwrap()
    }

    #[test]
    fn test_normalize_seed_strips_fragment() {
        let result = normalize_seed("https://example.com/page#section").unwrap();
        assert_eq!(result.as_str(), "https://example.com/page");
    }

    #[test]
    fn test_normalize_seed_invalid_scheme() {
        let result = normalize_seed("ftp://example.com/page");
        assert!(matches!(result.unwrap_err(), UrlError::InvalidScheme(_)));
    }

    #[test]
    fn test_normalize_seed_relative_rejected() {
        assert!(matches!(
            normalize_seed("/index.html").unwrap_err(),
            UrlError::Parse(_)
        ));
    }

    #[test]
    fn test_normalize_seed_empty_path_becomes_root() {
        let result = normalize_seed("http://example.test").unwrap();
        assert_eq!(result.as_str(), "http://example.test/");
    }

    #[test]
    fn test_resolve_relative_path() {
        let url = resolve_reference("img/a.png", &base_url()).unwrap();
        assert_eq!(url.as_str(), "https://example.com/docs/img/a.png");
    }

    #[test]
    fn test_resolve_absolute_path() {
        let url = resolve_reference("/style.css", &base_url()).unwrap();
        assert_eq!(url.as_str(), "https://example.com/style.css");
    }

    #[test]
    fn test_resolve_protocol_relative() {
        let url = resolve_reference("//cdn.example.net/lib.js", &base_url()).unwrap();
        assert_eq!(url.as_str(), "https://cdn.example.net/lib.js");
    }

    #[test]
    fn test_resolve_strips_fragment() {
        let url = resolve_reference("other.html#part", &base_url()).unwrap();
        assert_eq!(url.as_str(), "https://example.com/docs/other.html");
    }

    #[test]
    fn test_resolve_skips_special_schemes() {
        for raw in [
            "javascript:void(0)",
            "mailto:a@example.com",
            "tel:+123",
            "data:image/png;base64,AAAA",
            "JavaScript:alert(1)",
        ] {
            assert!(resolve_reference(raw, &base_url()).is_none(), "{}", raw);
        }
    }

    #[test]
    fn test_resolve_skips_fragment_only_and_empty() {
        assert!(resolve_reference("#top", &base_url()).is_none());
        assert!(resolve_reference("   ", &base_url()).is_none());
    }

    #[test]
    fn test_resolve_skips_non_http() {
        assert!(resolve_reference("ftp://example.com/file.txt", &base_url()).is_none());
    }

    #[test]
    fn test_looks_like_path_accepts_locations() {
        assert!(looks_like_path("/assets/app.js"));
        assert!(looks_like_path("./img/logo"));
        assert!(looks_like_path("../up"));
        assert!(looks_like_path("https://example.com/x"));
        assert!(looks_like_path("bg.png"));
        assert!(looks_like_path("fonts/icons.woff2?v=3"));
    }

    #[test]
    fn test_looks_like_path_rejects_prose() {
        assert!(!looks_like_path("hello world"));
        assert!(!looks_like_path("text/html"));
        assert!(!looks_like_path("utf-8"));
        assert!(!looks_like_path("1.5"));
        assert!(!looks_like_path("#anchor"));
        assert!(!looks_like_path("mailto:someone@example.com"));
        assert!(!looks_like_path(""));
    }
}
