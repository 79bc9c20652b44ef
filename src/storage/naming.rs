use sha2::{Digest, Sha256};
use url::Url;

/// Basename used when a URL path has no last segment
pub const DEFAULT_BASENAME: &str = "index.html";

/// Longest basename kept in a file name
const MAX_BASENAME_LEN: usize = 100;

/// Derives the local file name of a fetched resource
///
/// The name is `{sha256(content)}_{basename}`, where the basename is the last
/// segment of the URL path (or `index.html`). It depends only on the bytes and
/// the URL, never on time, so the same content fetched from the same path always
/// lands in the same file. The hash dominates uniqueness: different bytes never
/// share a name in practice.
///
/// # Examples
///
/// ```
/// use sumi_mirror::storage::file_name_for;
/// use url::Url;
///
/// let url = Url::parse("http://example.test/img/a.png").unwrap();
/// let name = file_name_for(&url, b"bytes");
/// assert!(name.ends_with("_a.png"));
/// assert_eq!(name.len(), 64 + "_a.png".len());
/// ```
pub fn file_name_for(url: &Url, content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    let hash = hex::encode(hasher.finalize());

    format!("{}_{}", hash, basename(url))
}

/// Returns a filesystem-safe version of the URL's last path segment
fn basename(url: &Url) -> String {
    let segment = url
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .unwrap_or("");

    let sanitized: String = segment
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .take(MAX_BASENAME_LEN)
        .collect();

    if sanitized.is_empty() || sanitized.chars().all(|c| c == '.') {
        DEFAULT_BASENAME.to_string()
    } else {
        sanitized
    }
}
