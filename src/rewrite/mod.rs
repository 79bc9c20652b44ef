//! Reference rewriting for saved markup documents
//!
//! Rewriting is a pure function of (document, mapping, document URL): every
//! `src`, `href`, `data` and `poster` attribute whose resolved URL has a saved
//! copy is replaced by the path of that copy relative to the document's own
//! saved location. Unmapped references are left exactly as they were. The bodies
//! of `<script>` and `<style>` elements and comments are copied verbatim.

mod relative;

pub use relative::relative_path;

use crate::extract::REFERENCE_ATTRIBUTES;
use crate::storage::FileMapping;
use crate::url::resolve_reference;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::path::Path;
use url::Url;

static TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)<!--.*?-->|<([A-Za-z][A-Za-z0-9:-]*)(?:[^>"']|"[^"]*"|'[^']*')*>"#)
        .expect("valid regex")
});

static ATTRIBUTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(\s+)([^\s=/>"']+)(?:(\s*=\s*)(?:"([^"]*)"|'([^']*)'|([^\s>"']+)))?"#)
        .expect("valid regex")
});

/// Elements whose content is raw text and never contains tags
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Rewrites the references of a markup document to local paths
///
/// # Arguments
///
/// * `markup` - The document as fetched
/// * `mapping` - URL to saved file mapping
/// * `own_url` - URL the document was fetched from
///
/// # Returns
///
/// The rewritten document. Rewriting an already rewritten document with the same
/// mapping returns it unchanged.
///
/// # Example
///
/// ```
/// use std::path::PathBuf;
/// use sumi_mirror::rewrite::rewrite_document;
/// use sumi_mirror::storage::{FileMapping, StoredFile};
/// use url::Url;
///
/// let mut mapping = FileMapping::new();
/// mapping.record("http://example.test/a.png", StoredFile {
///     local_path: PathBuf::from("1f_a.png"),
///     content_type: "image/png".to_string(),
/// });
///
/// let own = Url::parse("http://example.test/index.html").unwrap();
/// let out = rewrite_document(r#"<img src="a.png">"#, &mapping, &own);
/// assert_eq!(out, r#"<img src="1f_a.png">"#);
/// ```
pub fn rewrite_document(markup: &str, mapping: &FileMapping, own_url: &Url) -> String {
    let own_dir = mapping
        .get(own_url.as_str())
        .and_then(|file| file.local_path.parent().map(Path::to_path_buf))
        .unwrap_or_default();

    let lowered = markup.to_ascii_lowercase();
    let mut out = String::with_capacity(markup.len());
    let mut pos = 0;

    while let Some(captures) = TAG.captures_at(markup, pos) {
        let Some(whole) = captures.get(0) else {
            break;
        };
        out.push_str(&markup[pos..whole.start()]);
        pos = whole.end();

        let Some(name) = captures.get(1) else {
            // comment
            out.push_str(whole.as_str());
            continue;
        };

        out.push_str(&rewrite_tag(whole.as_str(), mapping, own_url, &own_dir));

        let name = name.as_str().to_ascii_lowercase();
        if RAW_TEXT_ELEMENTS.contains(&name.as_str()) {
            let closing = format!("</{}", name);
            let end = lowered[pos..]
                .find(&closing)
                .map_or(markup.len(), |offset| pos + offset);
            out.push_str(&markup[pos..end]);
            pos = end;
        }
    }

    out.push_str(&markup[pos..]);
    out
}

/// Rewrites the reference attributes of a single start tag
fn rewrite_tag(tag: &str, mapping: &FileMapping, own_url: &Url, own_dir: &Path) -> String {
    ATTRIBUTE
        .replace_all(tag, |caps: &Captures| {
            let original = caps[0].to_string();

            let name = caps[2].to_ascii_lowercase();
            if !REFERENCE_ATTRIBUTES.contains(&name.as_str()) {
                return original;
            }

            let (value, quote) = match (caps.get(4), caps.get(5), caps.get(6)) {
                (Some(v), _, _) => (v.as_str(), '"'),
                (_, Some(v), _) => (v.as_str(), '\''),
                (_, _, Some(v)) => (v.as_str(), '"'),
                _ => return original,
            };

            let Some(target) = local_target(value, mapping, own_url, own_dir) else {
                return original;
            };

            format!("{}{}{}{}{}{}", &caps[1], &caps[2], &caps[3], quote, target, quote)
        })
        .into_owned()
}

/// Resolves an attribute value and returns its local replacement, if mapped
fn local_target(value: &str, mapping: &FileMapping, own_url: &Url, own_dir: &Path) -> Option<String> {
    let decoded = html_escape::decode_html_entities(value);
    let resolved = resolve_reference(&decoded, own_url)?;
    let stored = mapping.get(resolved.as_str())?;
    Some(relative_path(own_dir, &stored.local_path))
}
