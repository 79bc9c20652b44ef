use crate::storage::path_to_slash;
use std::path::{Component, Path};

/// Expresses `target` relative to the directory `from_dir`
///
/// Both paths are relative to the same root (the scratch directory). The result
/// always uses `/` separators so it can be written into markup.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use sumi_mirror::rewrite::relative_path;
///
/// assert_eq!(relative_path(Path::new(""), Path::new("a.png")), "a.png");
/// assert_eq!(relative_path(Path::new("pages"), Path::new("img/a.png")), "../img/a.png");
/// ```
pub fn relative_path(from_dir: &Path, target: &Path) -> String {
    let from: Vec<Component> = from_dir
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect();
    let to: Vec<Component> = target
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect();

    let common = from
        .iter()
        .zip(to.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<String> = std::iter::repeat("..".to_string())
        .take(from.len() - common)
        .collect();
    parts.extend(
        to[common..]
            .iter()
            .map(|c| path_to_slash(Path::new(c.as_os_str()))),
    );

    if parts.is_empty() {
        ".".to_string()
    } else {
        parts.join("/")
    }
}
