use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// Where a fetched resource was saved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    /// Path relative to the scratch root
    pub local_path: PathBuf,

    /// Declared Content-Type, parameters stripped
    pub content_type: String,
}

/// Append-only mapping from source URL to saved file
///
/// This is the single source of truth for the reference rewriter and the
/// manifest. Entries are never removed or replaced, and iteration follows
/// insertion order.
#[derive(Debug, Clone, Default)]
pub struct FileMapping {
    entries: Vec<(String, StoredFile)>,
    index: HashMap<String, usize>,
}

/// Mapping shared between the crawl driver and its fetch workers
pub type SharedMapping = Arc<Mutex<FileMapping>>;

impl FileMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a saved resource
    ///
    /// Returns false and leaves the mapping unchanged if the URL is already
    /// present.
    pub fn record(&mut self, url: impl Into<String>, file: StoredFile) -> bool {
        let url = url.into();
        if self.index.contains_key(&url) {
            return false;
        }
        self.index.insert(url.clone(), self.entries.len());
        self.entries.push((url, file));
        true
    }

    /// Looks up the saved file for a URL
    pub fn get(&self, url: &str) -> Option<&StoredFile> {
        self.index.get(url).map(|&i| &self.entries[i].1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &StoredFile)> {
        self.entries.iter().map(|(url, file)| (url.as_str(), file))
    }

    /// Projects the mapping to URL -> relative path strings with `/` separators
    pub fn relative_paths(&self) -> BTreeMap<String, String> {
        self.entries
            .iter()
            .map(|(url, file)| (url.clone(), path_to_slash(&file.local_path)))
            .collect()
    }
}

/// Renders a relative path with forward slashes on every platform
pub fn path_to_slash(path: &std::path::Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
