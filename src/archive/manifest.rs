use crate::storage::FileMapping;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Name of the manifest inside the archive
pub const MANIFEST_FILE_NAME: &str = "metadata.json";

/// Metadata describing a finished crawl
///
/// A pure projection of the crawl state, built once after traversal ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Number of saved files
    pub total_files: u64,

    /// URLs processed as primary documents, in visit order
    pub visited_urls: Vec<String>,

    /// Source URL to path relative to the archive root
    pub file_mapping: BTreeMap<String, String>,
}

impl Manifest {
    pub fn new(visited_urls: Vec<String>, mapping: &FileMapping) -> Self {
        Self {
            total_files: mapping.len() as u64,
            visited_urls,
            file_mapping: mapping.relative_paths(),
        }
    }

    /// Serializes the manifest as pretty-printed JSON
    pub fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec_pretty(self)
    }
}
