//! Packaging of the scratch area into a single archive
//!
//! This module handles:
//! - The metadata manifest describing a finished crawl
//! - Writing the compressed archive from the scratch tree
//! - Discarding the scratch tree once the archive exists

mod manifest;
mod writer;

pub use manifest::{Manifest, MANIFEST_FILE_NAME};
pub use writer::{create_archive, package_scratch, sidecar_path};

use crate::storage::StorageError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while packaging a crawl
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Failed to create archive {path}: {source}")]
    Create {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("IO error while archiving: {0}")]
    Io(#[from] std::io::Error),

    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Failed to serialize manifest: {0}")]
    Manifest(#[from] serde_json::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Result type for archive operations
pub type ArchiveResult<T> = Result<T, ArchiveError>;
