//! Storage module for downloaded resources
//!
//! This module handles everything that touches the scratch area, including:
//! - Deriving content-addressed file names for fetched resources
//! - Persisting and re-reading resource bytes under the scratch root
//! - The URL to local path mapping shared by fetch workers and the rewriter

mod mapping;
mod naming;
mod scratch;

pub use mapping::{path_to_slash, FileMapping, SharedMapping, StoredFile};
pub use naming::{file_name_for, DEFAULT_BASENAME};
pub use scratch::ScratchStore;

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading or writing the scratch area
///
/// Every storage error is fatal to a crawl: without persistence the crawl
/// cannot make progress.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to prepare scratch directory {path}: {source}")]
    Prepare {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to remove scratch directory {path}: {source}")]
    Remove {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Path escapes the scratch root: {0}")]
    OutsideRoot(PathBuf),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
