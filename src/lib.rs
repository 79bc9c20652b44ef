//! Sumi-Mirror: an offline website archiver
//!
//! This crate crawls a website from a seed URL, downloads every resource it can
//! discover (pages, stylesheets, scripts, media, XML-referenced files), rewrites
//! markup references to point at the saved copies and packages everything into a
//! single compressed archive with a JSON manifest.

pub mod archive;
pub mod config;
pub mod crawler;
pub mod extract;
pub mod output;
pub mod rewrite;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Sumi-Mirror operations
///
/// Only configuration, storage and archive failures end up here. Fetch and parse
/// failures are recovered inside the crawl loop and never abort a run.
#[derive(Debug, Error)]
pub enum MirrorError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Archive error: {0}")]
    Archive(#[from] archive::ArchiveError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Worker task failed: {0}")]
    Worker(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Result type alias for Sumi-Mirror operations
pub type Result<T> = std::result::Result<T, MirrorError>;

// Re-export commonly used types
pub use config::{Config, CrawlBudget};
pub use crawler::{mirror_site, Coordinator};
pub use extract::{extract_urls, ContentKind};
pub use output::{CrawlReporter, CrawlSummary, TracingReporter};
