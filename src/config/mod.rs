//! Configuration module for Sumi-Mirror
//!
//! This module handles loading, merging and validating the crawl configuration.
//! Values come from an optional TOML file and from command line overrides; the
//! engine itself only ever sees a validated [`Config`] and its [`CrawlBudget`].
//!
//! # Example
//!
//! ```no_run
//! use sumi_mirror::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("mirror.toml")).unwrap();
//! println!("Crawler will use max depth: {}", config.crawler.max_depth);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlBudget, CrawlerConfig, OutputConfig, UserAgentConfig, DEFAULT_USER_AGENT,
};

// Re-export parser functions
pub use parser::{
    compute_config_hash, load_config, read_config, resolve_config,
    ConfigOverrides,
};
pub use validation::validate;
