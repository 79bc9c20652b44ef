use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// Values supplied on the command line that take precedence over the file
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub seed_url: Option<String>,
    pub archive_path: Option<PathBuf>,
    pub max_depth: Option<u32>,
    pub max_files: Option<u64>,
    pub delay_seconds: Option<f64>,
    pub concurrency: Option<u32>,
    pub max_retries: Option<u32>,
    pub manifest_sidecar: bool,
}

/// Parses a configuration file without validating it
///
/// Use this when values are still to be merged from another source (the command
/// line) before validation.
pub fn read_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    Ok(config)
}

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use sumi_mirror::config::load_config;
///
/// let config = load_config(Path::new("mirror.toml")).unwrap();
/// println!("Max depth: {}", config.crawler.max_depth);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let config = read_config(path)?;
    validate(&config)?;
    Ok(config)
}

/// Computes a SHA-256 hash of the configuration file content
///
/// Logged at startup so a run can be traced back to the exact file it used.
///
/// # Returns
///
/// * `Ok(String)` - Hex-encoded SHA-256 hash of the file content
/// * `Err(ConfigError)` - Failed to read the file
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    Ok(hex::encode(result))
}

/// Merges command line overrides into a configuration and validates the result
///
/// This is the only path from user input to a runnable configuration: it
/// rejects a missing seed or an invalid budget before any network activity.
pub fn resolve_config(mut config: Config, overrides: ConfigOverrides) -> Result<Config, ConfigError> {
    if let Some(seed) = overrides.seed_url {
        config.crawler.seed_url = Some(seed);
    }
    if let Some(path) = overrides.archive_path {
        config.output.archive_path = path;
    }
    if let Some(depth) = overrides.max_depth {
        config.crawler.max_depth = depth;
    }
    if let Some(files) = overrides.max_files {
        config.crawler.max_files = files;
    }
    if let Some(delay) = overrides.delay_seconds {
        config.crawler.delay_seconds = delay;
    }
    if let Some(concurrency) = overrides.concurrency {
        config.crawler.concurrency = concurrency;
    }
    if let Some(retries) = overrides.max_retries {
        config.crawler.max_retries = retries;
    }
    if overrides.manifest_sidecar {
        config.output.manifest_sidecar = true;
    }

    validate(&config)?;
    Ok(config)
}
