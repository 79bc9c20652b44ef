use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Browser-like identifier sent with every request
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Main configuration structure for Sumi-Mirror
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Absolute URL the crawl starts from
    #[serde(rename = "seed-url")]
    pub seed_url: Option<String>,

    /// Maximum depth to crawl from the seed (0 = unlimited)
    #[serde(rename = "max-depth")]
    pub max_depth: u32,

    /// Maximum number of files to download (0 = unlimited)
    #[serde(rename = "max-files")]
    pub max_files: u64,

    /// Delay before each primary document (seconds)
    #[serde(rename = "delay-seconds")]
    pub delay_seconds: f64,

    /// Number of concurrent sub-resource fetches
    pub concurrency: u32,

    /// Per-request timeout (seconds)
    #[serde(rename = "timeout-seconds")]
    pub timeout_seconds: u64,

    /// Retries for transient fetch failures (0 = never retry)
    #[serde(rename = "max-retries")]
    pub max_retries: u32,

    /// Base backoff between retries (milliseconds), multiplied by the attempt number
    #[serde(rename = "retry-backoff-ms")]
    pub retry_backoff_ms: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            seed_url: None,
            max_depth: 0,
            max_files: 0,
            delay_seconds: 0.0,
            concurrency: 10,
            timeout_seconds: 30,
            max_retries: 0,
            retry_backoff_ms: 500,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Full User-Agent header value
    pub value: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            value: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path of the final zip archive
    #[serde(rename = "archive-path")]
    pub archive_path: PathBuf,

    /// Ephemeral directory the crawl writes into before packaging
    #[serde(rename = "scratch-dir")]
    pub scratch_dir: PathBuf,

    /// Also write the manifest next to the archive
    #[serde(rename = "manifest-sidecar")]
    pub manifest_sidecar: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            archive_path: PathBuf::from("website_content.zip"),
            scratch_dir: PathBuf::from("downloaded_website"),
            manifest_sidecar: false,
        }
    }
}

/// Traversal limits handed to the crawl engine
///
/// `None` means unlimited. Unlike the on-disk configuration, `Some(0)` is a real
/// bound here: a depth limit of zero processes only the seed document and its
/// directly referenced resources.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrawlBudget {
    pub max_depth: Option<u32>,
    pub max_files: Option<u64>,
    pub delay: Duration,
}

impl CrawlBudget {
    /// A budget with no depth or file limit and no delay
    pub fn unlimited() -> Self {
        Self {
            max_depth: None,
            max_files: None,
            delay: Duration::ZERO,
        }
    }

    /// Returns true if a frontier entry at `depth` may still be processed
    pub fn allows_depth(&self, depth: u32) -> bool {
        self.max_depth.map_or(true, |max| depth <= max)
    }

    /// Returns true once `downloaded` files exhaust the file budget
    pub fn is_exhausted(&self, downloaded: u64) -> bool {
        self.max_files.map_or(false, |max| downloaded >= max)
    }
}

impl Config {
    /// Projects the configured limits into the engine's budget
    ///
    /// Zero depth and zero files mean unlimited, matching the command line.
    pub fn budget(&self) -> CrawlBudget {
        let delay = Duration::try_from_secs_f64(self.crawler.delay_seconds).unwrap_or(Duration::ZERO);

        CrawlBudget {
            max_depth: (self.crawler.max_depth > 0).then_some(self.crawler.max_depth),
            max_files: (self.crawler.max_files > 0).then_some(self.crawler.max_files),
            delay,
        }
    }

    /// Per-request timeout as a duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.crawler.timeout_seconds)
    }
}
