//! Reporting sink for crawl progress
//!
//! The engine never prints or installs a global subscriber itself. It reports
//! events through a [`CrawlReporter`] supplied by the caller; the binary uses
//! [`TracingReporter`], tests can record events instead.

use crate::crawler::FetchError;
use crate::output::CrawlSummary;
use std::path::Path;
use url::Url;

/// Receives progress events from a running crawl
///
/// Methods are called from the crawl driver and from fetch workers, so
/// implementations must be thread-safe. All methods have no-op defaults.
pub trait CrawlReporter: Send + Sync {
    /// A frontier entry is about to be processed as a primary document
    fn on_primary(&self, _url: &Url, _depth: u32) {}

    /// A resource was fetched and saved
    fn on_saved(&self, _url: &Url, _local_path: &Path, _files_so_far: u64) {}

    /// A fetch failed; the URL is treated as unobtainable
    fn on_fetch_failed(&self, _url: &Url, _error: &FetchError) {}

    /// The crawl finished and the archive was written
    fn on_finished(&self, _summary: &CrawlSummary) {}
}

/// Reporter that forwards every event to `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl CrawlReporter for TracingReporter {
    fn on_primary(&self, url: &Url, depth: u32) {
        tracing::debug!("Processing {} at depth {}", url, depth);
    }

    fn on_saved(&self, url: &Url, local_path: &Path, files_so_far: u64) {
        tracing::debug!("Saved {} as {} ({} files)", url, local_path.display(), files_so_far);
        if files_so_far % 50 == 0 {
            tracing::info!("Progress: {} files downloaded", files_so_far);
        }
    }

    fn on_fetch_failed(&self, url: &Url, error: &FetchError) {
        tracing::error!("Failed to fetch {}: {}", url, error);
    }

    fn on_finished(&self, summary: &CrawlSummary) {
        tracing::info!(
            "Mirror completed: {} files from {} pages in {:?}, archive at {}",
            summary.files_downloaded,
            summary.pages_processed,
            summary.elapsed,
            summary.archive_path.display()
        );
    }
}
