//! Summary of a finished crawl

use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::time::Duration;

/// Outcome of one crawl invocation
#[derive(Debug, Clone)]
pub struct CrawlSummary {
    /// When the crawl started
    pub started_at: DateTime<Utc>,

    /// Wall-clock duration of crawl and packaging
    pub elapsed: Duration,

    /// Number of files saved (entries in the file mapping)
    pub files_downloaded: u64,

    /// Number of frontier entries processed as primary documents
    pub pages_processed: u64,

    /// Number of fetches that failed
    pub fetch_failures: u64,

    /// Number of URLs dequeued and visited
    pub visited: u64,

    /// Whether the run stopped because the file budget was exhausted
    pub budget_exhausted: bool,

    /// Path of the written archive
    pub archive_path: PathBuf,

    /// Path of the manifest written next to the archive, if requested
    pub manifest_sidecar: Option<PathBuf>,
}

/// Prints a crawl summary to stdout in a formatted manner
pub fn print_summary(summary: &CrawlSummary) {
    println!("=== Mirror Summary ===\n");

    println!("Overview:");
    println!(
        "  Started: {}",
        summary.started_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!("  Duration: {:.1}s", summary.elapsed.as_secs_f64());
    println!("  Pages processed: {}", summary.pages_processed);
    println!("  URLs visited: {}", summary.visited);
    println!("  Files downloaded: {}", summary.files_downloaded);
    println!("  Failed fetches: {}", summary.fetch_failures);
    if summary.budget_exhausted {
        println!("  Stopped early: file limit reached");
    }
    println!();

    println!("Output:");
    println!("  Archive: {}", summary.archive_path.display());
    if let Some(sidecar) = &summary.manifest_sidecar {
        println!("  Manifest: {}", sidecar.display());
    }

    let attempted = summary.files_downloaded + summary.fetch_failures;
    let success_rate = if attempted > 0 {
        (summary.files_downloaded as f64 / attempted as f64) * 100.0
    } else {
        0.0
    };
    println!();
    println!(
        "Success Rate: {:.1}% ({} / {} fetches succeeded)",
        success_rate, summary.files_downloaded, attempted
    );
}
