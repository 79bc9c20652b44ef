//! Output module for crawl reporting
//!
//! This module handles:
//! - The reporting sink injected into the crawl engine
//! - The end-of-run summary and its console rendering

pub mod stats;
mod traits;

pub use stats::{print_summary, CrawlSummary};
pub use traits::{CrawlReporter, TracingReporter};
