//! Crawler module for site traversal and fetching
//!
//! This module contains the core mirroring logic, including:
//! - HTTP fetching with optional retries
//! - The breadth-first frontier with visited and claimed sets
//! - Overall crawl coordination and packaging

mod coordinator;
mod fetcher;
mod scheduler;

pub use coordinator::{mirror_site, Coordinator};
pub use fetcher::{build_http_client, FetchError, FetchedResource, Fetcher};
pub use scheduler::{FrontierEntry, Scheduler};
