//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the main crawl loop that coordinates all aspects of
//! the mirroring process, including:
//! - Preparing the scratch area and the HTTP client
//! - Breadth-first traversal of the frontier
//! - Concurrent fan-out of sub-resource fetches
//! - Rewriting saved markup to point at local copies
//! - Packaging the result into the archive

use crate::archive::{package_scratch, Manifest};
use crate::config::{validate, Config, CrawlBudget};
use crate::crawler::fetcher::Fetcher;
use crate::crawler::scheduler::{FrontierEntry, Scheduler};
use crate::extract::{extract_urls, media_type, ContentKind};
use crate::output::{CrawlReporter, CrawlSummary};
use crate::rewrite::rewrite_document;
use crate::storage::{
    file_name_for, FileMapping, ScratchStore, SharedMapping, StorageResult, StoredFile,
};
use crate::url::{normalize_seed, same_origin};
use crate::{ConfigError, MirrorError, Result};
use chrono::Utc;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use url::Url;

/// A primary document's content, freshly fetched or read back from scratch
struct PrimaryDocument {
    bytes: Vec<u8>,
    content_type: String,
}

/// State shared between the crawl driver and its fetch workers
#[derive(Clone)]
struct WorkerContext {
    fetcher: Fetcher,
    store: ScratchStore,
    mapping: SharedMapping,
    reporter: Arc<dyn CrawlReporter>,
    downloaded: Arc<AtomicU64>,
    failures: Arc<AtomicU64>,
    max_files: Option<u64>,
}

impl WorkerContext {
    /// Fetches a URL and saves it
    ///
    /// Fetch failures are reported and yield `None`. Storage failures are
    /// returned because the crawl cannot continue without persistence.
    async fn fetch_and_store(&self, url: &Url) -> StorageResult<Option<PrimaryDocument>> {
        match self.fetcher.fetch(url).await {
            Ok(resource) => {
                self.store_resource(url, &resource.bytes, &resource.content_type)?;
                Ok(Some(PrimaryDocument {
                    bytes: resource.bytes,
                    content_type: resource.content_type,
                }))
            }
            Err(e) => {
                self.failures.fetch_add(1, Ordering::Relaxed);
                self.reporter.on_fetch_failed(url, &e);
                Ok(None)
            }
        }
    }

    fn store_resource(&self, url: &Url, bytes: &[u8], content_type: &str) -> StorageResult<()> {
        let local_path = PathBuf::from(file_name_for(url, bytes));
        self.store.persist(&local_path, bytes)?;

        let stored = StoredFile {
            local_path: local_path.clone(),
            content_type: media_type(content_type),
        };
        if lock_mapping(&self.mapping).record(url.as_str(), stored) {
            let count = self.downloaded.fetch_add(1, Ordering::SeqCst) + 1;
            self.reporter.on_saved(url, &local_path, count);
        }

        Ok(())
    }

    fn budget_reached(&self) -> bool {
        self.max_files
            .map_or(false, |max| self.downloaded.load(Ordering::SeqCst) >= max)
    }
}

fn lock_mapping(mapping: &Mutex<FileMapping>) -> MutexGuard<'_, FileMapping> {
    mapping.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Fetch worker body: waits for a pool slot, then fetches unless the budget ran out
///
/// Returns the URL when it was saved.
async fn fetch_worker(
    context: WorkerContext,
    semaphore: Arc<Semaphore>,
    url: Url,
) -> Result<Option<Url>> {
    let _permit = semaphore
        .acquire_owned()
        .await
        .map_err(|e| MirrorError::Worker(e.to_string()))?;

    if context.budget_reached() {
        tracing::trace!("File limit reached, skipping {}", url);
        return Ok(None);
    }

    Ok(context.fetch_and_store(&url).await?.map(|_| url))
}

/// Main crawler coordinator structure
pub struct Coordinator {
    config: Arc<Config>,
    seed: Url,
    budget: CrawlBudget,
    scheduler: Scheduler,
    context: WorkerContext,
    semaphore: Arc<Semaphore>,
    pages_processed: u64,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// Validates the configuration, builds the HTTP client and prepares an empty
    /// scratch directory. No network activity happens here.
    ///
    /// # Arguments
    ///
    /// * `config` - The mirror configuration
    /// * `reporter` - Sink for progress events
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(MirrorError)` - Invalid configuration or unusable scratch directory
    pub fn new(config: Config, reporter: Arc<dyn CrawlReporter>) -> Result<Self> {
        validate(&config)?;

        let seed_str = config
            .crawler
            .seed_url
            .as_deref()
            .ok_or_else(|| ConfigError::Validation("seed-url is required".to_string()))?;
        let seed = normalize_seed(seed_str)?;

        let fetcher = Fetcher::from_config(&config)?;
        let store = ScratchStore::prepare(&config.output.scratch_dir)?;
        let budget = config.budget();

        let context = WorkerContext {
            fetcher,
            store,
            mapping: Arc::new(Mutex::new(FileMapping::new())),
            reporter,
            downloaded: Arc::new(AtomicU64::new(0)),
            failures: Arc::new(AtomicU64::new(0)),
            max_files: budget.max_files,
        };

        Ok(Self {
            semaphore: Arc::new(Semaphore::new(config.crawler.concurrency as usize)),
            scheduler: Scheduler::new(seed.clone()),
            config: Arc::new(config),
            seed,
            budget,
            context,
            pages_processed: 0,
        })
    }

    /// Replaces the traversal limits derived from the configuration
    ///
    /// Unlike the configuration, the budget can express a depth limit of zero.
    pub fn with_budget(mut self, budget: CrawlBudget) -> Self {
        self.context.max_files = budget.max_files;
        self.budget = budget;
        self
    }

    /// Runs the crawl to completion and writes the archive
    ///
    /// Each step pops one primary document, fetches it (or reuses its saved
    /// copy), fans out over the URLs it references, enqueues same-origin
    /// successes one level deeper and rewrites the document if it is markup.
    /// The loop ends when the frontier is empty or the file budget is spent.
    pub async fn run(mut self) -> Result<CrawlSummary> {
        let started_at = Utc::now();
        let start_time = Instant::now();

        tracing::info!(
            "Starting mirror of {} (max depth {:?}, max files {:?})",
            self.seed,
            self.budget.max_depth,
            self.budget.max_files
        );

        while !self.budget_exhausted() {
            let Some(entry) = self.scheduler.next_entry(&self.budget) else {
                tracing::info!("Frontier is empty, crawl complete");
                break;
            };

            if !self.budget.delay.is_zero() {
                tokio::time::sleep(self.budget.delay).await;
            }

            self.process_entry(entry).await?;

            if self.pages_processed > 0 && self.pages_processed % 10 == 0 {
                tracing::info!(
                    "Progress: {} pages processed, {} files saved, {} in frontier",
                    self.pages_processed,
                    self.context.downloaded.load(Ordering::SeqCst),
                    self.scheduler.frontier_size()
                );
            }
        }

        let budget_exhausted = self.budget_exhausted();
        if budget_exhausted {
            tracing::info!(
                "File limit reached with {} URLs left in the frontier",
                self.scheduler.frontier_size()
            );
        }

        let relinked = self.relink_documents()?;
        tracing::debug!("Final relink pass updated {} documents", relinked);

        let mapping = lock_mapping(&self.context.mapping).clone();
        let manifest = Manifest::new(self.scheduler.visited_urls().to_vec(), &mapping);
        let manifest_sidecar = package_scratch(
            self.context.store.clone(),
            &manifest,
            &self.config.output.archive_path,
            self.config.output.manifest_sidecar,
        )?;

        let summary = CrawlSummary {
            started_at,
            elapsed: start_time.elapsed(),
            files_downloaded: mapping.len() as u64,
            pages_processed: self.pages_processed,
            fetch_failures: self.context.failures.load(Ordering::SeqCst),
            visited: self.scheduler.visited_count() as u64,
            budget_exhausted,
            archive_path: self.config.output.archive_path.clone(),
            manifest_sidecar,
        };

        self.context.reporter.on_finished(&summary);
        Ok(summary)
    }

    fn budget_exhausted(&self) -> bool {
        self.budget
            .is_exhausted(self.context.downloaded.load(Ordering::SeqCst))
    }

    /// Processes a single primary document
    async fn process_entry(&mut self, entry: FrontierEntry) -> Result<()> {
        self.context.reporter.on_primary(&entry.url, entry.depth);

        let Some(document) = self.load_primary(&entry.url).await? else {
            return Ok(());
        };
        self.pages_processed += 1;

        let discovered = extract_urls(&document.bytes, &entry.url, &document.content_type);
        let pending: Vec<Url> = discovered
            .into_iter()
            .filter(|url| url != &entry.url && self.scheduler.claim(url))
            .collect();

        let saved = self.fan_out(pending).await?;
        for url in saved {
            if same_origin(&entry.url, &url) {
                self.scheduler.push(url, entry.depth + 1);
            }
        }

        if ContentKind::from_content_type(&document.content_type).is_markup() {
            self.rewrite_primary(&entry.url, &document.bytes)?;
        }

        Ok(())
    }

    /// Obtains a primary document's bytes, fetching it only if it was never fetched
    async fn load_primary(&mut self, url: &Url) -> Result<Option<PrimaryDocument>> {
        let stored = lock_mapping(&self.context.mapping).get(url.as_str()).cloned();
        if let Some(stored) = stored {
            tracing::debug!("Reusing saved copy of {}", url);
            let bytes = self.context.store.read(&stored.local_path)?;
            return Ok(Some(PrimaryDocument {
                bytes,
                content_type: stored.content_type,
            }));
        }

        if !self.scheduler.claim(url) {
            tracing::debug!("{} was already attempted, skipping", url);
            return Ok(None);
        }

        Ok(self.context.fetch_and_store(url).await?)
    }

    /// Fetches discovered URLs concurrently and waits for all of them
    ///
    /// # Returns
    ///
    /// The URLs that were saved, sorted.
    async fn fan_out(&self, urls: Vec<Url>) -> Result<Vec<Url>> {
        if urls.is_empty() {
            return Ok(Vec::new());
        }
        tracing::debug!("Dispatching {} sub-resource fetches", urls.len());

        let mut tasks = JoinSet::new();
        for url in urls {
            tasks.spawn(fetch_worker(
                self.context.clone(),
                Arc::clone(&self.semaphore),
                url,
            ));
        }

        let mut saved = Vec::new();
        let mut first_error = None;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok(Some(url))) => saved.push(url),
                Ok(Ok(None)) => {}
                Ok(Err(e)) => {
                    first_error.get_or_insert(e);
                }
                Err(e) => {
                    first_error.get_or_insert(MirrorError::Worker(e.to_string()));
                }
            }
        }

        if let Some(e) = first_error {
            return Err(e);
        }

        saved.sort();
        Ok(saved)
    }

    /// Rewrites a primary markup document against the current mapping
    fn rewrite_primary(&self, url: &Url, original: &[u8]) -> Result<()> {
        let markup = String::from_utf8_lossy(original);

        let (local_path, rewritten) = {
            let mapping = lock_mapping(&self.context.mapping);
            let Some(stored) = mapping.get(url.as_str()) else {
                return Ok(());
            };
            (
                stored.local_path.clone(),
                rewrite_document(&markup, &mapping, url),
            )
        };

        if rewritten.as_bytes() != original {
            self.context.store.overwrite(&local_path, rewritten.as_bytes())?;
        }
        Ok(())
    }

    /// Rewrites every saved markup document against the final mapping
    ///
    /// References to resources saved after a document was first rewritten now
    /// resolve too. Documents never processed as primaries (cross-origin pages,
    /// pages beyond the depth limit) are rewritten here for the first time.
    ///
    /// # Returns
    ///
    /// The number of files whose content changed.
    fn relink_documents(&self) -> Result<usize> {
        let mapping = lock_mapping(&self.context.mapping).clone();
        let mut seen = HashSet::new();
        let mut changed = 0;

        for (url, stored) in mapping.iter() {
            if !ContentKind::from_content_type(&stored.content_type).is_markup() {
                continue;
            }
            if !seen.insert(stored.local_path.clone()) {
                continue;
            }
            let Ok(own_url) = Url::parse(url) else {
                continue;
            };

            let bytes = self.context.store.read(&stored.local_path)?;
            let markup = String::from_utf8_lossy(&bytes);
            let rewritten = rewrite_document(&markup, &mapping, &own_url);

            if rewritten.as_bytes() != bytes.as_slice() {
                self.context
                    .store
                    .overwrite(&stored.local_path, rewritten.as_bytes())?;
                changed += 1;
            }
        }

        Ok(changed)
    }
}

/// Mirrors a site with the given configuration, reporting through `tracing`
///
/// # Arguments
///
/// * `config` - The mirror configuration
///
/// # Returns
///
/// * `Ok(CrawlSummary)` - The archive was written
/// * `Err(MirrorError)` - Configuration, storage or archive failure
pub async fn mirror_site(config: Config) -> Result<CrawlSummary> {
    Coordinator::new(config, Arc::new(crate::output::TracingReporter))?
        .run()
        .await
}
