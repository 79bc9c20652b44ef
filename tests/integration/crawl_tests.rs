//! Integration tests for the mirror engine
//!
//! These tests use wiremock to create mock HTTP servers and run the full
//! crawl, rewrite and packaging cycle end-to-end.

use std::collections::{BTreeSet, HashSet};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use sumi_mirror::archive::{sidecar_path, Manifest, MANIFEST_FILE_NAME};
use sumi_mirror::config::{Config, CrawlBudget, CrawlerConfig, OutputConfig, UserAgentConfig};
use sumi_mirror::crawler::{Coordinator, FetchError};
use sumi_mirror::output::{CrawlReporter, TracingReporter};
use sumi_mirror::MirrorError;
use tempfile::TempDir;
use url::Url;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

/// Creates a test configuration writing into `dir`
fn create_test_config(seed: &str, dir: &TempDir) -> Config {
    Config {
        crawler: CrawlerConfig {
            seed_url: Some(seed.to_string()),
            max_depth: 0,
            max_files: 0,
            delay_seconds: 0.0,
            concurrency: 4,
            timeout_seconds: 5,
            max_retries: 0,
            retry_backoff_ms: 10,
        },
        user_agent: UserAgentConfig {
            value: "TestBot/1.0".to_string(),
        },
        output: OutputConfig {
            archive_path: dir.path().join("site.zip"),
            scratch_dir: dir.path().join("scratch"),
            manifest_sidecar: false,
        },
    }
}

/// Reporter that remembers which URLs failed
#[derive(Default)]
struct RecordingReporter {
    failed: Mutex<Vec<String>>,
}

impl CrawlReporter for RecordingReporter {
    fn on_fetch_failed(&self, url: &Url, _error: &FetchError) {
        self.failed.lock().unwrap().push(url.to_string());
    }
}

async fn mount_body(server: &MockServer, route: &str, body: impl Into<Vec<u8>>, content_type: &str) {
    let body: Vec<u8> = body.into();
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, content_type))
        .mount(server)
        .await;
}

fn read_entry(archive_path: &Path, name: &str) -> Vec<u8> {
    let mut archive = zip::ZipArchive::new(File::open(archive_path).unwrap()).unwrap();
    let mut entry = archive.by_name(name).unwrap();
    let mut buf = Vec::new();
    entry.read_to_end(&mut buf).unwrap();
    buf
}

fn read_manifest(archive_path: &Path) -> Manifest {
    serde_json::from_slice(&read_entry(archive_path, MANIFEST_FILE_NAME)).unwrap()
}

async fn requested_paths(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|request| request.url.path().to_string())
        .collect()
}

const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0x01];

#[tokio::test]
async fn test_stylesheet_background_is_mirrored() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_body(
        &server,
        "/index.html",
        r#"<html><head><link href="style.css" rel="stylesheet"></head><body><img src="a.png"></body></html>"#,
        "text/html; charset=utf-8",
    )
    .await;
    mount_body(&server, "/a.png", PNG_BYTES, "image/png").await;
    mount_body(&server, "/style.css", "body { background: url(bg.png); }", "text/css").await;
    mount_body(&server, "/bg.png", PNG_BYTES.to_vec(), "image/png").await;

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&format!("{}/index.html", base), &dir);
    config.crawler.max_depth = 1;
    config.crawler.max_files = 10;
    let archive_path = config.output.archive_path.clone();

    let summary = Coordinator::new(config, Arc::new(TracingReporter))
        .unwrap()
        .run()
        .await
        .unwrap();

    // Every resource fetched exactly once
    let mut paths = requested_paths(&server).await;
    paths.sort();
    assert_eq!(paths, vec!["/a.png", "/bg.png", "/index.html", "/style.css"]);

    assert_eq!(summary.files_downloaded, 4);
    assert_eq!(summary.fetch_failures, 0);

    let manifest = read_manifest(&archive_path);
    assert_eq!(manifest.total_files, 4);
    assert_eq!(manifest.visited_urls[0], format!("{}/index.html", base));

    let local = |route: &str| manifest.file_mapping[&format!("{}{}", base, route)].clone();
    let index = String::from_utf8(read_entry(&archive_path, &local("/index.html"))).unwrap();
    assert!(index.contains(&format!(r#"href="{}""#, local("/style.css"))));
    assert!(index.contains(&format!(r#"src="{}""#, local("/a.png"))));
    assert!(!index.contains(r#"src="a.png""#));
}

#[tokio::test]
async fn test_duplicate_reference_fetched_once() {
    let server = MockServer::start().await;

    mount_body(
        &server,
        "/",
        r#"<html><body><img src="dup.png"><img src="/dup.png"><a href="page2.html">next</a></body></html>"#,
        "text/html",
    )
    .await;
    mount_body(
        &server,
        "/page2.html",
        r#"<html><body><img src="dup.png"><a href="/">home</a></body></html>"#,
        "text/html",
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/dup.png"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(PNG_BYTES)
                .insert_header("content-type", "image/png"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&format!("{}/", server.uri()), &dir);

    let summary = Coordinator::new(config, Arc::new(TracingReporter))
        .unwrap()
        .run()
        .await
        .unwrap();

    let paths = requested_paths(&server).await;
    let unique: HashSet<&String> = paths.iter().collect();
    assert_eq!(paths.len(), unique.len(), "a URL was fetched twice: {:?}", paths);
    assert_eq!(summary.files_downloaded, 3);
}

#[tokio::test]
async fn test_depth_zero_fetches_only_direct_references() {
    let server = MockServer::start().await;

    mount_body(
        &server,
        "/",
        r#"<html><body><a href="page1.html">one</a></body></html>"#,
        "text/html",
    )
    .await;
    mount_body(
        &server,
        "/page1.html",
        r#"<html><body><a href="deep.html">deeper</a></body></html>"#,
        "text/html",
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/deep.html"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&format!("{}/", server.uri()), &dir);

    let summary = Coordinator::new(config, Arc::new(TracingReporter))
        .unwrap()
        .with_budget(CrawlBudget {
            max_depth: Some(0),
            max_files: None,
            delay: Duration::ZERO,
        })
        .run()
        .await
        .unwrap();

    assert_eq!(summary.files_downloaded, 2);
    assert_eq!(summary.visited, 1);
}

#[tokio::test]
async fn test_file_limit_bounds_download_count() {
    let server = MockServer::start().await;

    let images: String = (0..30)
        .map(|i| format!(r#"<img src="img/{}.png">"#, i))
        .collect();
    mount_body(
        &server,
        "/",
        format!("<html><body>{}</body></html>", images),
        "text/html",
    )
    .await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/img/\d+\.png$"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(PNG_BYTES)
                .insert_header("content-type", "image/png"),
        )
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&format!("{}/", server.uri()), &dir);
    config.crawler.max_files = 5;
    config.crawler.concurrency = 2;
    let archive_path = config.output.archive_path.clone();

    let summary = Coordinator::new(config, Arc::new(TracingReporter))
        .unwrap()
        .run()
        .await
        .unwrap();

    assert!(summary.budget_exhausted);
    assert!(
        (5..=5 + 2).contains(&summary.files_downloaded),
        "downloaded {} files",
        summary.files_downloaded
    );
    assert_eq!(read_manifest(&archive_path).total_files, summary.files_downloaded);
}

#[tokio::test]
async fn test_cross_origin_resources_are_not_expanded() {
    let site = MockServer::start().await;
    let other = MockServer::start().await;

    mount_body(
        &site,
        "/",
        format!(
            r#"<html><body><a href="{}/b.html">elsewhere</a></body></html>"#,
            other.uri()
        ),
        "text/html",
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/b.html"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(
                r#"<html><body><a href="/elsewhere.html">go</a></body></html>"#,
                "text/html",
            ),
        )
        .expect(1)
        .mount(&other)
        .await;
    Mock::given(method("GET"))
        .and(path("/elsewhere.html"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .expect(0)
        .mount(&other)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&format!("{}/", site.uri()), &dir);
    let archive_path = config.output.archive_path.clone();

    Coordinator::new(config, Arc::new(TracingReporter))
        .unwrap()
        .run()
        .await
        .unwrap();

    let manifest = read_manifest(&archive_path);
    assert!(manifest
        .file_mapping
        .contains_key(&format!("{}/b.html", other.uri())));
    assert!(!manifest
        .visited_urls
        .contains(&format!("{}/b.html", other.uri())));
}

#[tokio::test]
async fn test_failed_fetch_is_not_mapped() {
    let server = MockServer::start().await;

    mount_body(
        &server,
        "/",
        r#"<html><body><img src="ok.png"><img src="missing.png"></body></html>"#,
        "text/html",
    )
    .await;
    mount_body(&server, "/ok.png", PNG_BYTES, "image/png").await;
    Mock::given(method("GET"))
        .and(path("/missing.png"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&format!("{}/", server.uri()), &dir);
    let archive_path = config.output.archive_path.clone();
    let reporter = Arc::new(RecordingReporter::default());

    let summary = Coordinator::new(config, reporter.clone())
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(summary.fetch_failures, 1);
    assert_eq!(
        *reporter.failed.lock().unwrap(),
        vec![format!("{}/missing.png", server.uri())]
    );

    let manifest = read_manifest(&archive_path);
    assert!(!manifest
        .file_mapping
        .contains_key(&format!("{}/missing.png", server.uri())));

    let index_path = &manifest.file_mapping[&format!("{}/", server.uri())];
    let index = String::from_utf8(read_entry(&archive_path, index_path)).unwrap();
    assert!(index.contains(r#"src="missing.png""#));
}

#[tokio::test]
async fn test_archive_round_trip_and_sidecar() {
    let server = MockServer::start().await;
    let stylesheet = "p { color: red; }\n";

    mount_body(
        &server,
        "/",
        r#"<html><head><link rel="stylesheet" href="css/site.css"></head><body><img src="logo.png"></body></html>"#,
        "text/html",
    )
    .await;
    mount_body(&server, "/css/site.css", stylesheet, "text/css").await;
    mount_body(&server, "/logo.png", PNG_BYTES, "image/png").await;

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&format!("{}/", server.uri()), &dir);
    config.output.manifest_sidecar = true;
    let archive_path = config.output.archive_path.clone();
    let scratch_dir = config.output.scratch_dir.clone();

    let summary = Coordinator::new(config, Arc::new(TracingReporter))
        .unwrap()
        .run()
        .await
        .unwrap();

    assert!(!scratch_dir.exists());
    assert_eq!(summary.manifest_sidecar, Some(sidecar_path(&archive_path)));

    let manifest = read_manifest(&archive_path);
    let sidecar: Manifest =
        serde_json::from_slice(&std::fs::read(sidecar_path(&archive_path)).unwrap()).unwrap();
    assert_eq!(sidecar, manifest);

    let css_path = &manifest.file_mapping[&format!("{}/css/site.css", server.uri())];
    let png_path = &manifest.file_mapping[&format!("{}/logo.png", server.uri())];
    assert_eq!(read_entry(&archive_path, css_path), stylesheet.as_bytes());
    assert_eq!(read_entry(&archive_path, png_path), PNG_BYTES);

    let mut archive = zip::ZipArchive::new(File::open(&archive_path).unwrap()).unwrap();
    let names: BTreeSet<String> = (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect();
    for local_path in manifest.file_mapping.values() {
        assert!(names.contains(local_path), "{} missing from archive", local_path);
    }
}

#[tokio::test]
async fn test_unreachable_seed_still_produces_archive() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&format!("{}/", server.uri()), &dir);
    let archive_path = config.output.archive_path.clone();

    let summary = Coordinator::new(config, Arc::new(TracingReporter))
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(summary.files_downloaded, 0);
    assert_eq!(summary.pages_processed, 0);
    assert_eq!(summary.fetch_failures, 1);
    assert_eq!(read_manifest(&archive_path).total_files, 0);
}

/// Responder that records when each request arrived and answers slowly
struct SlowImage {
    arrivals: Arc<Mutex<Vec<Instant>>>,
    delay: Duration,
}

impl Respond for SlowImage {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        self.arrivals.lock().unwrap().push(Instant::now());
        ResponseTemplate::new(200)
            .set_body_raw(PNG_BYTES.to_vec(), "image/png")
            .set_delay(self.delay)
    }
}

fn image_page(count: usize) -> String {
    let images: String = (0..count)
        .map(|i| format!(r#"<img src="img/{}.png">"#, i))
        .collect();
    format!("<html><body>{}</body></html>", images)
}

#[tokio::test]
async fn test_delay_applies_per_page_not_per_resource() {
    let server = MockServer::start().await;
    mount_body(&server, "/", image_page(12), "text/html").await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/img/\d+\.png$"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(PNG_BYTES.to_vec(), "image/png"))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&format!("{}/", server.uri()), &dir);
    let delay = Duration::from_millis(300);

    let summary = Coordinator::new(config, Arc::new(TracingReporter))
        .unwrap()
        .with_budget(CrawlBudget {
            max_depth: Some(0),
            max_files: None,
            delay,
        })
        .run()
        .await
        .unwrap();

    assert_eq!(summary.pages_processed, 1);
    assert_eq!(summary.files_downloaded, 13);
    // One pause before the single page, none between its sub-resources
    assert!(summary.elapsed >= delay);
    assert!(summary.elapsed < delay * 4, "took {:?}", summary.elapsed);
}

#[tokio::test]
async fn test_concurrency_bounds_in_flight_fetches() {
    let server = MockServer::start().await;
    let arrivals = Arc::new(Mutex::new(Vec::new()));
    let delay = Duration::from_millis(300);

    mount_body(&server, "/", image_page(8), "text/html").await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/img/\d+\.png$"))
        .respond_with(SlowImage {
            arrivals: Arc::clone(&arrivals),
            delay,
        })
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&format!("{}/", server.uri()), &dir);
    config.crawler.concurrency = 2;

    let summary = Coordinator::new(config, Arc::new(TracingReporter))
        .unwrap()
        .run()
        .await
        .unwrap();
    assert_eq!(summary.files_downloaded, 9);

    let mut arrivals = arrivals.lock().unwrap().clone();
    arrivals.sort();
    assert_eq!(arrivals.len(), 8);

    // With two slots and slow responses, no window shorter than one
    // response time can see a third request start
    let window = Duration::from_millis(250);
    let peak = (0..arrivals.len())
        .map(|i| {
            arrivals[i..]
                .iter()
                .take_while(|at| at.duration_since(arrivals[i]) < window)
                .count()
        })
        .max()
        .unwrap_or(0);
    assert!(peak <= 2, "{} requests started within {:?}", peak, window);

    // Eight slow fetches through two slots take at least four rounds
    assert!(summary.elapsed >= delay * 4, "took {:?}", summary.elapsed);
}

#[tokio::test]
async fn test_scratch_write_failure_aborts_crawl() {
    let server = MockServer::start().await;
    mount_body(&server, "/", "<html><body>hello</body></html>", "text/html").await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&format!("{}/", server.uri()), &dir);
    let scratch = config.output.scratch_dir.clone();

    let coordinator = Coordinator::new(config, Arc::new(TracingReporter)).unwrap();

    // Replace the prepared scratch directory with a plain file
    std::fs::remove_dir_all(&scratch).unwrap();
    std::fs::write(&scratch, b"").unwrap();

    let result = coordinator.run().await;
    assert!(matches!(result, Err(MirrorError::Storage(_))), "{:?}", result.err());
}
