//! Integration tests for the mirror
//!
//! These tests use wiremock to create mock HTTP servers and run complete
//! mirror runs end-to-end into temporary output directories.

use std::fs;
use std::path::Path;
use sumi_mirror::config::Config;
use sumi_mirror::crawler::{mirror, Coordinator};
use sumi_mirror::{FailureKind, SkipReason};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a fast test configuration rooted at the mock server
fn create_test_config(server: &MockServer, out: &TempDir) -> Config {
    let mut config = Config::for_root(format!("{}/", server.uri()));
    config.crawler.max_depth = 1;
    config.crawler.politeness_delay_ms = 10; // Very short for testing
    config.fetcher.request_timeout_secs = 5;
    config.fetcher.backoff_step_ms = 10;
    config.output.directory = public_dir(out).display().to_string();
    config
}

fn public_dir(out: &TempDir) -> std::path::PathBuf {
    out.path().join("public")
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.as_bytes().to_vec(), "text/html")
}

async fn mount_page(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(html(body))
        .mount(server)
        .await;
}

fn count_files(dir: &Path) -> usize {
    fs::read_dir(dir)
        .unwrap()
        .map(|entry| {
            let path = entry.unwrap().path();
            if path.is_dir() {
                count_files(&path)
            } else {
                1
            }
        })
        .sum()
}

#[tokio::test]
async fn test_mirror_root_and_same_domain_link() {
    let server = MockServer::start().await;
    let out = TempDir::new().unwrap();

    mount_page(
        &server,
        "/",
        r#"<html><body>
            <a href="/about">About</a>
            <a href="http://other.com/x">Elsewhere</a>
        </body></html>"#,
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/about"))
        .respond_with(html("<html><body><h1>About us</h1></body></html>"))
        .expect(1)
        .mount(&server)
        .await;

    let summary = mirror(create_test_config(&server, &out)).await.unwrap();

    let public = public_dir(&out);
    assert!(public.join("index.html").is_file());
    assert_eq!(
        fs::read_to_string(public.join("about.html")).unwrap(),
        "<html><body><h1>About us</h1></body></html>"
    );
    assert_eq!(summary.pages_visited, 2);
    assert_eq!(summary.files_saved(), 2);
    assert_eq!(summary.stats.skip_count(SkipReason::CrossDomain), 1);
    assert_eq!(summary.output_dir, fs::canonicalize(&public).unwrap());
}

#[tokio::test]
async fn test_forbidden_retried_then_failed() {
    let server = MockServer::start().await;
    let out = TempDir::new().unwrap();

    mount_page(
        &server,
        "/",
        r#"<a href="/blocked">Blocked</a><a href="/open">Open</a>"#,
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/blocked"))
        .respond_with(ResponseTemplate::new(403))
        .expect(3)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/open"))
        .respond_with(html("<p>open</p>"))
        .expect(1)
        .mount(&server)
        .await;

    let summary = mirror(create_test_config(&server, &out)).await.unwrap();

    assert_eq!(summary.stats.failure_count(FailureKind::FetchFailed), 1);
    assert!(!public_dir(&out).join("blocked.html").exists());
    assert!(public_dir(&out).join("open.html").is_file());
    assert_eq!(summary.files_saved(), 2);
}

#[tokio::test]
async fn test_transient_server_error_recovers() {
    let server = MockServer::start().await;
    let out = TempDir::new().unwrap();

    mount_page(&server, "/", r#"<a href="/flaky">Flaky</a>"#).await;

    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(html("<p>eventually</p>"))
        .expect(1)
        .mount(&server)
        .await;

    let summary = mirror(create_test_config(&server, &out)).await.unwrap();

    assert!(public_dir(&out).join("flaky.html").is_file());
    assert_eq!(summary.total_failures(), 0);
}

#[tokio::test]
async fn test_not_found_is_not_retried() {
    let server = MockServer::start().await;
    let out = TempDir::new().unwrap();

    mount_page(&server, "/", r#"<a href="/missing">Missing</a>"#).await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let summary = mirror(create_test_config(&server, &out)).await.unwrap();

    assert_eq!(summary.stats.failure_count(FailureKind::NetworkTerminal), 1);
    assert_eq!(summary.stats.failure_count(FailureKind::FetchFailed), 0);
    assert_eq!(summary.files_saved(), 1);
}

#[tokio::test]
async fn test_trailing_slash_and_plain_paths() {
    let server = MockServer::start().await;
    let out = TempDir::new().unwrap();

    mount_page(
        &server,
        "/",
        r#"<a href="/services/">Services</a><a href="/services">Services page</a>"#,
    )
    .await;
    mount_page(&server, "/services/", "<p>directory</p>").await;
    mount_page(&server, "/services", "<p>page</p>").await;

    mirror(create_test_config(&server, &out)).await.unwrap();

    let public = public_dir(&out);
    assert_eq!(
        fs::read_to_string(public.join("services/index.html")).unwrap(),
        "<p>directory</p>"
    );
    assert_eq!(
        fs::read_to_string(public.join("services.html")).unwrap(),
        "<p>page</p>"
    );
}

#[tokio::test]
async fn test_depth_limit_respected() {
    let server = MockServer::start().await;
    let out = TempDir::new().unwrap();

    mount_page(&server, "/", r#"<a href="/level1">One</a>"#).await;
    mount_page(&server, "/level1", r#"<a href="/level2">Two</a>"#).await;

    Mock::given(method("GET"))
        .and(path("/level2"))
        .respond_with(html("<p>too deep</p>"))
        .expect(0)
        .mount(&server)
        .await;

    let summary = mirror(create_test_config(&server, &out)).await.unwrap();

    assert_eq!(summary.pages_visited, 2);
    assert_eq!(summary.stats.skip_count(SkipReason::DepthExceeded), 1);
    assert!(!public_dir(&out).join("level2.html").exists());
}

#[tokio::test]
async fn test_page_budget_respected() {
    let server = MockServer::start().await;
    let out = TempDir::new().unwrap();

    mount_page(
        &server,
        "/",
        r#"<a href="/a">A</a><a href="/b">B</a><a href="/c">C</a>"#,
    )
    .await;
    mount_page(&server, "/a", "<p>a</p>").await;

    for route in ["/b", "/c"] {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(html("<p>over budget</p>"))
            .expect(0)
            .mount(&server)
            .await;
    }

    let mut config = create_test_config(&server, &out);
    config.crawler.max_pages = 2;

    let summary = mirror(config).await.unwrap();

    assert_eq!(summary.pages_visited, 2);
    assert_eq!(summary.stats.pages_saved, 2);
    assert_eq!(summary.stats.skip_count(SkipReason::BudgetExceeded), 2);
}

#[tokio::test]
async fn test_assets_saved_and_excluded_links_ignored() {
    let server = MockServer::start().await;
    let out = TempDir::new().unwrap();

    mount_page(
        &server,
        "/",
        r#"<html>
        <head>
            <link rel="stylesheet" href="/css/site.css">
            <script src="/js/app.js"></script>
        </head>
        <body>
            <img src="/images/logo.png">
            <a href="/menu.pdf">Menu</a>
        </body>
        </html>"#,
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/css/site.css"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(b"body{}".to_vec(), "text/css"))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/js/app.js"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(b"init();".to_vec(), "application/javascript"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let png = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0x00];
    Mock::given(method("GET"))
        .and(path("/images/logo.png"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(png.clone(), "image/png"))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/menu.pdf"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = create_test_config(&server, &out);
    config.crawler.max_depth = 0;

    let summary = mirror(config).await.unwrap();

    let public = public_dir(&out);
    assert_eq!(fs::read(public.join("css/site.css")).unwrap(), b"body{}");
    assert_eq!(fs::read(public.join("js/app.js")).unwrap(), b"init();");
    assert_eq!(fs::read(public.join("images/logo.png")).unwrap(), png);
    assert_eq!(summary.stats.assets_saved, 3);
    assert_eq!(summary.stats.pages_saved, 1);
}

#[tokio::test]
async fn test_navigational_link_rel_does_not_block_page() {
    let server = MockServer::start().await;
    let out = TempDir::new().unwrap();

    mount_page(&server, "/", r#"<a href="/a">A</a><a href="/b">B</a>"#).await;
    mount_page(
        &server,
        "/a",
        r#"<head><link rel="next" href="/p2"></head><body>A</body>"#,
    )
    .await;
    mount_page(&server, "/b", r#"<a href="/p2">Page two</a>"#).await;
    mount_page(&server, "/p2", r#"<a href="/deep">Deeper</a>"#).await;
    mount_page(&server, "/deep", "<p>Bottom</p>").await;

    let mut config = create_test_config(&server, &out);
    config.crawler.max_depth = 3;

    let summary = mirror(config).await.unwrap();

    let public = public_dir(&out);
    assert!(public.join("p2.html").exists());
    assert!(public.join("deep.html").exists());
    assert_eq!(summary.pages_visited, 5);
    assert_eq!(summary.stats.assets_saved, 0);
}

#[tokio::test]
async fn test_each_url_fetched_once_with_several_workers() {
    let server = MockServer::start().await;
    let out = TempDir::new().unwrap();

    let nav = r#"<link rel="stylesheet" href="/shared.css">
        <a href="/">Home</a><a href="/a">A</a><a href="/b">B</a>
        <a href="/c">C</a><a href="/d">D</a><a href="/a#top">A again</a>"#;

    for route in ["/", "/a", "/b", "/c", "/d"] {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(html(nav))
            .expect(1)
            .mount(&server)
            .await;
    }

    Mock::given(method("GET"))
        .and(path("/shared.css"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(b"a{}".to_vec(), "text/css"))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = create_test_config(&server, &out);
    config.crawler.workers = 4;
    config.crawler.max_depth = 3;

    let summary = mirror(config).await.unwrap();

    assert_eq!(summary.pages_visited, 5);
    assert_eq!(summary.files_saved(), 6);
    assert!(summary.stats.skip_count(SkipReason::AlreadyVisited) > 0);
}

#[tokio::test]
async fn test_other_port_is_cross_domain() {
    let server = MockServer::start().await;
    let other = MockServer::start().await;
    let out = TempDir::new().unwrap();

    mount_page(
        &server,
        "/",
        &format!(r#"<a href="{}/elsewhere">Other port</a>"#, other.uri()),
    )
    .await;

    Mock::given(method("GET"))
        .respond_with(html("<p>should not be fetched</p>"))
        .expect(0)
        .mount(&other)
        .await;

    let summary = mirror(create_test_config(&server, &out)).await.unwrap();

    assert_eq!(summary.stats.skip_count(SkipReason::CrossDomain), 1);
    assert_eq!(summary.files_saved(), 1);
}

#[tokio::test]
async fn test_io_failure_does_not_stop_run() {
    let server = MockServer::start().await;
    let out = TempDir::new().unwrap();

    mount_page(
        &server,
        "/",
        r#"<a href="/blog/post">Post</a><a href="/contact">Contact</a>"#,
    )
    .await;
    mount_page(&server, "/blog/post", "<p>post</p>").await;
    mount_page(&server, "/contact", "<p>contact</p>").await;

    // A regular file where the blog directory needs to go
    let public = public_dir(&out);
    fs::create_dir_all(&public).unwrap();
    fs::write(public.join("blog"), b"not a directory").unwrap();

    let summary = mirror(create_test_config(&server, &out)).await.unwrap();

    assert_eq!(summary.stats.failure_count(FailureKind::IoFailure), 1);
    assert!(public.join("contact.html").is_file());
    assert_eq!(summary.files_saved(), 2);
}

#[tokio::test]
async fn test_redirect_saved_under_requested_path() {
    let server = MockServer::start().await;
    let out = TempDir::new().unwrap();

    mount_page(&server, "/", r#"<a href="/old">Old</a>"#).await;

    let location = format!("{}/new", server.uri());
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", location.as_str()))
        .mount(&server)
        .await;
    mount_page(&server, "/new", "<p>moved here</p>").await;

    mirror(create_test_config(&server, &out)).await.unwrap();

    assert_eq!(
        fs::read_to_string(public_dir(&out).join("old.html")).unwrap(),
        "<p>moved here</p>"
    );
}

#[tokio::test]
async fn test_saved_files_match_summary() {
    let server = MockServer::start().await;
    let out = TempDir::new().unwrap();

    mount_page(
        &server,
        "/",
        r#"<img src="/logo.gif"><a href="/about">About</a><a href="/team/">Team</a>
           <a href="/missing">Missing</a>"#,
    )
    .await;
    mount_page(&server, "/about", "<p>about</p>").await;
    mount_page(&server, "/team/", r#"<a href="../about">About</a>"#).await;

    Mock::given(method("GET"))
        .and(path("/logo.gif"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(b"GIF89a".to_vec(), "image/gif"))
        .mount(&server)
        .await;

    let summary = mirror(create_test_config(&server, &out)).await.unwrap();

    let public = public_dir(&out);
    assert_eq!(count_files(&public) as u64, summary.files_saved());
    for record in summary.stats.saved() {
        let local = record.local_path.as_ref().unwrap();
        assert!(public.join(local).is_file(), "missing {}", local.display());
    }
    assert_eq!(summary.stats.failed().count(), 1);
}

#[tokio::test]
async fn test_markdown_report_written() {
    let server = MockServer::start().await;
    let out = TempDir::new().unwrap();

    mount_page(&server, "/", "<p>home</p>").await;

    let report = out.path().join("report.md");
    let mut config = create_test_config(&server, &out);
    config.output.summary_path = Some(report.display().to_string());

    mirror(config).await.unwrap();

    let contents = fs::read_to_string(&report).unwrap();
    assert!(contents.contains("# Sumi-Mirror Run Summary"));
    assert!(contents.contains("- **Pages Visited**: 1"));
    assert!(contents.contains("index.html"));
}

#[tokio::test]
async fn test_cancelled_run_stops_early() {
    let server = MockServer::start().await;
    let out = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .respond_with(html("<p>never</p>"))
        .expect(0)
        .mount(&server)
        .await;

    let coordinator = Coordinator::new(create_test_config(&server, &out))
        .await
        .unwrap();
    coordinator.cancel_token().cancel();

    let summary = coordinator.run().await.unwrap();

    assert!(summary.cancelled);
    assert_eq!(summary.pages_visited, 0);
    // The output directory is created even when nothing is fetched
    assert!(public_dir(&out).is_dir());
}
