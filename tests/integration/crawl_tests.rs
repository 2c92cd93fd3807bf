//! Integration tests for the link-following crawler
//!
//! These tests use wiremock to create mock HTTP servers and run full passes
//! (fetch, write, reconcile, commit) end-to-end against a temporary mirror.

use crate::support::{
    files_under, html, pdf, read_metadata, update_input, without_timestamps, write_input,
};
use site_mirror::config::Config;
use site_mirror::crawler::run_crawl;
use std::path::PathBuf;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PDF_BYTES: &[u8] = b"%PDF-1.4 mirror test";

/// Mounts the basic site: `/` links to `/docs/readme` and `/file.pdf`
async fn mount_site(server: &MockServer) {
    let base = server.uri();
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(&format!(
            r#"<h1>Home</h1>
            <a href="/docs/readme">Readme</a>
            <a href="{}/file.pdf">Manual</a>"#,
            base
        )))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/docs/readme"))
        .respond_with(html(r#"<h1>Readme</h1><a href="/">Home</a>"#))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/file.pdf"))
        .respond_with(pdf(PDF_BYTES))
        .mount(server)
        .await;
}

fn seed(server: &MockServer) -> String {
    format!("{}/", server.uri())
}

#[tokio::test]
async fn test_scenario_pages_and_pdf() {
    let server = MockServer::start().await;
    mount_site(&server).await;

    let dir = TempDir::new().unwrap();
    write_input(&dir, &[seed(&server)], &[]);

    let (metadata, report) = run_crawl(&Config::default(), dir.path()).await.unwrap();

    assert_eq!(
        files_under(dir.path()),
        vec![
            PathBuf::from("127.0.0.1/127.0.0.1/file.pdf"),
            PathBuf::from("127.0.0.1/docs/readme.md"),
            PathBuf::from("127.0.0.1/index.md"),
        ]
    );

    let base = server.uri();
    let ids: Vec<&String> = metadata.output.pages.keys().collect();
    assert_eq!(
        ids,
        vec![
            &format!("{}/", base),
            &format!("{}/docs/readme", base),
            &format!("{}/file.pdf", base),
        ]
    );

    let home = std::fs::read_to_string(dir.path().join("127.0.0.1/index.md")).unwrap();
    assert!(home.contains("Home"));
    assert_eq!(
        std::fs::read(dir.path().join("127.0.0.1/127.0.0.1/file.pdf")).unwrap(),
        PDF_BYTES
    );

    assert_eq!(
        metadata.output.folders.iter().collect::<Vec<_>>(),
        vec![&dir.path().join("127.0.0.1")]
    );
    assert_eq!(metadata.output.status, "");
    assert_eq!(metadata.output.error, "");
    assert_eq!(report.pages_removed, 0);

    // What was returned is what was committed
    assert_eq!(read_metadata(&dir), metadata);
}

#[tokio::test]
async fn test_rerun_is_idempotent() {
    let server = MockServer::start().await;
    mount_site(&server).await;

    let dir = TempDir::new().unwrap();
    write_input(&dir, &[seed(&server)], &[]);

    let (first, _) = run_crawl(&Config::default(), dir.path()).await.unwrap();
    let files_after_first = files_under(dir.path());
    let (second, report) = run_crawl(&Config::default(), dir.path()).await.unwrap();

    assert_eq!(without_timestamps(first), without_timestamps(second));
    assert_eq!(files_under(dir.path()), files_after_first);
    assert_eq!(report.pages_removed, 0);
    assert_eq!(report.folders_removed, 0);
}

#[tokio::test]
async fn test_unreachable_page_swept_on_next_pass() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(r#"<a href="/a">A</a><a href="/b">B</a><a href="/c">C</a>"#))
        .mount(&server)
        .await;
    for page in ["/a", "/b", "/c"] {
        Mock::given(method("GET"))
            .and(path(page))
            .respond_with(html(page))
            .mount(&server)
            .await;
    }

    let dir = TempDir::new().unwrap();
    write_input(&dir, &[seed(&server)], &[]);
    run_crawl(&Config::default(), dir.path()).await.unwrap();

    let a = dir.path().join("127.0.0.1/a.md");
    let b = dir.path().join("127.0.0.1/b.md");
    let c = dir.path().join("127.0.0.1/c.md");
    assert!(a.exists() && b.exists() && c.exists());

    // The site drops its link to /b
    server.reset().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(r#"<a href="/a">A</a><a href="/c">C</a>"#))
        .mount(&server)
        .await;
    for page in ["/a", "/c"] {
        Mock::given(method("GET"))
            .and(path(page))
            .respond_with(html(page))
            .mount(&server)
            .await;
    }

    let (metadata, report) = run_crawl(&Config::default(), dir.path()).await.unwrap();

    assert_eq!(report.pages_removed, 1);
    assert!(a.exists());
    assert!(!b.exists());
    assert!(c.exists());
    assert!(!metadata
        .output
        .pages
        .contains_key(&format!("{}/b", server.uri())));
    assert_eq!(metadata.output.pages.len(), 3);
}

#[tokio::test]
async fn test_dropped_query_variant_keeps_shared_file() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(r#"<a href="/docs?v=1">One</a><a href="/docs?v=2">Two</a>"#))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/docs"))
        .respond_with(html("docs"))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    write_input(&dir, &[seed(&server)], &[]);
    let (metadata, _) = run_crawl(&Config::default(), dir.path()).await.unwrap();

    let docs = dir.path().join("127.0.0.1/docs.md");
    assert!(docs.exists());
    assert_eq!(metadata.output.pages.len(), 3);

    // The site drops its link to the second variant
    server.reset().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(r#"<a href="/docs?v=1">One</a>"#))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/docs"))
        .respond_with(html("docs"))
        .mount(&server)
        .await;

    let (metadata, report) = run_crawl(&Config::default(), dir.path()).await.unwrap();

    assert_eq!(report.pages_removed, 1);
    assert_eq!(report.failures, 0);
    assert!(docs.exists());
    assert!(metadata
        .output
        .pages
        .contains_key(&format!("{}/docs?v=1", server.uri())));
    assert!(!metadata
        .output
        .pages
        .contains_key(&format!("{}/docs?v=2", server.uri())));
}

#[tokio::test]
async fn test_excluded_page_never_written_and_removed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(r#"<a href="/private">Private</a>"#))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/private"))
        .respond_with(html(r#"<p>secret</p><a href="/private/child">Child</a>"#))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/private/child"))
        .respond_with(html("child"))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    write_input(&dir, &[seed(&server)], &[]);
    run_crawl(&Config::default(), dir.path()).await.unwrap();

    let private = dir.path().join("127.0.0.1/private.md");
    assert!(private.exists());

    let excluded = format!("{}/private", server.uri());
    update_input(&dir, &[seed(&server)], &[excluded.clone()]);
    let (metadata, _) = run_crawl(&Config::default(), dir.path()).await.unwrap();

    assert!(!private.exists());
    assert!(!metadata.output.pages.contains_key(&excluded));

    // Links on the excluded page are still followed
    assert!(dir.path().join("127.0.0.1/private/child.md").exists());
    assert!(metadata
        .output
        .pages
        .contains_key(&format!("{}/private/child", server.uri())));
}

#[tokio::test]
async fn test_folder_pruned_when_seed_dropped() {
    let first = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html("first"))
        .mount(&first)
        .await;

    // Same address, addressed by name so it gets its own host folder
    let second = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html("second"))
        .mount(&second)
        .await;
    let second_seed = format!("http://localhost:{}/", second.address().port());

    let dir = TempDir::new().unwrap();
    write_input(&dir, &[seed(&first), second_seed], &[]);
    let (metadata, _) = run_crawl(&Config::default(), dir.path()).await.unwrap();

    let localhost = dir.path().join("localhost");
    assert!(localhost.join("index.md").exists());
    assert_eq!(metadata.output.folders.len(), 2);

    update_input(&dir, &[seed(&first)], &[]);
    let (metadata, report) = run_crawl(&Config::default(), dir.path()).await.unwrap();

    assert!(!localhost.exists());
    assert_eq!(report.folders_removed, 1);
    assert_eq!(
        metadata.output.folders.iter().collect::<Vec<_>>(),
        vec![&dir.path().join("127.0.0.1")]
    );
    assert_eq!(metadata.output.pages.len(), 1);
}

#[tokio::test]
async fn test_foreign_host_pdf_downloaded_but_not_traversed() {
    let foreign = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/papers/report.pdf"))
        .respond_with(pdf(PDF_BYTES))
        .expect(1)
        .mount(&foreign)
        .await;
    Mock::given(method("GET"))
        .and(path("/page"))
        .respond_with(html("foreign page"))
        .expect(0)
        .mount(&foreign)
        .await;
    let foreign_base = format!("http://localhost:{}", foreign.address().port());

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(&format!(
            r#"<a href="{0}/page">Page</a>
            <a href="{0}/papers/report.pdf">Report</a>
            <a href="{0}/papers/report.pdf">Report again</a>"#,
            foreign_base
        )))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    write_input(&dir, &[seed(&server)], &[]);
    let (metadata, _) = run_crawl(&Config::default(), dir.path()).await.unwrap();

    let report = dir.path().join("127.0.0.1/localhost/papers/report.pdf");
    assert_eq!(std::fs::read(&report).unwrap(), PDF_BYTES);
    assert!(!dir.path().join("localhost").exists());

    let record = &metadata.output.pages[&format!("{}/papers/report.pdf", foreign_base)];
    assert_eq!(record.path, report);
    assert_eq!(metadata.output.pages.len(), 2);
}

#[tokio::test]
async fn test_failed_pdf_download_not_recorded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(r#"<a href="/missing.pdf">Missing</a>"#))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/missing.pdf"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    write_input(&dir, &[seed(&server)], &[]);
    let (metadata, _) = run_crawl(&Config::default(), dir.path()).await.unwrap();

    assert_eq!(metadata.output.pages.len(), 1);
    assert!(!dir.path().join("127.0.0.1/127.0.0.1").exists());
    assert_eq!(metadata.output.error, "");
}

#[tokio::test]
async fn test_unreachable_seed_keeps_other_seeds() {
    let server = MockServer::start().await;
    mount_site(&server).await;

    let dir = TempDir::new().unwrap();
    let dead = "http://127.0.0.1:9/".to_string();
    write_input(&dir, &[dead.clone(), seed(&server)], &[]);

    let (metadata, _) = run_crawl(&Config::default(), dir.path()).await.unwrap();

    assert_eq!(metadata.output.pages.len(), 3);
    assert!(metadata.output.error.starts_with(&dead));
    assert_eq!(read_metadata(&dir).output.error, metadata.output.error);
}
