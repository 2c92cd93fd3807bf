//! Integration tests for the hosted crawl API backend
//!
//! A wiremock server stands in for the crawl API; passes run end-to-end
//! through the HTTP client, retry policy and reconciler.

use crate::support::{files_under, read_metadata, write_input};
use site_mirror::config::Config;
use site_mirror::hosted::run_hosted;
use site_mirror::MirrorError;
use std::path::PathBuf;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SEED: &str = "http://a.test/";

fn config(server: &MockServer) -> Config {
    let mut config = Config::default();
    config.hosted.endpoint = server.uri();
    config.hosted.api_key = "secret".to_string();
    config.hosted.poll_interval_ms = 10;
    config.hosted.retry_delay_ms = 10;
    config
}

fn document(source: &str, modified: &str, markdown: &str) -> serde_json::Value {
    serde_json::json!({
        "markdown": markdown,
        "metadata": { "sourceURL": source, "modifiedTime": modified }
    })
}

async fn mount_submit(server: &MockServer, job_id: &str) {
    Mock::given(method("POST"))
        .and(path("/v1/crawl"))
        .and(header("authorization", "Bearer secret"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "success": true, "id": job_id })),
        )
        .mount(server)
        .await;
}

/// Mounts a job that reports progress once, then completes with two result pages
async fn mount_job(
    server: &MockServer,
    job_id: &str,
    first: Vec<serde_json::Value>,
    second: Vec<serde_json::Value>,
) {
    let job_path = format!("/v1/crawl/{}", job_id);
    let next = format!("{}{}?skip=1", server.uri(), job_path);

    Mock::given(method("GET"))
        .and(path(job_path.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "scraping", "completed": 1, "total": 3
        })))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(job_path.as_str()))
        .and(query_param("skip", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "completed", "completed": 3, "total": 3, "data": second
        })))
        .with_priority(2)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(job_path.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "completed", "completed": 3, "total": 3, "data": first, "next": next
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_hosted_pass_writes_all_result_pages() {
    let server = MockServer::start().await;
    mount_submit(&server, "job-1").await;
    mount_job(
        &server,
        "job-1",
        vec![
            document("http://a.test/", "t1", "# Home\n"),
            document("http://a.test/docs/readme", "t1", "# Readme\n"),
        ],
        vec![document("http://a.test/docs/guide/", "t1", "# Guide\n")],
    )
    .await;

    let dir = TempDir::new().unwrap();
    write_input(&dir, &[SEED.to_string()], &[]);

    let (metadata, _) = run_hosted(&config(&server), dir.path()).await.unwrap();

    assert_eq!(
        files_under(dir.path()),
        vec![
            PathBuf::from("a.test/docs/guide.md"),
            PathBuf::from("a.test/docs/readme.md"),
            PathBuf::from("a.test/index.md"),
        ]
    );
    assert_eq!(
        std::fs::read_to_string(dir.path().join("a.test/docs/readme.md")).unwrap(),
        "# Readme\n"
    );
    assert_eq!(metadata.output.pages.len(), 3);
    assert_eq!(metadata.output.pages["http://a.test/"].last_update, "t1");
    assert!(metadata.output.scrape_job_ids.is_empty());
    assert_eq!(metadata.output.status, "");
    assert_eq!(metadata.output.error, "");
    assert_eq!(read_metadata(&dir), metadata);
}

#[tokio::test]
async fn test_second_pass_keeps_unchanged_and_sweeps_missing() {
    let first_api = MockServer::start().await;
    mount_submit(&first_api, "job-1").await;
    mount_job(
        &first_api,
        "job-1",
        vec![
            document("http://a.test/", "t1", "# Home\n"),
            document("http://a.test/old", "t1", "# Old\n"),
        ],
        vec![],
    )
    .await;

    let dir = TempDir::new().unwrap();
    write_input(&dir, &[SEED.to_string()], &[]);
    run_hosted(&config(&first_api), dir.path()).await.unwrap();

    // Local edit to an unchanged page must survive the next pass
    let home = dir.path().join("a.test/index.md");
    std::fs::write(&home, "local").unwrap();

    let second_api = MockServer::start().await;
    mount_submit(&second_api, "job-2").await;
    mount_job(
        &second_api,
        "job-2",
        vec![document("http://a.test/", "t1", "# Home v2\n")],
        vec![],
    )
    .await;

    let (metadata, report) = run_hosted(&config(&second_api), dir.path()).await.unwrap();

    assert_eq!(std::fs::read_to_string(&home).unwrap(), "local");
    assert!(!dir.path().join("a.test/old.md").exists());
    assert_eq!(report.pages_removed, 1);
    assert_eq!(
        metadata.output.pages.keys().collect::<Vec<_>>(),
        vec!["http://a.test/"]
    );
}

#[tokio::test]
async fn test_changed_page_rewritten() {
    let server = MockServer::start().await;
    mount_submit(&server, "job-1").await;
    mount_job(
        &server,
        "job-1",
        vec![document("http://a.test/", "t1", "# Home\n")],
        vec![],
    )
    .await;

    let dir = TempDir::new().unwrap();
    write_input(&dir, &[SEED.to_string()], &[]);
    run_hosted(&config(&server), dir.path()).await.unwrap();

    let server = MockServer::start().await;
    mount_submit(&server, "job-2").await;
    mount_job(
        &server,
        "job-2",
        vec![document("http://a.test/", "t2", "# Home v2\n")],
        vec![],
    )
    .await;

    let (metadata, _) = run_hosted(&config(&server), dir.path()).await.unwrap();

    assert_eq!(
        std::fs::read_to_string(dir.path().join("a.test/index.md")).unwrap(),
        "# Home v2\n"
    );
    assert_eq!(metadata.output.pages["http://a.test/"].last_update, "t2");
}

#[tokio::test]
async fn test_failed_submission_is_fatal() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/crawl"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    write_input(&dir, &[SEED.to_string()], &[]);

    let result = run_hosted(&config(&server), dir.path()).await;

    assert!(matches!(result, Err(MirrorError::HostedApi(_))));
    assert!(read_metadata(&dir).output.scrape_job_ids.is_empty());
}

#[tokio::test]
async fn test_pagination_failure_keeps_job_for_resume() {
    let server = MockServer::start().await;
    mount_submit(&server, "job-1").await;
    let next = format!("{}/v1/crawl/job-1?skip=1", server.uri());
    Mock::given(method("GET"))
        .and(path("/v1/crawl/job-1"))
        .and(query_param("skip", "1"))
        .respond_with(ResponseTemplate::new(502))
        .expect(3)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/crawl/job-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "completed", "completed": 2, "total": 2,
            "data": [document("http://a.test/", "t1", "# Home\n")],
            "next": next
        })))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    write_input(&dir, &[SEED.to_string()], &[]);

    let result = run_hosted(&config(&server), dir.path()).await;

    assert!(matches!(
        result,
        Err(MirrorError::RetriesExhausted { attempts: 3, .. })
    ));
    let saved = read_metadata(&dir);
    assert_eq!(saved.output.scrape_job_ids["http://a.test/"], "job-1");
    assert_eq!(saved.output.status, "wrote 1 webpages to disk");
    assert!(dir.path().join("a.test/index.md").exists());
}

#[tokio::test]
async fn test_missing_metadata_is_fatal() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let result = run_hosted(&config(&server), dir.path()).await;

    assert!(matches!(result, Err(MirrorError::MetadataMissing(_))));
}
