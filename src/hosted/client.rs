//! Hosted crawl API client
//!
//! Jobs are submitted with `POST {endpoint}/v1/crawl` and polled with
//! `GET {endpoint}/v1/crawl/{id}`. Completed jobs return their documents in
//! pages; each page carries the absolute URL of the next one in `next`.

use crate::config::HostedConfig;
use crate::{MirrorError, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Status value of a finished job
pub const STATUS_COMPLETED: &str = "completed";

/// One page of a crawl job's status
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CrawlStatus {
    #[serde(default)]
    pub status: String,

    #[serde(default)]
    pub completed: u64,

    #[serde(default)]
    pub total: u64,

    /// Documents in this page (only populated once the job completed)
    #[serde(default)]
    pub data: Vec<CrawlDocument>,

    /// Absolute URL of the next page, if any
    #[serde(default)]
    pub next: Option<String>,
}

impl CrawlStatus {
    pub fn is_completed(&self) -> bool {
        self.status == STATUS_COMPLETED
    }

    /// Returns true if the job ended without producing results
    pub fn is_failed(&self) -> bool {
        matches!(self.status.as_str(), "failed" | "cancelled")
    }

    /// The next-page cursor, ignoring empty strings
    pub fn next_cursor(&self) -> Option<&str> {
        self.next.as_deref().filter(|next| !next.is_empty())
    }
}

/// A crawled page as returned by the API
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CrawlDocument {
    #[serde(default)]
    pub markdown: Option<String>,

    #[serde(default)]
    pub metadata: DocumentMetadata,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DocumentMetadata {
    #[serde(rename = "sourceURL", default)]
    pub source_url: Option<String>,

    #[serde(rename = "modifiedTime", default)]
    pub modified_time: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SubmitRequest<'a> {
    url: &'a str,
    limit: u32,
    scrape_options: ScrapeOptions,
}

#[derive(Debug, Serialize)]
struct ScrapeOptions {
    formats: Vec<&'static str>,
}

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Transport for the hosted crawl API
#[allow(async_fn_in_trait)]
pub trait CrawlApi {
    /// Starts a crawl of `seed` and returns its job id
    async fn submit(&self, seed: &str, limit: u32) -> Result<String>;

    /// Fetches the current status (and first result page) of a job
    async fn status(&self, job_id: &str) -> Result<CrawlStatus>;

    /// Follows a `next` cursor to the following result page
    async fn next_page(&self, cursor: &str) -> Result<CrawlStatus>;
}

/// [`CrawlApi`] over HTTP
#[derive(Debug, Clone)]
pub struct HttpCrawlApi {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl HttpCrawlApi {
    pub fn new(client: Client, endpoint: &str, api_key: &str) -> Self {
        Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    pub fn from_config(client: Client, config: &HostedConfig) -> Self {
        Self::new(client, &config.endpoint, &config.api_key)
    }

    fn crawl_url(&self) -> String {
        format!("{}/v1/crawl", self.endpoint)
    }

    async fn get_status(&self, url: &str) -> Result<CrawlStatus> {
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|source| MirrorError::Http {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(MirrorError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.json::<CrawlStatus>().await.map_err(|source| MirrorError::Http {
            url: url.to_string(),
            source,
        })
    }
}

impl CrawlApi for HttpCrawlApi {
    async fn submit(&self, seed: &str, limit: u32) -> Result<String> {
        let url = self.crawl_url();
        let request = SubmitRequest {
            url: seed,
            limit,
            scrape_options: ScrapeOptions {
                formats: vec!["markdown"],
            },
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|source| MirrorError::Http {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(MirrorError::HostedApi(format!(
                "crawl submission for {} returned HTTP {}: {}",
                seed,
                status.as_u16(),
                body.trim()
            )));
        }

        let parsed: SubmitResponse = serde_json::from_str(&body)?;
        match parsed.id {
            Some(id) if parsed.success && !id.is_empty() => {
                tracing::info!("Submitted crawl job {} for {}", id, seed);
                Ok(id)
            }
            _ => Err(MirrorError::HostedApi(format!(
                "crawl submission for {} was rejected: {}",
                seed,
                parsed.error.unwrap_or_else(|| "no job id returned".to_string())
            ))),
        }
    }

    async fn status(&self, job_id: &str) -> Result<CrawlStatus> {
        self.get_status(&format!("{}/{}", self.crawl_url(), job_id))
            .await
    }

    async fn next_page(&self, cursor: &str) -> Result<CrawlStatus> {
        self.get_status(cursor).await
    }
}
