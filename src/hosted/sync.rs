//! Hosted crawl pass
//!
//! For each seed a crawl job is submitted (or resumed from the recorded job
//! id), polled until it completes, and its result pages are written into the
//! mirror. The job id stays in the metadata document until every result page
//! has been consumed, so an interrupted pass picks the same job back up.

use crate::config::{Config, HostedConfig};
use crate::crawler::build_http_client;
use crate::hosted::client::{CrawlApi, CrawlDocument, CrawlStatus, HttpCrawlApi};
use crate::hosted::retry::RetryPolicy;
use crate::output::ArtifactWriter;
use crate::reconcile::ReconcileReport;
use crate::session::MirrorSession;
use crate::storage::{JsonFileStore, MetadataRecord, MetadataStore};
use crate::url::normalize_identifier;
use crate::{MirrorError, Result};
use std::path::Path;
use std::time::Duration;

/// Drives one pass against the hosted crawl API
pub struct HostedSync<A: CrawlApi, S: MetadataStore = JsonFileStore> {
    api: A,
    session: MirrorSession<S>,
    retry: RetryPolicy,
    page_limit: u32,
    poll_interval: Duration,
    max_polls: u32,
    written: usize,
}

impl<A: CrawlApi, S: MetadataStore> HostedSync<A, S> {
    pub fn new(api: A, session: MirrorSession<S>, config: &HostedConfig) -> Self {
        Self {
            api,
            session,
            retry: RetryPolicy::from_config(config),
            page_limit: config.page_limit,
            poll_interval: Duration::from_millis(config.poll_interval_ms),
            max_polls: config.max_polls.max(1),
            written: 0,
        }
    }

    /// Syncs every seed, then reconciles and commits
    ///
    /// # Returns
    ///
    /// * `Ok((MetadataRecord, ReconcileReport))` - The committed document and sweep summary
    /// * `Err(MirrorError)` - A job could not be submitted, polled or paged
    ///   through, or the metadata document could not be saved. The mirror is
    ///   left unreconciled.
    pub async fn run(mut self) -> Result<(MetadataRecord, ReconcileReport)> {
        let seeds = self.session.metadata().seed_urls();
        tracing::info!("Starting hosted crawl pass over {} seeds", seeds.len());

        for seed in &seeds {
            self.sync_seed(seed).await?;
        }

        self.session.finish()
    }

    async fn sync_seed(&mut self, raw_seed: &str) -> Result<()> {
        let seed = match normalize_identifier(raw_seed) {
            Ok(seed) => seed.to_string(),
            Err(e) => return self.session.commit_error(format!("{}: {}", raw_seed, e)),
        };

        let job_id = self.ensure_job(&seed).await?;
        let Some(mut status) = self.wait_for_completion(&seed, &job_id).await? else {
            return Ok(());
        };

        loop {
            for document in std::mem::take(&mut status.data) {
                self.store_document(document).await?;
            }

            let Some(cursor) = status.next_cursor().map(str::to_string) else {
                break;
            };
            tracing::debug!("Fetching next result page for job {}", job_id);
            status = self
                .retry
                .run("Fetching next result page", || self.api.next_page(&cursor))
                .await?;
        }

        self.session
            .metadata_mut()
            .output
            .scrape_job_ids
            .remove(&seed);
        self.session.commit()
    }

    /// Returns the recorded job for `seed`, submitting a new one if there is none
    async fn ensure_job(&mut self, seed: &str) -> Result<String> {
        if let Some(job_id) = self.session.metadata().output.scrape_job_ids.get(seed) {
            tracing::info!("Resuming crawl job {} for {}", job_id, seed);
            return Ok(job_id.clone());
        }

        let job_id = self.api.submit(seed, self.page_limit).await?;
        self.session
            .metadata_mut()
            .output
            .scrape_job_ids
            .insert(seed.to_string(), job_id.clone());
        self.session.commit()?;
        Ok(job_id)
    }

    /// Polls a job until it completes
    ///
    /// Returns `None` if the job failed or was cancelled; the failure is
    /// recorded and the job id dropped.
    async fn wait_for_completion(&mut self, seed: &str, job_id: &str) -> Result<Option<CrawlStatus>> {
        for _ in 0..self.max_polls {
            let status = self
                .retry
                .run("Checking crawl status", || self.api.status(job_id))
                .await?;

            if status.is_completed() {
                return Ok(Some(status));
            }

            if status.is_failed() {
                self.session
                    .metadata_mut()
                    .output
                    .scrape_job_ids
                    .remove(seed);
                let failure = MirrorError::JobFailed {
                    job_id: job_id.to_string(),
                    status: status.status,
                };
                self.session.commit_error(format!("{}: {}", seed, failure))?;
                return Ok(None);
            }

            let progress = format!(
                "crawling status: {}, completed {}, total {}",
                status.status, status.completed, status.total
            );
            tracing::info!("{}", progress);
            self.session.commit_status(progress)?;
            tokio::time::sleep(self.poll_interval).await;
        }

        Err(MirrorError::HostedApi(format!(
            "crawl job {} for {} did not complete after {} status checks",
            job_id, seed, self.max_polls
        )))
    }

    /// Writes one result document, or re-affirms it if unchanged
    async fn store_document(&mut self, document: CrawlDocument) -> Result<()> {
        let Some(source) = document.metadata.source_url else {
            tracing::warn!("Skipping result without a source URL");
            return Ok(());
        };
        let url = match normalize_identifier(&source) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!("Skipping result {}: {}", source, e);
                return Ok(());
            }
        };
        let id = url.to_string();

        if self.session.state().is_excluded(&id) {
            tracing::info!("Excluded, not writing: {}", id);
            return Ok(());
        }
        if !self.session.state_mut().try_schedule(&id) {
            tracing::debug!("Duplicate result for {}", id);
            return Ok(());
        }

        let last_update = document.metadata.modified_time.filter(|s| !s.is_empty());
        let unchanged = match (&last_update, self.session.metadata().output.pages.get(&id)) {
            (Some(stamp), Some(record)) => record.last_update == *stamp,
            _ => false,
        };
        if unchanged && self.session.reaffirm(&id, &url) {
            return Ok(());
        }

        let markdown = document.markdown.unwrap_or_default();
        if self.session.write_page(&id, &url, &markdown, last_update).await {
            self.written += 1;
            let status = format!("wrote {} webpages to disk", self.written);
            tracing::info!("{}", status);
            self.session.commit_status(status)?;
        }
        Ok(())
    }
}

/// Runs a complete hosted crawl pass
///
/// # Arguments
///
/// * `config` - The mirror configuration
/// * `working_dir` - Root of the mirror
pub async fn run_hosted(
    config: &Config,
    working_dir: &Path,
) -> Result<(MetadataRecord, ReconcileReport)> {
    let client = build_http_client(&config.crawler)?;
    let store = JsonFileStore::new(config.metadata_path(working_dir));
    let writer = ArtifactWriter::new(working_dir, client.clone());
    let session = MirrorSession::load(store, writer)?;
    let api = HttpCrawlApi::from_config(client, &config.hosted);

    HostedSync::new(api, session, &config.hosted).run().await
}
