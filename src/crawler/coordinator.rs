//! Crawler coordinator - link-following pass orchestration
//!
//! This module contains the main crawl loop for the link-following backend:
//! - Loading the metadata document and exclusion set
//! - Walking a FIFO work-list of same-host pages per seed
//! - Converting and writing pages, downloading linked PDFs
//! - Reconciling the mirror once every seed has been walked

use crate::config::{Config, CrawlerConfig};
use crate::crawler::parser::parse_html;
use crate::crawler::{build_http_client, fetch_page, FetchResult};
use crate::output::{ArtifactWriter, MarkdownConverter};
use crate::reconcile::ReconcileReport;
use crate::session::MirrorSession;
use crate::storage::{JsonFileStore, MetadataRecord, MetadataStore};
use crate::url::{is_pdf, normalize_identifier, normalize_parsed, same_host};
use crate::Result;
use reqwest::Client;
use std::collections::VecDeque;
use std::path::Path;
use url::Url;

/// Main crawler coordinator structure
pub struct Coordinator<S: MetadataStore = JsonFileStore> {
    session: MirrorSession<S>,
    client: Client,
    converter: MarkdownConverter,
    config: CrawlerConfig,
}

impl<S: MetadataStore> Coordinator<S> {
    /// Creates a new coordinator over a loaded session
    ///
    /// # Arguments
    ///
    /// * `session` - Session holding the loaded metadata document
    /// * `client` - HTTP client used for page fetches
    /// * `config` - Link-following crawler settings
    pub fn new(session: MirrorSession<S>, client: Client, config: CrawlerConfig) -> Self {
        Self {
            session,
            client,
            converter: MarkdownConverter::new(),
            config,
        }
    }

    /// Runs the pass over every seed, then reconciles and commits
    ///
    /// Per-page failures are logged and skipped. Only a failure to persist
    /// the metadata document aborts the pass.
    ///
    /// # Returns
    ///
    /// * `Ok((MetadataRecord, ReconcileReport))` - The committed document and sweep summary
    /// * `Err(MirrorError)` - The metadata document could not be saved
    pub async fn run(mut self) -> Result<(MetadataRecord, ReconcileReport)> {
        let seeds = self.session.metadata().seed_urls();
        tracing::info!("Starting link-following pass over {} seeds", seeds.len());

        for seed in &seeds {
            self.crawl_seed(seed).await?;
        }

        self.session.finish()
    }

    /// Walks every same-host page reachable from one seed
    async fn crawl_seed(&mut self, raw_seed: &str) -> Result<()> {
        let seed = match normalize_identifier(raw_seed) {
            Ok(seed) => seed,
            Err(e) => return self.session.commit_error(format!("{}: {}", raw_seed, e)),
        };

        if !self.session.state_mut().try_schedule(seed.as_str()) {
            tracing::debug!("Seed {} already crawled this pass", seed);
            return Ok(());
        }

        tracing::info!("Crawling from seed {}", seed);
        let mut queue = VecDeque::from([seed.clone()]);
        let mut fetched = 0usize;

        while let Some(url) = queue.pop_front() {
            if self.config.max_pages > 0 && fetched >= self.config.max_pages {
                tracing::warn!(
                    "Page limit {} reached for seed {}, {} queued pages dropped",
                    self.config.max_pages,
                    seed,
                    queue.len() + 1
                );
                break;
            }
            fetched += 1;

            let links = match self.process_page(&seed, &url).await? {
                Some(links) => links,
                None => continue,
            };

            for link in links {
                self.handle_link(&seed, link, &mut queue).await?;
            }
        }

        Ok(())
    }

    /// Fetches one page, writes it unless excluded, and returns its links
    ///
    /// Returns `None` when the page could not be fetched.
    async fn process_page(&mut self, seed: &Url, url: &Url) -> Result<Option<Vec<Url>>> {
        let id = url.as_str();
        tracing::debug!("Processing URL: {}", id);

        let (final_url, body) = match fetch_page(&self.client, id).await {
            FetchResult::Success {
                final_url, body, ..
            } => (final_url, body),
            other => {
                if url == seed {
                    self.session.commit_error(format!("{}: {}", id, other))?;
                } else {
                    tracing::warn!("Skipping {}: {}", id, other);
                }
                return Ok(None);
            }
        };

        // Relative links resolve against where the page actually lives
        let base = Url::parse(&final_url).unwrap_or_else(|_| url.clone());
        let parsed = parse_html(&body, &base);

        if self.session.state().is_excluded(id) {
            tracing::info!("Excluded, not writing: {}", id);
            return Ok(Some(parsed.links));
        }

        match self.converter.convert(&parsed.body_html, id) {
            Ok(markdown) => {
                if self.session.write_page(id, url, &markdown, None).await {
                    let count = self.session.state().visited_count();
                    self.session.commit_status(format!("scraped {} pages", count))?;
                }
            }
            Err(e) => tracing::warn!("{}", e),
        }

        Ok(Some(parsed.links))
    }

    /// Downloads a PDF link or enqueues a same-host page link
    async fn handle_link(&mut self, seed: &Url, link: Url, queue: &mut VecDeque<Url>) -> Result<()> {
        let link = match normalize_parsed(link) {
            Ok(link) => link,
            Err(e) => {
                tracing::debug!("Ignoring link: {}", e);
                return Ok(());
            }
        };
        let link_id = link.as_str();

        if is_pdf(&link) {
            if self.session.state().is_excluded(link_id)
                || !self.session.state_mut().try_schedule(link_id)
            {
                return Ok(());
            }
            if self.session.download_pdf(link_id, seed, &link).await {
                self.session.commit()?;
            }
            return Ok(());
        }

        if same_host(seed, &link) && self.session.state_mut().try_schedule(link_id) {
            queue.push_back(link);
        }
        Ok(())
    }
}

/// Runs a complete link-following pass
///
/// This function orchestrates the entire pass:
///
/// 1. Resolve the working directory and open the metadata document
/// 2. Build the HTTP client
/// 3. Walk every seed's same-host pages, writing Markdown and PDFs
/// 4. Reconcile the mirror and commit the final document
///
/// # Arguments
///
/// * `config` - The mirror configuration
/// * `working_dir` - Root of the mirror
///
/// # Example
///
/// ```no_run
/// use site_mirror::config::config_from_env;
/// use site_mirror::crawler::run_crawl;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = config_from_env()?;
/// let working_dir = config.working_dir()?;
/// run_crawl(&config, &working_dir).await?;
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(
    config: &Config,
    working_dir: &Path,
) -> Result<(MetadataRecord, ReconcileReport)> {
    let client = build_http_client(&config.crawler)?;
    let store = JsonFileStore::new(config.metadata_path(working_dir));
    let writer = ArtifactWriter::new(working_dir, client.clone());
    let session = MirrorSession::load(store, writer)?;

    Coordinator::new(session, client, config.crawler.clone())
        .run()
        .await
}
