//! A single mirror pass
//!
//! Holds the loaded metadata document, the pass's tracker state and the
//! artifact writer, and implements the per-item steps shared by both crawl
//! backends: map, write, record, and finally reconcile and commit. The
//! backends decide when to [`MirrorSession::commit`]; every commit is a full
//! document rewrite.

use crate::output::ArtifactWriter;
use crate::reconcile::{reconcile_state, ReconcileReport};
use crate::state::CrawlState;
use crate::storage::{MetadataRecord, MetadataStore, PageRecord};
use crate::url::{host_folder, is_within, map_page_path, map_pdf_path};
use crate::Result;
use std::path::{Path, PathBuf};
use url::Url;

/// State for one pass over the mirror
pub struct MirrorSession<S: MetadataStore> {
    store: S,
    working_dir: PathBuf,
    metadata: MetadataRecord,
    state: CrawlState,
    writer: ArtifactWriter,
}

impl<S: MetadataStore> MirrorSession<S> {
    /// Loads the metadata document and prepares tracker state for a new pass
    ///
    /// Fails if the document is missing or malformed.
    pub fn load(store: S, writer: ArtifactWriter) -> Result<Self> {
        let metadata = store.load()?;
        let state = CrawlState::new(metadata.exclusion_ids());
        let working_dir = writer.working_dir().to_path_buf();

        tracing::info!(
            "Loaded metadata: {} seeds, {} exclusions, {} recorded pages",
            metadata.seed_urls().len(),
            state.excluded().len(),
            metadata.output.pages.len()
        );

        Ok(Self {
            store,
            working_dir,
            metadata,
            state,
            writer,
        })
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    pub fn metadata(&self) -> &MetadataRecord {
        &self.metadata
    }

    pub fn metadata_mut(&mut self) -> &mut MetadataRecord {
        &mut self.metadata
    }

    pub fn state(&self) -> &CrawlState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut CrawlState {
        &mut self.state
    }

    /// Persists the current document
    pub fn commit(&self) -> Result<()> {
        self.store.save(&self.metadata)
    }

    /// Sets the status message and persists the document
    pub fn commit_status(&mut self, status: impl Into<String>) -> Result<()> {
        self.metadata.set_status(status);
        self.commit()
    }

    /// Records a remote-crawl-level failure and persists it to the `error` field
    pub fn commit_error(&mut self, message: impl Into<String>) -> Result<()> {
        let message = message.into();
        tracing::error!("{}", message);
        self.state.record_error(message);
        self.metadata.output.error = self.state.error_summary();
        self.commit()
    }

    /// Writes a page's Markdown to its mapped path and records it
    ///
    /// Failures are logged and leave any previous record for `id` untouched.
    ///
    /// # Returns
    ///
    /// `true` if the page was written and recorded
    pub async fn write_page(
        &mut self,
        id: &str,
        url: &Url,
        markdown: &str,
        last_update: Option<String>,
    ) -> bool {
        let (path, folder) = match (
            map_page_path(&self.working_dir, url),
            host_folder(&self.working_dir, url),
        ) {
            (Ok(path), Ok(folder)) => (path, folder),
            (Err(e), _) | (_, Err(e)) => {
                tracing::warn!("Skipping {}: {}", id, e);
                return false;
            }
        };

        if let Err(e) = self.writer.write(&path, markdown.as_bytes()).await {
            tracing::error!("Failed to write markdown for {} to {}: {}", id, path.display(), e);
            return false;
        }

        let mut record = PageRecord::now(path, url.as_str());
        if let Some(stamp) = last_update.filter(|s| !s.is_empty()) {
            record.last_update = stamp;
        }
        self.record(id, record, &folder);
        true
    }

    /// Downloads a PDF found while crawling `source` and records it
    ///
    /// # Returns
    ///
    /// `true` if the file was downloaded and recorded
    pub async fn download_pdf(&mut self, id: &str, source: &Url, link: &Url) -> bool {
        let (path, folder) = match (
            map_pdf_path(&self.working_dir, source, link),
            host_folder(&self.working_dir, source),
        ) {
            (Ok(path), Ok(folder)) => (path, folder),
            (Err(e), _) | (_, Err(e)) => {
                tracing::warn!("Skipping PDF {}: {}", id, e);
                return false;
            }
        };

        tracing::info!("Downloading PDF {}", link);
        if let Err(e) = self.writer.download(link, &path).await {
            tracing::error!("Failed to download PDF {}: {}", link, e);
            return false;
        }

        self.record(id, PageRecord::now(path, link.as_str()), &folder);
        true
    }

    /// Re-affirms an unchanged artifact without rewriting it
    ///
    /// Succeeds only if `id` is recorded and its file is still on disk.
    pub fn reaffirm(&mut self, id: &str, url: &Url) -> bool {
        let Some(record) = self.metadata.output.pages.get(id) else {
            return false;
        };
        if !is_within(&self.working_dir, &record.path) || !record.path.is_file() {
            return false;
        }

        match host_folder(&self.working_dir, url) {
            Ok(folder) => {
                self.state.touch_folder(&folder);
                self.state.mark_visited(id);
                tracing::debug!("Unchanged: {}", id);
                true
            }
            Err(_) => false,
        }
    }

    /// Reconciles the document against this pass and commits the final state
    ///
    /// Failures recorded during the pass are written back into `error`
    /// after reconciliation clears it.
    pub fn finish(mut self) -> Result<(MetadataRecord, ReconcileReport)> {
        let report = reconcile_state(&mut self.metadata, &self.working_dir, &self.state);
        self.metadata.output.error = self.state.error_summary();
        self.commit()?;

        tracing::info!(
            "Pass complete: {} artifacts mirrored, {} removed",
            self.metadata.output.pages.len(),
            report.pages_removed
        );
        Ok((self.metadata, report))
    }

    fn record(&mut self, id: &str, record: PageRecord, folder: &Path) {
        self.metadata.record_page(id, record);
        self.state.touch_folder(folder);
        self.state.mark_visited(id);
    }
}
