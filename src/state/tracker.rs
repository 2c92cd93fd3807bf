use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};

/// Run-scoped bookkeeping for a single crawl pass
///
/// Owns the visited set, the immutable exclusion set, and the folders
/// touched during the pass. Identifiers are the canonical URL strings
/// produced by [`crate::url::normalize_identifier`].
#[derive(Debug, Clone, Default)]
pub struct CrawlState {
    /// Identifiers successfully processed this pass
    visited: HashSet<String>,

    /// Identifiers already scheduled for fetching this pass
    seen: HashSet<String>,

    /// Identifiers that must never be written (fixed for the pass)
    excluded: HashSet<String>,

    /// Mirror folders holding at least one artifact written or re-affirmed this pass
    folders: BTreeSet<PathBuf>,

    /// Remote-crawl-level failures recorded during the pass
    errors: Vec<String>,
}

impl CrawlState {
    /// Creates tracker state for a new pass with the given exclusion set
    pub fn new<I>(excluded: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        Self {
            excluded: excluded.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Records an identifier as successfully processed
    pub fn mark_visited(&mut self, id: &str) {
        self.seen.insert(id.to_string());
        self.visited.insert(id.to_string());
    }

    /// Returns true if the identifier was already processed this pass
    pub fn is_visited(&self, id: &str) -> bool {
        self.visited.contains(id)
    }

    /// Returns true if the identifier is in the exclusion set
    pub fn is_excluded(&self, id: &str) -> bool {
        self.excluded.contains(id)
    }

    /// Claims an identifier for fetching
    ///
    /// Returns false if it was already claimed or visited this pass, which is
    /// what keeps link cycles from being fetched twice.
    pub fn try_schedule(&mut self, id: &str) -> bool {
        !self.visited.contains(id) && self.seen.insert(id.to_string())
    }

    /// Records a folder as holding live artifacts this pass
    pub fn touch_folder(&mut self, path: &Path) {
        if !self.folders.contains(path) {
            self.folders.insert(path.to_path_buf());
        }
    }

    /// Number of identifiers processed this pass
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    /// The visited set
    pub fn visited(&self) -> &HashSet<String> {
        &self.visited
    }

    /// The exclusion set
    pub fn excluded(&self) -> &HashSet<String> {
        &self.excluded
    }

    /// Folders touched so far
    pub fn folders(&self) -> &BTreeSet<PathBuf> {
        &self.folders
    }

    /// Records a remote-crawl-level failure for the pass
    pub fn record_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    /// Failures recorded during the pass, joined for the metadata `error` field
    pub fn error_summary(&self) -> String {
        self.errors.join("; ")
    }
}
