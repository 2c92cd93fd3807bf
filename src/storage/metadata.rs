//! The persisted metadata document
//!
//! One JSON document per mirror, at `<working_dir>/.metadata.json` by default:
//!
//! ```json
//! {
//!   "input":  { "urls": ["http://a.test/"], "exclude": [] },
//!   "output": {
//!     "status": "", "error": "",
//!     "scrape_job_ids": {},
//!     "pages": { "http://a.test/": { "path": "...", "url": "...", "last_update": "..." } },
//!     "folders": ["/mirror/a.test"]
//!   }
//! }
//! ```

use crate::url::normalize_identifier;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

/// The whole metadata document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataRecord {
    pub input: MetadataInput,
    #[serde(default)]
    pub output: MetadataOutput,
}

/// Caller-supplied configuration for the mirror
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataInput {
    /// Seed URLs
    #[serde(default)]
    pub urls: Vec<String>,

    /// Single seed URL (older documents); merged with `urls`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// URLs that must never be mirrored
    #[serde(default)]
    pub exclude: Vec<String>,
}

/// State written back by the mirror
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataOutput {
    /// Progress message; empty once a pass completes cleanly
    #[serde(default)]
    pub status: String,

    /// Failures from the last pass; empty when there were none
    #[serde(default)]
    pub error: String,

    /// Hosted crawl job per seed URL, present while a job is in flight
    #[serde(default)]
    pub scrape_job_ids: BTreeMap<String, String>,

    /// Mirrored artifacts keyed by identifier
    #[serde(default)]
    pub pages: BTreeMap<String, PageRecord>,

    /// Mirror folders holding at least one live artifact
    #[serde(default)]
    pub folders: BTreeSet<PathBuf>,
}

/// One mirrored artifact (page or PDF)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRecord {
    /// Local file the artifact was written to
    pub path: PathBuf,

    /// Remote URL the artifact came from
    pub url: String,

    /// Remote modification time when known, otherwise the time it was written
    pub last_update: String,
}

impl PageRecord {
    /// Creates a record stamped with the current time
    pub fn now(path: PathBuf, url: impl Into<String>) -> Self {
        Self {
            path,
            url: url.into(),
            last_update: chrono::Utc::now().to_rfc3339(),
        }
    }
}

impl MetadataRecord {
    /// Seed URLs in document order, with the legacy single `url` first
    pub fn seed_urls(&self) -> Vec<String> {
        let mut seeds: Vec<String> = Vec::new();
        for seed in self.input.url.iter().chain(self.input.urls.iter()) {
            let seed = seed.trim();
            if !seed.is_empty() && !seeds.iter().any(|s| s == seed) {
                seeds.push(seed.to_string());
            }
        }
        seeds
    }

    /// The exclusion list in identifier form
    ///
    /// Entries that don't parse as URLs are kept verbatim so they still
    /// match by exact comparison.
    pub fn exclusion_ids(&self) -> Vec<String> {
        self.input
            .exclude
            .iter()
            .map(|raw| match normalize_identifier(raw) {
                Ok(url) => url.to_string(),
                Err(_) => raw.trim().to_string(),
            })
            .collect()
    }

    /// Records (or overwrites) the artifact for an identifier
    pub fn record_page(&mut self, id: impl Into<String>, record: PageRecord) {
        self.output.pages.insert(id.into(), record);
    }

    /// Sets the progress status message
    pub fn set_status(&mut self, status: impl Into<String>) {
        self.output.status = status.into();
    }
}
