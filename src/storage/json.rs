use crate::storage::{MetadataRecord, MetadataStore};
use crate::{MirrorError, Result};
use std::path::{Path, PathBuf};

/// Metadata store backed by a single indented JSON file
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Creates a store for the document at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the document
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl MetadataStore for JsonFileStore {
    fn load(&self) -> Result<MetadataRecord> {
        if !self.path.is_file() {
            return Err(MirrorError::MetadataMissing(self.path.clone()));
        }

        let data = std::fs::read_to_string(&self.path)?;
        let record: MetadataRecord = serde_json::from_str(&data)?;
        tracing::debug!(
            "Loaded metadata from {} ({} pages, {} folders)",
            self.path.display(),
            record.output.pages.len(),
            record.output.folders.len()
        );
        Ok(record)
    }

    fn save(&self, record: &MetadataRecord) -> Result<()> {
        let data = serde_json::to_string_pretty(record)?;

        // Write beside the target and rename over it
        let temp = self.temp_path();
        std::fs::write(&temp, data)?;
        if let Err(e) = std::fs::rename(&temp, &self.path) {
            let _ = std::fs::remove_file(&temp);
            return Err(e.into());
        }

        tracing::trace!("Saved metadata to {}", self.path.display());
        Ok(())
    }
}
