//! Reconciliation of the persisted mirror against the current pass
//!
//! Every pass rebuilds the set of live identifiers and folders from scratch.
//! Anything the previous document records that the pass did not re-affirm
//! (or that is now excluded) is deleted from disk and dropped from the
//! document. Deletion is best-effort: a failure is logged and the sweep
//! carries on with the remaining entries.

use crate::state::CrawlState;
use crate::storage::MetadataRecord;
use crate::url::is_within;
use std::collections::{BTreeSet, HashSet};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Outcome of a reconciliation sweep
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Page records dropped from the document
    pub pages_removed: usize,

    /// Folders dropped from the document
    pub folders_removed: usize,

    /// Deletions that failed or were refused
    pub failures: usize,
}

/// Reconciles `metadata` against the identifiers and folders of the current pass
///
/// 1. Every page record whose identifier is not in `visited`, or is in
///    `excluded`, has its artifact deleted and its record removed.
/// 2. Every recorded folder not in `current_folders` is deleted recursively.
/// 3. The recorded folder set becomes `current_folders`.
/// 4. `status` and `error` are cleared.
///
/// Paths outside `working_dir` are never deleted; their records are still
/// dropped. A stale record's artifact is also kept when a live record points
/// at the same path.
pub fn reconcile(
    metadata: &mut MetadataRecord,
    working_dir: &Path,
    visited: &HashSet<String>,
    current_folders: &BTreeSet<PathBuf>,
    excluded: &HashSet<String>,
) -> ReconcileReport {
    let mut report = ReconcileReport::default();

    let stale: Vec<String> = metadata
        .output
        .pages
        .keys()
        .filter(|id| !visited.contains(*id) || excluded.contains(*id))
        .cloned()
        .collect();

    // Identifiers differing only in query or port share one artifact
    let live_paths: HashSet<PathBuf> = metadata
        .output
        .pages
        .iter()
        .filter(|(id, _)| visited.contains(*id) && !excluded.contains(*id))
        .map(|(_, record)| record.path.clone())
        .collect();

    for id in stale {
        let Some(record) = metadata.output.pages.remove(&id) else {
            continue;
        };
        report.pages_removed += 1;

        if live_paths.contains(&record.path) {
            tracing::debug!(
                "Keeping {} for {}: still used by a live record",
                record.path.display(),
                id
            );
            continue;
        }

        tracing::info!("Removing {} ({})", record.path.display(), id);
        if !remove_path(working_dir, &record.path) {
            report.failures += 1;
        } else {
            prune_empty_parents(working_dir, &record.path);
        }
    }

    for folder in metadata.output.folders.iter() {
        if current_folders.contains(folder) {
            continue;
        }

        tracing::info!("Removing folder {}", folder.display());
        if !remove_path(working_dir, folder) {
            report.failures += 1;
        }
        report.folders_removed += 1;
    }

    metadata.output.folders = current_folders.clone();
    metadata.output.status.clear();
    metadata.output.error.clear();

    tracing::info!(
        "Reconciliation removed {} pages and {} folders ({} failures)",
        report.pages_removed,
        report.folders_removed,
        report.failures
    );
    report
}

/// Reconciles `metadata` against everything `state` recorded this pass
pub fn reconcile_state(
    metadata: &mut MetadataRecord,
    working_dir: &Path,
    state: &CrawlState,
) -> ReconcileReport {
    reconcile(
        metadata,
        working_dir,
        state.visited(),
        state.folders(),
        state.excluded(),
    )
}

/// Deletes a file or directory tree; a path that is already gone counts as removed
fn remove_path(working_dir: &Path, path: &Path) -> bool {
    if !is_within(working_dir, path) {
        tracing::warn!(
            "Refusing to delete {}: outside working directory {}",
            path.display(),
            working_dir.display()
        );
        return false;
    }

    let result = match std::fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => std::fs::remove_dir_all(path),
        Ok(_) => std::fs::remove_file(path),
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => true,
        Err(e) if e.kind() == ErrorKind::NotFound => true,
        Err(e) => {
            tracing::error!("Failed to remove {}: {}", path.display(), e);
            false
        }
    }
}

/// Removes directories left empty above a deleted artifact
///
/// Stops at the first non-empty directory and never climbs to `working_dir`.
fn prune_empty_parents(working_dir: &Path, path: &Path) {
    let mut current = path.parent();
    while let Some(dir) = current {
        if !is_within(working_dir, dir) || std::fs::remove_dir(dir).is_err() {
            break;
        }
        tracing::debug!("Removed empty directory {}", dir.display());
        current = dir.parent();
    }
}
