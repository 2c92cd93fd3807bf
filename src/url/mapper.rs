//! Path mapping from remote URLs to local mirror files
//!
//! Pages map to `<working_dir>/<hostname>/<segments...>/<last>.md`, with the
//! root path mapping to `index.md`. PDFs keep their original file name and
//! extension under `<working_dir>/<source host>/<link host>/<path>`.
//!
//! Empty and `.` segments are dropped before mapping, so `/docs//readme/`
//! and `/docs/readme` land on the same file, and a path with nothing left
//! after dropping them is the index page. A `..` segment is never mapped.

use crate::{UrlError, UrlResult};
use std::path::{Component, Path, PathBuf};
use url::Url;

/// File name used for the root page of a host
pub const INDEX_FILE: &str = "index.md";

/// Extension appended to mapped page files
pub const PAGE_EXTENSION: &str = "md";

/// Maps a hostname and URL path to the local Markdown file for that page
///
/// This is a pure function: the same inputs always yield the same path.
///
/// # Examples
///
/// ```
/// use std::path::{Path, PathBuf};
/// use site_mirror::url::map_path;
///
/// let root = Path::new("/mirror");
/// assert_eq!(map_path(root, "a.test", "/").unwrap(), PathBuf::from("/mirror/a.test/index.md"));
/// assert_eq!(
///     map_path(root, "a.test", "/docs/readme").unwrap(),
///     PathBuf::from("/mirror/a.test/docs/readme.md")
/// );
/// ```
pub fn map_path(working_dir: &Path, hostname: &str, url_path: &str) -> UrlResult<PathBuf> {
    let mut file_path = working_dir.join(checked_segment(hostname)?);
    let segments = path_segments(url_path)?;

    match segments.split_last() {
        None => file_path.push(INDEX_FILE),
        Some((last, parents)) => {
            for segment in parents {
                file_path.push(segment);
            }
            file_path.push(format!("{}.{}", last, PAGE_EXTENSION));
        }
    }

    Ok(file_path)
}

/// Maps a page URL to its local Markdown file
pub fn map_page_path(working_dir: &Path, url: &Url) -> UrlResult<PathBuf> {
    let hostname = url.host_str().ok_or(UrlError::MissingHost)?;
    map_path(working_dir, hostname, url.path())
}

/// Maps a PDF link, discovered while crawling `source`, to its local file
///
/// The file keeps the link's original name and extension.
pub fn map_pdf_path(working_dir: &Path, source: &Url, link: &Url) -> UrlResult<PathBuf> {
    let source_host = source.host_str().ok_or(UrlError::MissingHost)?;
    let link_host = link.host_str().ok_or(UrlError::MissingHost)?;

    let segments = path_segments(link.path())?;
    if segments.is_empty() {
        return Err(UrlError::EmptyPath(link.to_string()));
    }

    let mut file_path = working_dir
        .join(checked_segment(source_host)?)
        .join(checked_segment(link_host)?);
    file_path.extend(segments);
    Ok(file_path)
}

/// The mirror folder that holds everything mirrored from `url`'s host
pub fn host_folder(working_dir: &Path, url: &Url) -> UrlResult<PathBuf> {
    let hostname = url.host_str().ok_or(UrlError::MissingHost)?;
    Ok(working_dir.join(checked_segment(hostname)?))
}

/// Returns true if `path` lies strictly inside `working_dir`
///
/// Purely lexical: `..` components anywhere in `path` disqualify it.
pub fn is_within(working_dir: &Path, path: &Path) -> bool {
    if path
        .components()
        .any(|c| matches!(c, Component::ParentDir))
    {
        return false;
    }
    path != working_dir && path.starts_with(working_dir)
}

/// Splits a URL path into its non-empty segments, rejecting `..`
fn path_segments(url_path: &str) -> UrlResult<Vec<&str>> {
    url_path
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .map(checked_segment)
        .collect()
}

fn checked_segment(segment: &str) -> UrlResult<&str> {
    match segment {
        "" | "." => Err(UrlError::EmptyPath(segment.to_string())),
        ".." => Err(UrlError::PathTraversal(segment.to_string())),
        s if s.contains('\\') || s.contains('\0') => Err(UrlError::PathTraversal(s.to_string())),
        s => Ok(s),
    }
}
