//! URL handling module for Site-Mirror
//!
//! This module provides identifier normalization, the same-host traversal
//! policy, and the mapping from remote URLs to local mirror paths.

mod domain;
mod mapper;
mod normalize;

pub use domain::{is_pdf, same_host};
pub use mapper::{
    host_folder, is_within, map_page_path, map_path, map_pdf_path, INDEX_FILE, PAGE_EXTENSION,
};
pub use normalize::{normalize_identifier, normalize_parsed};
