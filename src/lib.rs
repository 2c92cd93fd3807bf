//! Site-Mirror: an incremental web-to-Markdown mirror
//!
//! This crate mirrors web pages (and linked PDF documents) into a local
//! directory tree, and keeps that tree consistent across runs by reconciling
//! each pass against a persisted metadata document.

pub mod config;
pub mod crawler;
pub mod hosted;
pub mod output;
pub mod reconcile;
pub mod session;
pub mod state;
pub mod storage;
pub mod url;

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Site-Mirror operations
#[derive(Debug, Error)]
pub enum MirrorError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Unexpected HTTP status {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Metadata file not found: {}", .0.display())]
    MetadataMissing(PathBuf),

    #[error("Path {} is outside the working directory", .0.display())]
    OutsideWorkingDir(PathBuf),

    #[error("Markdown conversion failed for {url}: {message}")]
    Convert { url: String, message: String },

    #[error("Hosted crawl API error: {0}")]
    HostedApi(String),

    #[error("Crawl job {job_id} ended with status '{status}'")]
    JobFailed { job_id: String, status: String },

    #[error("Gave up after {attempts} attempts: {last_error}")]
    RetriesExhausted { attempts: u32, last_error: String },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Unknown crawl mode: {0}")]
    UnknownMode(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,

    #[error("Path segment not allowed in a mirror path: {0}")]
    PathTraversal(String),

    #[error("URL has no file path: {0}")]
    EmptyPath(String),
}

/// Result type alias for Site-Mirror operations
pub type Result<T> = std::result::Result<T, MirrorError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::{Config, CrawlMode};
pub use reconcile::reconcile;
pub use session::MirrorSession;
pub use state::CrawlState;
pub use storage::{MetadataRecord, PageRecord};
pub use crate::url::{map_page_path, map_pdf_path, normalize_identifier};
