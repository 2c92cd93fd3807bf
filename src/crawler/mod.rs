//! Crawler module for the link-following backend
//!
//! This module contains the same-process crawling logic, including:
//! - HTTP fetching and response classification
//! - HTML parsing and link extraction
//! - Overall pass coordination over a per-seed work-list

mod coordinator;
mod fetcher;
mod parser;

pub use coordinator::{run_crawl, Coordinator};
pub use fetcher::{build_http_client, fetch_page, FetchResult};
pub use parser::{parse_html, ParsedPage};
