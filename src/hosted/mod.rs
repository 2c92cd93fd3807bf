//! Hosted crawl API backend
//!
//! This module contains:
//! - The crawl API transport (job submission, status, result paging)
//! - A bounded fixed-delay retry policy for status and paging calls
//! - The pass driver that writes completed job results into the mirror

mod client;
mod retry;
mod sync;

pub use client::{
    CrawlApi, CrawlDocument, CrawlStatus, DocumentMetadata, HttpCrawlApi, STATUS_COMPLETED,
};
pub use retry::RetryPolicy;
pub use sync::{run_hosted, HostedSync};
