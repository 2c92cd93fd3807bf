//! State module for tracking crawl progress
//!
//! This module provides the run-scoped bookkeeping for a pass: which
//! identifiers were visited, which are excluded, and which mirror folders
//! still hold live artifacts. Nothing here outlives the pass; the persisted
//! view lives in [`crate::storage`].

mod tracker;

pub use tracker::CrawlState;
