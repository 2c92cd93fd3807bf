//! Output module for writing mirror artifacts
//!
//! This module handles:
//! - Converting page HTML to Markdown
//! - Writing Markdown and binary artifacts under the working directory
//! - Streaming remote PDFs to disk

mod markdown;
mod writer;

pub use markdown::MarkdownConverter;
pub use writer::ArtifactWriter;
