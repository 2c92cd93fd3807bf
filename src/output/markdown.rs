//! HTML to Markdown conversion
//!
//! Pages are converted from their `<body>` only; scripts, styles and other
//! non-content elements are dropped.

use crate::{MirrorError, Result};
use htmd::HtmlToMarkdown;

/// Tags whose content never belongs in the mirrored Markdown
const SKIPPED_TAGS: &[&str] = &["script", "style", "noscript", "template", "iframe"];

/// Converts HTML fragments to Markdown text
pub struct MarkdownConverter {
    inner: HtmlToMarkdown,
}

impl MarkdownConverter {
    /// Creates a converter that skips non-content tags
    pub fn new() -> Self {
        Self {
            inner: HtmlToMarkdown::builder()
                .skip_tags(SKIPPED_TAGS.to_vec())
                .build(),
        }
    }

    /// Converts `html` to Markdown
    ///
    /// `url` only labels the error.
    pub fn convert(&self, html: &str, url: &str) -> Result<String> {
        let markdown = self
            .inner
            .convert(html)
            .map_err(|e| MirrorError::Convert {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        let mut markdown = markdown.trim().to_string();
        markdown.push('\n');
        Ok(markdown)
    }
}

impl Default for MarkdownConverter {
    fn default() -> Self {
        Self::new()
    }
}
