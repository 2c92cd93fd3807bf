//! Storage module for persisting mirror state
//!
//! This module handles the metadata document that ties remote URLs to local
//! artifacts across runs:
//! - Document types (input configuration, status, page records, folder set)
//! - Loading, which is a required precondition of every pass
//! - Atomic full-document saves after every unit of progress

mod json;
mod metadata;
mod traits;

pub use json::JsonFileStore;
pub use metadata::{MetadataInput, MetadataOutput, MetadataRecord, PageRecord};
pub use traits::MetadataStore;
