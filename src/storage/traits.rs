//! Storage trait for the metadata document

use crate::storage::MetadataRecord;
use crate::Result;

/// Trait for metadata store implementations
///
/// The store holds exactly one document. `load` is a required precondition
/// of every pass; `save` replaces the whole document.
pub trait MetadataStore {
    /// Loads the document, failing if it is missing or malformed
    fn load(&self) -> Result<MetadataRecord>;

    /// Overwrites the document with `record`
    ///
    /// A reader must observe either the previous document or the new one,
    /// never a partial write.
    fn save(&self, record: &MetadataRecord) -> Result<()>;
}
