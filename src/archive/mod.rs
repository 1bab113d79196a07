pub mod extractor;
pub mod inspector;

pub use extractor::{ArchiveExtractor, EntryReport};
pub use inspector::{is_tabular_entry, ArchiveInspector, ArchiveMetadata, EntryInfo};
