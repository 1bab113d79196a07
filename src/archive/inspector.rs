use crate::error::Result;
use serde::Serialize;
use std::fs::File;
use std::path::Path;
use zip::ZipArchive;

const TABULAR_EXTENSION: &str = ".csv";

#[derive(Debug, Clone, Serialize)]
pub struct EntryInfo {
    pub index: usize,
    pub name: String,
    pub size: u64,
    pub compressed_size: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ArchiveMetadata {
    pub tabular_entries: Vec<EntryInfo>,
    pub total_files: usize,
    pub archive_size: u64,
}

impl ArchiveMetadata {
    pub fn display_summary(&self) -> String {
        let mut summary = format!(
            "Bundle Metadata:\n  Total Files: {}\n  Tabular Files: {}\n  Bundle Size: {} bytes\n",
            self.total_files,
            self.tabular_entries.len(),
            self.archive_size
        );

        for entry in &self.tabular_entries {
            summary.push_str(&format!(
                "    {}: {} bytes ({} compressed)\n",
                entry.name, entry.size, entry.compressed_size
            ));
        }

        summary
    }

    pub fn has_tabular_data(&self) -> bool {
        !self.tabular_entries.is_empty()
    }
}

pub struct ArchiveInspector;

impl ArchiveInspector {
    pub fn inspect_zip(zip_path: &Path) -> Result<ArchiveMetadata> {
        let file = File::open(zip_path)?;
        let archive_size = file.metadata()?.len();
        let mut archive = ZipArchive::new(file)?;

        let mut tabular_entries = Vec::new();
        for i in 0..archive.len() {
            let entry = archive.by_index(i)?;
            if entry.is_dir() || !is_tabular_entry(entry.name()) {
                continue;
            }
            tabular_entries.push(EntryInfo {
                index: i,
                name: entry.name().to_string(),
                size: entry.size(),
                compressed_size: entry.compressed_size(),
            });
        }

        Ok(ArchiveMetadata {
            tabular_entries,
            total_files: archive.len(),
            archive_size,
        })
    }
}

/// Delimited-text entries are recognised by their `.csv` suffix, any case.
pub fn is_tabular_entry(name: &str) -> bool {
    !name.ends_with('/') && name.to_ascii_lowercase().ends_with(TABULAR_EXTENSION)
}
