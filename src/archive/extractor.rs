use crate::archive::ArchiveInspector;
use crate::error::{ProcessingError, Result};
use crate::models::ObservationTable;
use crate::readers::TableReader;
use std::fs::File;
use std::path::Path;
use tracing::{error, info, warn};
use zip::result::ZipError;
use zip::ZipArchive;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryReport {
    pub name: String,
    pub rows: Option<usize>,
    pub error: Option<String>,
}

/// Turns a downloaded bundle into one table.
pub struct ArchiveExtractor {
    reader: TableReader,
}

impl ArchiveExtractor {
    pub fn new() -> Self {
        Self {
            reader: TableReader::sniffing(),
        }
    }

    /// Parse every tabular entry of the bundle and concatenate them in
    /// discovery order.
    ///
    /// Returns `None` when the bundle is not a zip archive, has no tabular
    /// entries, or none of them could be parsed. A failing entry is reported
    /// and skipped.
    pub fn extract(&self, zip_path: &Path) -> Option<ObservationTable> {
        match self.extract_with_report(zip_path) {
            Ok((table, _)) => table,
            Err(ProcessingError::Archive(ZipError::InvalidArchive(reason))) => {
                error!(path = %zip_path.display(), reason, "Bundle is not a valid zip archive");
                None
            }
            Err(e) => {
                error!(path = %zip_path.display(), error = %e, "Failed to extract bundle");
                None
            }
        }
    }

    pub fn extract_with_report(
        &self,
        zip_path: &Path,
    ) -> Result<(Option<ObservationTable>, Vec<EntryReport>)> {
        let metadata = ArchiveInspector::inspect_zip(zip_path)?;

        if !metadata.has_tabular_data() {
            warn!(path = %zip_path.display(), "No tabular files found in bundle");
            return Ok((None, Vec::new()));
        }
        info!(
            entries = metadata.tabular_entries.len(),
            "Found tabular files in bundle"
        );

        let mut archive = ZipArchive::new(File::open(zip_path)?)?;
        let mut combined: Option<ObservationTable> = None;
        let mut reports = Vec::with_capacity(metadata.tabular_entries.len());

        for entry in &metadata.tabular_entries {
            let parsed = archive
                .by_index(entry.index)
                .map_err(ProcessingError::from)
                .and_then(|zip_file| self.reader.read_from(zip_file));

            match parsed {
                Ok(table) => {
                    info!(entry = %entry.name, rows = table.len(), "Parsed entry");
                    reports.push(EntryReport {
                        name: entry.name.clone(),
                        rows: Some(table.len()),
                        error: None,
                    });
                    match combined.as_mut() {
                        Some(all) => all.append(table),
                        None => combined = Some(table),
                    }
                }
                Err(e) => {
                    warn!(entry = %entry.name, error = %e, "Skipping unreadable entry");
                    reports.push(EntryReport {
                        name: entry.name.clone(),
                        rows: None,
                        error: Some(e.to_string()),
                    });
                }
            }
        }

        if let Some(table) = &combined {
            if reports.len() > 1 {
                info!(rows = table.len(), "Combined tabular entries");
            }
        }

        Ok((combined, reports))
    }
}

impl Default for ArchiveExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tempfile::NamedTempFile;
    use zip::{write::FileOptions, CompressionMethod, ZipWriter};

    fn create_test_zip(entries: &[(&str, &str)]) -> Result<NamedTempFile> {
        let file = NamedTempFile::new()?;
        {
            let mut zip = ZipWriter::new(&file);
            let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
            for (name, content) in entries {
                zip.start_file(*name, options)?;
                zip.write_all(content.as_bytes())?;
            }
            zip.finish()?;
        }
        Ok(file)
    }

    const JANUARY: &str = "station_id,datetime,species,conc_raw_micrograms_per_m3\n\
        PL0205001,2024-01-01 00:00,no2,12.5\n\
        PL0205001,2024-01-01 01:00,no2,13.0\n";
    const FEBRUARY: &str = "station_id,datetime,species,conc_raw_micrograms_per_m3\n\
        PL0205001,2024-02-01 00:00,no2,9.5\n";

    #[test]
    fn test_single_entry() -> Result<()> {
        let bundle = create_test_zip(&[("jan.csv", JANUARY)])?;
        let table = ArchiveExtractor::new().extract(bundle.path()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.columns()[0], "station_id");
        Ok(())
    }

    #[test]
    fn test_entries_are_concatenated_in_order() -> Result<()> {
        let bundle = create_test_zip(&[
            ("jan.csv", JANUARY),
            ("readme.txt", "ignored"),
            ("feb.csv", FEBRUARY),
        ])?;

        let (table, reports) = ArchiveExtractor::new().extract_with_report(bundle.path())?;
        let table = table.unwrap();

        assert_eq!(table.len(), 3);
        assert_eq!(table.rows()[2][1], Some("2024-02-01 00:00".to_string()));
        assert_eq!(
            reports.iter().map(|r| r.rows).collect::<Vec<_>>(),
            vec![Some(2), Some(1)]
        );
        Ok(())
    }

    #[test]
    fn test_duplicate_entries_are_kept() -> Result<()> {
        let bundle = create_test_zip(&[("a.csv", FEBRUARY), ("b.csv", FEBRUARY)])?;
        let table = ArchiveExtractor::new().extract(bundle.path()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[0], table.rows()[1]);
        Ok(())
    }

    #[test]
    fn test_no_tabular_entries() -> Result<()> {
        let bundle = create_test_zip(&[("readme.txt", "nothing here")])?;
        assert!(ArchiveExtractor::new().extract(bundle.path()).is_none());
        Ok(())
    }

    #[test]
    fn test_not_a_zip() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        file.write_all(b"<html>error page</html>")?;
        assert!(ArchiveExtractor::new().extract(file.path()).is_none());
        Ok(())
    }

    #[test]
    fn test_unreadable_entry_is_skipped() -> Result<()> {
        let bundle = create_test_zip(&[
            ("bad.csv", "a,b\n1,2,3,4\n"),
            ("good.csv", FEBRUARY),
        ])?;

        let (table, reports) = ArchiveExtractor::new().extract_with_report(bundle.path())?;

        assert_eq!(table.unwrap().len(), 1);
        assert!(reports[0].error.is_some());
        assert_eq!(reports[1].rows, Some(1));
        Ok(())
    }
}
