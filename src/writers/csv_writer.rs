use crate::error::Result;
use crate::models::{EnrichedObservation, ObservationTable};
use crate::utils::constants::{BYTES_PER_MB, FILE_DELIMITER, OUTPUT_COLUMNS};
use csv::{ReaderBuilder, Writer, WriterBuilder};
use std::fs::File;
use std::path::Path;
use tempfile::NamedTempFile;

pub struct DelimitedWriter;

impl DelimitedWriter {
    pub fn new() -> Self {
        Self
    }

    /// Write a raw table with its own header; missing fields become empty.
    pub fn write_table(&self, table: &ObservationTable, path: &Path) -> Result<()> {
        self.write_staged(path, |writer| {
            writer.write_record(table.columns())?;
            for row in table.rows() {
                writer.write_record(row.iter().map(|field| field.as_deref().unwrap_or("")))?;
            }
            Ok(())
        })
    }

    /// Write enriched rows under the ten output columns. The header is
    /// written even when there are no rows.
    pub fn write_enriched(&self, records: &[EnrichedObservation], path: &Path) -> Result<()> {
        self.write_staged(path, |writer| {
            writer.write_record(OUTPUT_COLUMNS)?;
            for record in records {
                writer.serialize(record)?;
            }
            Ok(())
        })
    }

    /// Write into a temporary file beside `path` and move it into place only
    /// once everything is flushed. On error `path` is left untouched.
    fn write_staged<F>(&self, path: &Path, write: F) -> Result<()>
    where
        F: FnOnce(&mut Writer<&File>) -> Result<()>,
    {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let staged = NamedTempFile::new_in(dir)?;

        {
            let mut writer = WriterBuilder::new()
                .delimiter(FILE_DELIMITER)
                .has_headers(false)
                .from_writer(staged.as_file());
            write(&mut writer)?;
            writer.flush()?;
        }
        staged.as_file().sync_all()?;
        staged.persist(path).map_err(|e| e.error)?;

        Ok(())
    }

    pub fn read_enriched(&self, path: &Path) -> Result<Vec<EnrichedObservation>> {
        let mut reader = ReaderBuilder::new()
            .delimiter(FILE_DELIMITER)
            .from_path(path)?;

        let mut records = Vec::new();
        for record in reader.deserialize() {
            records.push(record?);
        }
        Ok(records)
    }

    /// Get file statistics
    pub fn get_file_info(&self, path: &Path) -> Result<DelimitedFileInfo> {
        let mut reader = ReaderBuilder::new()
            .delimiter(FILE_DELIMITER)
            .flexible(true)
            .from_path(path)?;

        let columns: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        let mut total_rows = 0;
        for record in reader.records() {
            record?;
            total_rows += 1;
        }

        Ok(DelimitedFileInfo {
            total_rows,
            columns,
            file_size: std::fs::metadata(path)?.len(),
        })
    }
}

impl Default for DelimitedWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
pub struct DelimitedFileInfo {
    pub total_rows: usize,
    pub columns: Vec<String>,
    pub file_size: u64,
}

impl DelimitedFileInfo {
    pub fn size_mb(&self) -> f64 {
        self.file_size as f64 / BYTES_PER_MB
    }

    pub fn summary(&self) -> String {
        format!(
            "File Summary:\n\
            - Rows: {}\n\
            - Size: {:.2} MB\n\
            - Columns: {}",
            self.total_rows,
            self.size_mb(),
            self.columns.join(", ")
        )
    }
}
