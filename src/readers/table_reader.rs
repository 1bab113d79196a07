use crate::error::{ProcessingError, Result};
use crate::models::{parse_field, ObservationTable};
use crate::utils::constants::FILE_DELIMITER;
use csv::{ReaderBuilder, Trim};
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

pub struct TableReader {
    delimiter: Option<u8>,
}

impl TableReader {
    /// Reader for the pipeline's own `;`-separated files.
    pub fn new() -> Self {
        Self {
            delimiter: Some(FILE_DELIMITER),
        }
    }

    /// Reader that picks `;` or `,` from the header line.
    pub fn sniffing() -> Self {
        Self { delimiter: None }
    }

    pub fn read_path(&self, path: &Path) -> Result<ObservationTable> {
        let file = File::open(path)?;
        self.read_from(file)
    }

    /// Parse delimited text with a header row. Short rows are padded with
    /// missing fields, rows longer than the header are rejected.
    pub fn read_from<R: Read>(&self, source: R) -> Result<ObservationTable> {
        let mut buffered = BufReader::new(source);
        let delimiter = match self.delimiter {
            Some(d) => d,
            None => sniff_delimiter(buffered.fill_buf()?),
        };

        let mut reader = ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(buffered);

        let columns: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        let width = columns.len();
        let mut table = ObservationTable::new(columns);

        for (index, record) in reader.records().enumerate() {
            let record = record?;
            if record.len() > width {
                return Err(ProcessingError::InvalidFormat(format!(
                    "Line {} has {} fields, header has {}",
                    index + 2,
                    record.len(),
                    width
                )));
            }
            let mut row: Vec<Option<String>> = record.iter().map(parse_field).collect();
            row.resize(width, None);
            table.push_row(row)?;
        }

        Ok(table)
    }
}

impl Default for TableReader {
    fn default() -> Self {
        Self::new()
    }
}

/// `;` when the first line has more semicolons than commas, `,` otherwise.
pub fn sniff_delimiter(head: &[u8]) -> u8 {
    let first_line = head.split(|b| *b == b'\n').next().unwrap_or_default();
    let count = |needle: u8| first_line.iter().filter(|b| **b == needle).count();
    if count(b';') > count(b',') {
        b';'
    } else {
        b','
    }
}
