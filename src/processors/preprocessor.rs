use crate::error::Result;
use crate::models::{EnrichedObservation, Observation, ObservationTable};
use crate::processors::{Cleaner, CleaningReport};
use crate::readers::TableReader;
use crate::utils::progress::ProgressReporter;
use std::path::Path;
use tracing::{debug, info};

/// Stage-2 pipeline: clean, decode regions, derive calendar fields.
pub struct Preprocessor {
    cleaner: Cleaner,
    reader: TableReader,
}

#[derive(Debug)]
pub struct PreprocessOutcome {
    pub records: Vec<EnrichedObservation>,
    pub cleaning: CleaningReport,
    pub input_columns: Vec<String>,
}

impl Preprocessor {
    pub fn new() -> Self {
        Self {
            cleaner: Cleaner::new(),
            reader: TableReader::new(),
        }
    }

    pub fn process_file(
        &self,
        input: &Path,
        progress: Option<&ProgressReporter>,
    ) -> Result<PreprocessOutcome> {
        if let Some(p) = progress {
            p.set_message(&format!("Reading {}...", input.display()));
        }

        let table = self.reader.read_path(input)?;
        info!(
            rows = table.len(),
            columns = table.columns().len(),
            "Read stage-1 file"
        );

        self.process_table(table, progress)
    }

    pub fn process_table(
        &self,
        table: ObservationTable,
        progress: Option<&ProgressReporter>,
    ) -> Result<PreprocessOutcome> {
        let input_columns = table.columns().to_vec();

        if let Some(p) = progress {
            p.set_message("Cleaning rows...");
        }
        let (cleaned, cleaning) = self.cleaner.clean(table)?;

        if let Some(p) = progress {
            p.set_message("Decoding regions and timestamps...");
        }
        let observations = Observation::from_table(&cleaned)?;
        let records = observations
            .into_iter()
            .enumerate()
            .map(|(i, observation)| EnrichedObservation::enrich(observation, i + 1))
            .collect::<Result<Vec<_>>>()?;
        debug!(records = records.len(), "Enriched observations");

        Ok(PreprocessOutcome {
            records,
            cleaning,
            input_columns,
        })
    }
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProcessingError;

    const HEADER: &str = "station_id;datetime;species;conc_raw_micrograms_per_m3;lat";

    fn read(lines: &[&str]) -> ObservationTable {
        let mut text = format!("{}\n", HEADER);
        for line in lines {
            text.push_str(line);
            text.push('\n');
        }
        TableReader::new().read_from(text.as_bytes()).unwrap()
    }

    #[test]
    fn test_process_table_enriches_rows() {
        let table = read(&[
            "PL0205001;2024-03-01 00:00;no2;12.5;51.1",
            "PL1;2024-03-01 05:00;pm2p5;3;",
            "PL1;2024-03-01 06:00;pm2p5;4;50.0",
        ]);

        let outcome = Preprocessor::new().process_table(table, None).unwrap();

        assert_eq!(outcome.cleaning.rows_dropped_nulls, 1);
        assert_eq!(outcome.records.len(), 2);
        assert_eq!(outcome.records[0].region_name, "Dolnośląskie");
        assert_eq!(outcome.records[1].region_name, "Region-0");
        assert_eq!(outcome.records[1].hour, 6);
        assert_eq!(outcome.input_columns.len(), 5);
    }

    #[test]
    fn test_malformed_timestamp_aborts() {
        let table = read(&["PL0205001;31/12/2024;no2;12.5;51.1"]);
        let err = Preprocessor::new().process_table(table, None).unwrap_err();
        assert!(matches!(err, ProcessingError::InvalidTimestamp { row: 1, .. }));
    }

    #[test]
    fn test_unreadable_input_is_an_error() {
        let missing = Path::new("/nonexistent/air_quality_poland_2024.csv");
        assert!(Preprocessor::new().process_file(missing, None).is_err());
    }
}
