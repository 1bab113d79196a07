//! The two stages, each run end to end against files on disk.

use crate::analyzers::{ConcentrationAnalyzer, DatasetStatistics};
use crate::error::Result;
use crate::models::EnrichedObservation;
use crate::processors::{CleaningReport, Preprocessor};
use crate::retrieval::{DataProvider, RetrievalOutcome, Retriever};
use crate::utils::constants::{OUTPUT_COLUMNS, PREVIEW_ROWS};
use crate::utils::progress::ProgressReporter;
use crate::writers::{DelimitedFileInfo, DelimitedWriter};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug)]
pub enum StageOneResult {
    /// Output already existed; nothing was requested.
    AlreadyPresent(DelimitedFileInfo),
    Written {
        outcome: RetrievalOutcome,
        info: DelimitedFileInfo,
    },
    /// Every retrieval came back empty; nothing was written.
    NoData(RetrievalOutcome),
}

/// Stage one: retrieve the year and persist the combined rows. `connect`
/// builds the retriever and is only called when the output is missing, so
/// an existing file needs no credentials.
pub fn run_stage_one<P, F>(connect: F, output: &Path, work_dir: &Path) -> Result<StageOneResult>
where
    P: DataProvider,
    F: FnOnce() -> Result<Retriever<P>>,
{
    let writer = DelimitedWriter::new();

    if output.exists() {
        info!(path = %output.display(), "Output already present, skipping retrieval");
        return Ok(StageOneResult::AlreadyPresent(writer.get_file_info(output)?));
    }

    let retriever = connect()?;
    create_parent_dir(output)?;
    fs::create_dir_all(work_dir)?;

    let mut outcome = retriever.retrieve_year(work_dir)?;
    let Some(table) = outcome.table.take() else {
        warn!("No data retrieved, nothing written");
        return Ok(StageOneResult::NoData(outcome));
    };

    writer.write_table(&table, output)?;
    info!(path = %output.display(), rows = table.len(), "Wrote stage-1 file");

    Ok(StageOneResult::Written {
        outcome,
        info: writer.get_file_info(output)?,
    })
}

#[derive(Debug)]
pub struct StageTwoReport {
    pub input_columns: Vec<String>,
    pub cleaning: CleaningReport,
    pub statistics: DatasetStatistics,
    pub info: DelimitedFileInfo,
    pub preview: Vec<EnrichedObservation>,
}

/// Stage two: clean and enrich the stage-1 file, then write the final dataset.
pub fn run_stage_two(
    input: &Path,
    output: &Path,
    progress: Option<&ProgressReporter>,
) -> Result<StageTwoReport> {
    let preprocessor = Preprocessor::new();
    let outcome = preprocessor.process_file(input, progress)?;

    let statistics = ConcentrationAnalyzer::new().analyze(&outcome.records);

    if let Some(p) = progress {
        p.set_message(&format!("Writing {}...", output.display()));
    }
    create_parent_dir(output)?;
    let writer = DelimitedWriter::new();
    writer.write_enriched(&outcome.records, output)?;
    info!(path = %output.display(), rows = outcome.records.len(), "Wrote stage-2 file");

    let preview = outcome.records.iter().take(PREVIEW_ROWS).cloned().collect();

    Ok(StageTwoReport {
        input_columns: outcome.input_columns,
        cleaning: outcome.cleaning,
        statistics,
        info: writer.get_file_info(output)?,
        preview,
    })
}

/// Render rows as a `;`-separated block under the output header.
pub fn format_preview(records: &[EnrichedObservation]) -> String {
    let mut lines = vec![OUTPUT_COLUMNS.join(";")];
    for record in records {
        lines.push(format!(
            "{};{};{};{};{};{};{};{};{};{}",
            record.station_id,
            record.country_name,
            record.region_code,
            record.region_name,
            record.date,
            record.hour,
            record.month,
            record.day_of_week,
            record.species,
            record.concentration
        ));
    }
    lines.join("\n")
}

fn create_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
