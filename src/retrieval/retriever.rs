use crate::archive::ArchiveExtractor;
use crate::error::Result;
use crate::models::{ObservationTable, RequestDescriptor, RequestTemplate};
use crate::retrieval::{DataProvider, RetrievalHandle};
use crate::utils::constants::{ALL_MONTHS, BYTES_PER_MB, DEFAULT_MONTHLY_PAUSE_SECS};
use crate::utils::filename::bundle_prefix;
use crate::utils::progress::ProgressReporter;
use std::path::Path;
use std::thread;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetrievalStrategy {
    Bulk,
    Monthly,
}

#[derive(Debug)]
pub struct RetrievalOutcome {
    pub strategy: RetrievalStrategy,
    pub table: Option<ObservationTable>,
    pub attempts: usize,
    pub months_succeeded: Vec<String>,
    pub months_failed: Vec<(String, String)>,
}

impl RetrievalOutcome {
    pub fn summary(&self) -> String {
        let rows = self.table.as_ref().map_or(0, ObservationTable::len);
        let mut summary = format!(
            "Retrieval Summary:\n  Strategy: {:?}\n  Requests: {}\n  Rows: {}\n",
            self.strategy, self.attempts, rows
        );
        if self.strategy == RetrievalStrategy::Monthly {
            summary.push_str(&format!(
                "  Months retrieved: {}\n",
                self.months_succeeded.join(", ")
            ));
            for (month, reason) in &self.months_failed {
                summary.push_str(&format!("  Month {} skipped: {}\n", month, reason));
            }
        }
        summary
    }
}

/// Fetches one year of observations, splitting the request by month when
/// the provider refuses the whole year.
pub struct Retriever<P: DataProvider> {
    provider: P,
    dataset: String,
    template: RequestTemplate,
    extractor: ArchiveExtractor,
    monthly_pause: Duration,
    show_progress: bool,
}

impl<P: DataProvider> Retriever<P> {
    pub fn new(provider: P, dataset: &str, template: RequestTemplate) -> Self {
        Self {
            provider,
            dataset: dataset.to_string(),
            template,
            extractor: ArchiveExtractor::new(),
            monthly_pause: Duration::from_secs(DEFAULT_MONTHLY_PAUSE_SECS),
            show_progress: false,
        }
    }

    pub fn with_monthly_pause(mut self, pause: Duration) -> Self {
        self.monthly_pause = pause;
        self
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Bulk request first; a size-limit rejection switches to twelve monthly
    /// requests. Any other bulk failure is returned.
    pub fn retrieve_year(&self, work_dir: &Path) -> Result<RetrievalOutcome> {
        let request = RequestDescriptor::whole_year(&self.template)?;
        info!(
            country = request.country(),
            year = request.year(),
            variables = ?request.variables(),
            "Requesting full year"
        );

        let prefix = bundle_prefix(&self.template.country, self.template.year, None);
        match self.fetch_bundle(&request, work_dir, &prefix) {
            Ok(table) => Ok(RetrievalOutcome {
                strategy: RetrievalStrategy::Bulk,
                months_succeeded: if table.is_some() {
                    request.months().to_vec()
                } else {
                    Vec::new()
                },
                table,
                attempts: 1,
                months_failed: Vec::new(),
            }),
            Err(e) if e.is_size_limit() => {
                warn!(error = %e, "Request too large, retrieving month by month");
                self.retrieve_by_month(work_dir)
            }
            Err(e) => Err(e),
        }
    }

    fn retrieve_by_month(&self, work_dir: &Path) -> Result<RetrievalOutcome> {
        let progress = ProgressReporter::new(
            ALL_MONTHS.len() as u64,
            "Retrieving monthly bundles...",
            !self.show_progress,
        );

        let mut combined: Option<ObservationTable> = None;
        let mut months_succeeded = Vec::new();
        let mut months_failed = Vec::new();

        for month in ALL_MONTHS {
            progress.set_message(&format!("Retrieving {}/{}...", month, self.template.year));
            let prefix = bundle_prefix(&self.template.country, self.template.year, Some(month));

            let result = RequestDescriptor::single_month(&self.template, month)
                .and_then(|request| self.fetch_bundle(&request, work_dir, &prefix));

            match result {
                Ok(Some(table)) => {
                    info!(month, rows = table.len(), "Month retrieved");
                    match combined.as_mut() {
                        Some(all) => all.append(table),
                        None => combined = Some(table),
                    }
                    months_succeeded.push(month.to_string());
                }
                Ok(None) => {
                    warn!(month, "Month bundle held no usable data");
                    months_failed.push((month.to_string(), "no tabular data".to_string()));
                }
                Err(e) => {
                    warn!(month, error = %e, "Month retrieval failed, skipping");
                    months_failed.push((month.to_string(), e.to_string()));
                }
            }

            progress.increment(1);
            thread::sleep(self.monthly_pause);
        }

        progress.finish_with_message(&format!(
            "Retrieved {}/{} months",
            months_succeeded.len(),
            ALL_MONTHS.len()
        ));

        Ok(RetrievalOutcome {
            strategy: RetrievalStrategy::Monthly,
            table: combined,
            attempts: ALL_MONTHS.len(),
            months_succeeded,
            months_failed,
        })
    }

    /// Retrieve, download into a temporary bundle under `work_dir`, extract.
    /// The bundle is deleted when this returns.
    fn fetch_bundle(
        &self,
        request: &RequestDescriptor,
        work_dir: &Path,
        prefix: &str,
    ) -> Result<Option<ObservationTable>> {
        let handle = self.provider.retrieve(&self.dataset, request)?;

        let bundle = tempfile::Builder::new()
            .prefix(prefix)
            .suffix(".zip")
            .tempfile_in(work_dir)?;
        let bytes = handle.download(bundle.path())?;
        info!(size_mb = bytes as f64 / BYTES_PER_MB, "Bundle downloaded");

        Ok(self.extractor.extract(bundle.path()))
    }
}
