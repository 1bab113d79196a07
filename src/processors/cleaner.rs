use crate::error::Result;
use crate::models::ObservationTable;
use crate::utils::constants::COL_CONCENTRATION;
use std::fmt;
use tracing::{info, warn};

/// Type a column's values would load as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Float,
    Text,
    Empty,
}

impl ColumnType {
    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnType::Integer | ColumnType::Float | ColumnType::Empty)
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnType::Integer => "integer",
            ColumnType::Float => "float",
            ColumnType::Text => "text",
            ColumnType::Empty => "empty",
        };
        write!(f, "{}", name)
    }
}

/// Narrowest type holding every non-null value. Non-finite numbers count as text.
pub fn infer_column_type<'a, I>(values: I) -> ColumnType
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    let mut inferred = ColumnType::Empty;

    for value in values.into_iter().flatten() {
        if value.parse::<i64>().is_ok() {
            if inferred == ColumnType::Empty {
                inferred = ColumnType::Integer;
            }
        } else if parse_finite(value).is_some() {
            inferred = ColumnType::Float;
        } else {
            return ColumnType::Text;
        }
    }

    inferred
}

pub fn parse_finite(value: &str) -> Option<f64> {
    value.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[derive(Debug, Clone, Default)]
pub struct CleaningReport {
    pub initial_rows: usize,
    pub null_counts: Vec<(String, usize)>,
    pub rows_dropped_nulls: usize,
    pub column_types: Vec<(String, ColumnType)>,
    pub concentration_coerced: bool,
    pub rows_dropped_non_numeric: usize,
    pub final_rows: usize,
}

impl CleaningReport {
    pub fn total_nulls(&self) -> usize {
        self.null_counts.iter().map(|(_, n)| n).sum()
    }

    pub fn total_dropped(&self) -> usize {
        self.rows_dropped_nulls + self.rows_dropped_non_numeric
    }
}

pub struct Cleaner;

impl Cleaner {
    pub fn new() -> Self {
        Self
    }

    /// Remove incomplete rows, then rows whose concentration is not a finite
    /// number. Cleaning an already clean table leaves it unchanged.
    pub fn clean(&self, mut table: ObservationTable) -> Result<(ObservationTable, CleaningReport)> {
        let concentration = table.require_column(COL_CONCENTRATION)?;

        let mut report = CleaningReport {
            initial_rows: table.len(),
            null_counts: table.null_counts(),
            ..Default::default()
        };

        let total_nulls = report.total_nulls();
        if total_nulls > 0 {
            warn!(total_nulls, "Found null values");
            report.rows_dropped_nulls = table.retain_rows(|row| row.iter().all(Option::is_some));
            info!(
                dropped = report.rows_dropped_nulls,
                remaining = table.len(),
                "Dropped rows with null values"
            );
        }

        report.column_types = table
            .columns()
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), infer_column_type(table.column_values(i))))
            .collect();

        if !report.column_types[concentration].1.is_numeric() {
            report.concentration_coerced = true;
            report.rows_dropped_non_numeric = table.retain_rows(|row| {
                row[concentration]
                    .as_deref()
                    .and_then(parse_finite)
                    .is_some()
            });
            if report.rows_dropped_non_numeric > 0 {
                warn!(
                    dropped = report.rows_dropped_non_numeric,
                    "Dropped rows with non-numeric concentration"
                );
            }
        }

        report.final_rows = table.len();
        Ok((table, report))
    }

    /// Generate a summary report
    pub fn generate_summary(&self, report: &CleaningReport) -> String {
        let mut summary = String::new();

        summary.push_str("=== Data Cleaning Report ===\n");
        summary.push_str(&format!("Input Rows: {}\n", report.initial_rows));

        if report.total_nulls() == 0 {
            summary.push_str("Null Values: none\n");
        } else {
            summary.push_str(&format!("Null Values: {}\n", report.total_nulls()));
            for (column, count) in report.null_counts.iter().filter(|(_, n)| *n > 0) {
                summary.push_str(&format!(
                    "  - {}: {} ({:.2}%)\n",
                    column,
                    count,
                    100.0 * *count as f64 / report.initial_rows as f64
                ));
            }
            summary.push_str(&format!(
                "Rows Dropped (nulls): {}\n",
                report.rows_dropped_nulls
            ));
        }

        summary.push_str("\nColumn Types:\n");
        for (column, column_type) in &report.column_types {
            summary.push_str(&format!("  - {}: {}\n", column, column_type));
        }

        if report.concentration_coerced {
            summary.push_str(&format!(
                "\nConcentration coerced to numeric, rows dropped: {}\n",
                report.rows_dropped_non_numeric
            ));
        }

        summary.push_str(&format!("\nOutput Rows: {}\n", report.final_rows));
        summary
    }
}

impl Default for Cleaner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProcessingError;
    use pretty_assertions::assert_eq;

    fn table(rows: &[[Option<&str>; 4]]) -> ObservationTable {
        let columns = ["station_id", "datetime", "species", "conc_raw_micrograms_per_m3"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let rows = rows
            .iter()
            .map(|r| r.iter().map(|v| v.map(str::to_string)).collect())
            .collect();
        ObservationTable::from_parts(columns, rows).unwrap()
    }

    #[test]
    fn test_infer_column_type() {
        assert_eq!(infer_column_type([Some("1"), Some("2")]), ColumnType::Integer);
        assert_eq!(infer_column_type([Some("1"), Some("2.5")]), ColumnType::Float);
        assert_eq!(infer_column_type([Some("2.5"), Some("1")]), ColumnType::Float);
        assert_eq!(infer_column_type([Some("1"), Some("abc")]), ColumnType::Text);
        assert_eq!(infer_column_type([Some("inf")]), ColumnType::Text);
        assert_eq!(infer_column_type([None, None]), ColumnType::Empty);
    }

    #[test]
    fn test_drops_rows_with_nulls() {
        let input = table(&[
            [Some("PL0205001"), Some("2024-03-01 00:00"), Some("no2"), Some("12.5")],
            [Some("PL0205001"), None, Some("no2"), Some("13.0")],
            [None, Some("2024-03-01 02:00"), Some("no2"), None],
        ]);

        let (cleaned, report) = Cleaner::new().clean(input).unwrap();

        assert_eq!(cleaned.len(), 1);
        assert_eq!(report.initial_rows, 3);
        assert_eq!(report.total_nulls(), 3);
        assert_eq!(report.rows_dropped_nulls, 2);
        assert!(!report.concentration_coerced);
        assert_eq!(report.column_types[3].1, ColumnType::Float);
        assert_eq!(report.final_rows, 1);
    }

    #[test]
    fn test_coerces_non_numeric_concentration() {
        let input = table(&[
            [Some("PL0205001"), Some("2024-03-01 00:00"), Some("no2"), Some("12.5")],
            [Some("PL0205001"), Some("2024-03-01 01:00"), Some("no2"), Some("n/d")],
            [Some("PL0205001"), Some("2024-03-01 02:00"), Some("no2"), Some("inf")],
            [Some("PL0205001"), Some("2024-03-01 03:00"), Some("no2"), Some("8")],
        ]);

        let (cleaned, report) = Cleaner::new().clean(input).unwrap();

        assert!(report.concentration_coerced);
        assert_eq!(report.rows_dropped_non_numeric, 2);
        assert_eq!(report.total_dropped(), 2);
        assert_eq!(cleaned.len(), 2);
        for value in cleaned.column_values(3) {
            assert!(value.and_then(parse_finite).is_some());
        }
    }

    #[test]
    fn test_cleaning_is_idempotent() {
        let input = table(&[
            [Some("PL0205001"), Some("2024-03-01 00:00"), Some("no2"), Some("12.5")],
            [Some("PL0205001"), None, Some("no2"), Some("13.0")],
            [Some("PL0205001"), Some("2024-03-01 01:00"), Some("pm2p5"), Some("bad")],
        ]);
        let cleaner = Cleaner::new();

        let (once, _) = cleaner.clean(input).unwrap();
        let (twice, report) = cleaner.clean(once.clone()).unwrap();

        assert_eq!(twice, once);
        assert_eq!(report.total_dropped(), 0);
    }

    #[test]
    fn test_missing_concentration_column_is_fatal() {
        let input = ObservationTable::new(vec!["station_id".to_string()]);
        let err = Cleaner::new().clean(input).unwrap_err();
        assert!(matches!(err, ProcessingError::MissingColumn(_)));
    }

    #[test]
    fn test_summary_lists_null_columns() {
        let input = table(&[
            [Some("PL0205001"), None, Some("no2"), Some("12.5")],
            [Some("PL0205001"), Some("2024-03-01 01:00"), Some("no2"), Some("1")],
        ]);
        let cleaner = Cleaner::new();
        let (_, report) = cleaner.clean(input).unwrap();

        let summary = cleaner.generate_summary(&report);
        assert!(summary.contains("datetime: 1 (50.00%)"));
        assert!(summary.contains("Rows Dropped (nulls): 1"));
        assert!(summary.contains("Output Rows: 1"));
    }
}
