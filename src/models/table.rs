use crate::error::{ProcessingError, Result};
use crate::utils::constants::NULL_MARKERS;

pub type Row = Vec<Option<String>>;

/// String-typed rows under a named header, as delivered by the provider.
///
/// The provider schema is open-ended, so raw rows keep every column they
/// arrive with; `None` marks a missing field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObservationTable {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl ObservationTable {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn from_parts(columns: Vec<String>, rows: Vec<Row>) -> Result<Self> {
        let mut table = Self::new(columns);
        for row in rows {
            table.push_row(row)?;
        }
        Ok(table)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn require_column(&self, name: &str) -> Result<usize> {
        self.column_index(name)
            .ok_or_else(|| ProcessingError::MissingColumn(name.to_string()))
    }

    pub fn push_row(&mut self, row: Row) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(ProcessingError::InvalidFormat(format!(
                "Row {} has {} fields, expected {}",
                self.rows.len() + 1,
                row.len(),
                self.columns.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    /// Appends `other` below this table.
    ///
    /// Columns are the union of both headers in order of first appearance;
    /// fields a table does not carry are filled with `None`. Rows are never
    /// de-duplicated.
    pub fn append(&mut self, other: ObservationTable) {
        let added: Vec<String> = other
            .columns
            .iter()
            .filter(|c| !self.columns.contains(c))
            .cloned()
            .collect();

        if !added.is_empty() {
            for row in &mut self.rows {
                row.resize(self.columns.len() + added.len(), None);
            }
            self.columns.extend(added);
        }

        let mapping: Vec<usize> = other
            .columns
            .iter()
            .filter_map(|c| self.column_index(c))
            .collect();

        for row in other.rows {
            let mut aligned = vec![None; self.columns.len()];
            for (value, &target) in row.into_iter().zip(&mapping) {
                aligned[target] = value;
            }
            self.rows.push(aligned);
        }
    }

    /// Keeps only rows for which `keep` returns true; returns how many were removed.
    pub fn retain_rows<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(&Row) -> bool,
    {
        let before = self.rows.len();
        self.rows.retain(|row| keep(row));
        before - self.rows.len()
    }

    pub fn column_values(&self, index: usize) -> impl Iterator<Item = Option<&str>> + '_ {
        self.rows.iter().map(move |row| row[index].as_deref())
    }

    /// Number of null fields per column, in column order.
    pub fn null_counts(&self) -> Vec<(String, usize)> {
        self.columns
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let nulls = self.rows.iter().filter(|row| row[i].is_none()).count();
                (name.clone(), nulls)
            })
            .collect()
    }
}

/// Normalises a raw field: missing markers become `None`.
pub fn parse_field(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if NULL_MARKERS.contains(&trimmed) {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn row(values: &[Option<&str>]) -> Row {
        values.iter().map(|v| v.map(str::to_string)).collect()
    }

    #[test]
    fn test_parse_field_null_markers() {
        assert_eq!(parse_field(""), None);
        assert_eq!(parse_field("  "), None);
        assert_eq!(parse_field("NaN"), None);
        assert_eq!(parse_field("null"), None);
        assert_eq!(parse_field(" 12.5 "), Some("12.5".to_string()));
        assert_eq!(parse_field("0"), Some("0".to_string()));
    }

    #[test]
    fn test_push_row_rejects_wrong_width() {
        let mut table = ObservationTable::new(cols(&["a", "b"]));
        assert!(table.push_row(row(&[Some("1")])).is_err());
        assert!(table.push_row(row(&[Some("1"), None])).is_ok());
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_append_same_columns_preserves_order() {
        let mut first = ObservationTable::from_parts(
            cols(&["a", "b"]),
            vec![row(&[Some("1"), Some("x")]), row(&[Some("1"), Some("x")])],
        )
        .unwrap();
        let second =
            ObservationTable::from_parts(cols(&["a", "b"]), vec![row(&[Some("2"), Some("y")])])
                .unwrap();

        first.append(second);

        assert_eq!(first.len(), 3);
        // Duplicates are kept.
        assert_eq!(first.rows()[0], first.rows()[1]);
        assert_eq!(first.rows()[2], row(&[Some("2"), Some("y")]));
    }

    #[test]
    fn test_append_unions_columns() {
        let mut first =
            ObservationTable::from_parts(cols(&["a", "b"]), vec![row(&[Some("1"), Some("x")])])
                .unwrap();
        let second =
            ObservationTable::from_parts(cols(&["b", "c"]), vec![row(&[Some("y"), Some("z")])])
                .unwrap();

        first.append(second);

        assert_eq!(first.columns(), cols(&["a", "b", "c"]).as_slice());
        assert_eq!(first.rows()[0], row(&[Some("1"), Some("x"), None]));
        assert_eq!(first.rows()[1], row(&[None, Some("y"), Some("z")]));
    }

    #[test]
    fn test_append_into_empty_table() {
        let mut combined = ObservationTable::default();
        let part =
            ObservationTable::from_parts(cols(&["a"]), vec![row(&[Some("1")])]).unwrap();
        combined.append(part.clone());
        assert_eq!(combined, part);
    }

    #[test]
    fn test_null_counts() {
        let table = ObservationTable::from_parts(
            cols(&["a", "b"]),
            vec![row(&[None, Some("x")]), row(&[None, None])],
        )
        .unwrap();
        assert_eq!(
            table.null_counts(),
            vec![("a".to_string(), 2), ("b".to_string(), 1)]
        );
    }
}
