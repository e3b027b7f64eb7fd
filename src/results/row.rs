use std::collections::HashMap;
use std::sync::Arc;

use crate::types::RowValues;

/// One materialized row: an ordered mapping from column name to value.
///
/// Positional access is lossless. Name access resolves a duplicated column name to its
/// last position.
#[derive(Debug, Clone)]
pub struct Record {
    column_names: Arc<Vec<String>>,
    values: Vec<RowValues>,
    column_index: Arc<HashMap<String, usize>>,
}

impl Record {
    /// Create a record from column names and the row's values (same length, same order).
    #[must_use]
    pub fn new(column_names: Arc<Vec<String>>, values: Vec<RowValues>) -> Self {
        let column_index = Arc::new(build_index(&column_names));
        Self::with_index(column_names, values, column_index)
    }

    pub(crate) fn with_index(
        column_names: Arc<Vec<String>>,
        values: Vec<RowValues>,
        column_index: Arc<HashMap<String, usize>>,
    ) -> Self {
        Self {
            column_names,
            values,
            column_index,
        }
    }

    /// Get the index of a column by name
    #[must_use]
    pub fn get_column_index(&self, column_name: &str) -> Option<usize> {
        self.column_index.get(column_name).copied()
    }

    /// Get a value from the row by column name
    #[must_use]
    pub fn get(&self, column_name: &str) -> Option<&RowValues> {
        self.get_column_index(column_name)
            .and_then(|idx| self.values.get(idx))
    }

    /// Get a value from the row by column index
    #[must_use]
    pub fn get_by_index(&self, index: usize) -> Option<&RowValues> {
        self.values.get(index)
    }

    #[must_use]
    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    #[must_use]
    pub fn values(&self) -> &[RowValues] {
        &self.values
    }

    /// Number of cells in the row (duplicated names counted once per position).
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Ordered `(name, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RowValues)> {
        self.column_names
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }

    /// Text value of a column, treating NULL and missing columns as `None`.
    #[must_use]
    pub fn text(&self, column_name: &str) -> Option<&str> {
        self.get(column_name).and_then(RowValues::as_text)
    }

    /// Integer value of a column, accepting numeric text.
    #[must_use]
    pub fn int(&self, column_name: &str) -> Option<i64> {
        self.get(column_name).and_then(RowValues::to_i64)
    }
}

/// Later positions overwrite earlier ones, so duplicate names resolve to the last column.
pub(crate) fn build_index(column_names: &[String]) -> HashMap<String, usize> {
    column_names
        .iter()
        .enumerate()
        .map(|(i, name)| (name.clone(), i))
        .collect()
}
