//! In-memory CSV table backing `fromcsv`.

use crate::error::StateError;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

/// Rows of a CSV file, keyed by header name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CsvTable {
    rows: Vec<HashMap<String, String>>,
}

impl CsvTable {
    pub fn new(rows: Vec<HashMap<String, String>>) -> Self {
        Self { rows }
    }

    /// Load a CSV file whose first line is the header row.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, StateError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, StateError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);
        let headers = reader.headers()?.clone();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            let row = headers
                .iter()
                .zip(record.iter())
                .map(|(h, v)| (h.to_string(), v.to_string()))
                .collect();
            rows.push(row);
        }
        Ok(Self { rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Value of `column` in row `iteration % len`, so short tables recycle
    /// their rows.
    pub fn value(&self, iteration: u64, column: &str) -> Option<&str> {
        if self.rows.is_empty() {
            return None;
        }
        let row = (iteration % self.rows.len() as u64) as usize;
        self.rows[row].get(column).map(String::as_str)
    }
}
