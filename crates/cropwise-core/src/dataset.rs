//! # Dataset Module
//!
//! In-memory tables read from delimited files.
//!
//! - Header row names the columns
//! - Cells are trimmed; empty cells and NA markers become `None`
//! - Short rows are padded with missing cells, long rows are truncated
//! - A table is read once at startup and never written to afterwards

use crate::CropwiseError;
use crate::primitives::is_missing;
use std::io::Read;
use std::path::Path;

/// A loaded table: column names plus rows of optional cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

impl Table {
    /// Create an empty table (no columns, no rows).
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a table from headers and raw string rows.
    ///
    /// Cells are normalized exactly as when reading a file.
    #[must_use]
    pub fn from_rows<H, R, C>(headers: H, rows: R) -> Self
    where
        H: IntoIterator,
        H::Item: Into<String>,
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: AsRef<str>,
    {
        let headers: Vec<String> = headers
            .into_iter()
            .map(|h| h.into().trim().to_string())
            .collect();
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|row| normalize_row(row.into_iter().map(|c| c.as_ref().to_string()), width))
            .collect();
        Self { headers, rows }
    }

    /// Read a table from a CSV file.
    ///
    /// A missing file yields `CropwiseError::DatasetNotFound` so callers can
    /// tell it apart from a malformed file.
    pub fn load(path: &Path) -> Result<Self, CropwiseError> {
        let file = std::fs::File::open(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                CropwiseError::DatasetNotFound(path.display().to_string())
            } else {
                CropwiseError::IoError(format!("Cannot open '{}': {}", path.display(), e))
            }
        })?;
        Self::from_reader(file)
    }

    /// Read a table from any CSV source.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, CropwiseError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers: Vec<String> = csv_reader
            .headers()
            .map_err(|e| CropwiseError::CsvError(e.to_string()))?
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').to_string())
            .collect();
        let width = headers.len();

        let mut rows = Vec::new();
        for record in csv_reader.records() {
            let record = record.map_err(|e| CropwiseError::CsvError(e.to_string()))?;
            rows.push(normalize_row(record.iter().map(str::to_string), width));
        }

        Ok(Self { headers, rows })
    }

    /// Column names in file order.
    #[must_use]
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Number of data rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True if the table has no data rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column, if present.
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Iterate the rows.
    pub fn rows(&self) -> impl Iterator<Item = &[Option<String>]> {
        self.rows.iter().map(Vec::as_slice)
    }

    /// A single non-missing cell, by row number and column index.
    #[must_use]
    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.rows.get(row)?.get(column)?.as_deref()
    }
}

fn normalize_row(cells: impl Iterator<Item = String>, width: usize) -> Vec<Option<String>> {
    let mut row: Vec<Option<String>> = cells
        .take(width)
        .map(|c| {
            let c = c.trim();
            if is_missing(c) {
                None
            } else {
                Some(c.to_string())
            }
        })
        .collect();
    row.resize(width, None);
    row
}
