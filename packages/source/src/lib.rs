#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Incident source file reader.
//!
//! Reads a spreadsheet (or CSV export) into an in-memory [`SourceTable`],
//! checks that every [`SourceColumn`] is present, and projects the rows into
//! [`RawIncident`] values for cleaning. Nothing is parsed or typed here
//! beyond turning each cell into text; see [`parsing`] for the typed
//! conversions applied during cleaning.

pub mod delimited;
pub mod parsing;
pub mod spreadsheet;

use std::path::Path;

use incident_loader_models::{RawIncident, SourceColumn};

/// Number of rows logged as a preview after loading.
const PREVIEW_ROWS: usize = 5;

/// Errors that can occur while reading a source file.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// I/O error (file open/read).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing failed.
    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),

    /// Workbook parsing failed.
    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::Error),

    /// The file extension is not a supported spreadsheet or CSV format.
    #[error("Unsupported source format: {extension}")]
    UnsupportedFormat {
        /// The offending extension (empty when the path has none).
        extension: String,
    },

    /// The workbook has no worksheet or the worksheet has no header row.
    #[error("Source file is empty: {message}")]
    Empty {
        /// Description of what was missing.
        message: String,
    },

    /// One or more required columns are absent from the header row.
    #[error("Missing required columns: {}", .missing.join(", "))]
    MissingColumns {
        /// Header names of the absent columns, in required-column order.
        missing: Vec<String>,
    },
}

/// A source file held in memory with all of its original columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl SourceTable {
    /// Creates a table from a header row and data rows.
    ///
    /// Header names are kept exactly as written. Rows shorter than the
    /// header are padded with empty cells; longer rows are truncated.
    #[must_use]
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, String::new());
                row
            })
            .collect();

        Self { headers, rows }
    }

    /// Returns the header row.
    #[must_use]
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Returns the data rows in file order.
    #[must_use]
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Returns the number of data rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns whether the table has no data rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the position of the first column with exactly this header.
    #[must_use]
    pub fn column_index(&self, header: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == header)
    }

    /// Returns the required columns that are absent from the header row,
    /// in the order they were given.
    #[must_use]
    pub fn missing_columns(&self, required: &[SourceColumn]) -> Vec<SourceColumn> {
        required
            .iter()
            .copied()
            .filter(|column| self.column_index(column.as_ref()).is_none())
            .collect()
    }

    /// Fails if any of the required columns is absent.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::MissingColumns`] naming every absent column.
    pub fn require_columns(&self, required: &[SourceColumn]) -> Result<(), SourceError> {
        let missing = self.missing_columns(required);
        if missing.is_empty() {
            return Ok(());
        }

        Err(SourceError::MissingColumns {
            missing: missing.iter().map(ToString::to_string).collect(),
        })
    }

    /// Projects every row onto the required columns.
    ///
    /// Blank (empty or whitespace-only) cells become `None`; every other cell
    /// is passed through unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::MissingColumns`] if any required column is
    /// absent.
    pub fn to_incidents(&self) -> Result<Vec<RawIncident>, SourceError> {
        self.require_columns(&SourceColumn::ALL)?;

        let positions: Vec<(SourceColumn, usize)> = SourceColumn::ALL
            .into_iter()
            .filter_map(|column| Some((column, self.column_index(column.as_ref())?)))
            .collect();

        let incidents = self
            .rows
            .iter()
            .map(|row| {
                let mut incident = RawIncident::default();
                for &(column, index) in &positions {
                    incident.set(column, non_blank(&row[index]));
                }
                incident
            })
            .collect();

        Ok(incidents)
    }

    /// Logs the header and the first few rows at debug level.
    pub fn log_preview(&self) {
        log::debug!("Columns: {}", self.headers.join(" | "));
        for row in self.rows.iter().take(PREVIEW_ROWS) {
            log::debug!("  {}", row.join(" | "));
        }
    }
}

fn non_blank(cell: &str) -> Option<String> {
    if cell.trim().is_empty() {
        None
    } else {
        Some(cell.to_owned())
    }
}

/// Reads a source file into a [`SourceTable`], choosing the reader from the
/// file extension.
///
/// # Errors
///
/// Returns [`SourceError`] if the format is unsupported or the file cannot
/// be read or parsed.
pub fn read_table(path: &Path) -> Result<SourceTable, SourceError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "csv" => delimited::read_csv(path),
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => spreadsheet::read_workbook(path),
        _ => Err(SourceError::UnsupportedFormat { extension }),
    }
}

/// Loads a source file and returns its rows as [`RawIncident`] values in
/// file order.
///
/// The required-column check runs before any row is returned, so a file
/// with a missing column never reaches cleaning.
///
/// # Errors
///
/// Returns [`SourceError::MissingColumns`] naming the absent columns, or any
/// error from [`read_table`].
pub fn load_incidents(path: &Path) -> Result<Vec<RawIncident>, SourceError> {
    log::info!("Loading source file {}...", path.display());

    let table = read_table(path)?;

    if let Err(e) = table.require_columns(&SourceColumn::ALL) {
        log::error!("{e}");
        return Err(e);
    }

    log::info!("Loaded {} rows from {}", table.len(), path.display());
    table.log_preview();

    table.to_incidents()
}
