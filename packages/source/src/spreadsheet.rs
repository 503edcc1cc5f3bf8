//! Excel-family workbook reader.
//!
//! Only the first worksheet is read. Its first row is the header; every
//! following row becomes one [`SourceTable`] row with each cell rendered as
//! text.

use std::path::Path;

use calamine::{Data, DataType as _, Reader as _, open_workbook_auto};

use crate::{SourceError, SourceTable};

/// Format used to render date-time cells.
const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Reads the first worksheet of a workbook.
///
/// # Errors
///
/// Returns [`SourceError::Spreadsheet`] if the workbook cannot be opened or
/// parsed, or [`SourceError::Empty`] if it has no worksheet or no header
/// row.
pub fn read_workbook(path: &Path) -> Result<SourceTable, SourceError> {
    let mut workbook = open_workbook_auto(path)?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .unwrap_or_default();

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| SourceError::Empty {
            message: format!("{} has no worksheets", path.display()),
        })??;

    let mut rows = range.rows();

    let Some(header_row) = rows.next() else {
        return Err(SourceError::Empty {
            message: format!("worksheet '{sheet_name}' has no header row"),
        });
    };

    let headers = header_row.iter().map(cell_text).collect();
    let rows: Vec<Vec<String>> = rows.map(|row| row.iter().map(cell_text).collect()).collect();

    log::debug!(
        "Read {} rows from worksheet '{sheet_name}' of {}",
        rows.len(),
        path.display()
    );

    Ok(SourceTable::new(headers, rows))
}

/// Renders a cell as text.
///
/// Empty and error cells become empty strings. Date-time cells are rendered
/// as `YYYY-MM-DD HH:MM:SS` so they parse like their CSV counterparts.
#[must_use]
pub fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(_) | Data::DateTimeIso(_) => cell
            .as_datetime()
            .map_or_else(|| cell.to_string(), |dt| dt.format(DATE_TIME_FORMAT).to_string()),
        _ => cell.to_string(),
    }
}
