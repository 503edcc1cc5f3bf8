//! CSV reader.
//!
//! Parses a delimited text export into a [`SourceTable`] keyed by the
//! column headers in the first row.

use std::io::Read;
use std::path::Path;

use crate::{SourceError, SourceTable};

/// Reads a comma-delimited file from disk.
///
/// # Errors
///
/// Returns [`SourceError`] if the file cannot be opened or parsed.
pub fn read_csv(path: &Path) -> Result<SourceTable, SourceError> {
    let file = std::fs::File::open(path)?;
    let table = read_delimited(file, b',')?;

    log::debug!("Parsed {} CSV rows from {}", table.len(), path.display());

    Ok(table)
}

/// Parses delimited text from any reader.
///
/// Rows may have fewer fields than the header; missing trailing cells are
/// treated as empty.
///
/// # Errors
///
/// Returns [`SourceError::Csv`] on malformed input, or
/// [`SourceError::Empty`] when there is no header row.
pub fn read_delimited<R: Read>(reader: R, delimiter: u8) -> Result<SourceTable, SourceError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_owned).collect();

    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err(SourceError::Empty {
            message: "CSV file contains no header row".to_owned(),
        });
    }

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        rows.push(record.iter().map(str::to_owned).collect());
    }

    Ok(SourceTable::new(headers, rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_header_and_rows() {
        let data = "ID,Date,Block\nJA1,2024-01-01,001XX N STATE ST\nJA2,,\n";
        let table = read_delimited(data.as_bytes(), b',').unwrap();

        assert_eq!(table.headers(), ["ID", "Date", "Block"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[1], ["JA2", "", ""]);
    }

    #[test]
    fn keeps_header_whitespace() {
        let data = "ID, Date ,Block\nJA1,2024-01-01,001XX N STATE ST\n";
        let table = read_delimited(data.as_bytes(), b',').unwrap();

        assert_eq!(table.headers(), ["ID", " Date ", "Block"]);
        assert_eq!(table.column_index("Date"), None);
    }

    #[test]
    fn pads_short_rows() {
        let data = "ID,Date,Block\nJA1\n";
        let table = read_delimited(data.as_bytes(), b',').unwrap();

        assert_eq!(table.rows()[0], ["JA1", "", ""]);
    }

    #[test]
    fn honors_delimiter() {
        let data = "ID\tPrimary Type\nJA1\tTHEFT\n";
        let table = read_delimited(data.as_bytes(), b'\t').unwrap();

        assert_eq!(table.column_index("Primary Type"), Some(1));
        assert_eq!(table.rows()[0][1], "THEFT");
    }

    #[test]
    fn rejects_empty_input() {
        let err = read_delimited("".as_bytes(), b',').unwrap_err();
        assert!(matches!(err, SourceError::Empty { .. }));
    }
}
