#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Library for cleaning a crime incident spreadsheet and loading it into the
//! `incident_reports` table.
//!
//! One run is strictly linear: ensure the table exists, read and validate
//! the source file, clean the rows, and insert them in one transaction. Any
//! failure aborts the run; a failed run is simply re-executed.

pub mod clean;

use std::path::Path;
use std::time::Instant;

use incident_loader_database::{DbError, queries, schema};
use incident_loader_models::CleanReport;
use incident_loader_source::SourceError;
use switchy_database::Database;

/// Source file used when none is given on the command line.
pub const DEFAULT_SOURCE_FILE: &str = "Crime_Data.xlsx";

/// Errors that abort an import run.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// The source file could not be read or is missing required columns.
    #[error(transparent)]
    Source(#[from] SourceError),

    /// Schema setup or the batch insert failed.
    #[error(transparent)]
    Database(#[from] DbError),
}

/// What a completed run did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    /// Cleaning counters for the batch.
    pub report: CleanReport,
    /// Rows written to the destination table.
    pub inserted: u64,
}

/// Runs the whole job: schema setup, then [`import_file`].
///
/// # Errors
///
/// Returns [`IngestError`] if the schema cannot be created, the source file
/// is unreadable or incomplete, or the batch insert fails.
pub async fn run(db: &dyn Database, path: &Path) -> Result<ImportSummary, IngestError> {
    schema::ensure_incident_table(db).await?;
    import_file(db, path).await
}

/// Loads, cleans, and inserts one source file into an existing table.
///
/// Nothing is written unless the file has every required column and every
/// cleaned row inserts successfully.
///
/// # Errors
///
/// Returns [`IngestError::Source`] if the file is unreadable or missing
/// required columns, or [`IngestError::Database`] if the insert fails.
pub async fn import_file(db: &dyn Database, path: &Path) -> Result<ImportSummary, IngestError> {
    let start = Instant::now();

    let rows = incident_loader_source::load_incidents(path)?;
    let outcome = clean::clean(rows);
    let inserted = queries::insert_incidents(db, &outcome.incidents).await?;

    log::info!(
        "Imported {inserted} of {} rows from {} in {:.1}s",
        outcome.report.input_rows,
        path.display(),
        start.elapsed().as_secs_f64()
    );

    Ok(ImportSummary {
        report: outcome.report,
        inserted,
    })
}

#[cfg(test)]
mod tests {
    use moosicbox_json_utils::database::ToValue as _;
    use switchy_database_connection::init_sqlite_rusqlite;

    use super::*;

    const HEADER: &str = "ID,Date,Block,Primary Type,Description,Arrest,Domestic,\
                          X Coordinate,Y Coordinate,Year,Latitude,Longitude";

    const TEST_TABLE_SQL: &str = "CREATE TABLE incident_reports (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            case_id TEXT,
            report_date TEXT,
            location_block TEXT,
            incident_type TEXT,
            incident_description TEXT,
            arrest_status INTEGER,
            domestic_incident INTEGER,
            x_coord REAL,
            y_coord REAL,
            report_year INTEGER,
            latitude REAL,
            longitude REAL
        )";

    async fn test_db(dir: &tempfile::TempDir) -> Box<dyn Database> {
        let db = init_sqlite_rusqlite(Some(&dir.path().join("incidents.db"))).unwrap();
        db.exec_raw(TEST_TABLE_SQL).await.unwrap();
        db
    }

    async fn case_ids(db: &dyn Database) -> Vec<String> {
        db.query_raw_params("SELECT case_id FROM incident_reports ORDER BY id", &[])
            .await
            .unwrap()
            .iter()
            .map(|row| row.to_value("case_id").unwrap())
            .collect()
    }

    #[tokio::test]
    async fn imports_cleaned_rows_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let db = test_db(&dir).await;
        let path = dir.path().join("incidents.csv");
        std::fs::write(
            &path,
            format!(
                "{HEADER}\n\
                 JA1,01/15/2024 10:30:00 AM,001XX N STATE ST,THEFT,RETAIL,false,false,1176000,1900000,2024,41.88,-87.63\n\
                 JA2,garbage,002XX W MADISON ST,BATTERY,SIMPLE,true,true,,1900100,2024,41.89,-87.64\n\
                 JA3,2024-01-15 11:00:00,003XX S CLARK ST,ROBBERY,ARMED,false,false,1176200,1900200,2024,50.0,-87.63\n\
                 JA1,2024-01-15 12:00:00,004XX E GRAND AVE,THEFT,OVER $500,false,false,1176300,1900300,2024,41.90,-87.62\n\
                 JA5,2024-01-15 13:00:00,005XX N MICHIGAN AVE,NARCOTICS,POSS,true,false,1176400,1900400,2024,41.91,-87.62\n"
            ),
        )
        .unwrap();

        let summary = import_file(db.as_ref(), &path).await.unwrap();

        assert_eq!(summary.inserted, 3);
        assert_eq!(summary.report.out_of_bounds, 1);
        assert_eq!(summary.report.duplicates, 1);
        assert_eq!(summary.report.dates_coerced, 1);
        assert_eq!(case_ids(db.as_ref()).await, ["JA1", "JA2", "JA5"]);
    }

    #[tokio::test]
    async fn run_creates_table_then_imports() {
        let dir = tempfile::tempdir().unwrap();
        let db = init_sqlite_rusqlite(Some(&dir.path().join("fresh.db"))).unwrap();
        let path = dir.path().join("incidents.csv");
        std::fs::write(
            &path,
            format!(
                "{HEADER}\n\
                 JA1,2024-01-15 10:30:00,001XX N STATE ST,THEFT,RETAIL,false,false,1176000,1900000,2024,41.88,-87.63\n\
                 JA2,2024-01-15 11:00:00,002XX W MADISON ST,BATTERY,SIMPLE,true,true,,1900100,2024,41.89,-87.64\n"
            ),
        )
        .unwrap();

        let summary = run(db.as_ref(), &path).await.unwrap();
        assert_eq!(summary.inserted, 2);

        let summary = run(db.as_ref(), &path).await.unwrap();
        assert_eq!(summary.inserted, 2);

        let rows = db
            .query_raw_params("SELECT COUNT(*) AS n FROM incident_reports", &[])
            .await
            .unwrap();
        let count: i64 = (&rows[0]).to_value("n").unwrap();
        assert_eq!(count, 4);
    }

    #[tokio::test]
    async fn missing_column_aborts_before_insert() {
        let dir = tempfile::tempdir().unwrap();
        let db = test_db(&dir).await;
        let path = dir.path().join("incidents.csv");
        std::fs::write(
            &path,
            "ID,Date,Block,Description,Arrest,Domestic,X Coordinate,Y Coordinate,Year,Latitude,Longitude\n\
             JA1,2024-01-15 10:30:00,001XX N STATE ST,RETAIL,false,false,1176000,1900000,2024,41.88,-87.63\n",
        )
        .unwrap();

        let err = import_file(db.as_ref(), &path).await.unwrap_err();

        assert!(matches!(
            err,
            IngestError::Source(SourceError::MissingColumns { ref missing })
                if missing == &["Primary Type".to_string()]
        ));
        assert!(case_ids(db.as_ref()).await.is_empty());
    }

    #[tokio::test]
    async fn unreadable_file_is_a_source_error() {
        let dir = tempfile::tempdir().unwrap();
        let db = test_db(&dir).await;

        let err = import_file(db.as_ref(), &dir.path().join("missing.csv"))
            .await
            .unwrap_err();

        assert!(matches!(err, IngestError::Source(SourceError::Io(_))));
    }
}
