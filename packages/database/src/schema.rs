//! Creation of the destination table.
//!
//! The DDL lives in the workspace `migrations/` directory and is compiled
//! into the binary, so the loader needs nothing on disk besides its input.

use include_dir::{Dir, include_dir};
use incident_loader_models::DESTINATION_TABLE;
use switchy_database::Database;
use switchy_schema::discovery::embedded::EmbeddedMigrationSource;
use switchy_schema::runner::MigrationRunner;

use crate::DbError;

static MIGRATIONS_DIR: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/../../migrations");

/// Makes sure the `incident_reports` table exists.
///
/// Safe to call on every run. Already-applied migrations are skipped, and
/// the table DDL uses `CREATE TABLE IF NOT EXISTS`, so a table created
/// outside this tool is left untouched along with its rows.
///
/// # Errors
///
/// Returns [`DbError::Migration`] if the migration cannot be applied.
pub async fn ensure_incident_table(db: &dyn Database) -> Result<(), DbError> {
    let runner = MigrationRunner::new(Box::new(EmbeddedMigrationSource::new(&MIGRATIONS_DIR)));
    runner.run(db).await?;

    log::info!("Table '{DESTINATION_TABLE}' created or already exists");

    Ok(())
}

#[cfg(test)]
mod tests {
    use moosicbox_json_utils::database::ToValue as _;
    use switchy_database_connection::init_sqlite_rusqlite;

    use super::*;

    fn open(dir: &tempfile::TempDir) -> Box<dyn Database> {
        init_sqlite_rusqlite(Some(&dir.path().join("incidents.db"))).unwrap()
    }

    async fn case_ids(db: &dyn Database) -> Vec<String> {
        db.query_raw_params("SELECT case_id FROM incident_reports ORDER BY case_id", &[])
            .await
            .unwrap()
            .iter()
            .map(|row| row.to_value("case_id").unwrap())
            .collect()
    }

    #[tokio::test]
    async fn creates_table_and_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let db = open(&dir);

        ensure_incident_table(db.as_ref()).await.unwrap();
        db.exec_raw(
            "INSERT INTO incident_reports (case_id, arrest_status, latitude, longitude) \
             VALUES ('JA100', 0, 41.8781, -87.6298)",
        )
        .await
        .unwrap();

        ensure_incident_table(db.as_ref()).await.unwrap();

        assert_eq!(case_ids(db.as_ref()).await, ["JA100"]);
    }

    #[tokio::test]
    async fn created_table_accepts_every_destination_column() {
        let dir = tempfile::tempdir().unwrap();
        let db = open(&dir);

        ensure_incident_table(db.as_ref()).await.unwrap();

        let columns = incident_loader_models::DESTINATION_COLUMNS.join(", ");
        let rows = db
            .query_raw_params(&format!("SELECT {columns} FROM incident_reports"), &[])
            .await
            .unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn leaves_existing_table_and_rows_alone() {
        let dir = tempfile::tempdir().unwrap();
        let db = open(&dir);

        db.exec_raw(
            "CREATE TABLE incident_reports (
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
            )",
        )
        .await
        .unwrap();
        db.exec_raw("INSERT INTO incident_reports (case_id) VALUES ('JA001'), ('JA002')")
            .await
            .unwrap();

        ensure_incident_table(db.as_ref()).await.unwrap();

        assert_eq!(case_ids(db.as_ref()).await, ["JA001", "JA002"]);
    }
}
