#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Storage side of the incident loader.
//!
//! [`db`] turns `DB_*` settings into a `PostgreSQL` connection, [`schema`]
//! makes sure `incident_reports` exists before anything is written, and
//! [`queries`] inserts a cleaned batch atomically.

pub mod db;
pub mod queries;
pub mod schema;

/// Errors raised while connecting to, preparing, or writing the destination
/// database.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// A statement against the destination database failed.
    #[error("incident_reports query failed: {0}")]
    Database(#[from] switchy_database::DatabaseError),

    /// The `incident_reports` migration could not be applied.
    #[error("Schema setup failed: {0}")]
    Migration(#[from] switchy_schema::MigrationError),

    /// The database could not be reached.
    #[error("Could not connect to the incident database: {message}")]
    Connection {
        /// Description of what went wrong.
        message: String,
    },

    /// A `DB_*` setting is invalid.
    #[error("Invalid database setting: {message}")]
    Config {
        /// Description of what went wrong.
        message: String,
    },
}
