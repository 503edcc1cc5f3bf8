//! Batch insert of cleaned incidents.
//!
//! The whole batch is written inside one transaction: either every row is
//! committed or none are.

use incident_loader_models::CleanIncident;
use switchy_database::{Database, DatabaseValue};

use crate::DbError;

/// Parameterized insert for one incident. Column order matches
/// [`incident_loader_models::DESTINATION_COLUMNS`]; latitude/longitude are
/// cast so the `DECIMAL(9,6)` columns accept a float parameter.
pub const INSERT_INCIDENT_SQL: &str = "INSERT INTO incident_reports (
        case_id, report_date, location_block, incident_type, incident_description,
        arrest_status, domestic_incident, x_coord, y_coord, report_year,
        latitude, longitude
    ) VALUES (
        $1, $2, $3, $4, $5,
        $6, $7, $8, $9, $10,
        CAST($11 AS DOUBLE PRECISION), CAST($12 AS DOUBLE PRECISION)
    )";

/// Projects an incident onto the twelve destination columns, in order.
#[must_use]
pub fn incident_params(incident: &CleanIncident) -> Vec<DatabaseValue> {
    vec![
        incident
            .case_id
            .as_ref()
            .map_or(DatabaseValue::Null, |id| DatabaseValue::String(id.clone())),
        incident
            .report_date
            .map_or(DatabaseValue::Null, DatabaseValue::DateTime),
        incident
            .location_block
            .as_ref()
            .map_or(DatabaseValue::Null, |b| DatabaseValue::String(b.clone())),
        incident
            .incident_type
            .as_ref()
            .map_or(DatabaseValue::Null, |t| DatabaseValue::String(t.clone())),
        incident
            .incident_description
            .as_ref()
            .map_or(DatabaseValue::Null, |d| DatabaseValue::String(d.clone())),
        incident
            .arrest_status
            .map_or(DatabaseValue::Null, DatabaseValue::Bool),
        incident
            .domestic_incident
            .map_or(DatabaseValue::Null, DatabaseValue::Bool),
        incident.x_coord.map_or(DatabaseValue::Null, DatabaseValue::Real64),
        incident.y_coord.map_or(DatabaseValue::Null, DatabaseValue::Real64),
        incident
            .report_year
            .map_or(DatabaseValue::Null, DatabaseValue::Int32),
        DatabaseValue::Real64(incident.latitude),
        DatabaseValue::Real64(incident.longitude),
    ]
}

/// Inserts a batch of cleaned incidents in a single transaction.
///
/// If any row fails, the transaction is rolled back and that row's insert
/// error is returned, even when the rollback itself also fails; nothing from
/// the batch is committed. An empty batch writes
/// nothing.
///
/// # Errors
///
/// Returns [`DbError`] if the transaction cannot be started, any insert
/// fails, or the commit fails.
pub async fn insert_incidents(
    db: &dyn Database,
    incidents: &[CleanIncident],
) -> Result<u64, DbError> {
    if incidents.is_empty() {
        log::info!("No incidents to insert");
        return Ok(0);
    }

    log::info!("Inserting {} incidents...", incidents.len());

    let txn = db.begin_transaction().await?;
    let mut inserted = 0u64;

    for incident in incidents {
        match txn
            .exec_raw_params(INSERT_INCIDENT_SQL, &incident_params(incident))
            .await
        {
            Ok(count) => inserted += count,
            Err(e) => {
                log::error!(
                    "Insert failed for case {}, rolling back batch: {e}",
                    incident.case_id.as_deref().unwrap_or("<none>")
                );
                if let Err(rollback_err) = txn.rollback().await {
                    log::error!("Rollback failed after insert error: {rollback_err}");
                }
                return Err(e.into());
            }
        }
    }

    txn.commit().await?;

    log::info!("Batch insert committed ({inserted} rows)");

    Ok(inserted)
}
