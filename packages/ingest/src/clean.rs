//! Row cleaning.
//!
//! Turns the raw text rows of one batch into [`CleanIncident`] values. The
//! steps run in a fixed order because later steps rely on earlier ones:
//!
//! 1. Parse report timestamps (unparseable values become null, the row is
//!    kept).
//! 2. Fill missing planar x/y coordinates with the batch median of each
//!    column, computed once over the non-missing values.
//! 3. Title-case the incident category.
//! 4. Drop rows whose latitude/longitude is missing or outside the fence.
//! 5. Drop rows whose identifier was already seen, keeping the first.

use std::collections::BTreeSet;

use chrono::NaiveDateTime;
use incident_loader_models::{BoundingBox, CleanIncident, CleanReport, RawIncident};
use incident_loader_source::parsing::{parse_flag, parse_float, parse_report_date, parse_year};

/// Number of cleaned rows logged as a preview.
const PREVIEW_ROWS: usize = 5;

/// The cleaned rows of a batch along with what cleaning did to them.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanOutcome {
    /// Surviving incidents, in source order.
    pub incidents: Vec<CleanIncident>,
    /// Per-step counters.
    pub report: CleanReport,
}

/// A row with every cell typed but not yet geofenced.
#[derive(Debug, Clone)]
struct TypedIncident {
    case_id: Option<String>,
    report_date: Option<NaiveDateTime>,
    location_block: Option<String>,
    incident_type: Option<String>,
    incident_description: Option<String>,
    arrest_status: Option<bool>,
    domestic_incident: Option<bool>,
    x_coord: Option<f64>,
    y_coord: Option<f64>,
    report_year: Option<i32>,
    latitude: Option<f64>,
    longitude: Option<f64>,
}

impl TypedIncident {
    /// Types every cell. Also returns whether a non-empty timestamp had to
    /// be discarded.
    fn from_raw(row: RawIncident) -> (Self, bool) {
        let report_date = row.date.as_deref().and_then(parse_report_date);
        let coerced = row.date.is_some() && report_date.is_none();

        let typed = Self {
            case_id: row.id,
            report_date,
            location_block: row.block,
            incident_type: row.primary_type,
            incident_description: row.description,
            arrest_status: row.arrest.as_deref().and_then(parse_flag),
            domestic_incident: row.domestic.as_deref().and_then(parse_flag),
            x_coord: row.x_coordinate.as_deref().and_then(parse_float),
            y_coord: row.y_coordinate.as_deref().and_then(parse_float),
            report_year: row.year.as_deref().and_then(parse_year),
            latitude: row.latitude.as_deref().and_then(parse_float),
            longitude: row.longitude.as_deref().and_then(parse_float),
        };

        (typed, coerced)
    }

    /// Returns the incident if its coordinates are present and inside
    /// `fence`.
    fn geofence(self, fence: &BoundingBox) -> Option<CleanIncident> {
        let (Some(latitude), Some(longitude)) = (self.latitude, self.longitude) else {
            return None;
        };
        if !fence.contains(latitude, longitude) {
            return None;
        }

        Some(CleanIncident {
            case_id: self.case_id,
            report_date: self.report_date,
            location_block: self.location_block,
            incident_type: self.incident_type,
            incident_description: self.incident_description,
            arrest_status: self.arrest_status,
            domestic_incident: self.domestic_incident,
            x_coord: self.x_coord,
            y_coord: self.y_coord,
            report_year: self.report_year,
            latitude,
            longitude,
        })
    }
}

/// Cleans a batch using the City of Chicago geofence.
#[must_use]
pub fn clean(rows: Vec<RawIncident>) -> CleanOutcome {
    clean_with_fence(rows, &BoundingBox::CHICAGO)
}

/// Cleans a batch, keeping only rows inside `fence`.
#[must_use]
pub fn clean_with_fence(rows: Vec<RawIncident>, fence: &BoundingBox) -> CleanOutcome {
    log::info!("Cleaning {} rows...", rows.len());

    let mut report = CleanReport {
        input_rows: rows.len(),
        ..CleanReport::default()
    };

    let mut typed = Vec::with_capacity(rows.len());
    for row in rows {
        let (incident, coerced) = TypedIncident::from_raw(row);
        if coerced {
            report.dates_coerced += 1;
        }
        typed.push(incident);
    }

    // Both medians come from the full batch before any value is filled in.
    let x_median = median(typed.iter().filter_map(|t| t.x_coord).collect());
    let y_median = median(typed.iter().filter_map(|t| t.y_coord).collect());

    for incident in &mut typed {
        if incident.x_coord.is_none() && x_median.is_some() {
            incident.x_coord = x_median;
            report.x_imputed += 1;
        }
        if incident.y_coord.is_none() && y_median.is_some() {
            incident.y_coord = y_median;
            report.y_imputed += 1;
        }
        incident.incident_type = incident.incident_type.as_deref().map(title_case);
    }

    let fenced: Vec<CleanIncident> = typed
        .into_iter()
        .filter_map(|incident| incident.geofence(fence))
        .collect();
    report.out_of_bounds = report.input_rows - fenced.len();

    let fenced_len = fenced.len();
    let incidents = dedup_by_case_id(fenced);
    report.duplicates = fenced_len - incidents.len();
    report.output_rows = incidents.len();

    log::info!(
        "Data cleaning completed: {} in, {} out ({} out of bounds, {} duplicates, \
         {} dates coerced, {} x imputed, {} y imputed)",
        report.input_rows,
        report.output_rows,
        report.out_of_bounds,
        report.duplicates,
        report.dates_coerced,
        report.x_imputed,
        report.y_imputed,
    );
    for incident in incidents.iter().take(PREVIEW_ROWS) {
        log::debug!("  {incident:?}");
    }

    CleanOutcome { incidents, report }
}

/// Returns the median, or `None` for an empty set. An even-sized set yields
/// the mean of its two middle values.
#[must_use]
pub fn median(mut values: Vec<f64>) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;

    if values.len() % 2 == 1 {
        Some(values[mid])
    } else {
        Some(f64::midpoint(values[mid - 1], values[mid]))
    }
}

/// Title-cases text: each letter that follows a non-letter is upper-cased
/// and every other letter is lower-cased (`"NON-CRIMINAL"` becomes
/// `"Non-Criminal"`).
#[must_use]
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut previous_is_letter = false;

    for c in s.chars() {
        if c.is_alphabetic() {
            if previous_is_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            previous_is_letter = true;
        } else {
            out.push(c);
            previous_is_letter = false;
        }
    }

    out
}

/// Keeps the first incident for each identifier, preserving order. Rows
/// without an identifier share one key.
#[must_use]
pub fn dedup_by_case_id(incidents: Vec<CleanIncident>) -> Vec<CleanIncident> {
    let mut seen = BTreeSet::new();
    incidents
        .into_iter()
        .filter(|incident| seen.insert(incident.case_id.clone()))
        .collect()
}
