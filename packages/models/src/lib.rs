#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Incident record types shared by every stage of the import job.
//!
//! Rows enter the pipeline as [`RawIncident`] values (one text cell per
//! [`SourceColumn`]) and leave it as [`CleanIncident`] values that are ready
//! to be written to [`DESTINATION_TABLE`].

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Name of the table incidents are loaded into.
pub const DESTINATION_TABLE: &str = "incident_reports";

/// Destination columns, in the order [`CleanIncident`] values are bound.
///
/// The surrogate `id` column is assigned by the database and is not listed.
pub const DESTINATION_COLUMNS: [&str; 12] = [
    "case_id",
    "report_date",
    "location_block",
    "incident_type",
    "incident_description",
    "arrest_status",
    "domestic_incident",
    "x_coord",
    "y_coord",
    "report_year",
    "latitude",
    "longitude",
];

/// A column the source spreadsheet must provide. Header names are matched
/// exactly (case-sensitive); [`AsRef<str>`] and [`Display`](std::fmt::Display)
/// both yield the header text.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum SourceColumn {
    #[strum(serialize = "ID")]
    #[serde(rename = "ID")]
    Id,
    #[strum(serialize = "Date")]
    #[serde(rename = "Date")]
    Date,
    #[strum(serialize = "Block")]
    #[serde(rename = "Block")]
    Block,
    #[strum(serialize = "Primary Type")]
    #[serde(rename = "Primary Type")]
    PrimaryType,
    #[strum(serialize = "Description")]
    #[serde(rename = "Description")]
    Description,
    #[strum(serialize = "Arrest")]
    #[serde(rename = "Arrest")]
    Arrest,
    #[strum(serialize = "Domestic")]
    #[serde(rename = "Domestic")]
    Domestic,
    #[strum(serialize = "X Coordinate")]
    #[serde(rename = "X Coordinate")]
    XCoordinate,
    #[strum(serialize = "Y Coordinate")]
    #[serde(rename = "Y Coordinate")]
    YCoordinate,
    #[strum(serialize = "Year")]
    #[serde(rename = "Year")]
    Year,
    #[strum(serialize = "Latitude")]
    #[serde(rename = "Latitude")]
    Latitude,
    #[strum(serialize = "Longitude")]
    #[serde(rename = "Longitude")]
    Longitude,
}

impl SourceColumn {
    /// Every required column, in the same order as [`DESTINATION_COLUMNS`].
    pub const ALL: [Self; 12] = [
        Self::Id,
        Self::Date,
        Self::Block,
        Self::PrimaryType,
        Self::Description,
        Self::Arrest,
        Self::Domestic,
        Self::XCoordinate,
        Self::YCoordinate,
        Self::Year,
        Self::Latitude,
        Self::Longitude,
    ];
}

/// A source row projected onto the required columns.
///
/// Every cell is kept as text; empty cells are `None`. Typing happens during
/// cleaning so that malformed values can be coerced instead of rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawIncident {
    /// Business identifier (`ID`).
    pub id: Option<String>,
    /// Report timestamp as written in the source (`Date`).
    pub date: Option<String>,
    /// Block-level location text (`Block`).
    pub block: Option<String>,
    /// Incident category (`Primary Type`).
    pub primary_type: Option<String>,
    /// Narrative (`Description`).
    pub description: Option<String>,
    /// Arrest flag (`Arrest`).
    pub arrest: Option<String>,
    /// Domestic flag (`Domestic`).
    pub domestic: Option<String>,
    /// Planar x coordinate (`X Coordinate`).
    pub x_coordinate: Option<String>,
    /// Planar y coordinate (`Y Coordinate`).
    pub y_coordinate: Option<String>,
    /// Report year (`Year`).
    pub year: Option<String>,
    /// WGS84 latitude (`Latitude`).
    pub latitude: Option<String>,
    /// WGS84 longitude (`Longitude`).
    pub longitude: Option<String>,
}

impl RawIncident {
    /// Returns the cell for the given column.
    #[must_use]
    pub fn get(&self, column: SourceColumn) -> Option<&str> {
        match column {
            SourceColumn::Id => self.id.as_deref(),
            SourceColumn::Date => self.date.as_deref(),
            SourceColumn::Block => self.block.as_deref(),
            SourceColumn::PrimaryType => self.primary_type.as_deref(),
            SourceColumn::Description => self.description.as_deref(),
            SourceColumn::Arrest => self.arrest.as_deref(),
            SourceColumn::Domestic => self.domestic.as_deref(),
            SourceColumn::XCoordinate => self.x_coordinate.as_deref(),
            SourceColumn::YCoordinate => self.y_coordinate.as_deref(),
            SourceColumn::Year => self.year.as_deref(),
            SourceColumn::Latitude => self.latitude.as_deref(),
            SourceColumn::Longitude => self.longitude.as_deref(),
        }
    }

    /// Sets the cell for the given column.
    pub fn set(&mut self, column: SourceColumn, value: Option<String>) {
        let slot = match column {
            SourceColumn::Id => &mut self.id,
            SourceColumn::Date => &mut self.date,
            SourceColumn::Block => &mut self.block,
            SourceColumn::PrimaryType => &mut self.primary_type,
            SourceColumn::Description => &mut self.description,
            SourceColumn::Arrest => &mut self.arrest,
            SourceColumn::Domestic => &mut self.domestic,
            SourceColumn::XCoordinate => &mut self.x_coordinate,
            SourceColumn::YCoordinate => &mut self.y_coordinate,
            SourceColumn::Year => &mut self.year,
            SourceColumn::Latitude => &mut self.latitude,
            SourceColumn::Longitude => &mut self.longitude,
        };
        *slot = value;
    }
}

/// An incident that survived cleaning and is ready for insertion.
///
/// Coordinates are guaranteed to lie inside the geofence the batch was
/// cleaned with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanIncident {
    /// Business identifier, unique within the batch.
    pub case_id: Option<String>,
    /// Report timestamp. `None` when the source value was unparseable.
    pub report_date: Option<NaiveDateTime>,
    /// Block-level location text (e.g., "041XX W MADISON ST").
    pub location_block: Option<String>,
    /// Title-cased incident category (e.g., "Motor Vehicle Theft").
    pub incident_type: Option<String>,
    /// Free-text narrative.
    pub incident_description: Option<String>,
    /// Whether an arrest was made.
    pub arrest_status: Option<bool>,
    /// Whether the incident was domestic.
    pub domestic_incident: Option<bool>,
    /// Planar x coordinate, median-imputed when missing. Only `None` when no
    /// row in the batch had a value.
    pub x_coord: Option<f64>,
    /// Planar y coordinate, median-imputed when missing. Only `None` when no
    /// row in the batch had a value.
    pub y_coord: Option<f64>,
    /// Report year.
    pub report_year: Option<i32>,
    /// WGS84 latitude.
    pub latitude: f64,
    /// WGS84 longitude.
    pub longitude: f64,
}

/// A rectangular latitude/longitude fence. Bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingBox {
    /// Southern edge, in decimal degrees.
    pub min_latitude: f64,
    /// Northern edge, in decimal degrees.
    pub max_latitude: f64,
    /// Western edge, in decimal degrees.
    pub min_longitude: f64,
    /// Eastern edge, in decimal degrees.
    pub max_longitude: f64,
}

impl BoundingBox {
    /// The City of Chicago extent.
    pub const CHICAGO: Self = Self {
        min_latitude: 41.6445,
        max_latitude: 42.0231,
        min_longitude: -87.9401,
        max_longitude: -87.5245,
    };

    /// Returns whether the point lies inside the box, edges included.
    #[must_use]
    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        (self.min_latitude..=self.max_latitude).contains(&latitude)
            && (self.min_longitude..=self.max_longitude).contains(&longitude)
    }
}

/// Counters collected while cleaning one batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanReport {
    /// Rows read from the source.
    pub input_rows: usize,
    /// Non-empty timestamps that could not be parsed and were set to null.
    pub dates_coerced: usize,
    /// Missing x coordinates filled with the batch median.
    pub x_imputed: usize,
    /// Missing y coordinates filled with the batch median.
    pub y_imputed: usize,
    /// Rows dropped for missing or out-of-bounds latitude/longitude.
    pub out_of_bounds: usize,
    /// Rows dropped because an earlier row had the same identifier.
    pub duplicates: usize,
    /// Rows remaining after cleaning.
    pub output_rows: usize,
}

#[cfg(test)]
mod tests {
    use std::str::FromStr as _;

    use super::*;

    #[test]
    fn source_column_header_round_trips() {
        for column in SourceColumn::ALL {
            assert_eq!(SourceColumn::from_str(column.as_ref()).unwrap(), column);
            assert_eq!(column.to_string(), column.as_ref());
        }
        assert_eq!(SourceColumn::PrimaryType.as_ref(), "Primary Type");
        assert_eq!(SourceColumn::XCoordinate.as_ref(), "X Coordinate");
    }

    #[test]
    fn source_columns_are_case_sensitive() {
        assert!(SourceColumn::from_str("primary type").is_err());
        assert!(SourceColumn::from_str("id").is_err());
    }

    #[test]
    fn raw_incident_get_set() {
        let mut raw = RawIncident::default();
        for (i, column) in SourceColumn::ALL.into_iter().enumerate() {
            raw.set(column, Some(i.to_string()));
        }
        for (i, column) in SourceColumn::ALL.into_iter().enumerate() {
            assert_eq!(raw.get(column), Some(i.to_string().as_str()));
        }
    }

    #[test]
    fn chicago_box_is_inclusive() {
        let fence = BoundingBox::CHICAGO;
        assert!(fence.contains(41.6445, -87.9401));
        assert!(fence.contains(42.0231, -87.5245));
        assert!(fence.contains(41.8781, -87.6298));
    }

    #[test]
    fn chicago_box_rejects_outside_points() {
        let fence = BoundingBox::CHICAGO;
        assert!(!fence.contains(50.0, -87.6298));
        assert!(!fence.contains(41.8781, -87.5244));
        assert!(!fence.contains(41.6444, -87.6298));
        assert!(!fence.contains(f64::NAN, -87.6298));
    }
}
