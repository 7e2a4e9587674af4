//! Coordinates, date ranges and the location metadata echoed by the upstream

use crate::error::MeteoError;
use crate::units::{HISTORICAL_FLOOR_YEAR, LATITUDE_RANGE, LONGITUDE_RANGE};
use crate::Result;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Degrees either axis may drift before a returned coordinate counts as snapped
pub const GRID_SNAP_TOLERANCE_DEG: f64 = 0.1;

/// A validated point on the globe
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Coordinate {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
}

impl Coordinate {
    /// Create a coordinate, rejecting values outside the valid ranges
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        if !latitude.is_finite() || !LATITUDE_RANGE.contains(&latitude) {
            return Err(MeteoError::invalid_coordinate(
                "latitude",
                format!("latitude must be between -90 and 90, got: {latitude}"),
            ));
        }
        if !longitude.is_finite() || !LONGITUDE_RANGE.contains(&longitude) {
            return Err(MeteoError::invalid_coordinate(
                "longitude",
                format!("longitude must be between -180 and 180, got: {longitude}"),
            ));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Format location as coordinates string
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }

    /// Whether `other` lies within the grid snapping tolerance of this point
    #[must_use]
    pub fn within_tolerance(&self, other: &Coordinate) -> bool {
        (self.latitude - other.latitude).abs() <= GRID_SNAP_TOLERANCE_DEG
            && (self.longitude - other.longitude).abs() <= GRID_SNAP_TOLERANCE_DEG
    }
}

/// Inclusive calendar date range
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Create a range, rejecting `start > end`
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(MeteoError::invalid_date_range(
                &["start_date", "end_date"],
                format!("start_date {start} is after end_date {end}"),
            ));
        }
        Ok(Self { start, end })
    }

    /// Parse two `YYYY-MM-DD` strings into a range
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        let start = parse_date("start_date", start)?;
        let end = parse_date("end_date", end)?;
        Self::new(start, end)
    }

    /// Whether the range begins before the archive's advertised floor
    #[must_use]
    pub fn predates_floor(&self) -> bool {
        self.start.year() < HISTORICAL_FLOOR_YEAR
    }

    /// Number of calendar days covered, both ends included
    #[must_use]
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

fn parse_date(field: &str, value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|e| {
        MeteoError::invalid_date_range(
            &[field],
            format!("{field} must be a YYYY-MM-DD date, got '{value}': {e}"),
        )
    })
}

/// Location block every time-series payload starts with
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct LocationMeta {
    /// Coordinate the upstream actually served (grid cell centre)
    pub coordinate: Coordinate,
    /// Coordinate the caller asked for
    pub requested: Coordinate,
    /// True when `coordinate` lies outside the snapping tolerance of `requested`
    pub grid_snapped: bool,
    /// Elevation in meters
    pub elevation: Option<f64>,
    pub timezone: Option<String>,
    pub timezone_abbreviation: Option<String>,
    pub utc_offset_seconds: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0.0, 0.0)]
    #[case(90.0, 180.0)]
    #[case(-90.0, -180.0)]
    #[case(51.5072, -0.1276)]
    fn test_valid_coordinates(#[case] lat: f64, #[case] lon: f64) {
        let coordinate = Coordinate::new(lat, lon).unwrap();
        assert_eq!(coordinate.latitude, lat);
        assert_eq!(coordinate.longitude, lon);
    }

    #[rstest]
    #[case(90.0001, 0.0, "latitude")]
    #[case(-91.0, 0.0, "latitude")]
    #[case(0.0, 180.5, "longitude")]
    #[case(0.0, -181.0, "longitude")]
    #[case(f64::NAN, 0.0, "latitude")]
    #[case(0.0, f64::INFINITY, "longitude")]
    fn test_invalid_coordinates(#[case] lat: f64, #[case] lon: f64, #[case] field: &str) {
        let err = Coordinate::new(lat, lon).unwrap_err();
        assert!(matches!(err, MeteoError::InvalidCoordinate { .. }));
        assert_eq!(err.offending_fields(), vec![field]);
    }

    #[test]
    fn test_sweep_of_valid_grid_is_accepted() {
        for lat in (-90..=90).step_by(15) {
            for lon in (-180..=180).step_by(30) {
                assert!(Coordinate::new(f64::from(lat), f64::from(lon)).is_ok());
            }
        }
    }

    #[test]
    fn test_within_tolerance() {
        let requested = Coordinate::new(51.5072, -0.1276).unwrap();
        let served = Coordinate::new(51.5, -0.12).unwrap();
        assert!(requested.within_tolerance(&served));

        let far = Coordinate::new(51.8, -0.12).unwrap();
        assert!(!requested.within_tolerance(&far));
    }

    #[test]
    fn test_format_coordinates() {
        let coordinate = Coordinate::new(46.818_234, 8.227_456).unwrap();
        assert_eq!(coordinate.format_coordinates(), "46.8182, 8.2275");
    }

    #[test]
    fn test_date_range() {
        let range = DateRange::parse("2024-01-01", "2024-01-07").unwrap();
        assert_eq!(range.days(), 7);
        assert!(!range.predates_floor());

        let single = DateRange::parse("2024-02-29", "2024-02-29").unwrap();
        assert_eq!(single.days(), 1);
    }

    #[test]
    fn test_reversed_date_range() {
        let err = DateRange::parse("2024-01-08", "2024-01-07").unwrap_err();
        assert!(matches!(err, MeteoError::InvalidDateRange { .. }));
        assert_eq!(err.offending_fields(), vec!["start_date", "end_date"]);
    }

    #[rstest]
    #[case("2024-13-01", "2024-12-31")]
    #[case("yesterday", "2024-12-31")]
    #[case("2024-01-01", "2024-01-01T00:00")]
    fn test_malformed_dates(#[case] start: &str, #[case] end: &str) {
        assert!(matches!(
            DateRange::parse(start, end),
            Err(MeteoError::InvalidDateRange { .. })
        ));
    }

    #[test]
    fn test_floor_is_advisory() {
        let range = DateRange::parse("1939-12-25", "1940-01-02").unwrap();
        assert!(range.predates_floor());
    }
}
