//! Time-indexed columns decoded from parallel upstream arrays

use crate::error::MeteoError;
use crate::Result;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A sample instant: hourly series use date-times, daily series use dates
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Timestamp {
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl Timestamp {
    /// Parse the ISO 8601 forms the upstream emits
    pub fn parse(value: &str) -> Result<Self> {
        for format in ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S"] {
            if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
                return Ok(Self::DateTime(dt));
            }
        }
        NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .map(Self::Date)
            .map_err(|_| MeteoError::decode_field("time", format!("invalid timestamp '{value}'")))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Date(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            Self::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M")),
        }
    }
}

/// Values of one column; `None` marks a sample the upstream reported as missing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnValues {
    Numeric(Vec<Option<f64>>),
    Text(Vec<Option<String>>),
}

impl ColumnValues {
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Numeric(values) => values.len(),
            Self::Text(values) => values.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn as_numeric(&self) -> Option<&[Option<f64>]> {
        match self {
            Self::Numeric(values) => Some(values),
            Self::Text(_) => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&[Option<String>]> {
        match self {
            Self::Text(values) => Some(values),
            Self::Numeric(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Variable name as requested
    pub name: String,
    /// Unit string echoed by the upstream, e.g. "°C"
    pub unit: Option<String>,
    pub values: ColumnValues,
}

/// Parallel timestamps and columns; every column is exactly as long as `times`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeries {
    times: Vec<Timestamp>,
    columns: Vec<Column>,
}

impl TimeSeries {
    /// Build a series, rejecting any column whose length differs from `times`
    pub fn new(times: Vec<Timestamp>, columns: Vec<Column>) -> Result<Self> {
        if let Some(bad) = columns.iter().find(|c| c.values.len() != times.len()) {
            return Err(MeteoError::decode_field(
                &bad.name,
                format!(
                    "variable '{}' has {} values but there are {} timestamps",
                    bad.name,
                    bad.values.len(),
                    times.len()
                ),
            ));
        }
        Ok(Self { times, columns })
    }

    #[must_use]
    pub fn times(&self) -> &[Timestamp] {
        &self.times
    }

    /// Columns in request order
    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    #[must_use]
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Numeric samples of `name`, if it is a numeric column
    #[must_use]
    pub fn numeric(&self, name: &str) -> Option<&[Option<f64>]> {
        self.column(name).and_then(|c| c.values.as_numeric())
    }

    /// Number of samples
    #[must_use]
    pub fn len(&self) -> usize {
        self.times.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }
}

/// Distinguishes a group the caller never asked for from one that came back empty
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum SeriesGroup<T> {
    NotRequested,
    Requested(T),
}

impl<T> SeriesGroup<T> {
    #[must_use]
    pub fn is_requested(&self) -> bool {
        matches!(self, Self::Requested(_))
    }

    #[must_use]
    pub fn as_requested(&self) -> Option<&T> {
        match self {
            Self::Requested(value) => Some(value),
            Self::NotRequested => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numeric(name: &str, values: Vec<Option<f64>>) -> Column {
        Column {
            name: name.to_string(),
            unit: None,
            values: ColumnValues::Numeric(values),
        }
    }

    #[test]
    fn test_timestamp_parsing() {
        let hourly = Timestamp::parse("2024-11-22T10:00").unwrap();
        assert!(matches!(hourly, Timestamp::DateTime(_)));
        assert_eq!(hourly.to_string(), "2024-11-22T10:00");

        let daily = Timestamp::parse("2024-11-22").unwrap();
        assert!(matches!(daily, Timestamp::Date(_)));
        assert_eq!(daily.to_string(), "2024-11-22");

        assert!(Timestamp::parse("22/11/2024").is_err());
    }

    #[test]
    fn test_series_lengths_must_match() {
        let times = vec![
            Timestamp::parse("2024-01-01T00:00").unwrap(),
            Timestamp::parse("2024-01-01T01:00").unwrap(),
        ];
        let err = TimeSeries::new(times, vec![numeric("temperature_2m", vec![Some(1.0)])])
            .unwrap_err();
        assert!(matches!(err, MeteoError::DecodeError { .. }));
        assert_eq!(err.offending_fields(), vec!["temperature_2m"]);
    }

    #[test]
    fn test_series_lookup() {
        let times = vec![Timestamp::parse("2024-01-01").unwrap()];
        let series = TimeSeries::new(
            times,
            vec![
                numeric("temperature_2m_max", vec![Some(8.0)]),
                numeric("precipitation_sum", vec![None]),
            ],
        )
        .unwrap();

        assert_eq!(series.len(), 1);
        assert_eq!(series.numeric("temperature_2m_max"), Some(&[Some(8.0)][..]));
        assert_eq!(series.numeric("precipitation_sum"), Some(&[None][..]));
        assert!(series.column("rain_sum").is_none());
        assert_eq!(series.columns()[0].name, "temperature_2m_max");
    }

    #[test]
    fn test_empty_series_is_valid() {
        let series = TimeSeries::new(Vec::new(), vec![numeric("pm10", Vec::new())]).unwrap();
        assert!(series.is_empty());
    }

    #[test]
    fn test_group_serialization() {
        let absent: SeriesGroup<TimeSeries> = SeriesGroup::NotRequested;
        let json = serde_json::to_value(&absent).unwrap();
        assert_eq!(json["status"], "not_requested");

        let empty = SeriesGroup::Requested(TimeSeries::new(Vec::new(), Vec::new()).unwrap());
        let json = serde_json::to_value(&empty).unwrap();
        assert_eq!(json["status"], "requested");
        assert!(json["data"]["times"].as_array().unwrap().is_empty());
    }
}
