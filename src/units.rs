//! Unit option sets and numeric validity ranges

use crate::error::MeteoError;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// Valid latitude in decimal degrees
pub const LATITUDE_RANGE: RangeInclusive<f64> = -90.0..=90.0;
/// Valid longitude in decimal degrees
pub const LONGITUDE_RANGE: RangeInclusive<f64> = -180.0..=180.0;
/// Forecast horizon in days
pub const FORECAST_DAYS_RANGE: RangeInclusive<i64> = 1..=16;
/// Number of geocoding matches the upstream will return
pub const GEOCODING_COUNT_RANGE: RangeInclusive<i64> = 1..=100;
/// Earliest year the archive advertises; advisory only, coverage varies per grid cell
pub const HISTORICAL_FLOOR_YEAR: i32 = 1940;

pub const DEFAULT_FORECAST_DAYS: i64 = 7;
pub const DEFAULT_GEOCODING_COUNT: i64 = 10;

/// Check an integer argument against its range
pub fn check_range(field: &str, value: i64, range: &RangeInclusive<i64>) -> Result<i64> {
    if range.contains(&value) {
        Ok(value)
    } else {
        Err(MeteoError::InvalidRange {
            field: field.to_string(),
            value,
            min: *range.start(),
            max: *range.end(),
        })
    }
}

/// Shared behaviour of the enumerated option sets
pub trait UnitOption: Sized + Copy + 'static {
    /// Argument name the option is supplied under
    const FIELD: &'static str;
    /// Every option, default first
    const OPTIONS: &'static [Self];

    fn as_str(self) -> &'static str;

    /// Parse an exact option name; anything else is rejected with the allowed set
    fn parse(value: &str) -> Result<Self> {
        Self::OPTIONS
            .iter()
            .copied()
            .find(|option| option.as_str() == value)
            .ok_or_else(|| MeteoError::InvalidUnit {
                field: Self::FIELD.to_string(),
                value: value.to_string(),
                allowed: Self::allowed(),
            })
    }

    /// Parse an optional argument, falling back to the first listed option
    fn parse_or_default(value: Option<&str>) -> Result<Self> {
        match value {
            Some(value) => Self::parse(value),
            None => Ok(Self::OPTIONS[0]),
        }
    }

    fn allowed() -> Vec<String> {
        Self::OPTIONS.iter().map(|o| o.as_str().to_string()).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl UnitOption for TemperatureUnit {
    const FIELD: &'static str = "temperature_unit";
    const OPTIONS: &'static [Self] = &[Self::Celsius, Self::Fahrenheit];

    fn as_str(self) -> &'static str {
        match self {
            Self::Celsius => "celsius",
            Self::Fahrenheit => "fahrenheit",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindSpeedUnit {
    #[default]
    Kmh,
    Ms,
    Mph,
    Kn,
}

impl UnitOption for WindSpeedUnit {
    const FIELD: &'static str = "wind_speed_unit";
    const OPTIONS: &'static [Self] = &[Self::Kmh, Self::Ms, Self::Mph, Self::Kn];

    fn as_str(self) -> &'static str {
        match self {
            Self::Kmh => "kmh",
            Self::Ms => "ms",
            Self::Mph => "mph",
            Self::Kn => "kn",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrecipitationUnit {
    #[default]
    Mm,
    Inch,
}

impl UnitOption for PrecipitationUnit {
    const FIELD: &'static str = "precipitation_unit";
    const OPTIONS: &'static [Self] = &[Self::Mm, Self::Inch];

    fn as_str(self) -> &'static str {
        match self {
            Self::Mm => "mm",
            Self::Inch => "inch",
        }
    }
}

/// Model domain for air-quality requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AirQualityDomain {
    #[default]
    Auto,
    CamsGlobal,
    CamsEurope,
}

impl AirQualityDomain {
    pub const OPTIONS: [Self; 3] = [Self::Auto, Self::CamsGlobal, Self::CamsEurope];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::CamsGlobal => "cams_global",
            Self::CamsEurope => "cams_europe",
        }
    }

    pub fn parse_or_default(value: Option<&str>) -> Result<Self> {
        let Some(value) = value else {
            return Ok(Self::default());
        };
        Self::OPTIONS
            .into_iter()
            .find(|option| option.as_str() == value)
            .ok_or_else(|| MeteoError::InvalidOption {
                field: "domains".to_string(),
                value: value.to_string(),
                allowed: Self::OPTIONS.iter().map(|o| o.as_str().to_string()).collect(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("celsius", TemperatureUnit::Celsius)]
    #[case("fahrenheit", TemperatureUnit::Fahrenheit)]
    fn test_temperature_units(#[case] input: &str, #[case] expected: TemperatureUnit) {
        assert_eq!(TemperatureUnit::parse(input).unwrap(), expected);
    }

    #[rstest]
    #[case("kmh", WindSpeedUnit::Kmh)]
    #[case("ms", WindSpeedUnit::Ms)]
    #[case("mph", WindSpeedUnit::Mph)]
    #[case("kn", WindSpeedUnit::Kn)]
    fn test_wind_speed_units(#[case] input: &str, #[case] expected: WindSpeedUnit) {
        assert_eq!(WindSpeedUnit::parse(input).unwrap(), expected);
    }

    #[test]
    fn test_defaults_are_first_option() {
        assert_eq!(
            TemperatureUnit::parse_or_default(None).unwrap(),
            TemperatureUnit::Celsius
        );
        assert_eq!(WindSpeedUnit::parse_or_default(None).unwrap(), WindSpeedUnit::Kmh);
        assert_eq!(
            PrecipitationUnit::parse_or_default(None).unwrap(),
            PrecipitationUnit::Mm
        );
        assert_eq!(TemperatureUnit::default(), TemperatureUnit::OPTIONS[0]);
    }

    #[rstest]
    #[case("Celsius")]
    #[case("kelvin")]
    #[case("")]
    fn test_unknown_temperature_unit(#[case] input: &str) {
        let err = TemperatureUnit::parse(input).unwrap_err();
        match err {
            MeteoError::InvalidUnit { field, allowed, .. } => {
                assert_eq!(field, "temperature_unit");
                assert_eq!(allowed, vec!["celsius", "fahrenheit"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_precipitation_unit_rejects_cm() {
        assert!(matches!(
            PrecipitationUnit::parse("cm"),
            Err(MeteoError::InvalidUnit { .. })
        ));
    }

    #[test]
    fn test_air_quality_domain() {
        assert_eq!(
            AirQualityDomain::parse_or_default(Some("cams_europe")).unwrap(),
            AirQualityDomain::CamsEurope
        );
        assert_eq!(
            AirQualityDomain::parse_or_default(None).unwrap(),
            AirQualityDomain::Auto
        );
        assert!(matches!(
            AirQualityDomain::parse_or_default(Some("ecmwf")),
            Err(MeteoError::InvalidOption { .. })
        ));
    }

    #[rstest]
    #[case(1, true)]
    #[case(16, true)]
    #[case(0, false)]
    #[case(17, false)]
    #[case(-3, false)]
    fn test_forecast_days_range(#[case] days: i64, #[case] ok: bool) {
        let result = check_range("forecast_days", days, &FORECAST_DAYS_RANGE);
        assert_eq!(result.is_ok(), ok);
    }
}
