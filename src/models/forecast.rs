//! Decoded results of the forecast, archive, air-quality and marine endpoints

use super::location::LocationMeta;
use super::series::{SeriesGroup, TimeSeries, Timestamp};
use crate::weather_code::{self, WeatherCodeEntry};
use crate::Result;
use serde::Serialize;

/// Instantaneous conditions, present only when the caller asked for them
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct CurrentConditions {
    /// Observation time in the result's timezone
    pub time: Timestamp,
    /// Temperature in the requested unit
    pub temperature: f64,
    /// Wind speed in the requested unit
    pub wind_speed: f64,
    /// Wind direction in degrees (0-360, where 0/360 is North)
    pub wind_direction: Option<f64>,
    /// WMO weather code
    pub weather_code: u8,
    pub is_day: Option<bool>,
    /// Length of the averaging window in seconds
    pub interval_seconds: Option<i64>,
}

impl CurrentConditions {
    /// Interpret the embedded weather code
    pub fn condition(&self) -> Result<&'static WeatherCodeEntry> {
        weather_code::interpret(i64::from(self.weather_code))
    }

    /// Convert wind direction from degrees to a 16-point compass label
    #[must_use]
    pub fn wind_direction_cardinal(&self) -> Option<&'static str> {
        self.wind_direction.map(wind_direction_to_cardinal)
    }
}

/// Convert wind direction from degrees to cardinal direction
#[must_use]
pub fn wind_direction_to_cardinal(degrees: f64) -> &'static str {
    const POINTS: [&str; 16] = [
        "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW",
        "NW", "NNW",
    ];
    let normalized = degrees.rem_euclid(360.0);
    // 22.5 degree sectors centred on each point
    let sector = ((normalized + 11.25) / 22.5).floor() as usize % POINTS.len();
    POINTS[sector]
}

/// Result of `get_weather_forecast`
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct WeatherForecast {
    pub location: LocationMeta,
    pub current: SeriesGroup<CurrentConditions>,
    pub hourly: SeriesGroup<TimeSeries>,
    pub daily: SeriesGroup<TimeSeries>,
}

/// Result of `get_historical_weather`
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct HistoricalWeather {
    pub location: LocationMeta,
    pub hourly: SeriesGroup<TimeSeries>,
    pub daily: SeriesGroup<TimeSeries>,
}

/// Result of `get_air_quality`
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct AirQuality {
    pub location: LocationMeta,
    pub hourly: SeriesGroup<TimeSeries>,
}

/// Result of `get_marine_forecast`
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct MarineForecast {
    pub location: LocationMeta,
    pub hourly: SeriesGroup<TimeSeries>,
    pub daily: SeriesGroup<TimeSeries>,
}
