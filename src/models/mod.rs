//! Data models for the Open-Meteo tools
//!
//! This module contains the core domain models organized by concern:
//! - Location: Coordinates, date ranges and echoed location metadata
//! - Series: Time-indexed columns shared by every time-series endpoint
//! - Forecast: Decoded forecast, archive, air-quality and marine results
//! - Geocoding: Place-name matches

pub mod forecast;
pub mod geocoding;
pub mod location;
pub mod series;

// Re-export all public types for convenient access
pub use forecast::{AirQuality, CurrentConditions, HistoricalWeather, MarineForecast, WeatherForecast};
pub use geocoding::{GeocodingResult, GeocodingResults};
pub use location::{Coordinate, DateRange, LocationMeta};
pub use series::{Column, ColumnValues, SeriesGroup, TimeSeries, Timestamp};
