//! `open-meteo-tools` - validated, strongly typed access to the Open-Meteo APIs
//!
//! This library provides six tools (forecast, geocoding, historical weather,
//! air quality, marine forecast and weather-code interpretation) together with
//! the parameter validation, endpoint routing and response decoding behind them.

pub mod api;
pub mod config;
pub mod decode;
pub mod endpoint;
pub mod error;
pub mod logging;
pub mod models;
pub mod query;
pub mod tools;
pub mod units;
pub mod vocabulary;
pub mod weather_code;

// Re-export core types for public API
pub use api::{HttpTransport, Transport};
pub use config::MeteoConfig;
pub use endpoint::{EndpointKind, Endpoints};
pub use error::{ErrorKind, MeteoError, ToolError};
pub use models::{
    AirQuality, Coordinate, CurrentConditions, GeocodingResult, GeocodingResults,
    HistoricalWeather, MarineForecast, SeriesGroup, TimeSeries, WeatherForecast,
};
pub use query::{AirQualityArgs, ForecastArgs, GeocodingArgs, HistoricalArgs, MarineArgs};
pub use tools::{ToolRegistry, WeatherTools};
pub use weather_code::{Severity, WeatherCodeEntry};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, MeteoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
