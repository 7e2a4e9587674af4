//! The six weather tools
//!
//! Each operation validates its arguments, issues one upstream GET through the
//! transport and decodes the payload. Nothing is kept between calls.

pub mod registry;

pub use registry::{ToolDefinition, ToolHandler, ToolRegistry};

use crate::api::{HttpTransport, Transport};
use crate::config::MeteoConfig;
use crate::decode;
use crate::endpoint::{EndpointKind, Endpoints};
use crate::models::{AirQuality, GeocodingResults, HistoricalWeather, MarineForecast, WeatherForecast};
use crate::query::{
    AirQualityArgs, ForecastArgs, GeocodingArgs, HistoricalArgs, MarineArgs, QueryParams,
};
use crate::weather_code::{self, WeatherCodeEntry};
use crate::Result;
use serde_json::Value;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

/// Stateless tool service over a transport
pub struct WeatherTools<T: Transport = HttpTransport> {
    transport: T,
    endpoints: Endpoints,
}

impl WeatherTools<HttpTransport> {
    /// Build the production service from configuration
    pub fn from_config(config: &MeteoConfig) -> Result<Self> {
        let transport = HttpTransport::new(&config.upstream)?;
        let endpoints = match config.upstream.base_url_override.as_deref() {
            Some(origin) => Endpoints::with_override(origin)?,
            None => Endpoints::production(),
        };
        Ok(Self::new(transport, endpoints))
    }
}

impl<T: Transport> WeatherTools<T> {
    pub fn new(transport: T, endpoints: Endpoints) -> Self {
        Self {
            transport,
            endpoints,
        }
    }

    async fn fetch(&self, kind: EndpointKind, query: &QueryParams) -> Result<Value> {
        let url = self.endpoints.url_for(kind);
        self.transport.get_json(&url, query).await
    }

    /// Current conditions plus optional hourly and daily series
    #[instrument(skip(self, args), fields(tool = "get_weather_forecast", lat = args.latitude, lon = args.longitude))]
    pub async fn get_weather_forecast(&self, args: &ForecastArgs) -> Result<WeatherForecast> {
        let request = args.validate()?;
        let start_time = Instant::now();

        let payload = self.fetch(EndpointKind::Forecast, &request.query()).await?;
        let forecast = decode::decode_forecast(&request, &payload)?;

        if let Some((current, condition)) = forecast
            .current
            .as_requested()
            .and_then(|current| current.condition().ok().map(|c| (current, c)))
        {
            debug!(
                code = current.weather_code,
                wind_from = current.wind_direction_cardinal().unwrap_or("n/a"),
                precipitation = condition.severity.is_precipitation(),
                "Current conditions: {}",
                condition.description
            );
        }

        info!(
            days = request.forecast_days,
            "Retrieved forecast for {} in {:.3}s",
            forecast.location.coordinate.format_coordinates(),
            start_time.elapsed().as_secs_f64()
        );
        Ok(forecast)
    }

    /// Place-name search; an unknown place yields an empty result list
    #[instrument(skip(self, args), fields(tool = "geocode_location", location = %args.name))]
    pub async fn geocode_location(&self, args: &GeocodingArgs) -> Result<GeocodingResults> {
        let request = args.validate()?;

        let payload = self.fetch(EndpointKind::Geocoding, &request.query()).await?;
        let results = decode::decode_geocoding(&payload)?;

        match results.first() {
            None => warn!("No results found for location '{}'", request.name),
            Some(best) => info!(
                "Found {} geocoding results for '{}', best match {}",
                results.results.len(),
                request.name,
                best.display_name()
            ),
        }
        Ok(results)
    }

    /// Archived observations between two dates
    #[instrument(skip(self, args), fields(tool = "get_historical_weather", lat = args.latitude, lon = args.longitude))]
    pub async fn get_historical_weather(&self, args: &HistoricalArgs) -> Result<HistoricalWeather> {
        let request = args.validate()?;

        let payload = self.fetch(EndpointKind::Historical, &request.query()).await?;
        let historical = decode::decode_historical(&request, &payload)?;

        info!(
            days = request.range.days(),
            "Retrieved archive data from {} to {}", request.range.start, request.range.end
        );
        Ok(historical)
    }

    /// Pollutant concentrations and AQI indices
    #[instrument(skip(self, args), fields(tool = "get_air_quality", lat = args.latitude, lon = args.longitude))]
    pub async fn get_air_quality(&self, args: &AirQualityArgs) -> Result<AirQuality> {
        let request = args.validate()?;

        let payload = self.fetch(EndpointKind::AirQuality, &request.query()).await?;
        let air_quality = decode::decode_air_quality(&request, &payload)?;

        info!(variables = request.hourly.names().len(), "Retrieved air quality data");
        Ok(air_quality)
    }

    /// Wave, swell, current and sea-level forecasts
    #[instrument(skip(self, args), fields(tool = "get_marine_forecast", lat = args.latitude, lon = args.longitude))]
    pub async fn get_marine_forecast(&self, args: &MarineArgs) -> Result<MarineForecast> {
        let request = args.validate()?;

        let payload = self.fetch(EndpointKind::Marine, &request.query()).await?;
        let marine = decode::decode_marine(&request, &payload)?;

        info!(days = request.forecast_days, "Retrieved marine forecast");
        Ok(marine)
    }

    /// Describe a WMO weather code; needs no network access
    pub fn interpret_weather_code(&self, code: i64) -> Result<&'static WeatherCodeEntry> {
        weather_code::interpret(code)
    }
}
