//! Vocabulary registry
//!
//! One static set of legal field names per request domain. The same sets drive
//! outbound validation and, while decoding, tell columns apart from metadata.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::LazyLock;

/// A family of field names accepted by one upstream endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    ForecastHourly,
    ForecastDaily,
    HistoricalHourly,
    HistoricalDaily,
    AirQualityHourly,
    MarineHourly,
    MarineDaily,
    GeocodingQuery,
}

impl Domain {
    pub const ALL: [Domain; 8] = [
        Domain::ForecastHourly,
        Domain::ForecastDaily,
        Domain::HistoricalHourly,
        Domain::HistoricalDaily,
        Domain::AirQualityHourly,
        Domain::MarineHourly,
        Domain::MarineDaily,
        Domain::GeocodingQuery,
    ];

    /// Human-readable label used in error messages
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Domain::ForecastHourly => "forecast hourly",
            Domain::ForecastDaily => "forecast daily",
            Domain::HistoricalHourly => "historical hourly",
            Domain::HistoricalDaily => "historical daily",
            Domain::AirQualityHourly => "air quality hourly",
            Domain::MarineHourly => "marine hourly",
            Domain::MarineDaily => "marine daily",
            Domain::GeocodingQuery => "geocoding query",
        }
    }

    fn fields(self) -> &'static [&'static str] {
        match self {
            Domain::ForecastHourly => FORECAST_HOURLY,
            Domain::ForecastDaily => FORECAST_DAILY,
            Domain::HistoricalHourly => HISTORICAL_HOURLY,
            Domain::HistoricalDaily => HISTORICAL_DAILY,
            Domain::AirQualityHourly => AIR_QUALITY_HOURLY,
            Domain::MarineHourly => MARINE_HOURLY,
            Domain::MarineDaily => MARINE_DAILY,
            Domain::GeocodingQuery => GEOCODING_QUERY,
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

const FORECAST_HOURLY: &[&str] = &[
    "temperature_2m",
    "relative_humidity_2m",
    "dew_point_2m",
    "apparent_temperature",
    "precipitation_probability",
    "precipitation",
    "rain",
    "showers",
    "snowfall",
    "snow_depth",
    "weather_code",
    "pressure_msl",
    "surface_pressure",
    "cloud_cover",
    "cloud_cover_low",
    "cloud_cover_mid",
    "cloud_cover_high",
    "visibility",
    "evapotranspiration",
    "et0_fao_evapotranspiration",
    "vapour_pressure_deficit",
    "wind_speed_10m",
    "wind_speed_80m",
    "wind_speed_120m",
    "wind_speed_180m",
    "wind_direction_10m",
    "wind_direction_80m",
    "wind_direction_120m",
    "wind_direction_180m",
    "wind_gusts_10m",
    "temperature_80m",
    "temperature_120m",
    "temperature_180m",
    "soil_temperature_0cm",
    "soil_temperature_6cm",
    "soil_temperature_18cm",
    "soil_temperature_54cm",
    "soil_moisture_0_to_1cm",
    "soil_moisture_1_to_3cm",
    "soil_moisture_3_to_9cm",
    "soil_moisture_9_to_27cm",
    "soil_moisture_27_to_81cm",
    "uv_index",
    "uv_index_clear_sky",
    "is_day",
    "sunshine_duration",
    "cape",
    "freezing_level_height",
    "shortwave_radiation",
    "direct_radiation",
    "diffuse_radiation",
    "direct_normal_irradiance",
];

const FORECAST_DAILY: &[&str] = &[
    "weather_code",
    "temperature_2m_max",
    "temperature_2m_min",
    "apparent_temperature_max",
    "apparent_temperature_min",
    "sunrise",
    "sunset",
    "daylight_duration",
    "sunshine_duration",
    "uv_index_max",
    "uv_index_clear_sky_max",
    "precipitation_sum",
    "rain_sum",
    "showers_sum",
    "snowfall_sum",
    "precipitation_hours",
    "precipitation_probability_max",
    "wind_speed_10m_max",
    "wind_gusts_10m_max",
    "wind_direction_10m_dominant",
    "shortwave_radiation_sum",
    "et0_fao_evapotranspiration",
];

const HISTORICAL_HOURLY: &[&str] = &[
    "temperature_2m",
    "relative_humidity_2m",
    "dew_point_2m",
    "apparent_temperature",
    "precipitation",
    "rain",
    "snowfall",
    "snow_depth",
    "weather_code",
    "pressure_msl",
    "surface_pressure",
    "cloud_cover",
    "cloud_cover_low",
    "cloud_cover_mid",
    "cloud_cover_high",
    "et0_fao_evapotranspiration",
    "vapour_pressure_deficit",
    "wind_speed_10m",
    "wind_speed_100m",
    "wind_direction_10m",
    "wind_direction_100m",
    "wind_gusts_10m",
    "soil_temperature_0_to_7cm",
    "soil_temperature_7_to_28cm",
    "soil_temperature_28_to_100cm",
    "soil_temperature_100_to_255cm",
    "soil_moisture_0_to_7cm",
    "soil_moisture_7_to_28cm",
    "soil_moisture_28_to_100cm",
    "soil_moisture_100_to_255cm",
    "is_day",
    "sunshine_duration",
    "shortwave_radiation",
    "direct_radiation",
    "diffuse_radiation",
];

const HISTORICAL_DAILY: &[&str] = &[
    "weather_code",
    "temperature_2m_max",
    "temperature_2m_min",
    "temperature_2m_mean",
    "apparent_temperature_max",
    "apparent_temperature_min",
    "apparent_temperature_mean",
    "sunrise",
    "sunset",
    "daylight_duration",
    "sunshine_duration",
    "precipitation_sum",
    "rain_sum",
    "snowfall_sum",
    "precipitation_hours",
    "wind_speed_10m_max",
    "wind_gusts_10m_max",
    "wind_direction_10m_dominant",
    "shortwave_radiation_sum",
    "et0_fao_evapotranspiration",
];

const AIR_QUALITY_HOURLY: &[&str] = &[
    "pm10",
    "pm2_5",
    "carbon_monoxide",
    "carbon_dioxide",
    "nitrogen_dioxide",
    "sulphur_dioxide",
    "ozone",
    "aerosol_optical_depth",
    "dust",
    "uv_index",
    "uv_index_clear_sky",
    "ammonia",
    "methane",
    "alder_pollen",
    "birch_pollen",
    "grass_pollen",
    "mugwort_pollen",
    "olive_pollen",
    "ragweed_pollen",
    "us_aqi",
    "us_aqi_pm2_5",
    "us_aqi_pm10",
    "us_aqi_nitrogen_dioxide",
    "us_aqi_ozone",
    "us_aqi_sulphur_dioxide",
    "us_aqi_carbon_monoxide",
    "european_aqi",
    "european_aqi_pm2_5",
    "european_aqi_pm10",
    "european_aqi_nitrogen_dioxide",
    "european_aqi_ozone",
    "european_aqi_sulphur_dioxide",
];

const MARINE_HOURLY: &[&str] = &[
    "wave_height",
    "wave_direction",
    "wave_period",
    "wave_peak_period",
    "wind_wave_height",
    "wind_wave_direction",
    "wind_wave_period",
    "wind_wave_peak_period",
    "swell_wave_height",
    "swell_wave_direction",
    "swell_wave_period",
    "swell_wave_peak_period",
    "secondary_swell_wave_height",
    "secondary_swell_wave_direction",
    "secondary_swell_wave_period",
    "ocean_current_velocity",
    "ocean_current_direction",
    "sea_level_height_msl",
    "sea_surface_temperature",
];

const MARINE_DAILY: &[&str] = &[
    "wave_height_max",
    "wave_direction_dominant",
    "wave_period_max",
    "wind_wave_height_max",
    "wind_wave_direction_dominant",
    "wind_wave_period_max",
    "wind_wave_peak_period_max",
    "swell_wave_height_max",
    "swell_wave_direction_dominant",
    "swell_wave_period_max",
    "swell_wave_peak_period_max",
];

const GEOCODING_QUERY: &[&str] = &["name", "count", "language", "format", "countryCode"];

/// Fields whose values are ISO timestamps rather than numbers
const TEXT_FIELDS: &[&str] = &["sunrise", "sunset"];

static REGISTRY: LazyLock<[HashSet<&'static str>; 8]> =
    LazyLock::new(|| Domain::ALL.map(|domain| domain.fields().iter().copied().collect()));

fn set_for(domain: Domain) -> &'static HashSet<&'static str> {
    // `Domain::ALL` lists variants in declaration order
    &REGISTRY[domain as usize]
}

/// Whether `field` is a legal name within `domain`
#[must_use]
pub fn is_valid(domain: Domain, field: &str) -> bool {
    set_for(domain).contains(field)
}

/// All legal names within `domain`
#[must_use]
pub fn allowed_fields(domain: Domain) -> &'static HashSet<&'static str> {
    set_for(domain)
}

/// Legal names within `domain` in their documented order
#[must_use]
pub fn documented_fields(domain: Domain) -> &'static [&'static str] {
    domain.fields()
}

/// Whether values of `field` decode as text instead of numbers
#[must_use]
pub fn is_text_field(field: &str) -> bool {
    TEXT_FIELDS.contains(&field)
}
