//! Parameter builder
//!
//! Turns raw tool arguments into validated requests and their ordered outbound
//! query strings. Every check here runs before a request is handed to the
//! transport, so an invalid call never reaches the network.

use crate::error::MeteoError;
use crate::models::{Coordinate, DateRange};
use crate::units::{
    self, AirQualityDomain, PrecipitationUnit, TemperatureUnit, UnitOption, WindSpeedUnit,
    DEFAULT_FORECAST_DAYS, DEFAULT_GEOCODING_COUNT, FORECAST_DAYS_RANGE, GEOCODING_COUNT_RANGE,
};
use crate::vocabulary::{self, Domain};
use crate::Result;
use serde::Deserialize;
use tracing::warn;

/// Hourly variables requested from the air-quality endpoint when none are given
pub const DEFAULT_AIR_QUALITY_HOURLY: &str =
    "pm10,pm2_5,carbon_monoxide,nitrogen_dioxide,sulphur_dioxide,ozone,us_aqi,european_aqi";

/// Hourly variables requested from the marine endpoint when none are given
pub const DEFAULT_MARINE_HOURLY: &str =
    "wave_height,wave_direction,wave_period,wind_wave_height,swell_wave_height,sea_level_height_msl";

/// Ordered outbound query parameters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: &str, value: impl ToString) {
        self.pairs.push((name.to_string(), value.to_string()));
    }

    /// Value of the first parameter called `name`
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.pairs.iter().map(|(k, _)| k.as_str()).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Ordered, deduplicated variable names checked against one vocabulary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableList {
    domain: Domain,
    names: Vec<String>,
}

impl VariableList {
    /// Parse a comma-separated list; every unknown token is reported at once
    pub fn parse(domain: Domain, field: &str, input: &str) -> Result<Self> {
        let mut names: Vec<String> = Vec::new();
        for token in input.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            if !names.iter().any(|existing| existing == token) {
                names.push(token.to_string());
            }
        }

        let unknown: Vec<String> = names
            .iter()
            .filter(|name| !vocabulary::is_valid(domain, name))
            .cloned()
            .collect();
        if !unknown.is_empty() {
            return Err(MeteoError::UnknownVariable {
                field: field.to_string(),
                domain: domain.label().to_string(),
                tokens: unknown,
            });
        }

        Ok(Self { domain, names })
    }

    /// Parse an optional argument; absent or blank input means the group is not requested
    pub fn parse_optional(domain: Domain, field: &str, input: Option<&str>) -> Result<Option<Self>> {
        match input {
            Some(input) => {
                let list = Self::parse(domain, field, input)?;
                Ok((!list.is_empty()).then_some(list))
            }
            None => Ok(None),
        }
    }

    #[must_use]
    pub fn domain(&self) -> Domain {
        self.domain
    }

    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Comma-joined wire form
    #[must_use]
    pub fn to_param(&self) -> String {
        self.names.join(",")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UnitPreferences {
    pub temperature: TemperatureUnit,
    pub wind_speed: WindSpeedUnit,
    pub precipitation: PrecipitationUnit,
}

impl UnitPreferences {
    pub fn parse(
        temperature: Option<&str>,
        wind_speed: Option<&str>,
        precipitation: Option<&str>,
    ) -> Result<Self> {
        Ok(Self {
            temperature: TemperatureUnit::parse_or_default(temperature)?,
            wind_speed: WindSpeedUnit::parse_or_default(wind_speed)?,
            precipitation: PrecipitationUnit::parse_or_default(precipitation)?,
        })
    }

    fn append_to(&self, params: &mut QueryParams) {
        params.push(TemperatureUnit::FIELD, self.temperature.as_str());
        params.push(WindSpeedUnit::FIELD, self.wind_speed.as_str());
        params.push(PrecipitationUnit::FIELD, self.precipitation.as_str());
    }
}

/// Timezone for result timestamps; `Auto` resolves to the location's local zone
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Timezone {
    #[default]
    Auto,
    Named(String),
}

impl Timezone {
    pub fn parse(value: Option<&str>) -> Result<Self> {
        match value.map(str::trim) {
            None | Some("auto") => Ok(Self::Auto),
            Some("") => Err(MeteoError::invalid_arguments(
                "timezone",
                "timezone must be an IANA name such as 'Europe/London' or 'auto'",
            )),
            Some(name) => Ok(Self::Named(name.to_string())),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Auto => "auto",
            Self::Named(name) => name,
        }
    }
}

fn append_coordinate(params: &mut QueryParams, coordinate: &Coordinate) {
    params.push("latitude", coordinate.latitude);
    params.push("longitude", coordinate.longitude);
}

fn append_list(params: &mut QueryParams, name: &str, list: Option<&VariableList>) {
    if let Some(list) = list {
        params.push(name, list.to_param());
    }
}

/// Arguments of `get_weather_forecast`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ForecastArgs {
    pub latitude: f64,
    pub longitude: f64,
    pub temperature_unit: Option<String>,
    pub wind_speed_unit: Option<String>,
    pub precipitation_unit: Option<String>,
    pub timezone: Option<String>,
    pub forecast_days: Option<i64>,
    pub current_weather: Option<bool>,
    pub hourly: Option<String>,
    pub daily: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForecastRequest {
    pub coordinate: Coordinate,
    pub units: UnitPreferences,
    pub timezone: Timezone,
    pub forecast_days: i64,
    pub current_weather: bool,
    pub hourly: Option<VariableList>,
    pub daily: Option<VariableList>,
}

impl ForecastArgs {
    pub fn validate(&self) -> Result<ForecastRequest> {
        Ok(ForecastRequest {
            coordinate: Coordinate::new(self.latitude, self.longitude)?,
            units: UnitPreferences::parse(
                self.temperature_unit.as_deref(),
                self.wind_speed_unit.as_deref(),
                self.precipitation_unit.as_deref(),
            )?,
            timezone: Timezone::parse(self.timezone.as_deref())?,
            forecast_days: units::check_range(
                "forecast_days",
                self.forecast_days.unwrap_or(DEFAULT_FORECAST_DAYS),
                &FORECAST_DAYS_RANGE,
            )?,
            current_weather: self.current_weather.unwrap_or(true),
            hourly: VariableList::parse_optional(
                Domain::ForecastHourly,
                "hourly",
                self.hourly.as_deref(),
            )?,
            daily: VariableList::parse_optional(
                Domain::ForecastDaily,
                "daily",
                self.daily.as_deref(),
            )?,
        })
    }
}

impl ForecastRequest {
    #[must_use]
    pub fn query(&self) -> QueryParams {
        let mut params = QueryParams::new();
        append_coordinate(&mut params, &self.coordinate);
        self.units.append_to(&mut params);
        params.push("timezone", self.timezone.as_str());
        params.push("forecast_days", self.forecast_days);
        if self.current_weather {
            params.push("current_weather", "true");
        }
        append_list(&mut params, "hourly", self.hourly.as_ref());
        append_list(&mut params, "daily", self.daily.as_ref());
        params
    }
}

/// Arguments of `geocode_location`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeocodingArgs {
    pub name: String,
    pub count: Option<i64>,
    pub language: Option<String>,
    pub format: Option<String>,
    pub country_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeocodingRequest {
    pub name: String,
    pub count: i64,
    pub language: String,
    pub country_code: Option<String>,
}

impl GeocodingArgs {
    pub fn validate(&self) -> Result<GeocodingRequest> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(MeteoError::invalid_arguments(
                "name",
                "name must not be empty",
            ));
        }

        let count = units::check_range(
            "count",
            self.count.unwrap_or(DEFAULT_GEOCODING_COUNT),
            &GEOCODING_COUNT_RANGE,
        )?;

        let language = match self.language.as_deref().map(str::trim) {
            None => "en".to_string(),
            Some(lang) if !lang.is_empty() && lang.chars().all(|c| c.is_ascii_alphabetic()) => {
                lang.to_ascii_lowercase()
            }
            Some(lang) => {
                return Err(MeteoError::invalid_arguments(
                    "language",
                    format!("language must be a language code such as 'en' or 'de', got '{lang}'"),
                ));
            }
        };

        if let Some(format) = self.format.as_deref() {
            if format != "json" {
                return Err(MeteoError::InvalidOption {
                    field: "format".to_string(),
                    value: format.to_string(),
                    allowed: vec!["json".to_string()],
                });
            }
        }

        let country_code = match self.country_code.as_deref().map(str::trim) {
            None => None,
            Some(code) if code.len() == 2 && code.chars().all(|c| c.is_ascii_alphabetic()) => {
                Some(code.to_ascii_uppercase())
            }
            Some(code) => {
                return Err(MeteoError::invalid_arguments(
                    "country_code",
                    format!("country_code must be an ISO 3166-1 alpha-2 code, got '{code}'"),
                ));
            }
        };

        Ok(GeocodingRequest {
            name: name.to_string(),
            count,
            language,
            country_code,
        })
    }
}

impl GeocodingRequest {
    #[must_use]
    pub fn query(&self) -> QueryParams {
        let mut params = QueryParams::new();
        params.push("name", &self.name);
        params.push("count", self.count);
        params.push("language", &self.language);
        params.push("format", "json");
        if let Some(code) = &self.country_code {
            params.push("countryCode", code);
        }
        params
    }
}

/// Arguments of `get_historical_weather`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HistoricalArgs {
    pub latitude: f64,
    pub longitude: f64,
    pub start_date: String,
    pub end_date: String,
    pub temperature_unit: Option<String>,
    pub wind_speed_unit: Option<String>,
    pub precipitation_unit: Option<String>,
    pub timezone: Option<String>,
    pub hourly: Option<String>,
    pub daily: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistoricalRequest {
    pub coordinate: Coordinate,
    pub range: DateRange,
    pub units: UnitPreferences,
    pub timezone: Timezone,
    pub hourly: Option<VariableList>,
    pub daily: Option<VariableList>,
}

impl HistoricalArgs {
    pub fn validate(&self) -> Result<HistoricalRequest> {
        let coordinate = Coordinate::new(self.latitude, self.longitude)?;
        let range = DateRange::parse(&self.start_date, &self.end_date)?;
        if range.predates_floor() {
            warn!(
                start_date = %range.start,
                "Start date predates the archive's 1940 floor; coverage depends on the location"
            );
        }

        Ok(HistoricalRequest {
            coordinate,
            range,
            units: UnitPreferences::parse(
                self.temperature_unit.as_deref(),
                self.wind_speed_unit.as_deref(),
                self.precipitation_unit.as_deref(),
            )?,
            timezone: Timezone::parse(self.timezone.as_deref())?,
            hourly: VariableList::parse_optional(
                Domain::HistoricalHourly,
                "hourly",
                self.hourly.as_deref(),
            )?,
            daily: VariableList::parse_optional(
                Domain::HistoricalDaily,
                "daily",
                self.daily.as_deref(),
            )?,
        })
    }
}

impl HistoricalRequest {
    #[must_use]
    pub fn query(&self) -> QueryParams {
        let mut params = QueryParams::new();
        append_coordinate(&mut params, &self.coordinate);
        params.push("start_date", self.range.start.format("%Y-%m-%d"));
        params.push("end_date", self.range.end.format("%Y-%m-%d"));
        self.units.append_to(&mut params);
        params.push("timezone", self.timezone.as_str());
        append_list(&mut params, "hourly", self.hourly.as_ref());
        append_list(&mut params, "daily", self.daily.as_ref());
        params
    }
}

/// Arguments of `get_air_quality`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AirQualityArgs {
    pub latitude: f64,
    pub longitude: f64,
    pub timezone: Option<String>,
    pub hourly: Option<String>,
    pub domains: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AirQualityRequest {
    pub coordinate: Coordinate,
    pub timezone: Timezone,
    pub domains: AirQualityDomain,
    pub hourly: VariableList,
}

impl AirQualityArgs {
    pub fn validate(&self) -> Result<AirQualityRequest> {
        let coordinate = Coordinate::new(self.latitude, self.longitude)?;
        let hourly = VariableList::parse_optional(
            Domain::AirQualityHourly,
            "hourly",
            self.hourly.as_deref(),
        )?;
        let hourly = match hourly {
            Some(list) => list,
            None => VariableList::parse(
                Domain::AirQualityHourly,
                "hourly",
                DEFAULT_AIR_QUALITY_HOURLY,
            )?,
        };

        Ok(AirQualityRequest {
            coordinate,
            timezone: Timezone::parse(self.timezone.as_deref())?,
            domains: AirQualityDomain::parse_or_default(self.domains.as_deref())?,
            hourly,
        })
    }
}

impl AirQualityRequest {
    #[must_use]
    pub fn query(&self) -> QueryParams {
        let mut params = QueryParams::new();
        append_coordinate(&mut params, &self.coordinate);
        params.push("timezone", self.timezone.as_str());
        params.push("domains", self.domains.as_str());
        params.push("hourly", self.hourly.to_param());
        params
    }
}

/// Arguments of `get_marine_forecast`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MarineArgs {
    pub latitude: f64,
    pub longitude: f64,
    pub timezone: Option<String>,
    pub forecast_days: Option<i64>,
    pub hourly: Option<String>,
    pub daily: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarineRequest {
    pub coordinate: Coordinate,
    pub timezone: Timezone,
    pub forecast_days: i64,
    pub hourly: VariableList,
    pub daily: Option<VariableList>,
}

impl MarineArgs {
    pub fn validate(&self) -> Result<MarineRequest> {
        let coordinate = Coordinate::new(self.latitude, self.longitude)?;
        let forecast_days = units::check_range(
            "forecast_days",
            self.forecast_days.unwrap_or(DEFAULT_FORECAST_DAYS),
            &FORECAST_DAYS_RANGE,
        )?;
        let hourly = match VariableList::parse_optional(
            Domain::MarineHourly,
            "hourly",
            self.hourly.as_deref(),
        )? {
            Some(list) => list,
            None => VariableList::parse(Domain::MarineHourly, "hourly", DEFAULT_MARINE_HOURLY)?,
        };

        Ok(MarineRequest {
            coordinate,
            timezone: Timezone::parse(self.timezone.as_deref())?,
            forecast_days,
            hourly,
            daily: VariableList::parse_optional(
                Domain::MarineDaily,
                "daily",
                self.daily.as_deref(),
            )?,
        })
    }
}

impl MarineRequest {
    #[must_use]
    pub fn query(&self) -> QueryParams {
        let mut params = QueryParams::new();
        append_coordinate(&mut params, &self.coordinate);
        params.push("timezone", self.timezone.as_str());
        params.push("forecast_days", self.forecast_days);
        params.push("hourly", self.hourly.to_param());
        append_list(&mut params, "daily", self.daily.as_ref());
        params
    }
}
