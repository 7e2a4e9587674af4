//! Response decoder
//!
//! Converts raw upstream JSON into the typed result records. Decoding is
//! all-or-nothing: any shape violation fails the whole call with a
//! `DecodeError`, and nothing partially decoded escapes.

use crate::error::MeteoError;
use crate::models::{
    AirQuality, Column, ColumnValues, Coordinate, CurrentConditions, GeocodingResult,
    GeocodingResults, HistoricalWeather, LocationMeta, MarineForecast, SeriesGroup, TimeSeries,
    Timestamp, WeatherForecast,
};
use crate::query::{
    AirQualityRequest, ForecastRequest, HistoricalRequest, MarineRequest, VariableList,
};
use crate::vocabulary;
use crate::Result;
use serde_json::{Map, Value};
use tracing::debug;

type Object = Map<String, Value>;

/// Decode a forecast payload
pub fn decode_forecast(request: &ForecastRequest, payload: &Value) -> Result<WeatherForecast> {
    let root = as_object(payload, "response")?;
    Ok(WeatherForecast {
        location: decode_location(&request.coordinate, root)?,
        current: decode_current(root, request.current_weather)?,
        hourly: decode_group(root, "hourly", request.hourly.as_ref())?,
        daily: decode_group(root, "daily", request.daily.as_ref())?,
    })
}

/// Decode an archive payload
pub fn decode_historical(
    request: &HistoricalRequest,
    payload: &Value,
) -> Result<HistoricalWeather> {
    let root = as_object(payload, "response")?;
    Ok(HistoricalWeather {
        location: decode_location(&request.coordinate, root)?,
        hourly: decode_group(root, "hourly", request.hourly.as_ref())?,
        daily: decode_group(root, "daily", request.daily.as_ref())?,
    })
}

/// Decode an air-quality payload
pub fn decode_air_quality(request: &AirQualityRequest, payload: &Value) -> Result<AirQuality> {
    let root = as_object(payload, "response")?;
    Ok(AirQuality {
        location: decode_location(&request.coordinate, root)?,
        hourly: decode_group(root, "hourly", Some(&request.hourly))?,
    })
}

/// Decode a marine payload
pub fn decode_marine(request: &MarineRequest, payload: &Value) -> Result<MarineForecast> {
    let root = as_object(payload, "response")?;
    Ok(MarineForecast {
        location: decode_location(&request.coordinate, root)?,
        hourly: decode_group(root, "hourly", Some(&request.hourly))?,
        daily: decode_group(root, "daily", request.daily.as_ref())?,
    })
}

/// Decode a geocoding payload; a missing `results` key means no matches
pub fn decode_geocoding(payload: &Value) -> Result<GeocodingResults> {
    let root = as_object(payload, "response")?;
    let items = match root.get("results") {
        None | Some(Value::Null) => return Ok(GeocodingResults::default()),
        Some(Value::Array(items)) => items,
        Some(_) => {
            return Err(MeteoError::decode_field("results", "'results' is not an array"));
        }
    };

    let results = items
        .iter()
        .enumerate()
        .map(|(index, item)| decode_geocoding_result(index, item))
        .collect::<Result<Vec<_>>>()?;
    Ok(GeocodingResults { results })
}

fn decode_geocoding_result(index: usize, item: &Value) -> Result<GeocodingResult> {
    let obj = as_object(item, &format!("results[{index}]"))?;
    let name = obj
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| MeteoError::decode_field("name", format!("results[{index}] has no name")))?;

    let admin_regions = ["admin1", "admin2", "admin3", "admin4"]
        .iter()
        .filter_map(|key| optional_str(obj, key))
        .collect();
    let postcodes = obj
        .get("postcodes")
        .and_then(Value::as_array)
        .map(|codes| {
            codes
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    Ok(GeocodingResult {
        id: obj.get("id").and_then(Value::as_i64),
        name: name.to_string(),
        latitude: required_f64(obj, "latitude")?,
        longitude: required_f64(obj, "longitude")?,
        elevation: optional_f64(obj, "elevation")?,
        country: optional_str(obj, "country"),
        country_code: optional_str(obj, "country_code"),
        admin_regions,
        timezone: optional_str(obj, "timezone"),
        population: obj.get("population").and_then(Value::as_u64),
        feature_code: optional_str(obj, "feature_code"),
        postcodes,
    })
}

fn decode_location(requested: &Coordinate, root: &Object) -> Result<LocationMeta> {
    let coordinate = Coordinate {
        latitude: required_f64(root, "latitude")?,
        longitude: required_f64(root, "longitude")?,
    };
    let grid_snapped = !requested.within_tolerance(&coordinate);
    if grid_snapped {
        debug!(
            requested = %requested.format_coordinates(),
            served = %coordinate.format_coordinates(),
            "Upstream snapped the request to a distant grid cell"
        );
    }

    Ok(LocationMeta {
        coordinate,
        requested: *requested,
        grid_snapped,
        elevation: optional_f64(root, "elevation")?,
        timezone: optional_str(root, "timezone"),
        timezone_abbreviation: optional_str(root, "timezone_abbreviation"),
        utc_offset_seconds: root.get("utc_offset_seconds").and_then(Value::as_i64),
    })
}

fn decode_current(root: &Object, requested: bool) -> Result<SeriesGroup<CurrentConditions>> {
    if !requested {
        return Ok(SeriesGroup::NotRequested);
    }
    let current = match root.get("current_weather") {
        Some(value) => as_object(value, "current_weather")?,
        None => {
            return Err(MeteoError::decode_field(
                "current_weather",
                "current weather was requested but the response has no 'current_weather' block",
            ));
        }
    };

    let time = current
        .get("time")
        .and_then(Value::as_str)
        .ok_or_else(|| MeteoError::decode_field("time", "current weather has no time"))
        .and_then(Timestamp::parse)?;
    let weather_code = current
        .get("weathercode")
        .and_then(Value::as_u64)
        .and_then(|code| u8::try_from(code).ok())
        .ok_or_else(|| {
            MeteoError::decode_field("weathercode", "current weather code is missing or invalid")
        })?;
    let is_day = match current.get("is_day") {
        None | Some(Value::Null) => None,
        Some(value) => Some(value.as_i64().map(|v| v != 0).or_else(|| value.as_bool()).ok_or_else(
            || MeteoError::decode_field("is_day", "is_day is neither 0/1 nor a boolean"),
        )?),
    };

    Ok(SeriesGroup::Requested(CurrentConditions {
        time,
        temperature: required_f64(current, "temperature")?,
        wind_speed: required_f64(current, "windspeed")?,
        wind_direction: optional_f64(current, "winddirection")?,
        weather_code,
        is_day,
        interval_seconds: current.get("interval").and_then(Value::as_i64),
    }))
}

fn decode_group(
    root: &Object,
    group: &str,
    requested: Option<&VariableList>,
) -> Result<SeriesGroup<TimeSeries>> {
    let Some(list) = requested else {
        if root.contains_key(group) {
            debug!(group, "Ignoring unrequested group in response");
        }
        return Ok(SeriesGroup::NotRequested);
    };

    let block = match root.get(group) {
        Some(value) => as_object(value, group)?,
        None => {
            return Err(MeteoError::decode_field(
                group,
                format!("'{group}' was requested but is missing from the response"),
            ));
        }
    };
    let units = root
        .get(&format!("{group}_units"))
        .and_then(Value::as_object);

    let times = block
        .get("time")
        .and_then(Value::as_array)
        .ok_or_else(|| MeteoError::decode_field("time", format!("'{group}' has no time array")))?
        .iter()
        .map(|value| {
            value
                .as_str()
                .ok_or_else(|| MeteoError::decode_field("time", "timestamp is not a string"))
                .and_then(Timestamp::parse)
        })
        .collect::<Result<Vec<_>>>()?;

    let columns = list
        .names()
        .iter()
        .map(|name| -> Result<Column> {
            let values = block.get(name).ok_or_else(|| {
                MeteoError::decode_field(
                    name,
                    format!("requested variable '{name}' is missing from '{group}'"),
                )
            })?;
            Ok(Column {
                name: name.clone(),
                unit: units
                    .and_then(|u| u.get(name))
                    .and_then(Value::as_str)
                    .map(str::to_string),
                values: decode_column(name, values)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    for key in block.keys() {
        if key != "time" && !vocabulary::is_valid(list.domain(), key) {
            debug!(group, key = %key, "Ignoring unknown key in response group");
        }
    }

    TimeSeries::new(times, columns).map(SeriesGroup::Requested)
}

fn decode_column(name: &str, values: &Value) -> Result<ColumnValues> {
    let items = values
        .as_array()
        .ok_or_else(|| MeteoError::decode_field(name, format!("'{name}' is not an array")))?;

    if vocabulary::is_text_field(name) {
        let text = items
            .iter()
            .map(|item| match item {
                Value::Null => Ok(None),
                Value::String(s) => Ok(Some(s.clone())),
                other => Err(MeteoError::decode_field(
                    name,
                    format!("'{name}' contains non-text value {other}"),
                )),
            })
            .collect::<Result<Vec<_>>>()?;
        return Ok(ColumnValues::Text(text));
    }

    let numbers = items
        .iter()
        .map(|item| match item {
            Value::Null => Ok(None),
            Value::Number(n) => n.as_f64().map(Some).ok_or_else(|| {
                MeteoError::decode_field(name, format!("'{name}' contains unrepresentable {n}"))
            }),
            other => Err(MeteoError::decode_field(
                name,
                format!("'{name}' contains non-numeric value {other}"),
            )),
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(ColumnValues::Numeric(numbers))
}

fn as_object<'a>(value: &'a Value, what: &str) -> Result<&'a Object> {
    value
        .as_object()
        .ok_or_else(|| MeteoError::decode_field(what, format!("{what} is not a JSON object")))
}

fn required_f64(obj: &Object, field: &str) -> Result<f64> {
    obj.get(field)
        .and_then(Value::as_f64)
        .ok_or_else(|| MeteoError::decode_field(field, format!("'{field}' is missing or not a number")))
}

fn optional_f64(obj: &Object, field: &str) -> Result<Option<f64>> {
    match obj.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_f64()
            .map(Some)
            .ok_or_else(|| MeteoError::decode_field(field, format!("'{field}' is not a number"))),
    }
}

fn optional_str(obj: &Object, field: &str) -> Option<String> {
    obj.get(field).and_then(Value::as_str).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{ForecastArgs, HistoricalArgs, MarineArgs};
    use serde_json::json;

    fn forecast_request(hourly: Option<&str>, daily: Option<&str>, current: bool) -> ForecastRequest {
        ForecastArgs {
            latitude: 51.5072,
            longitude: -0.1276,
            current_weather: Some(current),
            hourly: hourly.map(str::to_string),
            daily: daily.map(str::to_string),
            ..Default::default()
        }
        .validate()
        .unwrap()
    }

    #[test]
    fn test_current_conditions() {
        let request = forecast_request(None, None, true);
        let payload = json!({
            "latitude": 51.5,
            "longitude": -0.12,
            "current_weather": {
                "temperature": 7.8,
                "windspeed": 18.3,
                "weathercode": 61,
                "time": "2024-11-22T10:00"
            }
        });
        let forecast = decode_forecast(&request, &payload).unwrap();
        let current = forecast.current.as_requested().unwrap();
        assert_eq!(current.temperature, 7.8);
        assert_eq!(current.wind_speed, 18.3);
        assert_eq!(current.wind_direction, None);
        assert_eq!(current.weather_code, 61);
        assert_eq!(forecast.location.coordinate.latitude, 51.5);
        assert!(!forecast.location.grid_snapped);
        assert!(!forecast.hourly.is_requested());
        assert!(!forecast.daily.is_requested());
    }

    #[test]
    fn test_hourly_columns_follow_request_order() {
        let request = forecast_request(Some("precipitation,temperature_2m"), None, false);
        let payload = json!({
            "latitude": 51.5,
            "longitude": -0.12,
            "elevation": 23.0,
            "timezone": "Europe/London",
            "timezone_abbreviation": "GMT",
            "utc_offset_seconds": 0,
            "hourly_units": {"time": "iso8601", "temperature_2m": "°C", "precipitation": "mm"},
            "hourly": {
                "time": ["2024-11-22T00:00", "2024-11-22T01:00"],
                "temperature_2m": [7.1, null],
                "precipitation": [0.0, 0.4],
                "generationtime_hint": [1, 2]
            }
        });
        let forecast = decode_forecast(&request, &payload).unwrap();
        let hourly = forecast.hourly.as_requested().unwrap();
        assert_eq!(hourly.len(), 2);
        assert_eq!(hourly.columns()[0].name, "precipitation");
        assert_eq!(hourly.columns()[1].name, "temperature_2m");
        assert_eq!(hourly.numeric("temperature_2m"), Some(&[Some(7.1), None][..]));
        assert_eq!(hourly.column("temperature_2m").unwrap().unit.as_deref(), Some("°C"));
        assert!(hourly.column("generationtime_hint").is_none());
        assert_eq!(forecast.location.timezone.as_deref(), Some("Europe/London"));
        assert_eq!(forecast.location.utc_offset_seconds, Some(0));
    }

    #[test]
    fn test_length_mismatch_is_decode_error() {
        let request = forecast_request(Some("temperature_2m"), None, false);
        let payload = json!({
            "latitude": 51.5,
            "longitude": -0.12,
            "hourly": {
                "time": ["2024-11-22T00:00", "2024-11-22T01:00", "2024-11-22T02:00"],
                "temperature_2m": [7.1, 7.0]
            }
        });
        let err = decode_forecast(&request, &payload).unwrap_err();
        assert!(matches!(err, MeteoError::DecodeError { .. }));
        assert_eq!(err.offending_fields(), vec!["temperature_2m"]);
    }

    #[test]
    fn test_missing_group_and_variable() {
        let request = forecast_request(None, Some("temperature_2m_max"), false);
        let payload = json!({"latitude": 51.5, "longitude": -0.12});
        let err = decode_forecast(&request, &payload).unwrap_err();
        assert_eq!(err.offending_fields(), vec!["daily"]);

        let payload = json!({
            "latitude": 51.5,
            "longitude": -0.12,
            "daily": {"time": ["2024-11-22"]}
        });
        let err = decode_forecast(&request, &payload).unwrap_err();
        assert_eq!(err.offending_fields(), vec!["temperature_2m_max"]);
    }

    #[test]
    fn test_missing_current_block() {
        let request = forecast_request(None, None, true);
        let payload = json!({"latitude": 51.5, "longitude": -0.12});
        let err = decode_forecast(&request, &payload).unwrap_err();
        assert_eq!(err.offending_fields(), vec!["current_weather"]);
    }

    #[test]
    fn test_non_numeric_value_is_rejected() {
        let request = forecast_request(Some("rain"), None, false);
        let payload = json!({
            "latitude": 51.5,
            "longitude": -0.12,
            "hourly": {"time": ["2024-11-22T00:00"], "rain": ["n/a"]}
        });
        assert!(matches!(
            decode_forecast(&request, &payload),
            Err(MeteoError::DecodeError { .. })
        ));
    }

    #[test]
    fn test_daily_text_columns_and_grid_snapping() {
        let request = HistoricalArgs {
            latitude: 46.0,
            longitude: 7.0,
            start_date: "2024-01-01".to_string(),
            end_date: "2024-01-02".to_string(),
            daily: Some("sunrise,temperature_2m_max".to_string()),
            ..Default::default()
        }
        .validate()
        .unwrap();
        let payload = json!({
            "latitude": 46.25,
            "longitude": 7.0,
            "daily": {
                "time": ["2024-01-01", "2024-01-02"],
                "sunrise": ["2024-01-01T08:12", "2024-01-02T08:12"],
                "temperature_2m_max": [1.5, 2.5]
            }
        });
        let historical = decode_historical(&request, &payload).unwrap();
        assert!(historical.location.grid_snapped);
        assert_eq!(historical.location.requested.latitude, 46.0);

        let daily = historical.daily.as_requested().unwrap();
        assert!(matches!(daily.times()[0], Timestamp::Date(_)));
        let sunrise = daily.column("sunrise").unwrap().values.as_text().unwrap();
        assert_eq!(sunrise[1].as_deref(), Some("2024-01-02T08:12"));
    }

    #[test]
    fn test_requested_but_empty_group() {
        let request = MarineArgs {
            latitude: 21.3,
            longitude: -157.9,
            hourly: Some("wave_height".to_string()),
            ..Default::default()
        }
        .validate()
        .unwrap();
        let payload = json!({
            "latitude": 21.3,
            "longitude": -157.9,
            "hourly": {"time": [], "wave_height": []}
        });
        let marine = decode_marine(&request, &payload).unwrap();
        let hourly = marine.hourly.as_requested().unwrap();
        assert!(hourly.is_empty());
        assert_eq!(marine.daily, SeriesGroup::NotRequested);
    }

    #[test]
    fn test_geocoding() {
        let payload = json!({
            "results": [{
                "id": 2643743,
                "name": "London",
                "latitude": 51.50853,
                "longitude": -0.12574,
                "elevation": 25.0,
                "feature_code": "PPLC",
                "country_code": "GB",
                "country": "United Kingdom",
                "timezone": "Europe/London",
                "population": 7556900,
                "admin1": "England",
                "admin3": "Westminster"
            }],
            "generationtime_ms": 0.5
        });
        let results = decode_geocoding(&payload).unwrap();
        let london = results.first().unwrap();
        assert_eq!(london.name, "London");
        assert_eq!(london.admin_regions, vec!["England", "Westminster"]);
        assert_eq!(london.population, Some(7_556_900));
        assert!(london.postcodes.is_empty());
    }

    #[test]
    fn test_geocoding_without_matches() {
        let results = decode_geocoding(&json!({"generationtime_ms": 0.3})).unwrap();
        assert!(results.is_empty());

        let err = decode_geocoding(&json!({"results": [{"latitude": 1.0}]})).unwrap_err();
        assert_eq!(err.offending_fields(), vec!["name"]);
    }
}
