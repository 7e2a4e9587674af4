//! Explicit tool table: name, description, argument schema, result schema, handler

use super::WeatherTools;
use crate::api::{HttpTransport, Transport};
use crate::error::{MeteoError, ToolError};
use crate::query::{AirQualityArgs, ForecastArgs, GeocodingArgs, HistoricalArgs, MarineArgs};
use crate::Result;
use futures::future::BoxFuture;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

/// Handler invoked with the raw argument record
pub type ToolHandler<T> = for<'a> fn(&'a WeatherTools<T>, Value) -> BoxFuture<'a, Result<Value>>;

pub struct ToolDefinition<T: Transport> {
    pub name: &'static str,
    pub description: &'static str,
    pub input_schema: Value,
    pub output_schema: Value,
    handler: ToolHandler<T>,
}

/// Arguments of `interpret_weather_code`
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct InterpretArgs {
    #[serde(alias = "weather_code")]
    code: i64,
}

/// Registry built once at startup; dispatches calls by tool name
pub struct ToolRegistry<T: Transport = HttpTransport> {
    service: WeatherTools<T>,
    tools: Vec<ToolDefinition<T>>,
}

impl<T: Transport> ToolRegistry<T> {
    pub fn new(service: WeatherTools<T>) -> Self {
        Self {
            service,
            tools: definitions(),
        }
    }

    #[must_use]
    pub fn service(&self) -> &WeatherTools<T> {
        &self.service
    }

    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.tools.iter().map(|t| t.name).collect()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ToolDefinition<T>> {
        self.tools.iter().find(|t| t.name == name)
    }

    /// Tool listing for the hosting framework
    #[must_use]
    pub fn list(&self) -> Value {
        Value::Array(
            self.tools
                .iter()
                .map(|t| {
                    json!({
                        "name": t.name,
                        "description": t.description,
                        "inputSchema": t.input_schema,
                        "outputSchema": t.output_schema,
                    })
                })
                .collect(),
        )
    }

    /// Run a tool, returning its serialized result or a structured error
    #[instrument(skip(self, arguments), fields(tool = %name))]
    pub async fn call(&self, name: &str, arguments: Value) -> std::result::Result<Value, ToolError> {
        let Some(tool) = self.get(name) else {
            let err = MeteoError::invalid_arguments(
                "name",
                format!(
                    "Unknown tool '{name}'. Available tools: {}",
                    self.names().join(", ")
                ),
            );
            warn!("{}", err);
            return Err(ToolError::from(err));
        };

        let start_time = Instant::now();
        match (tool.handler)(&self.service, arguments).await {
            Ok(value) => {
                debug!(
                    elapsed_ms = start_time.elapsed().as_millis() as u64,
                    "Tool call succeeded"
                );
                Ok(value)
            }
            Err(err) => {
                if err.kind().is_validation() {
                    info!(kind = %err.kind(), "Rejected tool arguments: {}", err);
                } else {
                    warn!(kind = %err.kind(), "Tool call failed: {}", err);
                }
                Err(ToolError::from(&err))
            }
        }
    }
}

fn parse_args<A: DeserializeOwned>(arguments: Value) -> Result<A> {
    let arguments = match arguments {
        Value::Null => Value::Object(Map::new()),
        other => other,
    };
    serde_json::from_value(arguments.clone()).map_err(|err| argument_error::<A>(&arguments, &err))
}

/// Name the field serde complained about, e.g. "missing field `latitude`"
fn argument_error<A: DeserializeOwned>(arguments: &Value, err: &serde_json::Error) -> MeteoError {
    let message = err.to_string();
    if let Some(field) = message.split('`').nth(1) {
        return MeteoError::invalid_arguments(field, message.clone());
    }
    match mistyped_field::<A>(arguments, &message) {
        Some(field) => {
            let message = format!("'{field}': {message}");
            MeteoError::invalid_arguments(field, message)
        }
        None => MeteoError::invalid_arguments("arguments", message),
    }
}

/// Type errors carry no field name; the culprit is the key whose removal changes the error
fn mistyped_field<A: DeserializeOwned>(arguments: &Value, message: &str) -> Option<String> {
    let object = arguments.as_object()?;
    object
        .keys()
        .find(|key| {
            let mut trimmed = object.clone();
            trimmed.remove(key.as_str());
            serde_json::from_value::<A>(Value::Object(trimmed))
                .map_or_else(|e| e.to_string() != message, |_| true)
        })
        .cloned()
}

fn to_value<R: Serialize>(result: &R) -> Result<Value> {
    serde_json::to_value(result)
        .map_err(|e| MeteoError::decode(format!("Failed to serialize result: {e}")))
}

fn forecast_handler<T: Transport>(
    tools: &WeatherTools<T>,
    arguments: Value,
) -> BoxFuture<'_, Result<Value>> {
    Box::pin(async move {
        let args: ForecastArgs = parse_args(arguments)?;
        to_value(&tools.get_weather_forecast(&args).await?)
    })
}

fn geocode_handler<T: Transport>(
    tools: &WeatherTools<T>,
    arguments: Value,
) -> BoxFuture<'_, Result<Value>> {
    Box::pin(async move {
        let args: GeocodingArgs = parse_args(arguments)?;
        to_value(&tools.geocode_location(&args).await?)
    })
}

fn historical_handler<T: Transport>(
    tools: &WeatherTools<T>,
    arguments: Value,
) -> BoxFuture<'_, Result<Value>> {
    Box::pin(async move {
        let args: HistoricalArgs = parse_args(arguments)?;
        to_value(&tools.get_historical_weather(&args).await?)
    })
}

fn air_quality_handler<T: Transport>(
    tools: &WeatherTools<T>,
    arguments: Value,
) -> BoxFuture<'_, Result<Value>> {
    Box::pin(async move {
        let args: AirQualityArgs = parse_args(arguments)?;
        to_value(&tools.get_air_quality(&args).await?)
    })
}

fn marine_handler<T: Transport>(
    tools: &WeatherTools<T>,
    arguments: Value,
) -> BoxFuture<'_, Result<Value>> {
    Box::pin(async move {
        let args: MarineArgs = parse_args(arguments)?;
        to_value(&tools.get_marine_forecast(&args).await?)
    })
}

fn interpret_handler<T: Transport>(
    tools: &WeatherTools<T>,
    arguments: Value,
) -> BoxFuture<'_, Result<Value>> {
    Box::pin(async move {
        let args: InterpretArgs = parse_args(arguments)?;
        to_value(tools.interpret_weather_code(args.code)?)
    })
}

fn coordinate_properties() -> Map<String, Value> {
    let mut properties = Map::new();
    properties.insert(
        "latitude".to_string(),
        json!({"type": "number", "minimum": -90, "maximum": 90,
               "description": "Latitude in decimal degrees. Use geocode_location to find it."}),
    );
    properties.insert(
        "longitude".to_string(),
        json!({"type": "number", "minimum": -180, "maximum": 180,
               "description": "Longitude in decimal degrees. Use geocode_location to find it."}),
    );
    properties
}

fn unit_properties(properties: &mut Map<String, Value>) {
    properties.insert(
        "temperature_unit".to_string(),
        json!({"type": "string", "enum": ["celsius", "fahrenheit"], "default": "celsius"}),
    );
    properties.insert(
        "wind_speed_unit".to_string(),
        json!({"type": "string", "enum": ["kmh", "ms", "mph", "kn"], "default": "kmh"}),
    );
    properties.insert(
        "precipitation_unit".to_string(),
        json!({"type": "string", "enum": ["mm", "inch"], "default": "mm"}),
    );
}

fn timezone_property(properties: &mut Map<String, Value>) {
    properties.insert(
        "timezone".to_string(),
        json!({"type": "string", "default": "auto",
               "description": "IANA timezone such as 'Europe/London', or 'auto' for the location's local time"}),
    );
}

fn list_property(properties: &mut Map<String, Value>, name: &str, description: &str) {
    properties.insert(
        name.to_string(),
        json!({"type": "string", "description": description}),
    );
}

fn forecast_days_property(properties: &mut Map<String, Value>) {
    properties.insert(
        "forecast_days".to_string(),
        json!({"type": "integer", "minimum": 1, "maximum": 16, "default": 7}),
    );
}

fn object_schema(properties: Map<String, Value>, required: &[&str]) -> Value {
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
        "additionalProperties": false,
    })
}

fn series_result_schema(groups: &[&str]) -> Value {
    let mut properties = Map::new();
    properties.insert("location".to_string(), json!({"type": "object"}));
    for group in groups {
        properties.insert(
            (*group).to_string(),
            json!({
                "type": "object",
                "properties": {
                    "status": {"type": "string", "enum": ["not_requested", "requested"]},
                    "data": {"type": "object"}
                },
                "required": ["status"]
            }),
        );
    }
    json!({"type": "object", "properties": properties})
}

fn definitions<T: Transport>() -> Vec<ToolDefinition<T>> {
    let mut forecast = coordinate_properties();
    unit_properties(&mut forecast);
    timezone_property(&mut forecast);
    forecast_days_property(&mut forecast);
    forecast.insert(
        "current_weather".to_string(),
        json!({"type": "boolean", "default": true,
               "description": "Include current conditions (recommended for 'what is the weather' questions)"}),
    );
    list_property(
        &mut forecast,
        "hourly",
        "Comma-separated hourly variables, e.g. 'temperature_2m,precipitation,wind_speed_10m'",
    );
    list_property(
        &mut forecast,
        "daily",
        "Comma-separated daily variables, e.g. 'temperature_2m_max,temperature_2m_min,sunrise'",
    );

    let mut geocode = Map::new();
    geocode.insert(
        "name".to_string(),
        json!({"type": "string", "description": "Place name. Plain city names match best; retry with a simpler name when nothing is found."}),
    );
    geocode.insert(
        "count".to_string(),
        json!({"type": "integer", "minimum": 1, "maximum": 100, "default": 10}),
    );
    geocode.insert(
        "language".to_string(),
        json!({"type": "string", "default": "en"}),
    );
    geocode.insert(
        "format".to_string(),
        json!({"type": "string", "enum": ["json"], "default": "json"}),
    );
    geocode.insert(
        "country_code".to_string(),
        json!({"type": "string", "description": "ISO 3166-1 alpha-2 code restricting matches to one country"}),
    );

    let mut historical = coordinate_properties();
    historical.insert(
        "start_date".to_string(),
        json!({"type": "string", "format": "date", "description": "YYYY-MM-DD; archive coverage starts around 1940"}),
    );
    historical.insert(
        "end_date".to_string(),
        json!({"type": "string", "format": "date", "description": "YYYY-MM-DD, on or after start_date"}),
    );
    unit_properties(&mut historical);
    timezone_property(&mut historical);
    list_property(&mut historical, "hourly", "Comma-separated hourly archive variables");
    list_property(&mut historical, "daily", "Comma-separated daily archive variables");

    let mut air_quality = coordinate_properties();
    timezone_property(&mut air_quality);
    list_property(
        &mut air_quality,
        "hourly",
        "Comma-separated pollutants and indices; defaults to particulates, gases, us_aqi and european_aqi",
    );
    air_quality.insert(
        "domains".to_string(),
        json!({"type": "string", "enum": ["auto", "cams_global", "cams_europe"], "default": "auto"}),
    );

    let mut marine = coordinate_properties();
    timezone_property(&mut marine);
    forecast_days_property(&mut marine);
    list_property(
        &mut marine,
        "hourly",
        "Comma-separated marine variables; sea_level_height_msl carries tides",
    );
    list_property(
        &mut marine,
        "daily",
        "Comma-separated daily marine variables, e.g. 'wave_height_max'",
    );

    let mut interpret = Map::new();
    interpret.insert(
        "code".to_string(),
        json!({"type": "integer", "minimum": 0, "maximum": 99,
               "description": "WMO weather code, e.g. the 'weathercode' of current conditions"}),
    );

    vec![
        ToolDefinition {
            name: "get_weather_forecast",
            description: "Weather forecast with current conditions and optional hourly and daily series for up to 16 days. Weather codes: 0 clear, 1-3 cloud, 45/48 fog, 51-57 drizzle, 61-67 rain, 71-77 snow, 80-82 showers, 95-99 thunderstorm.",
            input_schema: object_schema(forecast, &["latitude", "longitude"]),
            output_schema: series_result_schema(&["current", "hourly", "daily"]),
            handler: forecast_handler::<T>,
        },
        ToolDefinition {
            name: "geocode_location",
            description: "Convert a place name into coordinates, timezone and administrative regions. Call this before the weather tools. No match returns an empty list.",
            input_schema: object_schema(geocode, &["name"]),
            output_schema: json!({
                "type": "object",
                "properties": {"results": {"type": "array", "items": {"type": "object"}}}
            }),
            handler: geocode_handler::<T>,
        },
        ToolDefinition {
            name: "get_historical_weather",
            description: "Archived weather between two dates (inclusive) from the reanalysis archive.",
            input_schema: object_schema(historical, &["latitude", "longitude", "start_date", "end_date"]),
            output_schema: series_result_schema(&["hourly", "daily"]),
            handler: historical_handler::<T>,
        },
        ToolDefinition {
            name: "get_air_quality",
            description: "Hourly air quality forecast: particulate matter, gases, pollen and US/European AQI.",
            input_schema: object_schema(air_quality, &["latitude", "longitude"]),
            output_schema: series_result_schema(&["hourly"]),
            handler: air_quality_handler::<T>,
        },
        ToolDefinition {
            name: "get_marine_forecast",
            description: "Ocean forecast for coastal or offshore points: wave height, period and direction, swell, currents and tides via sea_level_height_msl.",
            input_schema: object_schema(marine, &["latitude", "longitude"]),
            output_schema: series_result_schema(&["hourly", "daily"]),
            handler: marine_handler::<T>,
        },
        ToolDefinition {
            name: "interpret_weather_code",
            description: "Translate a WMO weather code (0-99) into a description and a severity category.",
            input_schema: object_schema(interpret, &["code"]),
            output_schema: json!({
                "type": "object",
                "properties": {
                    "code": {"type": "integer"},
                    "description": {"type": "string"},
                    "severity": {"type": "string", "enum": ["clear", "cloud", "fog", "drizzle", "rain", "snow", "thunderstorm"]}
                }
            }),
            handler: interpret_handler::<T>,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::Endpoints;
    use crate::error::ErrorKind;
    use crate::query::QueryParams;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records every request and answers with a fixed payload
    #[derive(Default)]
    struct RecordingTransport {
        requests: Mutex<Vec<(String, QueryParams)>>,
        payload: Value,
    }

    #[async_trait]
    impl Transport for RecordingTransport {
        async fn get_json(&self, url: &str, query: &QueryParams) -> Result<Value> {
            self.requests
                .lock()
                .unwrap()
                .push((url.to_string(), query.clone()));
            Ok(self.payload.clone())
        }
    }

    fn registry(payload: Value) -> ToolRegistry<RecordingTransport> {
        let transport = RecordingTransport {
            payload,
            ..Default::default()
        };
        ToolRegistry::new(WeatherTools::new(transport, Endpoints::production()))
    }

    fn request_count(registry: &ToolRegistry<RecordingTransport>) -> usize {
        registry.service().transport.requests.lock().unwrap().len()
    }

    #[test]
    fn test_registry_lists_six_tools() {
        let registry = registry(Value::Null);
        assert_eq!(
            registry.names(),
            vec![
                "get_weather_forecast",
                "geocode_location",
                "get_historical_weather",
                "get_air_quality",
                "get_marine_forecast",
                "interpret_weather_code",
            ]
        );
        let listing = registry.list();
        assert_eq!(listing.as_array().unwrap().len(), 6);
        assert_eq!(listing[0]["inputSchema"]["required"], json!(["latitude", "longitude"]));
    }

    #[tokio::test]
    async fn test_interpret_weather_code() {
        let registry = registry(Value::Null);
        let result = registry
            .call("interpret_weather_code", json!({"code": 95}))
            .await
            .unwrap();
        assert_eq!(result["description"], "Thunderstorm");
        assert_eq!(result["severity"], "thunderstorm");

        let alias = registry
            .call("interpret_weather_code", json!({"weather_code": 0}))
            .await
            .unwrap();
        assert_eq!(alias["severity"], "clear");

        let err = registry
            .call("interpret_weather_code", json!({"code": 100}))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidCode);
        assert_eq!(request_count(&registry), 0);
    }

    #[tokio::test]
    async fn test_argument_errors_name_the_field() {
        let registry = registry(Value::Null);
        let err = registry
            .call("get_weather_forecast", json!({"longitude": 0.0}))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidArguments);
        assert_eq!(err.offending_fields, vec!["latitude"]);

        let err = registry
            .call(
                "get_air_quality",
                json!({"latitude": 0.0, "longitude": 0.0, "pollen": true}),
            )
            .await
            .unwrap_err();
        assert_eq!(err.offending_fields, vec!["pollen"]);
        assert_eq!(request_count(&registry), 0);
    }

    #[tokio::test]
    async fn test_mistyped_argument_names_the_field() {
        let registry = registry(Value::Null);
        let err = registry
            .call(
                "get_weather_forecast",
                json!({"latitude": "51.5", "longitude": 0.0}),
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidArguments);
        assert_eq!(err.offending_fields, vec!["latitude"]);
        assert!(err.message.contains("latitude"));

        let err = registry
            .call(
                "get_weather_forecast",
                json!({"latitude": 51.5, "longitude": 0.0, "forecast_days": "3"}),
            )
            .await
            .unwrap_err();
        assert_eq!(err.offending_fields, vec!["forecast_days"]);

        let err = registry
            .call("interpret_weather_code", json!({"code": "sixty-one"}))
            .await
            .unwrap_err();
        assert_eq!(err.offending_fields, vec!["code"]);
        assert_eq!(request_count(&registry), 0);
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let registry = registry(Value::Null);
        let err = registry.call("get_pollen", json!({})).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidArguments);
        assert!(err.message.contains("geocode_location"));
    }

    #[tokio::test]
    async fn test_validation_happens_before_any_request() {
        let registry = registry(Value::Null);
        let err = registry
            .call(
                "get_weather_forecast",
                json!({"latitude": 51.5, "longitude": -0.12, "hourly": "temperature_2m,foo,bar"}),
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnknownVariable);
        assert_eq!(err.offending_fields, vec!["foo", "bar"]);
        assert_eq!(request_count(&registry), 0);
    }

    #[tokio::test]
    async fn test_forecast_and_geocoding_with_matches() {
        let registry = registry(json!({
            "latitude": 51.5,
            "longitude": -0.12,
            "current_weather": {
                "temperature": 7.8,
                "windspeed": 18.3,
                "winddirection": 225.0,
                "weathercode": 61,
                "time": "2024-11-22T10:00"
            },
            "results": [{
                "name": "London",
                "latitude": 51.50853,
                "longitude": -0.12574,
                "country": "United Kingdom",
                "admin1": "England"
            }]
        }));

        let forecast = registry
            .call("get_weather_forecast", json!({"latitude": 51.5072, "longitude": -0.1276}))
            .await
            .unwrap();
        assert_eq!(forecast["current"]["data"]["weather_code"], 61);

        let places = registry
            .call("geocode_location", json!({"name": "London"}))
            .await
            .unwrap();
        assert_eq!(places["results"][0]["admin_regions"], json!(["England"]));
        assert_eq!(request_count(&registry), 2);
    }

    #[tokio::test]
    async fn test_geocode_routes_to_geocoding_host() {
        let registry = registry(json!({"generationtime_ms": 0.4}));
        let result = registry
            .call("geocode_location", json!({"name": "Atlantis"}))
            .await
            .unwrap();
        assert_eq!(result["results"], json!([]));

        let requests = registry.service().transport.requests.lock().unwrap();
        assert_eq!(requests[0].0, "https://geocoding-api.open-meteo.com/v1/search");
        assert_eq!(requests[0].1.get("name"), Some("Atlantis"));
    }
}
