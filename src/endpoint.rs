//! Endpoint router: one fixed upstream URL per logical request kind

use crate::error::MeteoError;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndpointKind {
    Forecast,
    Geocoding,
    Historical,
    AirQuality,
    Marine,
}

impl EndpointKind {
    pub const ALL: [EndpointKind; 5] = [
        EndpointKind::Forecast,
        EndpointKind::Geocoding,
        EndpointKind::Historical,
        EndpointKind::AirQuality,
        EndpointKind::Marine,
    ];

    /// Scheme and host of the production service
    #[must_use]
    pub fn origin(self) -> &'static str {
        match self {
            EndpointKind::Forecast => "https://api.open-meteo.com",
            EndpointKind::Geocoding => "https://geocoding-api.open-meteo.com",
            EndpointKind::Historical => "https://archive-api.open-meteo.com",
            EndpointKind::AirQuality => "https://air-quality-api.open-meteo.com",
            EndpointKind::Marine => "https://marine-api.open-meteo.com",
        }
    }

    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            EndpointKind::Forecast => "/v1/forecast",
            EndpointKind::Geocoding => "/v1/search",
            EndpointKind::Historical => "/v1/archive",
            EndpointKind::AirQuality => "/v1/air-quality",
            EndpointKind::Marine => "/v1/marine",
        }
    }
}

impl fmt::Display for EndpointKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EndpointKind::Forecast => "forecast",
            EndpointKind::Geocoding => "geocoding",
            EndpointKind::Historical => "historical",
            EndpointKind::AirQuality => "air_quality",
            EndpointKind::Marine => "marine",
        };
        f.write_str(name)
    }
}

/// Production URL for `kind`
#[must_use]
pub fn base_url_for(kind: EndpointKind) -> String {
    format!("{}{}", kind.origin(), kind.path())
}

/// Resolves endpoint URLs, optionally routing every kind through one origin
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Endpoints {
    override_origin: Option<String>,
}

impl Endpoints {
    /// Router pointing at the production hosts
    #[must_use]
    pub fn production() -> Self {
        Self::default()
    }

    /// Router sending every request to `origin` (a proxy or a stub upstream)
    pub fn with_override(origin: &str) -> Result<Self> {
        let trimmed = origin.trim().trim_end_matches('/');
        if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
            return Err(MeteoError::config(format!(
                "base URL override must start with http:// or https://, got '{origin}'"
            )));
        }
        Ok(Self {
            override_origin: Some(trimmed.to_string()),
        })
    }

    #[must_use]
    pub fn url_for(&self, kind: EndpointKind) -> String {
        match &self.override_origin {
            Some(origin) => format!("{origin}{}", kind.path()),
            None => base_url_for(kind),
        }
    }
}
