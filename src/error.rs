//! Error types and handling for the Open-Meteo tool layer
//!
//! Validation errors are raised before any request leaves the process; upstream
//! and decode errors carry enough context for a caller to correct itself.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Main error type for every tool operation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MeteoError {
    /// Latitude or longitude outside the valid range
    #[error("Invalid coordinate: {message}")]
    InvalidCoordinate { field: String, message: String },

    /// Malformed dates or a start date after the end date
    #[error("Invalid date range: {message}")]
    InvalidDateRange { fields: Vec<String>, message: String },

    /// Integer argument outside its allowed bounds
    #[error("Invalid range for '{field}': {value} is not within {min}..={max}")]
    InvalidRange {
        field: String,
        value: i64,
        min: i64,
        max: i64,
    },

    /// One or more variable names not known for the requested domain
    #[error("Unknown {domain} variable(s): {}", .tokens.join(", "))]
    UnknownVariable {
        field: String,
        domain: String,
        tokens: Vec<String>,
    },

    /// Unit value outside its enumerated option set
    #[error("Invalid unit for '{field}': '{value}' (allowed: {})", .allowed.join(", "))]
    InvalidUnit {
        field: String,
        value: String,
        allowed: Vec<String>,
    },

    /// Non-unit option outside its enumerated set
    #[error("Invalid value for '{field}': '{value}' (allowed: {})", .allowed.join(", "))]
    InvalidOption {
        field: String,
        value: String,
        allowed: Vec<String>,
    },

    /// Weather code outside 0..=99
    #[error("Invalid weather code {code}: WMO codes range from 0 to 99")]
    InvalidCode { code: i64 },

    /// Tool arguments that could not be read at all
    #[error("Invalid arguments: {message}")]
    InvalidArguments {
        fields: Vec<String>,
        message: String,
    },

    /// Upstream answered with a non-success status
    #[error("Upstream HTTP error {status}: {reason}")]
    UpstreamHttpError { status: u16, reason: String },

    /// Upstream did not answer within the timeout budget
    #[error("Upstream request timed out after {timeout_seconds}s")]
    UpstreamTimeout { timeout_seconds: u64 },

    /// Connection could not be established or was reset
    #[error("Upstream connection failed: {message}")]
    UpstreamConnection { message: String },

    /// Payload violated the expected response shape
    #[error("Decode error: {reason}")]
    DecodeError {
        fields: Vec<String>,
        reason: String,
    },

    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },
}

/// Stable, wire-visible error classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    InvalidCoordinate,
    InvalidDateRange,
    InvalidRange,
    UnknownVariable,
    InvalidUnit,
    InvalidOption,
    InvalidCode,
    InvalidArguments,
    UpstreamHttpError,
    UpstreamTimeout,
    UpstreamConnection,
    DecodeError,
    Config,
}

impl ErrorKind {
    /// Name used on the wire
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidCoordinate => "InvalidCoordinate",
            Self::InvalidDateRange => "InvalidDateRange",
            Self::InvalidRange => "InvalidRange",
            Self::UnknownVariable => "UnknownVariable",
            Self::InvalidUnit => "InvalidUnit",
            Self::InvalidOption => "InvalidOption",
            Self::InvalidCode => "InvalidCode",
            Self::InvalidArguments => "InvalidArguments",
            Self::UpstreamHttpError => "UpstreamHttpError",
            Self::UpstreamTimeout => "UpstreamTimeout",
            Self::UpstreamConnection => "UpstreamConnection",
            Self::DecodeError => "DecodeError",
            Self::Config => "Config",
        }
    }

    /// Whether the caller can fix the failure by changing its arguments
    #[must_use]
    pub fn is_validation(self) -> bool {
        matches!(
            self,
            Self::InvalidCoordinate
                | Self::InvalidDateRange
                | Self::InvalidRange
                | Self::UnknownVariable
                | Self::InvalidUnit
                | Self::InvalidOption
                | Self::InvalidCode
                | Self::InvalidArguments
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl MeteoError {
    /// Create a coordinate error for a single axis
    pub fn invalid_coordinate<F: Into<String>, S: Into<String>>(field: F, message: S) -> Self {
        Self::InvalidCoordinate {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a date range error naming the fields involved
    pub fn invalid_date_range<S: Into<String>>(fields: &[&str], message: S) -> Self {
        Self::InvalidDateRange {
            fields: fields.iter().map(|f| (*f).to_string()).collect(),
            message: message.into(),
        }
    }

    /// Create an argument error for a single field
    pub fn invalid_arguments<F: Into<String>, S: Into<String>>(field: F, message: S) -> Self {
        Self::InvalidArguments {
            fields: vec![field.into()],
            message: message.into(),
        }
    }

    /// Create a decode error that is not tied to a particular field
    pub fn decode<S: Into<String>>(reason: S) -> Self {
        Self::DecodeError {
            fields: Vec::new(),
            reason: reason.into(),
        }
    }

    /// Create a decode error naming the offending field
    pub fn decode_field<F: Into<String>, S: Into<String>>(field: F, reason: S) -> Self {
        Self::DecodeError {
            fields: vec![field.into()],
            reason: reason.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Classification of this error
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidCoordinate { .. } => ErrorKind::InvalidCoordinate,
            Self::InvalidDateRange { .. } => ErrorKind::InvalidDateRange,
            Self::InvalidRange { .. } => ErrorKind::InvalidRange,
            Self::UnknownVariable { .. } => ErrorKind::UnknownVariable,
            Self::InvalidUnit { .. } => ErrorKind::InvalidUnit,
            Self::InvalidOption { .. } => ErrorKind::InvalidOption,
            Self::InvalidCode { .. } => ErrorKind::InvalidCode,
            Self::InvalidArguments { .. } => ErrorKind::InvalidArguments,
            Self::UpstreamHttpError { .. } => ErrorKind::UpstreamHttpError,
            Self::UpstreamTimeout { .. } => ErrorKind::UpstreamTimeout,
            Self::UpstreamConnection { .. } => ErrorKind::UpstreamConnection,
            Self::DecodeError { .. } => ErrorKind::DecodeError,
            Self::Config { .. } => ErrorKind::Config,
        }
    }

    /// Field or token names the caller should look at
    #[must_use]
    pub fn offending_fields(&self) -> Vec<String> {
        match self {
            Self::InvalidCoordinate { field, .. } => vec![field.clone()],
            Self::InvalidDateRange { fields, .. }
            | Self::InvalidArguments { fields, .. }
            | Self::DecodeError { fields, .. } => fields.clone(),
            Self::InvalidRange { field, .. }
            | Self::InvalidUnit { field, .. }
            | Self::InvalidOption { field, .. } => vec![field.clone()],
            Self::UnknownVariable { tokens, .. } => tokens.clone(),
            Self::InvalidCode { .. } => vec!["code".to_string()],
            Self::UpstreamHttpError { .. }
            | Self::UpstreamTimeout { .. }
            | Self::UpstreamConnection { .. }
            | Self::Config { .. } => Vec::new(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::UpstreamHttpError { status, reason } if (400..500).contains(status) => {
                format!("The weather service rejected the request ({status}): {reason}")
            }
            Self::UpstreamHttpError { status, .. } => {
                format!("The weather service is currently failing (HTTP {status}). Try again later.")
            }
            Self::UpstreamTimeout { .. } | Self::UpstreamConnection { .. } => {
                "Unable to reach the weather service. Please try again later.".to_string()
            }
            Self::Config { .. } => {
                "Configuration error. Please check your configuration file and environment."
                    .to_string()
            }
            other => other.to_string(),
        }
    }
}

/// Structured error surfaced to tool callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolError {
    pub kind: ErrorKind,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub offending_fields: Vec<String>,
}

impl From<&MeteoError> for ToolError {
    fn from(err: &MeteoError) -> Self {
        Self {
            kind: err.kind(),
            message: err.user_message(),
            offending_fields: err.offending_fields(),
        }
    }
}

impl From<MeteoError> for ToolError {
    fn from(err: MeteoError) -> Self {
        Self::from(&err)
    }
}

impl fmt::Display for ToolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for ToolError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let coord_err = MeteoError::invalid_coordinate("latitude", "must be within -90..=90");
        assert!(matches!(coord_err, MeteoError::InvalidCoordinate { .. }));
        assert_eq!(coord_err.kind(), ErrorKind::InvalidCoordinate);

        let config_err = MeteoError::config("timeout too large");
        assert!(matches!(config_err, MeteoError::Config { .. }));

        let decode_err = MeteoError::decode_field("temperature_2m", "length mismatch");
        assert_eq!(decode_err.offending_fields(), vec!["temperature_2m"]);
    }

    #[test]
    fn test_unknown_variable_lists_every_token() {
        let err = MeteoError::UnknownVariable {
            field: "hourly".to_string(),
            domain: "forecast hourly".to_string(),
            tokens: vec!["foo".to_string(), "bar".to_string()],
        };
        let message = err.to_string();
        assert!(message.contains("foo"));
        assert!(message.contains("bar"));
        assert_eq!(err.offending_fields(), vec!["foo", "bar"]);
    }

    #[test]
    fn test_user_messages() {
        let not_found = MeteoError::UpstreamHttpError {
            status: 400,
            reason: "Parameter 'start_date' is out of allowed range".to_string(),
        };
        assert!(not_found.user_message().contains("start_date"));

        let server = MeteoError::UpstreamHttpError {
            status: 503,
            reason: "Service Unavailable".to_string(),
        };
        assert!(server.user_message().contains("503"));

        let timeout = MeteoError::UpstreamTimeout { timeout_seconds: 30 };
        assert!(timeout.user_message().contains("Unable to reach"));

        let range = MeteoError::InvalidRange {
            field: "forecast_days".to_string(),
            value: 17,
            min: 1,
            max: 16,
        };
        assert!(range.user_message().contains("forecast_days"));
    }

    #[test]
    fn test_tool_error_serialization() {
        let err = MeteoError::InvalidCode { code: 100 };
        let tool_err = ToolError::from(&err);
        let json = serde_json::to_value(&tool_err).unwrap();
        assert_eq!(json["kind"], "InvalidCode");
        assert_eq!(json["offending_fields"][0], "code");

        let upstream = ToolError::from(MeteoError::UpstreamTimeout { timeout_seconds: 5 });
        let json = serde_json::to_value(&upstream).unwrap();
        assert!(json.get("offending_fields").is_none());
    }

    #[test]
    fn test_validation_kinds() {
        assert!(ErrorKind::UnknownVariable.is_validation());
        assert!(ErrorKind::InvalidCode.is_validation());
        assert!(!ErrorKind::UpstreamTimeout.is_validation());
        assert!(!ErrorKind::DecodeError.is_validation());
    }
}
