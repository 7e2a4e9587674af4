//! Structured logging setup
//!
//! Everything goes to stderr so a host speaking a tool protocol over stdout
//! never sees log lines interleaved with its messages.

use crate::config::LoggingConfig;
use crate::error::MeteoError;
use crate::Result;
use std::env;
use std::io;
use tracing::debug;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Output format of the fmt layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Compact,
    Json,
}

impl LogFormat {
    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "pretty" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            "json" => Ok(Self::Json),
            other => Err(MeteoError::config(format!(
                "Invalid log format '{other}'. Must be one of: pretty, compact, json"
            ))),
        }
    }
}

fn noise_directive(directive: &str) -> Directive {
    directive
        .parse()
        .unwrap_or_else(|_| tracing::Level::WARN.into())
}

/// Build the filter: `RUST_LOG` wins over the configured level, HTTP internals stay at warn
pub fn build_filter(config: &LoggingConfig) -> EnvFilter {
    env::var("RUST_LOG")
        .map_or_else(
            |_| EnvFilter::new(&config.level),
            |directive| EnvFilter::new(&directive),
        )
        .add_directive(noise_directive("hyper=warn"))
        .add_directive(noise_directive("hyper_util=warn"))
        .add_directive(noise_directive("reqwest=warn"))
        .add_directive(noise_directive("reqwest_retry=warn"))
}

/// Install the global subscriber; a second call is a no-op
pub fn init(config: &LoggingConfig) -> Result<()> {
    let format = LogFormat::parse(&config.format)?;
    let registry = tracing_subscriber::registry().with(build_filter(config));

    let installed = match format {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_writer(io::stderr),
            )
            .try_init(),
        LogFormat::Pretty => registry
            .with(
                fmt::layer()
                    .pretty()
                    .with_target(true)
                    .with_writer(io::stderr),
            )
            .try_init(),
        LogFormat::Compact => registry
            .with(
                fmt::layer()
                    .compact()
                    .with_target(false)
                    .with_writer(io::stderr),
            )
            .try_init(),
    };

    if installed.is_err() {
        debug!("Global tracing subscriber already installed; keeping it");
    }
    Ok(())
}
