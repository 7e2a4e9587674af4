//! HTTP transport for the Open-Meteo endpoints
//!
//! A thin collaborator that performs exactly one logical GET per tool call.
//! Transient failures (connection errors, timeouts, 5xx) are retried with
//! exponential backoff; 4xx answers are surfaced at once.

use crate::config::UpstreamConfig;
use crate::error::MeteoError;
use crate::query::QueryParams;
use crate::Result;
use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::policies::ExponentialBackoff;
use reqwest_retry::{RetryError, RetryTransientMiddleware, Retryable, RetryableStrategy};
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, instrument, warn};

/// Responses slower than this are logged as slow
const SLOW_RESPONSE: Duration = Duration::from_secs(5);

/// Fetches JSON from an upstream endpoint
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get_json(&self, url: &str, query: &QueryParams) -> Result<Value>;
}

/// Retries 5xx answers and transport failures, never 4xx
struct ServerErrorsOnly;

impl RetryableStrategy for ServerErrorsOnly {
    fn handle(
        &self,
        res: &std::result::Result<reqwest::Response, reqwest_middleware::Error>,
    ) -> Option<Retryable> {
        match res {
            Ok(response) if response.status().is_server_error() => Some(Retryable::Transient),
            Ok(_) => None,
            Err(err) => reqwest_retry::default_on_request_failure(err),
        }
    }
}

/// `reqwest` transport with retry middleware
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: ClientWithMiddleware,
    timeout_seconds: u64,
}

impl HttpTransport {
    /// Create a new transport from upstream settings
    pub fn new(config: &UpstreamConfig) -> Result<Self> {
        if config.min_retry_interval_ms > config.max_retry_interval_ms {
            return Err(MeteoError::config(
                "Minimum retry interval cannot exceed the maximum",
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| MeteoError::config(format!("Failed to create HTTP client: {e}")))?;

        let retry_policy = ExponentialBackoff::builder()
            .retry_bounds(
                Duration::from_millis(config.min_retry_interval_ms),
                Duration::from_millis(config.max_retry_interval_ms),
            )
            .build_with_max_retries(config.max_retries);

        let client = ClientBuilder::new(client)
            .with(RetryTransientMiddleware::new_with_policy_and_strategy(
                retry_policy,
                ServerErrorsOnly,
            ))
            .build();

        Ok(Self {
            client,
            timeout_seconds: config.timeout_seconds,
        })
    }

    fn map_send_error(&self, err: &reqwest_middleware::Error) -> MeteoError {
        if is_timeout(err) {
            return MeteoError::UpstreamTimeout {
                timeout_seconds: self.timeout_seconds,
            };
        }
        match err {
            reqwest_middleware::Error::Reqwest(e) => MeteoError::UpstreamConnection {
                message: e.to_string(),
            },
            reqwest_middleware::Error::Middleware(e) => MeteoError::UpstreamConnection {
                message: format!("{e:#}"),
            },
        }
    }
}

/// Timeouts may arrive wrapped by the retry middleware
fn is_timeout(err: &reqwest_middleware::Error) -> bool {
    match err {
        reqwest_middleware::Error::Reqwest(e) => e.is_timeout(),
        reqwest_middleware::Error::Middleware(e) => {
            if let Some(RetryError::WithRetries { err, .. } | RetryError::Error(err)) =
                e.downcast_ref::<RetryError>()
            {
                return is_timeout(err);
            }
            e.chain().any(|cause| {
                cause
                    .downcast_ref::<reqwest::Error>()
                    .is_some_and(reqwest::Error::is_timeout)
                    || cause
                        .downcast_ref::<reqwest_middleware::Error>()
                        .is_some_and(is_timeout)
            })
        }
    }
}

/// Reason string from an Open-Meteo error body (`{"error": true, "reason": ".."}`)
fn upstream_reason(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("reason").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Unknown status")
                .to_string()
        })
}

#[async_trait]
impl Transport for HttpTransport {
    #[instrument(skip(self, query), fields(url = %url))]
    async fn get_json(&self, url: &str, query: &QueryParams) -> Result<Value> {
        let request_url = Url::parse_with_params(url, query.iter())
            .map_err(|e| MeteoError::config(format!("Invalid upstream URL '{url}': {e}")))?;
        debug!("Open-Meteo request URL: {}", request_url);

        let request_start = Instant::now();
        let response = self
            .client
            .get(request_url)
            .send()
            .await
            .map_err(|e| {
                let mapped = self.map_send_error(&e);
                error!("Upstream request failed: {}", e);
                mapped
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                MeteoError::UpstreamTimeout {
                    timeout_seconds: self.timeout_seconds,
                }
            } else {
                MeteoError::UpstreamConnection {
                    message: format!("Failed to read response body: {e}"),
                }
            }
        })?;
        let total_duration = request_start.elapsed();

        debug!(
            status = status.as_u16(),
            "HTTP response received in {:.3}s",
            total_duration.as_secs_f64()
        );

        if total_duration > SLOW_RESPONSE {
            warn!(
                "Slow API response detected: {:.3}s",
                total_duration.as_secs_f64()
            );
        }

        if !status.is_success() {
            let reason = upstream_reason(status, &body);
            if status.is_client_error() {
                warn!(status = status.as_u16(), reason = %reason, "Upstream rejected the request");
            } else {
                error!(status = status.as_u16(), reason = %reason, "Upstream failed after retries");
            }
            return Err(MeteoError::UpstreamHttpError {
                status: status.as_u16(),
                reason,
            });
        }

        info!(
            elapsed_ms = total_duration.as_millis() as u64,
            "Successful API request in {:.3}s",
            total_duration.as_secs_f64()
        );

        serde_json::from_str(&body)
            .map_err(|e| MeteoError::decode(format!("Response body is not valid JSON: {e}")))
    }
}
