//! HTTP transport with tracing instrumentation and retries.
//!
//! This module provides the [`Client`] struct that the per-endpoint
//! services borrow to send requests against the Ours Privacy API.

use std::env;
use std::time::Duration;

use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE, RETRY_AFTER, USER_AGENT,
};
use reqwest::Method;
use serde_json::Value;
use tracing::{debug, instrument, warn, Span};
use url::Url;

use conversion::{coerce_model, ResponseModel};

use crate::error::{ApiError, ClientError, StatusError};
use crate::request_options::RequestOptions;
use crate::services::{IdentifyService, TrackService, VisitorService};

/// Base URL used when neither the builder nor the environment overrides it.
pub const DEFAULT_BASE_URL: &str = "https://api.oursprivacy.com/api/v1";

/// Environment variable consulted for the base URL.
pub const BASE_URL_ENV: &str = "OURS_PRIVACY_BASE_URL";

/// User-Agent sent with every request.
pub const SDK_USER_AGENT: &str = concat!("ours-privacy/rust ", env!("CARGO_PKG_VERSION"));

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default number of retries after the initial attempt.
const DEFAULT_MAX_RETRIES: u32 = 2;

/// Initial backoff delay; doubles per attempt up to [`MAX_BACKOFF`].
const INITIAL_BACKOFF: Duration = Duration::from_millis(500);
const MAX_BACKOFF: Duration = Duration::from_secs(8);

/// Builder for configuring a [`Client`].
#[derive(Debug)]
pub struct ClientBuilder {
    base_url: String,
    base_url_overridden: bool,
    timeout: Duration,
    default_headers: HeaderMap,
    max_retries: u32,
}

impl ClientBuilder {
    fn new() -> Self {
        let (base_url, overridden) = match env::var(BASE_URL_ENV) {
            Ok(url) if !url.trim().is_empty() => (url, true),
            _ => (DEFAULT_BASE_URL.to_string(), false),
        };
        let mut default_headers = HeaderMap::new();
        default_headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        default_headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        default_headers.insert(USER_AGENT, HeaderValue::from_static(SDK_USER_AGENT));
        Self {
            base_url,
            base_url_overridden: overridden,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            default_headers,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    /// Overrides the base URL for all requests.
    ///
    /// Takes precedence over the `OURS_PRIVACY_BASE_URL` environment
    /// variable.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self.base_url_overridden = true;
        self
    }

    /// Sets the default request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the retry budget applied when a request does not override it.
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Adds a default header to all requests.
    ///
    /// ## Errors
    ///
    /// Returns an error if the header name or value is invalid.
    pub fn default_header(
        mut self,
        name: impl AsRef<str>,
        value: impl AsRef<str>,
    ) -> Result<Self, ApiError> {
        let name = HeaderName::try_from(name.as_ref())
            .map_err(|e| ClientError::Connection(format!("invalid header name: {e}")))?;
        let value = HeaderValue::try_from(value.as_ref())
            .map_err(|e| ClientError::Connection(format!("invalid header value: {e}")))?;
        self.default_headers.insert(name, value);
        Ok(self)
    }

    /// Builds the [`Client`].
    ///
    /// ## Errors
    ///
    /// Returns an error if the base URL does not parse or the HTTP client
    /// cannot be constructed.
    pub fn build(self) -> Result<Client, ApiError> {
        let base_url = Url::parse(self.base_url.trim_end_matches('/'))
            .map_err(|e| ClientError::Connection(format!("invalid base URL: {e}")))?;

        let http = reqwest::Client::builder()
            .timeout(self.timeout)
            .default_headers(self.default_headers)
            .pool_max_idle_per_host(10)
            .build()
            .map_err(ClientError::Request)?;

        Ok(Client {
            http,
            base_url,
            base_url_overridden: self.base_url_overridden,
            timeout: self.timeout,
            max_retries: self.max_retries,
        })
    }
}

/// Async HTTP client for the Ours Privacy API.
///
/// The client wraps `reqwest::Client` with connection pooling and exposes
/// the endpoint groups through [`Client::track`], [`Client::identify`] and
/// [`Client::visitor`].
///
/// ## Examples
///
/// ```rust,ignore
/// use ours_privacy::{Client, EventParams};
///
/// let client = Client::new()?;
/// let response = client
///     .track()
///     .event(EventParams::new("tk_live_xxx", "signup"), Default::default())
///     .await?;
/// ```
#[derive(Debug)]
pub struct Client {
    http: reqwest::Client,
    base_url: Url,
    base_url_overridden: bool,
    timeout: Duration,
    max_retries: u32,
}

impl Client {
    /// Creates a new builder for configuring a client.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Creates a new client with default settings.
    ///
    /// ## Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new() -> Result<Self, ApiError> {
        Self::builder().build()
    }

    /// Returns the base URL for this client.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Whether the base URL came from the builder or the environment rather
    /// than the built-in default.
    pub fn base_url_overridden(&self) -> bool {
        self.base_url_overridden
    }

    /// Event tracking endpoints.
    pub fn track(&self) -> TrackService<'_> {
        TrackService::new(self)
    }

    /// Visitor identification endpoints.
    pub fn identify(&self) -> IdentifyService<'_> {
        IdentifyService::new(self)
    }

    /// Visitor property endpoints.
    pub fn visitor(&self) -> VisitorService<'_> {
        VisitorService::new(self)
    }

    /// Sends a request and coerces the response into `T`.
    pub(crate) async fn request<T: ResponseModel>(
        &self,
        method: Method,
        path: &str,
        body: Value,
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        let raw = self.request_value(method, path, body, options).await?;
        Ok(coerce_model::<T>(&raw)?)
    }

    /// Sends a request and returns the response as raw JSON.
    #[instrument(
        name = "api_request",
        skip(self, body, options),
        fields(
            http.method = %method,
            http.url = tracing::field::Empty,
            http.status_code = tracing::field::Empty,
            retry.attempt = tracing::field::Empty,
            otel.kind = "client",
            otel.status_code = tracing::field::Empty,
        )
    )]
    pub(crate) async fn request_value(
        &self,
        method: Method,
        path: &str,
        body: Value,
        options: RequestOptions,
    ) -> Result<Value, ApiError> {
        let url = self.endpoint_url(path)?;
        Span::current().record("http.url", url.as_str());

        let timeout = options.timeout.unwrap_or(self.timeout);
        let max_retries = options.max_retries.unwrap_or(self.max_retries);

        let mut attempt: u32 = 0;
        loop {
            Span::current().record("retry.attempt", attempt);

            let request = self
                .http
                .request(method.clone(), url.clone())
                .headers(options.extra_headers.clone())
                .timeout(timeout)
                .json(&body);

            let response = match request.send().await {
                Ok(response) => response,
                Err(e) => {
                    let retryable = e.is_timeout() || e.is_connect();
                    if retryable && attempt < max_retries {
                        warn!(error = %e, attempt, "transport error, retrying");
                        tokio::time::sleep(backoff_delay(attempt)).await;
                        attempt += 1;
                        continue;
                    }
                    Span::current().record("otel.status_code", "ERROR");
                    return Err(map_send_error(e, timeout).into());
                }
            };

            let status = response.status();
            Span::current().record("http.status_code", status.as_u16());

            if status.is_success() {
                Span::current().record("otel.status_code", "OK");
                let bytes = response.bytes().await.map_err(ClientError::Request)?;
                return Ok(serde_json::from_slice(&bytes)?);
            }

            let retry_after = parse_retry_after(response.headers());
            let message = response.text().await.unwrap_or_else(|_| status.to_string());
            let error = StatusError::from_status(status.as_u16(), message);

            if error.is_retryable() && attempt < max_retries {
                let delay = retry_after.unwrap_or_else(|| backoff_delay(attempt));
                warn!(status = status.as_u16(), attempt, "retryable status, retrying");
                tokio::time::sleep(delay).await;
                attempt += 1;
                continue;
            }

            let otel_status = if status.is_server_error() {
                "ERROR"
            } else {
                "UNSET"
            };
            Span::current().record("otel.status_code", otel_status);
            debug!(status = status.as_u16(), "request failed");
            return Err(ApiError::Status(error));
        }
    }

    fn endpoint_url(&self, path: &str) -> Result<Url, ClientError> {
        // Url::join drops the last segment of a base without a trailing
        // slash, so paths are appended textually instead.
        let raw = format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        Url::parse(&raw).map_err(|e| ClientError::Connection(format!("invalid URL: {e}")))
    }
}

fn backoff_delay(attempt: u32) -> Duration {
    INITIAL_BACKOFF
        .saturating_mul(2u32.saturating_pow(attempt))
        .min(MAX_BACKOFF)
}

fn map_send_error(error: reqwest::Error, timeout: Duration) -> ClientError {
    if error.is_timeout() {
        ClientError::Timeout {
            duration_ms: timeout.as_millis() as u64,
        }
    } else if error.is_connect() {
        ClientError::Connection(error.to_string())
    } else {
        ClientError::Request(error)
    }
}

/// Reads a numeric `Retry-After` header, capped at [`MAX_BACKOFF`].
/// HTTP-date forms fall back to exponential backoff.
fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(|secs| Duration::from_secs(secs).min(MAX_BACKOFF))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles_and_caps() {
        assert_eq!(backoff_delay(0), Duration::from_millis(500));
        assert_eq!(backoff_delay(1), Duration::from_secs(1));
        assert_eq!(backoff_delay(2), Duration::from_secs(2));
        assert_eq!(backoff_delay(10), MAX_BACKOFF);
    }

    #[test]
    fn test_builder_base_url_marks_override() {
        let client = Client::builder()
            .base_url("https://staging.oursprivacy.test/api/v1")
            .build()
            .unwrap();
        assert!(client.base_url_overridden());
        assert_eq!(
            client.base_url().as_str(),
            "https://staging.oursprivacy.test/api/v1"
        );
    }

    #[test]
    fn test_default_base_url() {
        // The env override is exercised in the integration suite; here the
        // variable is assumed unset.
        if env::var(BASE_URL_ENV).is_err() {
            let client = Client::new().unwrap();
            assert_eq!(client.base_url().as_str(), DEFAULT_BASE_URL);
            assert!(!client.base_url_overridden());
        }
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        let err = Client::builder().base_url("not a url").build().unwrap_err();
        assert!(matches!(err, ApiError::Client(_)));
    }
}
