//! VapiClient: reqwest implementation of [`PlatformApi`].
//!
//! Every request carries `Authorization: Bearer <key>` and a JSON content
//! type, and runs under the configured [`RetryPolicy`]. Non-2xx responses are
//! never swallowed: they come back as `PlatformError::Status` with the parsed
//! body (or the raw text when the body is not JSON).
//!
//! The API key is wrapped in [`SecretString`] and only exposed while the
//! authorization header is built.

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use reqwest::{Method, Url};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tracing::Instrument;

use voxclone_core::platform::retry::RetryPolicy;
use voxclone_core::platform::{PlatformApi, PlatformConnector};
use voxclone_observe::attrs;
use voxclone_types::config::AppConfig;
use voxclone_types::credential::Redacted;
use voxclone_types::error::PlatformError;
use voxclone_types::resource::{Resource, ResourceKind};

/// HTTP client for one user's platform account.
pub struct VapiClient {
    http: reqwest::Client,
    api_key: SecretString,
    base_url: Url,
    retry: RetryPolicy,
}

// No Debug derive: the struct holds the user's API key.

impl VapiClient {
    /// Build a client with its own connection pool.
    pub fn new(
        api_key: SecretString,
        base_url: &str,
        timeout: Duration,
        retry: RetryPolicy,
    ) -> Result<Self, PlatformError> {
        let http = build_http(timeout)?;
        Self::with_http(http, api_key, base_url, retry)
    }

    /// Build a client on top of an existing connection pool.
    pub fn with_http(
        http: reqwest::Client,
        api_key: SecretString,
        base_url: &str,
        retry: RetryPolicy,
    ) -> Result<Self, PlatformError> {
        Ok(Self {
            http,
            api_key,
            base_url: parse_base_url(base_url)?,
            retry,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // parse_base_url rejects cannot-be-a-base URLs, so this always applies.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// One logical request: retried per policy, traced as a single span.
    async fn request(
        &self,
        method: Method,
        kind: ResourceKind,
        segments: &[&str],
        body: Option<&Value>,
    ) -> Result<Value, PlatformError> {
        let url = self.endpoint(segments);
        let label = format!("{method} {}", url.path());
        let span = attrs::platform_request_span(method.as_str(), url.path(), kind.singular());
        let attempts = AtomicU32::new(0);

        let result = self
            .retry
            .run(&label, || {
                attempts.fetch_add(1, Ordering::Relaxed);
                self.send_once(method.clone(), url.clone(), body)
            })
            .instrument(span.clone())
            .await;

        span.record(attrs::ATTEMPTS, attempts.load(Ordering::Relaxed));
        match &result {
            Ok(_) => {
                tracing::debug!(parent: &span, request = %label, "Platform request succeeded");
            }
            Err(err) => {
                if let Some(status) = err.status() {
                    span.record(attrs::HTTP_RESPONSE_STATUS_CODE, status);
                }
                tracing::debug!(parent: &span, request = %label, error = %err, "Platform request failed");
            }
        }
        result
    }

    async fn send_once(
        &self,
        method: Method,
        url: Url,
        body: Option<&Value>,
    ) -> Result<Value, PlatformError> {
        let mut builder = self
            .http
            .request(method, url)
            .bearer_auth(self.api_key.expose_secret())
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .header(reqwest::header::ACCEPT, "application/json");
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| PlatformError::Network(describe_transport_error(e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| PlatformError::Network(describe_transport_error(e)))?;
        let body = parse_body(&text);

        if status.is_success() {
            Ok(body)
        } else {
            Err(PlatformError::Status {
                status: status.as_u16(),
                body,
            })
        }
    }

    async fn list_at(&self, kind: ResourceKind, segment: &str) -> Result<Vec<Resource>, PlatformError> {
        let body = self.request(Method::GET, kind, &[segment], None).await?;
        decode_list(body)
    }
}

impl PlatformApi for VapiClient {
    /// Lists under `/<kind>`; on a 404 only, tries `/<kinds>` before giving up.
    async fn list(&self, kind: ResourceKind) -> Result<Vec<Resource>, PlatformError> {
        match self.list_at(kind, kind.singular()).await {
            Err(err) if err.is_not_found() => {
                tracing::debug!(kind = %kind, "Singular collection path not found, trying plural");
                self.list_at(kind, kind.plural()).await
            }
            other => other,
        }
    }

    async fn get(&self, kind: ResourceKind, id: &str) -> Result<Resource, PlatformError> {
        let body = self
            .request(Method::GET, kind, &[kind.singular(), id], None)
            .await?;
        decode_resource(body)
    }

    async fn create(&self, kind: ResourceKind, body: &Value) -> Result<Resource, PlatformError> {
        let body = self
            .request(Method::POST, kind, &[kind.singular()], Some(body))
            .await?;
        decode_resource(body)
    }

    async fn update(
        &self,
        kind: ResourceKind,
        id: &str,
        body: &Value,
    ) -> Result<Resource, PlatformError> {
        let body = self
            .request(Method::PATCH, kind, &[kind.singular(), id], Some(body))
            .await?;
        decode_resource(body)
    }

    async fn delete(&self, kind: ResourceKind, id: &str) -> Result<(), PlatformError> {
        self.request(Method::DELETE, kind, &[kind.singular(), id], None)
            .await
            .map(|_| ())
    }
}

/// Hands out a [`VapiClient`] per decrypted key, sharing one connection pool.
#[derive(Clone)]
pub struct VapiConnector {
    http: reqwest::Client,
    base_url: String,
    retry: RetryPolicy,
}

impl VapiConnector {
    pub fn new(base_url: impl Into<String>, timeout: Duration, retry: RetryPolicy) -> Result<Self, PlatformError> {
        let base_url = base_url.into();
        parse_base_url(&base_url)?;
        Ok(Self {
            http: build_http(timeout)?,
            base_url,
            retry,
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, PlatformError> {
        Self::new(
            config.platform.base_url.clone(),
            Duration::from_secs(config.platform.request_timeout_secs),
            RetryPolicy::from(&config.retry),
        )
    }
}

impl PlatformConnector for VapiConnector {
    type Api = VapiClient;

    fn connect(&self, api_key: &Redacted) -> Result<VapiClient, PlatformError> {
        VapiClient::with_http(
            self.http.clone(),
            SecretString::from(api_key.expose().to_string()),
            &self.base_url,
            self.retry.clone(),
        )
    }
}

fn build_http(timeout: Duration) -> Result<reqwest::Client, PlatformError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| PlatformError::Network(format!("failed to build HTTP client: {e}")))
}

fn parse_base_url(base_url: &str) -> Result<Url, PlatformError> {
    let url = Url::parse(base_url)
        .map_err(|e| PlatformError::Network(format!("invalid base url '{base_url}': {e}")))?;
    if url.cannot_be_a_base() {
        return Err(PlatformError::Network(format!(
            "invalid base url '{base_url}': cannot hold a path"
        )));
    }
    Ok(url)
}

/// JSON when possible, the raw text as a JSON string otherwise.
fn parse_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

/// Transport failures, without the request URL's query or any header.
fn describe_transport_error(e: reqwest::Error) -> String {
    if e.is_timeout() {
        "request timed out".to_string()
    } else if e.is_connect() {
        "connection failed".to_string()
    } else {
        e.without_url().to_string()
    }
}

fn decode_resource(body: Value) -> Result<Resource, PlatformError> {
    if !body.is_object() {
        return Err(PlatformError::Decode(format!(
            "expected a JSON object, got {}",
            json_type(&body)
        )));
    }
    Resource::from_value(body).map_err(|e| PlatformError::Decode(e.to_string()))
}

/// A bare array, or an envelope holding one under `results` or `data`.
fn decode_list(body: Value) -> Result<Vec<Resource>, PlatformError> {
    let items = match body {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("results").or_else(|| map.remove("data")) {
            Some(Value::Array(items)) => items,
            _ => {
                return Err(PlatformError::Decode(
                    "list response holds no array".to_string(),
                ));
            }
        },
        other => {
            return Err(PlatformError::Decode(format!(
                "expected a JSON array, got {}",
                json_type(&other)
            )));
        }
    };
    items.into_iter().map(decode_resource).collect()
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
