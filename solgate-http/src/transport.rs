//! The single HTTP adapter every gateway call goes through.
//!
//! [`GatewayTransport::send`] normalizes all outcomes into either a JSON
//! [`Value`] or a [`Failure`]:
//!
//! - a JSON `Content-Type` is always sent, merged with caller headers
//! - the body is parsed as JSON regardless of status (an empty body is `null`)
//! - non-2xx responses become a failure whose message is taken from the
//!   `error`, `detail` or `message` field
//! - transport errors (DNS, refused connection, timeout) become a
//!   `"Network error: ..."` failure instead of propagating the raw error

use std::time::Duration;

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Client, Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use solgate::SdkError;
use solgate::error::BoxError;

use crate::constants::ERROR_MESSAGE_FIELDS;

/// A normalized failed call.
#[derive(Debug)]
pub(crate) struct Failure {
    /// Normalized message.
    pub message: String,
    /// HTTP status, absent for transport errors.
    pub status: Option<StatusCode>,
    /// Parsed response body, when there was one.
    pub body: Option<Value>,
    /// Underlying transport error.
    pub source: Option<reqwest::Error>,
}

impl Failure {
    fn network(source: reqwest::Error) -> Self {
        Self {
            message: format!("Network error: {source}"),
            status: None,
            body: None,
            source: Some(source),
        }
    }

    fn http(status: StatusCode, body: Value) -> Self {
        let message = extract_error_message(&body)
            .unwrap_or_else(|| format!("Request failed with status {}", status.as_u16()));
        Self {
            message,
            status: Some(status),
            body: Some(body),
            source: None,
        }
    }

    /// Whether the gateway reported the resource as missing.
    pub fn is_not_found(&self) -> bool {
        self.status == Some(StatusCode::NOT_FOUND)
    }

    /// Converts into the generic error for `endpoint`: [`SdkError::Network`]
    /// without a response, [`SdkError::Api`] otherwise.
    pub fn into_sdk_error(self, endpoint: &str) -> SdkError {
        match self.status {
            None => SdkError::Network {
                message: self.message,
                source: self.source.map(|e| -> BoxError { Box::new(e) }),
            },
            Some(status) => SdkError::Api {
                message: self.message,
                status: Some(status.as_u16()),
                endpoint: Some(endpoint.to_owned()),
                body: self.body,
            },
        }
    }
}

/// Pulls a human-readable message out of an error body.
pub(crate) fn extract_error_message(body: &Value) -> Option<String> {
    ERROR_MESSAGE_FIELDS
        .iter()
        .find_map(|field| match body.get(field)? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        })
}

/// Decodes a successful response body into `T`.
///
/// A body that does not match is reported as [`SdkError::Api`] for `endpoint`.
pub(crate) fn decode<T: DeserializeOwned>(value: Value, endpoint: &str) -> Result<T, SdkError> {
    T::deserialize(&value).map_err(|e| SdkError::Api {
        message: format!("Unexpected response from {endpoint}: {e}"),
        status: None,
        endpoint: Some(endpoint.to_owned()),
        body: Some(value),
    })
}

/// Thin wrapper over a shared [`reqwest::Client`].
#[derive(Debug, Clone)]
pub(crate) struct GatewayTransport {
    client: Client,
}

impl GatewayTransport {
    /// Builds a transport with its own client.
    pub fn new(timeout: Duration) -> Result<Self, SdkError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SdkError::configuration(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Wraps a pre-configured client.
    pub const fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Sends one request to `base_url` + `path`.
    pub async fn send<Q, B>(
        &self,
        method: Method,
        base_url: &str,
        path: &str,
        headers: HeaderMap,
        query: Option<&Q>,
        body: Option<&B>,
    ) -> Result<Value, Failure>
    where
        Q: Serialize + ?Sized,
        B: Serialize + ?Sized,
    {
        let mut merged = HeaderMap::new();
        merged.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        merged.extend(headers);

        let mut req = self
            .client
            .request(method.clone(), format!("{base_url}{path}"))
            .headers(merged);
        if let Some(query) = query {
            req = req.query(query);
        }
        if let Some(body) = body {
            req = req.json(body);
        }

        let response = req.send().await.map_err(Failure::network)?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(Failure::network)?;

        #[cfg(feature = "telemetry")]
        tracing::debug!(%method, path, status = status.as_u16(), "gateway response");

        let parsed = if bytes.is_empty() {
            Ok(Value::Null)
        } else {
            serde_json::from_slice::<Value>(&bytes)
        };

        match (status.is_success(), parsed) {
            (true, Ok(value)) => Ok(value),
            (true, Err(e)) => Err(Failure {
                message: format!("Invalid JSON response: {e}"),
                status: Some(status),
                body: None,
                source: None,
            }),
            (false, Ok(value)) => Err(Failure::http(status, value)),
            (false, Err(_)) => Err(Failure::http(status, Value::Null)),
        }
    }
}
