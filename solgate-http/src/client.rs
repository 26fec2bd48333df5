//! The gateway client: payment lifecycle, session, and protected calls.
//!
//! [`GatewayClient`] owns at most one [`Session`]. Verifying a payment (or
//! simulating one in sandbox mode) stores the session the gateway grants;
//! [`GatewayClient::request`] then spends it one call at a time against the
//! protected service.
//!
//! Methods that change the session take `&mut self`. Share a client between
//! tasks only behind your own lock.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde_json::Value;
use solgate::endpoints::{self, PaymentOperation};
use solgate::proto::{
    CancelPaymentResponse, CreatePaymentRequest, CreatePaymentResponse, ListPaymentsFilter,
    PAYMENT_LIST_KEYS, PaymentStatusResponse, Session, SimulateOptions, SimulatePaymentResponse,
    VerifyPaymentRequest, VerifyPaymentResponse, list_from_value,
};
use solgate::{GatewayConfig, SdkError};

#[cfg(feature = "telemetry")]
use tracing::instrument;

use crate::constants::SESSION_TOKEN_HEADER;
use crate::transport::{Failure, GatewayTransport, decode, extract_error_message};

/// Options for a protected-service call.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    /// HTTP method. Defaults to `GET`.
    pub method: Method,
    /// Extra headers, merged over the JSON content type.
    pub headers: HeaderMap,
    /// JSON body.
    pub body: Option<Value>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            headers: HeaderMap::new(),
            body: None,
        }
    }
}

impl RequestOptions {
    /// A `GET` request.
    #[must_use]
    pub fn get() -> Self {
        Self::default()
    }

    /// A `POST` request with a JSON body.
    #[must_use]
    pub fn post(body: Value) -> Self {
        Self {
            method: Method::POST,
            body: Some(body),
            ..Self::default()
        }
    }

    /// Sets the method.
    #[must_use]
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Adds a header.
    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Sets the JSON body.
    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// Client for the payment gateway API.
///
/// # Example
///
/// ```no_run
/// use solgate::GatewayConfig;
/// use solgate::proto::SimulateOptions;
/// use solgate_http::{GatewayClient, RequestOptions};
///
/// # async fn run() -> Result<(), solgate::SdkError> {
/// let mut client = GatewayClient::new(GatewayConfig::default().with_sandbox(true))?;
/// let payment = client.create_payment("policy_basic", None).await?;
/// client
///     .simulate_payment(&payment.reference_id, SimulateOptions::default())
///     .await?;
/// let data: serde_json::Value = client.request("/v1/data", RequestOptions::get()).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct GatewayClient {
    pub(crate) config: GatewayConfig,
    pub(crate) transport: GatewayTransport,
    session: Option<Session>,
}

impl GatewayClient {
    /// Creates a client with its own HTTP connection pool.
    ///
    /// # Errors
    ///
    /// Returns [`SdkError::Configuration`] if a configured URL is invalid or
    /// the HTTP client cannot be built.
    pub fn new(config: GatewayConfig) -> Result<Self, SdkError> {
        config.validate()?;
        let transport = GatewayTransport::new(config.timeout)?;
        Ok(Self {
            config,
            transport,
            session: None,
        })
    }

    /// Creates a client on top of a pre-configured [`reqwest::Client`].
    ///
    /// The configured timeout is not applied; configure it on `http` instead.
    #[must_use]
    pub const fn with_http_client(config: GatewayConfig, http: Client) -> Self {
        Self {
            config,
            transport: GatewayTransport::with_client(http),
            session: None,
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Whether payment calls go to the sandbox family.
    #[must_use]
    pub const fn is_sandbox(&self) -> bool {
        self.config.sandbox
    }

    fn payment_path(&self, operation: PaymentOperation<'_>) -> Result<String, SdkError> {
        endpoints::payment_path(self.config.sandbox, operation).ok_or_else(|| {
            let message = match operation {
                PaymentOperation::Verify(_) => {
                    "verify_payment is not available in sandbox mode. Use simulate_payment instead."
                }
                _ => "simulate_payment is only available in sandbox mode.",
            };
            SdkError::sandbox_mismatch(message)
        })
    }

    /// Creates a payment against a merchant policy.
    ///
    /// # Errors
    ///
    /// Returns [`SdkError::PaymentCreation`] if the gateway rejects the request
    /// or cannot be reached.
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "solgate.gateway.create_payment", skip(self, metadata), err)
    )]
    pub async fn create_payment(
        &self,
        policy_id: &str,
        metadata: Option<Value>,
    ) -> Result<CreatePaymentResponse, SdkError> {
        let path = self.payment_path(PaymentOperation::Create)?;
        let body = CreatePaymentRequest {
            policy_id: policy_id.to_owned(),
            metadata,
        };
        let value = self
            .transport
            .send::<(), _>(
                Method::POST,
                &self.config.base_url,
                &path,
                HeaderMap::new(),
                None,
                Some(&body),
            )
            .await
            .map_err(|f| SdkError::payment_creation(f.message))?;
        if let Some(message) = rejection(&value, "Failed to create payment") {
            return Err(SdkError::payment_creation(message));
        }

        let response: CreatePaymentResponse = decode(value, &path)
            .map_err(|e| SdkError::payment_creation(e.to_string()))?;
        if !response.success {
            return Err(SdkError::payment_creation("Failed to create payment"));
        }
        Ok(response)
    }

    /// Fetches the current status of a payment.
    ///
    /// # Errors
    ///
    /// Returns [`SdkError::PaymentNotFound`] on 404, otherwise
    /// [`SdkError::Api`] or [`SdkError::Network`].
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "solgate.gateway.get_payment_status", skip(self), err)
    )]
    pub async fn get_payment_status(
        &self,
        reference_id: &str,
    ) -> Result<PaymentStatusResponse, SdkError> {
        let path = self.payment_path(PaymentOperation::Status(reference_id))?;
        let value = self
            .transport
            .send::<(), ()>(
                Method::GET,
                &self.config.base_url,
                &path,
                HeaderMap::new(),
                None,
                None,
            )
            .await
            .map_err(|f| not_found_or(f, reference_id, &path))?;
        decode(value, &path)
    }

    /// Verifies an on-chain payment and stores the granted session.
    ///
    /// Production mode only.
    ///
    /// # Errors
    ///
    /// Returns [`SdkError::SandboxModeMismatch`] in sandbox mode, without any
    /// network call, and [`SdkError::PaymentVerification`] if the gateway
    /// rejects the transaction.
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "solgate.gateway.verify_payment", skip(self), err)
    )]
    pub async fn verify_payment(
        &mut self,
        reference_id: &str,
        tx_hash: &str,
    ) -> Result<VerifyPaymentResponse, SdkError> {
        let path = self.payment_path(PaymentOperation::Verify(reference_id))?;
        let body = VerifyPaymentRequest {
            tx_hash: tx_hash.to_owned(),
        };
        let fail = |message: String| SdkError::payment_verification(message, Some(reference_id.to_owned()));

        let value = self
            .transport
            .send::<(), _>(
                Method::POST,
                &self.config.base_url,
                &path,
                HeaderMap::new(),
                None,
                Some(&body),
            )
            .await
            .map_err(|f| fail(f.message))?;
        if let Some(message) = rejection(&value, "Payment verification failed") {
            return Err(fail(message));
        }
        let response: VerifyPaymentResponse =
            decode(value, &path).map_err(|e| fail(e.to_string()))?;

        let session = response.to_session(reference_id).ok_or_else(|| {
            fail(
                response
                    .message
                    .clone()
                    .unwrap_or_else(|| "Payment verification failed".to_owned()),
            )
        })?;
        self.set_session(session);
        Ok(response)
    }

    /// Simulates a payment outcome in the sandbox.
    ///
    /// A successful simulation that returns a token replaces the stored
    /// session; any other outcome leaves it untouched.
    ///
    /// # Errors
    ///
    /// Returns [`SdkError::SandboxModeMismatch`] outside sandbox mode, without
    /// any network call, and [`SdkError::Api`] / [`SdkError::Network`] if the
    /// call fails.
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "solgate.gateway.simulate_payment", skip(self), err)
    )]
    pub async fn simulate_payment(
        &mut self,
        reference_id: &str,
        options: SimulateOptions,
    ) -> Result<SimulatePaymentResponse, SdkError> {
        let path = self.payment_path(PaymentOperation::Simulate(reference_id))?;
        let value = self
            .transport
            .send::<(), _>(
                Method::POST,
                &self.config.base_url,
                &path,
                HeaderMap::new(),
                None,
                Some(&options),
            )
            .await
            .map_err(|f| not_found_or(f, reference_id, &path))?;
        let response: SimulatePaymentResponse = decode(value, &path)?;

        if let Some(session) = response.to_session(reference_id) {
            self.set_session(session);
        } else {
            #[cfg(feature = "telemetry")]
            tracing::debug!(
                success = response.success,
                "simulation granted no session; keeping current session"
            );
        }
        Ok(response)
    }

    /// Cancels a pending payment.
    ///
    /// # Errors
    ///
    /// Returns [`SdkError::PaymentNotFound`] on 404, otherwise
    /// [`SdkError::Api`] or [`SdkError::Network`].
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "solgate.gateway.cancel_payment", skip(self), err)
    )]
    pub async fn cancel_payment(
        &self,
        reference_id: &str,
    ) -> Result<CancelPaymentResponse, SdkError> {
        let path = self.payment_path(PaymentOperation::Cancel(reference_id))?;
        let value = self
            .transport
            .send::<(), ()>(
                Method::POST,
                &self.config.base_url,
                &path,
                HeaderMap::new(),
                None,
                None,
            )
            .await
            .map_err(|f| not_found_or(f, reference_id, &path))?;
        decode(value, &path)
    }

    /// Lists payments, newest first as ordered by the gateway.
    ///
    /// A response without data yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns [`SdkError::Api`] or [`SdkError::Network`] if the call fails.
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "solgate.gateway.list_payments", skip(self), err)
    )]
    pub async fn list_payments(
        &self,
        filter: ListPaymentsFilter,
    ) -> Result<Vec<PaymentStatusResponse>, SdkError> {
        let path = self.payment_path(PaymentOperation::List)?;
        let value = self
            .transport
            .send::<_, ()>(
                Method::GET,
                &self.config.base_url,
                &path,
                HeaderMap::new(),
                Some(&filter),
                None,
            )
            .await
            .map_err(|f| f.into_sdk_error(&path))?;
        list_from_value(value.clone(), PAYMENT_LIST_KEYS).map_err(|e| SdkError::Api {
            message: format!("Unexpected response from {path}: {e}"),
            status: None,
            endpoint: Some(path.clone()),
            body: Some(value),
        })
    }

    /// Calls the protected service with the stored session.
    ///
    /// `endpoint` is a path relative to the service base URL. On success the
    /// session loses exactly one call; a failed call costs nothing.
    ///
    /// # Errors
    ///
    /// Returns [`SdkError::NoActiveSession`] when no session is stored and
    /// [`SdkError::SessionExpired`] when it is expired or exhausted, both
    /// before any network call. Returns [`SdkError::Api`] or
    /// [`SdkError::Network`] if the call itself fails.
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "solgate.gateway.request", skip(self, options), err)
    )]
    pub async fn request<T: DeserializeOwned>(
        &mut self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<T, SdkError> {
        let session = self.session.as_ref().ok_or(SdkError::NoActiveSession)?;
        if !session.is_active() {
            return Err(SdkError::SessionExpired);
        }
        let token = HeaderValue::from_str(&session.token).map_err(|_| SdkError::Session {
            message: "session token is not a valid header value".to_owned(),
        })?;

        let RequestOptions {
            method,
            mut headers,
            body,
        } = options;
        headers.insert(SESSION_TOKEN_HEADER, token);

        let value = self
            .transport
            .send::<(), _>(
                method,
                self.config.service_url(),
                endpoint,
                headers,
                None,
                body.as_ref(),
            )
            .await
            .map_err(|f| f.into_sdk_error(endpoint))?;

        if let Some(session) = self.session.as_mut() {
            session.consume_call();
            #[cfg(feature = "telemetry")]
            tracing::debug!(calls_remaining = session.calls_remaining, "session call consumed");
        }
        decode(value, endpoint)
    }

    /// The stored session, if any.
    #[must_use]
    pub const fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Stores `session`, replacing any previous one.
    pub fn set_session(&mut self, session: Session) {
        #[cfg(feature = "telemetry")]
        tracing::debug!(
            reference_id = %session.reference_id,
            calls_remaining = session.calls_remaining,
            expires_at = %session.expires_at,
            "session stored"
        );
        self.session = Some(session);
    }

    /// Drops the stored session and returns it.
    pub const fn clear_session(&mut self) -> Option<Session> {
        self.session.take()
    }

    /// Whether a stored session is usable right now.
    #[must_use]
    pub fn has_active_session(&self) -> bool {
        self.session.as_ref().is_some_and(Session::is_active)
    }
}

/// The server's message when a 2xx body carries `"success": false`.
fn rejection(value: &Value, fallback: &str) -> Option<String> {
    if value.get("success").and_then(Value::as_bool) != Some(false) {
        return None;
    }
    Some(extract_error_message(value).unwrap_or_else(|| fallback.to_owned()))
}

/// Maps a 404 to [`SdkError::PaymentNotFound`], anything else to the generic error.
fn not_found_or(failure: Failure, reference_id: &str, path: &str) -> SdkError {
    if failure.is_not_found() {
        SdkError::PaymentNotFound {
            reference_id: reference_id.to_owned(),
        }
    } else {
        failure.into_sdk_error(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use solgate::ErrorCode;
    use solgate::Timestamp;
    use solgate::proto::{PaymentStatus, SimulateOptions};
    use std::time::Duration;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer, sandbox: bool) -> GatewayClient {
        let config = GatewayConfig::new(server.uri()).with_sandbox(sandbox);
        GatewayClient::new(config).unwrap()
    }

    fn future_rfc3339() -> String {
        (chrono::Utc::now() + chrono::Duration::hours(1)).to_rfc3339()
    }

    fn session(calls: u32) -> Session {
        Session {
            token: "tok-existing".into(),
            reference_id: "ref-existing".into(),
            expires_at: Timestamp::now() + Duration::from_secs(3600),
            calls_remaining: calls,
        }
    }

    fn create_payment_body() -> Value {
        json!({
            "success": true,
            "reference_id": "ref-1",
            "status": "pending",
            "payment_details": {
                "recipient": "9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM",
                "amount_lamports": 1_000_000,
                "amount_sol": 0.001,
                "reference": "ref-1",
                "expires_in": 900
            }
        })
    }

    #[tokio::test]
    async fn test_create_then_simulate_stores_session() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/sandbox/payments"))
            .and(body_json(json!({"policy_id": "p1"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(create_payment_body()))
            .expect(1)
            .mount(&mock_server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/v1/sandbox/payments/ref-1/simulate"))
            .and(body_json(json!({"success": true})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "token": "tok-1",
                "calls_remaining": 100,
                "expires_at": future_rfc3339()
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let mut client = client(&mock_server, true);
        let payment = client.create_payment("p1", None).await.unwrap();
        assert_eq!(payment.reference_id, "ref-1");
        assert_eq!(payment.status, PaymentStatus::Pending);
        assert_eq!(payment.payment_details.amount_lamports, 1_000_000);

        client
            .simulate_payment("ref-1", SimulateOptions::default())
            .await
            .unwrap();
        assert!(client.has_active_session());
        let session = client.session().unwrap();
        assert_eq!(session.calls_remaining, 100);
        assert_eq!(session.token, "tok-1");
        assert_eq!(session.reference_id, "ref-1");
    }

    #[tokio::test]
    async fn test_production_create_avoids_sandbox_path() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/payments"))
            .respond_with(ResponseTemplate::new(201).set_body_json(create_payment_body()))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = client(&mock_server, false);
        client
            .create_payment("p1", Some(json!({"order": 7})))
            .await
            .unwrap();
        let requests = mock_server.received_requests().await.unwrap();
        assert!(!requests[0].url.path().contains("sandbox"));
        let sent: Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert_eq!(sent, json!({"policy_id": "p1", "metadata": {"order": 7}}));
    }

    #[tokio::test]
    async fn test_create_payment_error_message_from_server() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/payments"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(json!({"detail": "Unknown policy"})),
            )
            .mount(&mock_server)
            .await;

        let client = client(&mock_server, false);
        let err = client.create_payment("nope", None).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::PaymentCreationFailed);
        assert_eq!(err.to_string(), "Unknown policy");
    }

    #[tokio::test]
    async fn test_create_payment_generic_message_fallback() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/payments"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&mock_server)
            .await;

        let client = client(&mock_server, false);
        let err = client.create_payment("p1", None).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::PaymentCreationFailed);
        assert_eq!(err.to_string(), "Request failed with status 503");
    }

    #[tokio::test]
    async fn test_create_payment_rejected_with_ok_status() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/payments"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"success": false, "error": "Policy inactive"})),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = client(&mock_server, false);
        let err = client.create_payment("p1", None).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::PaymentCreationFailed);
        assert_eq!(err.to_string(), "Policy inactive");
    }

    #[tokio::test]
    async fn test_create_payment_rejected_without_message() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/payments"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": false})))
            .mount(&mock_server)
            .await;

        let client = client(&mock_server, false);
        let err = client.create_payment("p1", None).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::PaymentCreationFailed);
        assert_eq!(err.to_string(), "Failed to create payment");
    }

    #[tokio::test]
    async fn test_verify_in_sandbox_fails_without_network() {
        let mock_server = MockServer::start().await;
        Mock::given(wiremock::matchers::any())
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;

        let mut client = client(&mock_server, true);
        let err = client.verify_payment("ref-1", "sig").await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::SandboxModeMismatch);
    }

    #[tokio::test]
    async fn test_simulate_in_production_fails_without_network() {
        let mock_server = MockServer::start().await;
        Mock::given(wiremock::matchers::any())
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;

        let mut client = client(&mock_server, false);
        let err = client
            .simulate_payment("ref-1", SimulateOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::SandboxModeMismatch);
    }

    #[tokio::test]
    async fn test_verify_stores_session() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/payments/ref-9/verify"))
            .and(body_json(json!({"tx_hash": "5sig"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "token": "tok-9",
                "reference_id": "ref-9",
                "status": "active",
                "calls_remaining": 3,
                "expires_at": future_rfc3339()
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let mut client = client(&mock_server, false);
        let response = client.verify_payment("ref-9", "5sig").await.unwrap();
        assert_eq!(response.status, Some(PaymentStatus::Active));
        assert_eq!(client.session().unwrap().token, "tok-9");
        assert_eq!(client.session().unwrap().calls_remaining, 3);
    }

    #[tokio::test]
    async fn test_verify_failure_carries_reference_and_keeps_session() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/payments/ref-9/verify"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(json!({"error": "Transaction not found"})),
            )
            .mount(&mock_server)
            .await;

        let mut client = client(&mock_server, false);
        client.set_session(session(5));
        let err = client.verify_payment("ref-9", "5sig").await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::PaymentVerificationFailed);
        assert_eq!(err.reference_id(), Some("ref-9"));
        assert_eq!(err.to_string(), "Transaction not found");
        assert_eq!(client.session().unwrap().token, "tok-existing");
    }

    #[tokio::test]
    async fn test_verify_rejected_with_ok_status_keeps_session() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/payments/ref-9/verify"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": false,
                "error": "Transaction not found on chain"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let mut client = client(&mock_server, false);
        client.set_session(session(5));
        let err = client.verify_payment("ref-9", "5sig").await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::PaymentVerificationFailed);
        assert_eq!(err.reference_id(), Some("ref-9"));
        assert_eq!(err.to_string(), "Transaction not found on chain");
        assert_eq!(client.session().unwrap().token, "tok-existing");
    }

    #[tokio::test]
    async fn test_failed_simulation_keeps_existing_session() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/sandbox/payments/ref-2/simulate"))
            .and(body_json(json!({"success": false})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": false,
                "status": "pending",
                "message": "Simulated failure"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let mut client = client(&mock_server, true);
        client.set_session(session(7));
        let response = client
            .simulate_payment("ref-2", SimulateOptions::failure())
            .await
            .unwrap();
        assert!(!response.success);
        let kept = client.session().unwrap();
        assert_eq!(kept.token, "tok-existing");
        assert_eq!(kept.calls_remaining, 7);
    }

    #[tokio::test]
    async fn test_status_not_found() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/payments/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "Not found"})))
            .mount(&mock_server)
            .await;

        let client = client(&mock_server, false);
        let err = client.get_payment_status("missing").await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::PaymentNotFound);
        assert_eq!(err.reference_id(), Some("missing"));
    }

    #[tokio::test]
    async fn test_status_and_cancel() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/sandbox/payments/ref-3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "reference_id": "ref-3",
                "status": "pending",
                "amount": "2500"
            })))
            .mount(&mock_server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/v1/sandbox/payments/ref-3/cancel"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "reference_id": "ref-3",
                "status": "cancelled"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = client(&mock_server, true);
        let status = client.get_payment_status("ref-3").await.unwrap();
        assert_eq!(status.amount_lamports, Some(2_500));
        let cancelled = client.cancel_payment("ref-3").await.unwrap();
        assert_eq!(cancelled.status, Some(PaymentStatus::Cancelled));
    }

    #[tokio::test]
    async fn test_cancel_server_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/payments/ref-4/cancel"))
            .respond_with(
                ResponseTemplate::new(409).set_body_json(json!({"error": "Payment already active"})),
            )
            .mount(&mock_server)
            .await;

        let client = client(&mock_server, false);
        let err = client.cancel_payment("ref-4").await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::ApiError);
        assert_eq!(err.status(), Some(409));
        assert_eq!(err.to_string(), "Payment already active");
    }

    #[tokio::test]
    async fn test_list_payments_sends_filters() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/payments"))
            .and(query_param("status", "active"))
            .and(query_param("limit", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "payments": [
                    {"reference_id": "a", "status": "active"},
                    {"reference_id": "b", "status": "active"}
                ]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = client(&mock_server, false);
        let filter = ListPaymentsFilter {
            status: Some(PaymentStatus::Active),
            limit: Some(2),
            offset: None,
        };
        let payments = client.list_payments(filter).await.unwrap();
        let ids: Vec<_> = payments.iter().map(|p| p.reference_id.as_str()).collect();
        assert_eq!(ids, ["a", "b"]);
    }

    #[tokio::test]
    async fn test_list_payments_empty_on_null() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/sandbox/payments"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"payments": null})))
            .mount(&mock_server)
            .await;

        let client = client(&mock_server, true);
        let payments = client.list_payments(ListPaymentsFilter::default()).await.unwrap();
        assert!(payments.is_empty());
    }

    #[tokio::test]
    async fn test_list_payments_empty_on_empty_body() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/payments"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&mock_server)
            .await;

        let client = client(&mock_server, false);
        let payments = client.list_payments(ListPaymentsFilter::default()).await.unwrap();
        assert!(payments.is_empty());
    }

    #[tokio::test]
    async fn test_request_without_session_makes_no_call() {
        let mock_server = MockServer::start().await;
        Mock::given(wiremock::matchers::any())
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;

        let mut client = client(&mock_server, false);
        let err = client
            .request::<Value>("/x", RequestOptions::get())
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::NoActiveSession);
    }

    #[tokio::test]
    async fn test_request_with_expired_session_makes_no_call() {
        let mock_server = MockServer::start().await;
        Mock::given(wiremock::matchers::any())
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;

        let mut client = client(&mock_server, false);
        let mut expired = session(10);
        expired.expires_at = Timestamp::from_secs(1_600_000_000).unwrap();
        client.set_session(expired);
        let err = client
            .request::<Value>("/x", RequestOptions::get())
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::SessionExpired);
        assert!(err.is_session_error());
    }

    #[tokio::test]
    async fn test_request_consumes_calls_until_exhausted() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/data"))
            .and(header("x-session-token", "tok-existing"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"value": 42})))
            .expect(2)
            .mount(&mock_server)
            .await;

        let mut client = client(&mock_server, false);
        client.set_session(session(2));

        let data: Value = client.request("/v1/data", RequestOptions::get()).await.unwrap();
        assert_eq!(data, json!({"value": 42}));
        assert_eq!(client.session().unwrap().calls_remaining, 1);

        let _: Value = client.request("/v1/data", RequestOptions::get()).await.unwrap();
        assert_eq!(client.session().unwrap().calls_remaining, 0);
        assert!(!client.has_active_session());

        let err = client
            .request::<Value>("/v1/data", RequestOptions::get())
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::SessionExpired);
    }

    #[tokio::test]
    async fn test_failed_request_does_not_consume_call() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/jobs"))
            .and(body_json(json!({"n": 1})))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({"error": "boom"})))
            .mount(&mock_server)
            .await;

        let mut client = client(&mock_server, false);
        client.set_session(session(4));
        let err = client
            .request::<Value>("/v1/jobs", RequestOptions::post(json!({"n": 1})))
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::ApiError);
        assert_eq!(err.to_string(), "boom");
        assert_eq!(client.session().unwrap().calls_remaining, 4);
    }

    #[tokio::test]
    async fn test_request_uses_service_url() {
        let gateway = MockServer::start().await;
        let service = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/data"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&service)
            .await;

        let config = GatewayConfig::new(gateway.uri()).with_service_url(service.uri());
        let mut client = GatewayClient::new(config).unwrap();
        client.set_session(session(1));
        let _: Value = client.request("/v1/data", RequestOptions::get()).await.unwrap();
        assert!(gateway.received_requests().await.unwrap().is_empty());
    }

    #[test]
    fn test_new_rejects_invalid_url() {
        let err = GatewayClient::new(GatewayConfig::new("not a url")).unwrap_err();
        assert_eq!(err.code(), ErrorCode::ConfigurationError);
    }

    #[test]
    fn test_session_accessors() {
        let mut client = GatewayClient::new(GatewayConfig::default()).unwrap();
        assert!(!client.has_active_session());
        assert!(client.session().is_none());
        client.set_session(session(1));
        assert!(client.has_active_session());
        let mut replacement = session(9);
        replacement.token = "tok-new".into();
        client.set_session(replacement);
        assert_eq!(client.session().unwrap().token, "tok-new");
        assert!(client.clear_session().is_some());
        assert!(!client.has_active_session());
    }
}
