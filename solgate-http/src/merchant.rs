//! Merchant account operations.
//!
//! Every call here authenticates with the configured API key, sent as
//! `X-API-Key`, and targets the same paths in sandbox and production.

use reqwest::Method;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use solgate::SdkError;
use solgate::endpoints::{
    MERCHANT_EARNINGS, MERCHANT_ME, MERCHANT_POLICIES, MERCHANT_STATS, MERCHANT_TRANSACTIONS,
    SESSION_ACTIVATE, merchant_policy,
};
use solgate::proto::{
    Acknowledgement, ActivateSessionRequest, CreatePolicyRequest, Earnings, MerchantStats,
    MerchantTransaction, MerchantUser, POLICY_LIST_KEYS, Policy, SessionGrant,
    TRANSACTION_LIST_KEYS, TransactionFilter, list_from_value,
};

#[cfg(feature = "telemetry")]
use tracing::instrument;

use crate::client::GatewayClient;
use crate::constants::API_KEY_HEADER;
use crate::transport::decode;

#[derive(Serialize)]
struct EarningsQuery<'a> {
    period: &'a str,
}

impl GatewayClient {
    fn api_key_headers(&self) -> Result<HeaderMap, SdkError> {
        let key = self.config.api_key.as_deref().ok_or_else(|| {
            SdkError::configuration(
                "API key required for merchant operations. Set api_key in the gateway config.",
            )
        })?;
        let value = HeaderValue::from_str(key)
            .map_err(|_| SdkError::configuration("API key is not a valid header value"))?;
        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, value);
        Ok(headers)
    }

    async fn merchant_call<Q, B>(
        &self,
        method: Method,
        path: &str,
        query: Option<&Q>,
        body: Option<&B>,
    ) -> Result<Value, SdkError>
    where
        Q: Serialize + ?Sized,
        B: Serialize + ?Sized,
    {
        let headers = self.api_key_headers()?;
        self.transport
            .send(method, &self.config.base_url, path, headers, query, body)
            .await
            .map_err(|f| f.into_sdk_error(path))
    }

    async fn merchant_get<T: DeserializeOwned>(&self, path: &str) -> Result<T, SdkError> {
        let value = self
            .merchant_call::<(), ()>(Method::GET, path, None, None)
            .await?;
        decode(value, path)
    }

    /// Fetches the merchant owning the API key.
    ///
    /// # Errors
    ///
    /// Returns [`SdkError::Configuration`] without an API key, otherwise
    /// [`SdkError::Api`] or [`SdkError::Network`] if the call fails.
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "solgate.merchant.me", skip(self), err)
    )]
    pub async fn get_merchant_user(&self) -> Result<MerchantUser, SdkError> {
        self.merchant_get(MERCHANT_ME).await
    }

    /// Fetches aggregate merchant statistics.
    ///
    /// # Errors
    ///
    /// Same as [`get_merchant_user`](Self::get_merchant_user).
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "solgate.merchant.stats", skip(self), err)
    )]
    pub async fn get_merchant_stats(&self) -> Result<MerchantStats, SdkError> {
        self.merchant_get(MERCHANT_STATS).await
    }

    /// Lists the merchant's pricing policies.
    ///
    /// # Errors
    ///
    /// Same as [`get_merchant_user`](Self::get_merchant_user).
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "solgate.merchant.list_policies", skip(self), err)
    )]
    pub async fn list_policies(&self) -> Result<Vec<Policy>, SdkError> {
        let value = self
            .merchant_call::<(), ()>(Method::GET, MERCHANT_POLICIES, None, None)
            .await?;
        decode_list(value, POLICY_LIST_KEYS, MERCHANT_POLICIES)
    }

    /// Creates a pricing policy.
    ///
    /// The gateway may answer with the policy itself or wrap it under
    /// `policy`; both are accepted.
    ///
    /// # Errors
    ///
    /// Same as [`get_merchant_user`](Self::get_merchant_user).
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "solgate.merchant.create_policy", skip(self, request), err)
    )]
    pub async fn create_policy(&self, request: &CreatePolicyRequest) -> Result<Policy, SdkError> {
        let mut value = self
            .merchant_call::<(), _>(Method::POST, MERCHANT_POLICIES, None, Some(request))
            .await?;
        if let Some(inner) = value.get_mut("policy").map(Value::take) {
            value = inner;
        }
        decode(value, MERCHANT_POLICIES)
    }

    /// Deletes a pricing policy.
    ///
    /// An empty success response counts as an acknowledgement.
    ///
    /// # Errors
    ///
    /// Same as [`get_merchant_user`](Self::get_merchant_user).
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "solgate.merchant.delete_policy", skip(self), err)
    )]
    pub async fn delete_policy(&self, policy_id: &str) -> Result<Acknowledgement, SdkError> {
        let path = merchant_policy(policy_id);
        let value = self
            .merchant_call::<(), ()>(Method::DELETE, &path, None, None)
            .await?;
        if value.is_null() {
            return Ok(Acknowledgement {
                success: true,
                message: None,
            });
        }
        decode(value, &path)
    }

    /// Fetches the merchant's transaction history.
    ///
    /// # Errors
    ///
    /// Same as [`get_merchant_user`](Self::get_merchant_user).
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "solgate.merchant.transactions", skip(self), err)
    )]
    pub async fn get_transactions(
        &self,
        filter: TransactionFilter,
    ) -> Result<Vec<MerchantTransaction>, SdkError> {
        let value = self
            .merchant_call::<_, ()>(Method::GET, MERCHANT_TRANSACTIONS, Some(&filter), None)
            .await?;
        decode_list(value, TRANSACTION_LIST_KEYS, MERCHANT_TRANSACTIONS)
    }

    /// Fetches earnings over `period` (e.g. `"7d"`, `"30d"`).
    ///
    /// # Errors
    ///
    /// Same as [`get_merchant_user`](Self::get_merchant_user).
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "solgate.merchant.earnings", skip(self), err)
    )]
    pub async fn get_earnings(&self, period: &str) -> Result<Earnings, SdkError> {
        let query = EarningsQuery { period };
        let value = self
            .merchant_call::<_, ()>(Method::GET, MERCHANT_EARNINGS, Some(&query), None)
            .await?;
        decode(value, MERCHANT_EARNINGS)
    }

    /// Asks the gateway to issue a session for a paid payment on the
    /// merchant's behalf.
    ///
    /// The returned grant is not stored on this client; pass
    /// [`SessionGrant::to_session`] to [`set_session`](Self::set_session)
    /// to use it here.
    ///
    /// # Errors
    ///
    /// Same as [`get_merchant_user`](Self::get_merchant_user).
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "solgate.merchant.activate_session", skip(self), err)
    )]
    pub async fn activate_session(
        &self,
        reference_id: &str,
        tx_hash: &str,
    ) -> Result<SessionGrant, SdkError> {
        let body = ActivateSessionRequest {
            reference_id: reference_id.to_owned(),
            tx_hash: tx_hash.to_owned(),
        };
        let value = self
            .merchant_call::<(), _>(Method::POST, SESSION_ACTIVATE, None, Some(&body))
            .await?;
        decode(value, SESSION_ACTIVATE)
    }
}

fn decode_list<T: DeserializeOwned>(
    value: Value,
    keys: &[&str],
    endpoint: &str,
) -> Result<Vec<T>, SdkError> {
    list_from_value(value.clone(), keys).map_err(|e| SdkError::Api {
        message: format!("Unexpected response from {endpoint}: {e}"),
        status: None,
        endpoint: Some(endpoint.to_owned()),
        body: Some(value),
    })
}
