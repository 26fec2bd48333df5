//! Merchant account wire types.
//!
//! These records are returned by the API-key authenticated merchant family.
//! Unknown fields are kept in `extra` so the SDK does not drop data when the
//! gateway grows its responses.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use serde_with::{DisplayFromStr, PickFirst, serde_as};

use super::{PaymentStatus, default_true};
use crate::Timestamp;

/// The authenticated merchant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MerchantUser {
    /// Merchant id.
    pub id: String,
    /// Contact email.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Payout wallet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wallet_address: Option<String>,
    /// Account creation time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
    /// Remaining fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Aggregate merchant statistics.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MerchantStats {
    /// Payments created against the merchant's policies.
    #[serde(default)]
    pub total_payments: u64,
    /// Sessions currently active.
    #[serde(default)]
    pub active_sessions: u64,
    /// Lifetime earnings in lamports.
    #[serde(default, alias = "total_earnings")]
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub total_earnings_lamports: u64,
    /// Remaining fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A merchant pricing policy: what a payment buys.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    /// Policy id, used when creating payments.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Price in lamports.
    #[serde(alias = "price")]
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub price_lamports: u64,
    /// Session lifetime in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<u64>,
    /// Calls granted per session.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_calls: Option<u32>,
    /// Description shown to payers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether new payments may use the policy.
    #[serde(default = "default_true")]
    pub active: bool,
    /// Creation time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
}

/// Body of a create-policy call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatePolicyRequest {
    /// Display name.
    pub name: String,
    /// Price in lamports.
    pub price_lamports: u64,
    /// Session lifetime in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<u64>,
    /// Calls granted per session.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_calls: Option<u32>,
    /// Description shown to payers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl CreatePolicyRequest {
    /// Creates a request with only the required fields set.
    #[must_use]
    pub fn new(name: impl Into<String>, price_lamports: u64) -> Self {
        Self {
            name: name.into(),
            price_lamports,
            duration_seconds: None,
            max_calls: None,
            description: None,
        }
    }

    /// Sets the session lifetime.
    #[must_use]
    pub const fn with_duration_seconds(mut self, seconds: u64) -> Self {
        self.duration_seconds = Some(seconds);
        self
    }

    /// Sets the per-session call budget.
    #[must_use]
    pub const fn with_max_calls(mut self, calls: u32) -> Self {
        self.max_calls = Some(calls);
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Plain success/failure answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Acknowledgement {
    /// Whether the operation succeeded.
    #[serde(default = "default_true")]
    pub success: bool,
    /// Human-readable note.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// A payment as seen from the merchant's ledger.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerchantTransaction {
    /// Payment reference id.
    pub reference_id: String,
    /// Policy paid for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy_id: Option<String>,
    /// Signature of the paying transaction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
    /// Amount in lamports.
    #[serde(default, alias = "amount", skip_serializing_if = "Option::is_none")]
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    pub amount_lamports: Option<u64>,
    /// Payment status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<PaymentStatus>,
    /// Creation time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
}

/// Query filters for the merchant transaction history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionFilter {
    /// Only transactions with this status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<PaymentStatus>,
    /// Maximum number of results.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    /// Number of results to skip.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
}

/// Merchant earnings over a period.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Earnings {
    /// Period the figures cover, e.g. `"30d"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<String>,
    /// Gross earnings in lamports.
    #[serde(default, alias = "total")]
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub total_lamports: u64,
    /// Platform fees withheld, in lamports.
    #[serde(default, alias = "platform_fees", skip_serializing_if = "Option::is_none")]
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    pub platform_fee_lamports: Option<u64>,
    /// Net earnings in lamports.
    #[serde(default, alias = "net", skip_serializing_if = "Option::is_none")]
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    pub net_lamports: Option<u64>,
    /// Remaining fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Keys under which the gateway wraps policy lists.
pub const POLICY_LIST_KEYS: &[&str] = &["policies", "data", "items"];

/// Keys under which the gateway wraps transaction lists.
pub const TRANSACTION_LIST_KEYS: &[&str] = &["transactions", "data", "items"];
