//! Payment lifecycle wire types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use serde_with::{DisplayFromStr, PickFirst, serde_as};

use crate::Timestamp;

use super::default_true;

/// Lamports in one SOL.
pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

/// Converts lamports to SOL.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn lamports_to_sol(lamports: u64) -> f64 {
    lamports as f64 / LAMPORTS_PER_SOL as f64
}

/// Server-side status of a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// Created, waiting for the on-chain transfer.
    Pending,
    /// Verified; a session was issued.
    Active,
    /// The payment window or session lapsed.
    Expired,
    /// Revoked by the merchant.
    Revoked,
    /// Cancelled before completion.
    Cancelled,
}

impl PaymentStatus {
    /// Status as it appears on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Active => "active",
            Self::Expired => "expired",
            Self::Revoked => "revoked",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown [`PaymentStatus`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown payment status: {0}")]
pub struct UnknownPaymentStatus(pub String);

impl FromStr for PaymentStatus {
    type Err = UnknownPaymentStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "active" => Ok(Self::Active),
            "expired" => Ok(Self::Expired),
            "revoked" => Ok(Self::Revoked),
            "cancelled" | "canceled" => Ok(Self::Cancelled),
            _ => Err(UnknownPaymentStatus(s.to_owned())),
        }
    }
}

/// Split of a production payment between the merchant and the platform.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeSplit {
    /// Merchant wallet address.
    pub recipient: String,
    /// Lamports owed to the merchant.
    #[serde(alias = "recipient_amount")]
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub recipient_lamports: u64,
    /// Platform fee wallet address.
    pub platform: String,
    /// Lamports owed to the platform.
    #[serde(alias = "platform_amount")]
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub platform_lamports: u64,
}

/// On-chain program that routes a production payment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractRouting {
    /// Routing program id.
    pub program_id: String,
    /// Accounts the routing program expects, in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub accounts: Vec<String>,
    /// Any further routing data.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The on-chain transfer a payer must perform to satisfy a payment.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentDetails {
    /// Wallet that receives the transfer.
    #[serde(alias = "recipient_address")]
    pub recipient: String,
    /// Amount in lamports.
    #[serde(alias = "amount")]
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub amount_lamports: u64,
    /// Amount in SOL, as displayed by the gateway.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_sol: Option<f64>,
    /// Payment reference, to be attached as the transaction memo.
    #[serde(alias = "memo")]
    pub reference: String,
    /// Seconds the payer has to complete the transfer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,
    /// Merchant/platform split (production only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee_split: Option<FeeSplit>,
    /// Smart-contract routing (production only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract: Option<ContractRouting>,
}

impl PaymentDetails {
    /// Amount in SOL, computed from lamports when the gateway omitted it.
    #[must_use]
    pub fn human_amount(&self) -> f64 {
        self.amount_sol
            .unwrap_or_else(|| lamports_to_sol(self.amount_lamports))
    }
}

/// Body of a create-payment call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatePaymentRequest {
    /// Merchant policy being paid for.
    pub policy_id: String,
    /// Free-form metadata stored with the payment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

/// Gateway answer to a create-payment call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatePaymentResponse {
    /// Whether the gateway accepted the request.
    #[serde(default = "default_true")]
    pub success: bool,
    /// Reference id of the new payment.
    pub reference_id: String,
    /// Initial status, normally [`PaymentStatus::Pending`].
    pub status: PaymentStatus,
    /// Transfer the payer must perform.
    pub payment_details: PaymentDetails,
}

/// Snapshot of a payment's server-side state.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentStatusResponse {
    /// Reference id of the payment.
    pub reference_id: String,
    /// Current status.
    pub status: PaymentStatus,
    /// Policy the payment belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy_id: Option<String>,
    /// Amount in lamports.
    #[serde(default, alias = "amount", skip_serializing_if = "Option::is_none")]
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    pub amount_lamports: Option<u64>,
    /// Signature of the paying transaction, once known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
    /// Session calls left, for active payments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calls_remaining: Option<u32>,
    /// When the payment was created.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
    /// When the payment (or its session) expires.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<Timestamp>,
    /// Transfer details, while the payment is pending.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_details: Option<PaymentDetails>,
}

/// Body of a verify call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyPaymentRequest {
    /// Signature of the paying transaction.
    pub tx_hash: String,
}

/// Options for a sandbox simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulateOptions {
    /// Simulate a successful payment (`true`) or a failed one.
    #[serde(default = "default_true")]
    pub success: bool,
}

impl Default for SimulateOptions {
    fn default() -> Self {
        Self { success: true }
    }
}

impl SimulateOptions {
    /// Options simulating a failed payment.
    #[must_use]
    pub const fn failure() -> Self {
        Self { success: false }
    }
}

/// Gateway answer to a cancel call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelPaymentResponse {
    /// Whether the payment was cancelled.
    #[serde(default = "default_true")]
    pub success: bool,
    /// Reference id of the payment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_id: Option<String>,
    /// Status after cancellation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<PaymentStatus>,
    /// Human-readable note from the gateway.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Query filters for listing payments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListPaymentsFilter {
    /// Only payments with this status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<PaymentStatus>,
    /// Maximum number of results.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    /// Number of results to skip.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
}

/// Keys under which the gateway wraps payment lists.
pub const PAYMENT_LIST_KEYS: &[&str] = &["payments", "data", "items"];
