//! Session records.
//!
//! A [`Session`] is the client-side proof of a completed payment. It grants a
//! bounded number of calls to the protected service until it expires, and is
//! active only while both budgets hold:
//!
//! ```text
//! active  <=>  expires_at > now  &&  calls_remaining > 0
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::PaymentStatus;
use super::default_true;
use crate::Timestamp;

/// A session issued by the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Token sent as `X-Session-Token` on protected calls.
    pub token: String,
    /// Reference id of the payment that produced this session.
    pub reference_id: String,
    /// Expiry time.
    pub expires_at: Timestamp,
    /// Protected calls left.
    pub calls_remaining: u32,
}

impl Session {
    /// Whether the session is usable at `now`.
    #[must_use]
    pub fn is_active_at(&self, now: Timestamp) -> bool {
        self.expires_at > now && self.calls_remaining > 0
    }

    /// Whether the session is usable right now.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.is_active_at(Timestamp::now())
    }

    /// Time left before expiry; zero once expired.
    #[must_use]
    pub fn time_remaining(&self) -> Duration {
        self.expires_at.duration_since(Timestamp::now())
    }

    /// Records one consumed call.
    pub const fn consume_call(&mut self) {
        self.calls_remaining = self.calls_remaining.saturating_sub(1);
    }
}

/// Gateway answer to verify, simulate and session-activation calls.
///
/// On success it carries the fields of a new [`Session`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionGrant {
    /// Whether the gateway granted a session.
    #[serde(default = "default_true")]
    pub success: bool,
    /// Session token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Reference id of the payment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_id: Option<String>,
    /// Session expiry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<Timestamp>,
    /// Calls granted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calls_remaining: Option<u32>,
    /// Payment status after the call.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<PaymentStatus>,
    /// Signature of the paying transaction, when the gateway echoes it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
    /// Human-readable note from the gateway.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Response of `POST /api/v1/payments/{id}/verify`.
pub type VerifyPaymentResponse = SessionGrant;

/// Response of `POST /api/v1/sandbox/payments/{id}/simulate`.
pub type SimulatePaymentResponse = SessionGrant;

impl SessionGrant {
    /// Builds the granted [`Session`].
    ///
    /// Returns `None` unless the grant reports success and carries a token,
    /// an expiry and a call budget. `reference_id` is used when the response
    /// does not echo one.
    #[must_use]
    pub fn to_session(&self, reference_id: &str) -> Option<Session> {
        if !self.success {
            return None;
        }
        Some(Session {
            token: self.token.clone()?,
            reference_id: self
                .reference_id
                .clone()
                .unwrap_or_else(|| reference_id.to_owned()),
            expires_at: self.expires_at?,
            calls_remaining: self.calls_remaining?,
        })
    }
}

/// Body of a session activation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivateSessionRequest {
    /// Reference id of the paid payment.
    pub reference_id: String,
    /// Signature of the paying transaction.
    pub tx_hash: String,
}
