//! Endpoint table for the gateway API.
//!
//! Payment lifecycle calls live under one of two disjoint path families: the
//! production family (`/api/v1/payments`) and the sandbox family
//! (`/api/v1/sandbox/payments`). The family is a pure function of the
//! client's `sandbox` flag, consulted once per call. Verification only exists
//! in production and simulation only exists in the sandbox; asking for either
//! in the wrong family yields `None`.
//!
//! Merchant calls use a fixed family that does not depend on the mode.
//!
//! Identifiers are percent-encoded into a single path segment.

use urlencoding::encode;

/// Path prefix of the production payment family.
pub const PRODUCTION_PAYMENTS: &str = "/api/v1/payments";

/// Path prefix of the sandbox payment family.
pub const SANDBOX_PAYMENTS: &str = "/api/v1/sandbox/payments";

/// Authenticated merchant profile.
pub const MERCHANT_ME: &str = "/api/v1/merchant/me";

/// Merchant aggregate statistics.
pub const MERCHANT_STATS: &str = "/api/v1/merchant/stats";

/// Merchant pricing policies.
pub const MERCHANT_POLICIES: &str = "/api/v1/merchant/policies";

/// Merchant transaction history.
pub const MERCHANT_TRANSACTIONS: &str = "/api/v1/merchant/transactions";

/// Merchant earnings summary.
pub const MERCHANT_EARNINGS: &str = "/api/v1/merchant/earnings";

/// Session activation by reference id and transaction signature.
pub const SESSION_ACTIVATE: &str = "/api/v1/sessions/activate";

/// The two payment endpoint families.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointFamily {
    /// Real payments verified against the chain.
    Production,
    /// Simulated payments, no on-chain transfer required.
    Sandbox,
}

impl EndpointFamily {
    /// Selects the family for the given sandbox flag.
    #[must_use]
    pub const fn for_mode(sandbox: bool) -> Self {
        if sandbox { Self::Sandbox } else { Self::Production }
    }

    /// Path prefix shared by every payment call of this family.
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Production => PRODUCTION_PAYMENTS,
            Self::Sandbox => SANDBOX_PAYMENTS,
        }
    }
}

/// A payment lifecycle call, with the payment reference where one applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentOperation<'a> {
    /// `POST {prefix}`
    Create,
    /// `GET {prefix}`
    List,
    /// `GET {prefix}/{id}`
    Status(&'a str),
    /// `POST {prefix}/{id}/cancel`
    Cancel(&'a str),
    /// `POST /api/v1/payments/{id}/verify`, production only.
    Verify(&'a str),
    /// `POST /api/v1/sandbox/payments/{id}/simulate`, sandbox only.
    Simulate(&'a str),
}

/// Resolves the path of `operation` in the family selected by `sandbox`.
///
/// Returns `None` when the operation does not exist in that family.
#[must_use]
pub fn payment_path(sandbox: bool, operation: PaymentOperation<'_>) -> Option<String> {
    let family = EndpointFamily::for_mode(sandbox);
    let prefix = family.prefix();
    match (family, operation) {
        (_, PaymentOperation::Create | PaymentOperation::List) => Some(prefix.to_owned()),
        (_, PaymentOperation::Status(id)) => Some(format!("{prefix}/{}", encode(id))),
        (_, PaymentOperation::Cancel(id)) => Some(format!("{prefix}/{}/cancel", encode(id))),
        (EndpointFamily::Production, PaymentOperation::Verify(id)) => {
            Some(format!("{prefix}/{}/verify", encode(id)))
        }
        (EndpointFamily::Sandbox, PaymentOperation::Simulate(id)) => {
            Some(format!("{prefix}/{}/simulate", encode(id)))
        }
        (EndpointFamily::Sandbox, PaymentOperation::Verify(_))
        | (EndpointFamily::Production, PaymentOperation::Simulate(_)) => None,
    }
}

/// Path of a single merchant policy.
#[must_use]
pub fn merchant_policy(policy_id: &str) -> String {
    format!("{MERCHANT_POLICIES}/{}", encode(policy_id))
}
