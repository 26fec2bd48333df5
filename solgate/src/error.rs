//! Error taxonomy shared by the gateway client and the wallet helper.
//!
//! Every failure surfaced by the SDK is an [`SdkError`]. Each variant maps to a
//! stable, machine-readable [`ErrorCode`] and carries whatever context the
//! failing call knew about (reference id, endpoint, HTTP status, transaction
//! signature, offending field). Matching on the whole enum catches any SDK
//! error; matching on one variant, or on [`SdkError::is_session_error`],
//! narrows it.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Boxed low-level cause of a transport failure.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Stable discriminant of an [`SdkError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// The gateway refused to create a payment.
    PaymentCreationFailed,
    /// The gateway refused to verify a payment.
    PaymentVerificationFailed,
    /// The referenced payment does not exist.
    PaymentNotFound,
    /// Generic session failure.
    SessionError,
    /// No session has been stored on the client.
    NoActiveSession,
    /// The stored session has expired or has no calls left.
    SessionExpired,
    /// Non-success HTTP response from the gateway.
    ApiError,
    /// The request never produced an HTTP response.
    NetworkError,
    /// Operation not available in the client's sandbox mode.
    SandboxModeMismatch,
    /// Transaction build, signing or submission failed.
    WalletError,
    /// Malformed caller input.
    ValidationError,
    /// Missing or invalid client configuration.
    ConfigurationError,
}

impl ErrorCode {
    /// Returns the code as it appears on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PaymentCreationFailed => "PAYMENT_CREATION_FAILED",
            Self::PaymentVerificationFailed => "PAYMENT_VERIFICATION_FAILED",
            Self::PaymentNotFound => "PAYMENT_NOT_FOUND",
            Self::SessionError => "SESSION_ERROR",
            Self::NoActiveSession => "NO_ACTIVE_SESSION",
            Self::SessionExpired => "SESSION_EXPIRED",
            Self::ApiError => "API_ERROR",
            Self::NetworkError => "NETWORK_ERROR",
            Self::SandboxModeMismatch => "SANDBOX_MODE_MISMATCH",
            Self::WalletError => "WALLET_ERROR",
            Self::ValidationError => "VALIDATION_ERROR",
            Self::ConfigurationError => "CONFIGURATION_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Any failure produced by the SDK.
#[derive(Debug, thiserror::Error)]
pub enum SdkError {
    /// The gateway did not create the payment.
    #[error("{message}")]
    PaymentCreation {
        /// Message extracted from the gateway response.
        message: String,
    },

    /// The gateway did not verify the payment.
    #[error("{message}")]
    PaymentVerification {
        /// Message extracted from the gateway response.
        message: String,
        /// Reference id of the payment being verified.
        reference_id: Option<String>,
    },

    /// The referenced payment does not exist.
    #[error("Payment not found: {reference_id}")]
    PaymentNotFound {
        /// Reference id that was looked up.
        reference_id: String,
    },

    /// Generic session failure.
    #[error("{message}")]
    Session {
        /// Description of the failure.
        message: String,
    },

    /// No session is stored on the client.
    #[error("No active session. Verify or simulate a payment first.")]
    NoActiveSession,

    /// The stored session is expired or exhausted.
    #[error("Session expired or no calls remaining")]
    SessionExpired,

    /// The gateway answered with a non-success status.
    #[error("{message}")]
    Api {
        /// Message extracted from the response.
        message: String,
        /// HTTP status code.
        status: Option<u16>,
        /// Endpoint path that was called.
        endpoint: Option<String>,
        /// Raw response body.
        body: Option<Value>,
    },

    /// The request failed before any HTTP response arrived.
    #[error("{message}")]
    Network {
        /// Normalized description of the failure.
        message: String,
        /// The originating transport error.
        #[source]
        source: Option<BoxError>,
    },

    /// Operation not available in the current sandbox mode.
    #[error("{message}")]
    SandboxModeMismatch {
        /// Description of the mismatch.
        message: String,
    },

    /// Transaction build, signing or submission failed.
    #[error("{message}")]
    Wallet {
        /// Description of the failure.
        message: String,
        /// Signature of the transaction, if one was produced.
        signature: Option<String>,
    },

    /// Malformed caller input.
    #[error("{message}")]
    Validation {
        /// Description of the problem.
        message: String,
        /// Name of the offending field.
        field: Option<String>,
    },

    /// Missing or invalid client configuration.
    #[error("{message}")]
    Configuration {
        /// Description of the problem.
        message: String,
    },
}

impl SdkError {
    /// Returns the stable code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::PaymentCreation { .. } => ErrorCode::PaymentCreationFailed,
            Self::PaymentVerification { .. } => ErrorCode::PaymentVerificationFailed,
            Self::PaymentNotFound { .. } => ErrorCode::PaymentNotFound,
            Self::Session { .. } => ErrorCode::SessionError,
            Self::NoActiveSession => ErrorCode::NoActiveSession,
            Self::SessionExpired => ErrorCode::SessionExpired,
            Self::Api { .. } => ErrorCode::ApiError,
            Self::Network { .. } => ErrorCode::NetworkError,
            Self::SandboxModeMismatch { .. } => ErrorCode::SandboxModeMismatch,
            Self::Wallet { .. } => ErrorCode::WalletError,
            Self::Validation { .. } => ErrorCode::ValidationError,
            Self::Configuration { .. } => ErrorCode::ConfigurationError,
        }
    }

    /// Returns `true` for the session family: generic, missing, and expired.
    #[must_use]
    pub const fn is_session_error(&self) -> bool {
        matches!(
            self,
            Self::Session { .. } | Self::NoActiveSession | Self::SessionExpired
        )
    }

    /// Reference id carried by the error, if any.
    #[must_use]
    pub fn reference_id(&self) -> Option<&str> {
        match self {
            Self::PaymentVerification { reference_id, .. } => reference_id.as_deref(),
            Self::PaymentNotFound { reference_id } => Some(reference_id),
            _ => None,
        }
    }

    /// HTTP status carried by the error, if any.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => *status,
            _ => None,
        }
    }

    /// Creates a payment creation error.
    #[must_use]
    pub fn payment_creation(message: impl Into<String>) -> Self {
        Self::PaymentCreation {
            message: message.into(),
        }
    }

    /// Creates a payment verification error.
    #[must_use]
    pub fn payment_verification(message: impl Into<String>, reference_id: Option<String>) -> Self {
        Self::PaymentVerification {
            message: message.into(),
            reference_id,
        }
    }

    /// Creates a sandbox mode mismatch error.
    #[must_use]
    pub fn sandbox_mismatch(message: impl Into<String>) -> Self {
        Self::SandboxModeMismatch {
            message: message.into(),
        }
    }

    /// Creates a wallet error without a transaction signature.
    #[must_use]
    pub fn wallet(message: impl Into<String>) -> Self {
        Self::Wallet {
            message: message.into(),
            signature: None,
        }
    }

    /// Creates a validation error naming the offending field.
    #[must_use]
    pub fn validation(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Creates a configuration error.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}
