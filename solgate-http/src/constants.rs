//! HTTP-specific constants for the gateway API.

use reqwest::header::HeaderName;

/// Header carrying the session token on protected-service calls.
pub const SESSION_TOKEN_HEADER: HeaderName = HeaderName::from_static("x-session-token");

/// Header carrying the merchant API key on merchant calls.
pub const API_KEY_HEADER: HeaderName = HeaderName::from_static("x-api-key");

/// Response fields the gateway uses to carry an error message, in priority order.
pub const ERROR_MESSAGE_FIELDS: &[&str] = &["error", "detail", "message"];
