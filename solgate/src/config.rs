//! Gateway client configuration.
//!
//! Every field is optional from the caller's point of view: start from
//! [`GatewayConfig::default()`] and override what you need with the `with_*`
//! builders. Nothing here reads the environment; credentials and endpoints
//! are supplied by the embedding application.
//!
//! ```rust
//! use solgate::GatewayConfig;
//!
//! let config = GatewayConfig::default()
//!     .with_base_url("https://gateway.example")
//!     .with_sandbox(true)
//!     .with_api_key("sk_test_123");
//! assert!(config.sandbox);
//! assert_eq!(config.service_url(), "https://gateway.example");
//! ```

use std::time::Duration;

use url::Url;

use crate::SdkError;

/// Default gateway API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.solgate.io";

/// Default Solana JSON-RPC endpoint.
pub const DEFAULT_RPC_URL: &str = "https://api.mainnet-beta.solana.com";

/// Default HTTP request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for the gateway client and wallet helper.
#[derive(Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    /// Payment gateway base URL (without trailing slash).
    pub base_url: String,

    /// Base URL of the session-protected service. Falls back to
    /// [`Self::base_url`] when unset.
    pub service_url: Option<String>,

    /// Solana JSON-RPC endpoint.
    pub rpc_url: String,

    /// Route payment lifecycle calls to the sandbox endpoint family.
    pub sandbox: bool,

    /// Merchant API key, required for merchant operations.
    pub api_key: Option<String>,

    /// HTTP request timeout.
    pub timeout: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            service_url: None,
            rpc_url: DEFAULT_RPC_URL.to_owned(),
            sandbox: false,
            api_key: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl GatewayConfig {
    /// Creates a config with the given gateway base URL.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::default().with_base_url(base_url)
    }

    /// Sets the gateway base URL. Trailing slashes are dropped.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_owned();
        self
    }

    /// Sets the protected service base URL. Trailing slashes are dropped.
    #[must_use]
    pub fn with_service_url(mut self, url: impl Into<String>) -> Self {
        self.service_url = Some(url.into().trim_end_matches('/').to_owned());
        self
    }

    /// Sets the Solana RPC endpoint.
    #[must_use]
    pub fn with_rpc_url(mut self, url: impl Into<String>) -> Self {
        self.rpc_url = url.into();
        self
    }

    /// Enables or disables sandbox mode.
    #[must_use]
    pub const fn with_sandbox(mut self, sandbox: bool) -> Self {
        self.sandbox = sandbox;
        self
    }

    /// Sets the merchant API key.
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Sets the HTTP request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Effective protected service base URL.
    #[must_use]
    pub fn service_url(&self) -> &str {
        self.service_url.as_deref().unwrap_or(&self.base_url)
    }

    /// Checks that every configured URL is an absolute `http(s)` URL.
    ///
    /// # Errors
    ///
    /// Returns [`SdkError::Configuration`] naming the first bad URL.
    pub fn validate(&self) -> Result<(), SdkError> {
        check_url("base_url", &self.base_url)?;
        if let Some(url) = &self.service_url {
            check_url("service_url", url)?;
        }
        check_url("rpc_url", &self.rpc_url)
    }
}

fn check_url(name: &str, value: &str) -> Result<(), SdkError> {
    let url = Url::parse(value)
        .map_err(|e| SdkError::configuration(format!("invalid {name} {value:?}: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(SdkError::configuration(format!(
            "invalid {name} {value:?}: unsupported scheme {scheme}"
        ))),
    }
}

impl std::fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("base_url", &self.base_url)
            .field("service_url", &self.service_url)
            .field("rpc_url", &self.rpc_url)
            .field("sandbox", &self.sandbox)
            .field("has_api_key", &self.api_key.is_some())
            .field("timeout", &self.timeout)
            .finish()
    }
}
