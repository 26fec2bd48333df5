//! Command-line arguments.

use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use solgate::GatewayConfig;
use solgate::config::{DEFAULT_BASE_URL, DEFAULT_RPC_URL};
use solgate::proto::PaymentStatus;

/// Command-line client for the solgate payment gateway.
#[derive(Debug, Parser)]
#[command(name = "solgate", version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub gateway: GatewayArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Connection settings, each overridable from the environment.
#[derive(Debug, Args)]
pub struct GatewayArgs {
    /// Payment gateway base URL.
    #[arg(long, env = "SOLGATE_BASE_URL", default_value = DEFAULT_BASE_URL, global = true)]
    pub base_url: String,

    /// Base URL of the session-protected service.
    #[arg(long, env = "SOLGATE_SERVICE_URL", global = true)]
    pub service_url: Option<String>,

    /// Solana JSON-RPC endpoint.
    #[arg(long, env = "SOLGATE_RPC_URL", default_value = DEFAULT_RPC_URL, global = true)]
    pub rpc_url: String,

    /// Use the sandbox endpoint family.
    #[arg(long, env = "SOLGATE_SANDBOX", global = true)]
    pub sandbox: bool,

    /// Merchant API key.
    #[arg(long, env = "SOLGATE_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    /// Base58 secret key of the paying wallet.
    #[arg(long, env = "SOLGATE_PAYER_KEY", hide_env_values = true, global = true)]
    pub payer_key: Option<String>,

    /// HTTP timeout in seconds.
    #[arg(long, env = "SOLGATE_TIMEOUT_SECS", default_value_t = 30, global = true)]
    pub timeout_secs: u64,
}

impl GatewayArgs {
    /// Builds the client configuration.
    pub fn config(&self) -> GatewayConfig {
        let mut config = GatewayConfig::new(&self.base_url)
            .with_rpc_url(&self.rpc_url)
            .with_sandbox(self.sandbox)
            .with_timeout(Duration::from_secs(self.timeout_secs));
        if let Some(url) = &self.service_url {
            config = config.with_service_url(url);
        }
        if let Some(key) = &self.api_key {
            config = config.with_api_key(key);
        }
        config
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create a payment against a policy
    Create {
        /// Policy id.
        policy_id: String,
        /// Metadata attached to the payment, as a JSON object.
        #[arg(long, value_parser = parse_json)]
        metadata: Option<serde_json::Value>,
    },
    /// Show the status of a payment
    Status {
        /// Payment reference id.
        reference_id: String,
    },
    /// Simulate a payment outcome (sandbox only)
    Simulate {
        /// Payment reference id.
        reference_id: String,
        /// Simulate a failed payment.
        #[arg(long)]
        fail: bool,
    },
    /// Verify an on-chain payment (production only)
    Verify {
        /// Payment reference id.
        reference_id: String,
        /// Signature of the paying transaction.
        tx_hash: String,
    },
    /// Cancel a pending payment
    Cancel {
        /// Payment reference id.
        reference_id: String,
    },
    /// List payments
    List {
        /// Only payments with this status.
        #[arg(long)]
        status: Option<PaymentStatus>,
        /// Maximum number of results.
        #[arg(long)]
        limit: Option<u32>,
        /// Number of results to skip.
        #[arg(long)]
        offset: Option<u32>,
    },
    /// Show the SOL balance of an address
    Balance {
        /// Base58 address.
        address: String,
    },
    /// Pay a pending payment from the payer wallet, then verify it
    Pay {
        /// Payment reference id.
        reference_id: String,
        /// Send the transaction without asking the gateway to verify it.
        #[arg(long)]
        no_verify: bool,
    },
    /// Wait for a transaction to be confirmed
    Confirm {
        /// Transaction signature.
        signature: String,
        /// Seconds to wait.
        #[arg(long, default_value_t = 30)]
        timeout: u64,
    },
    /// Merchant account operations (requires an API key)
    #[command(subcommand)]
    Merchant(MerchantCommand),
}

#[derive(Debug, Subcommand)]
pub enum MerchantCommand {
    /// Show the merchant account
    Me,
    /// Show aggregate statistics
    Stats,
    /// List pricing policies
    Policies,
    /// Show the transaction history
    Transactions {
        /// Only transactions with this status.
        #[arg(long)]
        status: Option<PaymentStatus>,
        /// Maximum number of results.
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Show earnings over a period
    Earnings {
        /// Period such as `7d` or `30d`.
        #[arg(long, default_value = "30d")]
        period: String,
    },
}

fn parse_json(s: &str) -> Result<serde_json::Value, serde_json::Error> {
    serde_json::from_str(s)
}
