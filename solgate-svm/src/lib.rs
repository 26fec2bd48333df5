#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Solana wallet helper for solgate payments.
//!
//! A gateway payment tells the payer whom to pay, how many lamports, and which
//! reference to attach. [`PaymentWallet`] turns that into a legacy Solana
//! transaction with two instructions, in this order:
//!
//! 1. a System Program transfer from the payer to the recipient
//! 2. a Memo Program instruction carrying the payment reference, signed by the payer
//!
//! It then signs and submits the transaction, waits for `confirmed`
//! commitment, and reports the signature the gateway needs to verify the
//! payment. Balance lookups and confirmation polling round it off.
//!
//! # Architecture
//!
//! - [`rpc`] - The [`SolanaRpc`] abstraction over the JSON-RPC node
//! - [`network`] - Cluster classification and explorer links
//! - [`wallet`] - Transaction building, submission and confirmation
//!
//! # Feature Flags
//!
//! - `telemetry` - Emits [`tracing`](https://docs.rs/tracing) spans and events
//!
//! # Example
//!
//! ```no_run
//! use solgate_svm::{PaymentWallet, SendOutcome, keypair_from_base58};
//!
//! # async fn run(details: solgate::proto::PaymentDetails) -> Result<(), solgate::SdkError> {
//! let wallet = PaymentWallet::new("https://api.devnet.solana.com");
//! let payer = keypair_from_base58("<base58 secret key>")?;
//! match wallet.send_payment_from_details(&payer, &details).await {
//!     SendOutcome::Sent { signature } => println!("paid: {signature}"),
//!     SendOutcome::Failed { error } => eprintln!("payment failed: {error}"),
//! }
//! # Ok(())
//! # }
//! ```

pub mod network;
pub mod rpc;
pub mod wallet;

pub use network::SolanaNetwork;
pub use rpc::{RpcError, SolanaRpc};
pub use wallet::{PaymentWallet, SendOutcome, TransferParams, keypair_from_base58};
