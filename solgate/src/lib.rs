#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Core types for the solgate payment gateway SDK.
//!
//! This crate holds everything the gateway client and the Solana wallet helper
//! share: configuration, the error taxonomy, timestamps, the sandbox/production
//! endpoint table, and the JSON wire types exchanged with the gateway. It does
//! no I/O of its own.
//!
//! # Overview
//!
//! A payer asks the gateway for a payment against a merchant policy, transfers
//! the requested lamports on Solana with the payment reference as memo, and
//! hands the transaction signature back to the gateway. The gateway answers
//! with a [`Session`](proto::Session): a token good for a bounded number of
//! calls to a protected service until it expires.
//!
//! # Modules
//!
//! - [`config`] - Gateway configuration with defaults and builders
//! - [`endpoints`] - Sandbox/production path selection
//! - [`error`] - [`SdkError`] and its stable [`ErrorCode`]s
//! - [`proto`] - Wire types for payments, sessions and merchant records
//! - [`timestamp`] - Lenient UTC timestamps

pub mod config;
pub mod endpoints;
pub mod error;
pub mod proto;
pub mod timestamp;

pub use config::GatewayConfig;
pub use error::{ErrorCode, SdkError};
pub use timestamp::Timestamp;
