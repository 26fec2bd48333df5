#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! HTTP client for the solgate payment gateway.
//!
//! [`GatewayClient`] drives the payment lifecycle (create, status, verify or
//! simulate, cancel, list), keeps the session the gateway grants, and spends
//! it on calls to the protected service through [`GatewayClient::request`].
//! With an API key configured it also exposes the merchant account API.
//!
//! Every call goes through a single transport that always speaks JSON and
//! folds HTTP and network failures into [`solgate::SdkError`].
//!
//! # Feature Flags
//!
//! - `telemetry` - Emits [`tracing`](https://docs.rs/tracing) spans and events

pub mod client;
pub mod constants;
mod merchant;
mod transport;

pub use client::{GatewayClient, RequestOptions};
