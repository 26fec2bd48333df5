//! Command-line client for the solgate payment gateway.
//!
//! # Usage
//!
//! ```bash
//! # Create a payment in the sandbox and simulate its settlement
//! solgate --sandbox create policy_basic
//! solgate --sandbox simulate <reference_id>
//!
//! # Pay a production payment from a local wallet and verify it
//! SOLGATE_PAYER_KEY=<base58> solgate pay <reference_id>
//!
//! # Configure logging level
//! RUST_LOG=debug solgate status <reference_id>
//! ```
//!
//! # Environment Variables
//!
//! Variables are also read from a `.env` file in the working directory.
//!
//! - `SOLGATE_BASE_URL` - Gateway base URL (default: `https://api.solgate.io`)
//! - `SOLGATE_SERVICE_URL` - Protected service base URL (default: gateway URL)
//! - `SOLGATE_RPC_URL` - Solana RPC endpoint (default: mainnet-beta)
//! - `SOLGATE_SANDBOX` - Use the sandbox endpoint family
//! - `SOLGATE_API_KEY` - Merchant API key
//! - `SOLGATE_PAYER_KEY` - Base58 secret key of the paying wallet
//! - `RUST_LOG` - Log level filter (default: `info`)

#![allow(clippy::print_stdout)]

mod cli;

use std::str::FromStr;
use std::time::Duration;

use clap::Parser;
use serde::Serialize;
use solana_signature::Signature;
use solana_signer::Signer;
use solgate::proto::{ListPaymentsFilter, SimulateOptions, TransactionFilter};
use solgate_http::GatewayClient;
use solgate_svm::{PaymentWallet, SendOutcome, keypair_from_base58};
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command, GatewayArgs, MerchantCommand};

type CliResult = Result<(), Box<dyn std::error::Error>>;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> CliResult {
    let config = cli.gateway.config();
    tracing::debug!(
        base_url = %config.base_url,
        sandbox = config.sandbox,
        "Loaded configuration"
    );
    let mut client = GatewayClient::new(config)?;

    match cli.command {
        Command::Create {
            policy_id,
            metadata,
        } => print_json(&client.create_payment(&policy_id, metadata).await?),
        Command::Status { reference_id } => {
            print_json(&client.get_payment_status(&reference_id).await?)
        }
        Command::Simulate { reference_id, fail } => {
            let options = if fail {
                SimulateOptions::failure()
            } else {
                SimulateOptions::default()
            };
            print_json(&client.simulate_payment(&reference_id, options).await?)
        }
        Command::Verify {
            reference_id,
            tx_hash,
        } => print_json(&client.verify_payment(&reference_id, &tx_hash).await?),
        Command::Cancel { reference_id } => {
            print_json(&client.cancel_payment(&reference_id).await?)
        }
        Command::List {
            status,
            limit,
            offset,
        } => {
            let filter = ListPaymentsFilter {
                status,
                limit,
                offset,
            };
            print_json(&client.list_payments(filter).await?)
        }
        Command::Balance { address } => {
            let wallet = PaymentWallet::from_config(client.config());
            let sol = wallet.get_balance_sol(&address).await?;
            println!("{sol} SOL ({})", wallet.network());
            Ok(())
        }
        Command::Pay {
            reference_id,
            no_verify,
        } => pay(&mut client, &cli.gateway, &reference_id, no_verify).await,
        Command::Confirm { signature, timeout } => {
            let signature = Signature::from_str(&signature)?;
            let wallet = PaymentWallet::from_config(client.config());
            let confirmed = wallet
                .wait_for_confirmation(&signature, Duration::from_secs(timeout))
                .await;
            if confirmed {
                println!("confirmed: {}", wallet.network().explorer_url(&signature.to_string()));
                Ok(())
            } else {
                Err(format!("{signature} not confirmed within {timeout}s").into())
            }
        }
        Command::Merchant(command) => merchant(&client, command).await,
    }
}

async fn pay(
    client: &mut GatewayClient,
    args: &GatewayArgs,
    reference_id: &str,
    no_verify: bool,
) -> CliResult {
    let secret = args
        .payer_key
        .as_deref()
        .ok_or("a payer key is required: set SOLGATE_PAYER_KEY or pass --payer-key")?;
    let payer = keypair_from_base58(secret)?;

    let payment = client.get_payment_status(reference_id).await?;
    let details = payment
        .payment_details
        .ok_or_else(|| format!("payment {reference_id} has no payment details ({})", payment.status))?;
    tracing::info!(
        recipient = %details.recipient,
        amount_sol = details.human_amount(),
        payer = %payer.pubkey(),
        "Sending payment"
    );

    let wallet = PaymentWallet::from_config(client.config());
    let signature = match wallet.send_payment_from_details(&payer, &details).await {
        SendOutcome::Sent { signature } => signature,
        SendOutcome::Failed { error } => return Err(error.into()),
    };
    println!("sent: {}", wallet.network().explorer_url(&signature.to_string()));

    if no_verify || client.is_sandbox() {
        return Ok(());
    }
    print_json(&client.verify_payment(reference_id, &signature.to_string()).await?)
}

async fn merchant(client: &GatewayClient, command: MerchantCommand) -> CliResult {
    match command {
        MerchantCommand::Me => print_json(&client.get_merchant_user().await?),
        MerchantCommand::Stats => print_json(&client.get_merchant_stats().await?),
        MerchantCommand::Policies => print_json(&client.list_policies().await?),
        MerchantCommand::Transactions { status, limit } => {
            let filter = TransactionFilter {
                status,
                limit,
                offset: None,
            };
            print_json(&client.get_transactions(filter).await?)
        }
        MerchantCommand::Earnings { period } => print_json(&client.get_earnings(&period).await?),
    }
}

fn print_json<T: Serialize>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
