//! Building, sending and confirming payment transactions.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use solana_client::nonblocking::rpc_client::RpcClient;
use solana_commitment_config::CommitmentConfig;
use solana_instruction::{AccountMeta, Instruction};
use solana_keypair::Keypair;
use solana_pubkey::{Pubkey, pubkey};
use solana_signature::Signature;
use solana_signer::Signer;
use solana_system_interface::instruction as system_instruction;
use solana_transaction::Transaction;
use solgate::proto::{PaymentDetails, lamports_to_sol};
use solgate::{GatewayConfig, SdkError};
use tokio::time::{Instant, sleep};

#[cfg(feature = "telemetry")]
use tracing::instrument;

use crate::network::SolanaNetwork;
use crate::rpc::{RpcError, SolanaRpc};

/// SPL Memo program.
pub const MEMO_PROGRAM_ID: Pubkey = pubkey!("MemoSq4gqABAXKb96qnH8TysNcWxMyWCqXgDLGmfcHr");

/// How long [`PaymentWallet::wait_for_confirmation`] waits by default.
pub const DEFAULT_CONFIRMATION_TIMEOUT: Duration = Duration::from_secs(30);

/// Delay between confirmation checks.
const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// A transfer to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferParams {
    /// Base58 address of the recipient.
    pub recipient_address: String,
    /// Amount in lamports.
    pub amount_lamports: u64,
    /// Memo attached to the transaction, usually the payment reference.
    pub memo: String,
}

impl From<&PaymentDetails> for TransferParams {
    fn from(details: &PaymentDetails) -> Self {
        Self {
            recipient_address: details.recipient.clone(),
            amount_lamports: details.amount_lamports,
            memo: details.reference.clone(),
        }
    }
}

/// Result of [`PaymentWallet::send_payment`].
#[derive(Debug)]
pub enum SendOutcome {
    /// The transaction reached `confirmed` commitment.
    Sent {
        /// Transaction signature, to hand to the gateway for verification.
        signature: Signature,
    },
    /// Building, signing or submitting failed.
    Failed {
        /// What went wrong.
        error: SdkError,
    },
}

impl SendOutcome {
    /// The signature, if the payment was sent.
    #[must_use]
    pub const fn signature(&self) -> Option<&Signature> {
        match self {
            Self::Sent { signature } => Some(signature),
            Self::Failed { .. } => None,
        }
    }

    /// Converts into a `Result`.
    ///
    /// # Errors
    ///
    /// Returns the captured error of a [`SendOutcome::Failed`].
    pub fn into_result(self) -> Result<Signature, SdkError> {
        match self {
            Self::Sent { signature } => Ok(signature),
            Self::Failed { error } => Err(error),
        }
    }
}

/// Parses a base58-encoded 64-byte secret key.
///
/// # Errors
///
/// Returns [`SdkError::Validation`] if the string is not a valid keypair.
pub fn keypair_from_base58(secret: &str) -> Result<Keypair, SdkError> {
    let bytes = bs58::decode(secret.trim())
        .into_vec()
        .map_err(|e| SdkError::validation(format!("Invalid secret key: {e}"), "secret_key"))?;
    Keypair::try_from(bytes.as_slice())
        .map_err(|e| SdkError::validation(format!("Invalid secret key: {e}"), "secret_key"))
}

fn parse_address(address: &str, field: &str) -> Result<Pubkey, SdkError> {
    Pubkey::from_str(address)
        .map_err(|e| SdkError::validation(format!("Invalid address {address}: {e}"), field))
}

fn rpc_failure(context: &str, error: RpcError) -> SdkError {
    SdkError::Network {
        message: format!("{context}: {error}"),
        source: Some(Box::new(error)),
    }
}

/// Pays gateway payments from a local keypair.
///
/// The cluster is classified once, from the RPC endpoint, when the wallet is
/// created.
pub struct PaymentWallet<R = RpcClient> {
    rpc: R,
    network: SolanaNetwork,
}

impl<R: SolanaRpc> fmt::Debug for PaymentWallet<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaymentWallet")
            .field("endpoint", &self.rpc.endpoint())
            .field("network", &self.network)
            .finish()
    }
}

impl PaymentWallet<RpcClient> {
    /// Creates a wallet talking to `rpc_url` at `confirmed` commitment.
    #[must_use]
    pub fn new(rpc_url: impl Into<String>) -> Self {
        let rpc = RpcClient::new_with_commitment(rpc_url.into(), CommitmentConfig::confirmed());
        Self::with_rpc(rpc)
    }

    /// Creates a wallet for the RPC endpoint in `config`.
    #[must_use]
    pub fn from_config(config: &GatewayConfig) -> Self {
        Self::new(config.rpc_url.clone())
    }
}

impl<R: SolanaRpc> PaymentWallet<R> {
    /// Wraps an existing RPC implementation.
    pub fn with_rpc(rpc: R) -> Self {
        let network = SolanaNetwork::from_endpoint(&rpc.endpoint());
        Self { rpc, network }
    }

    /// The cluster this wallet pays on.
    #[must_use]
    pub const fn network(&self) -> SolanaNetwork {
        self.network
    }

    /// The underlying RPC.
    #[must_use]
    pub const fn rpc(&self) -> &R {
        &self.rpc
    }

    /// Builds the unsigned payment transaction for `payer`.
    ///
    /// The recipient is validated before any RPC call; the recent blockhash
    /// is fetched last.
    ///
    /// # Errors
    ///
    /// Returns [`SdkError::Validation`] for a malformed recipient and
    /// [`SdkError::Network`] if the blockhash cannot be fetched.
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "solgate.wallet.create_transaction", skip(self, params), err)
    )]
    pub async fn create_payment_transaction(
        &self,
        payer: &Pubkey,
        params: &TransferParams,
    ) -> Result<Transaction, SdkError> {
        let recipient = parse_address(&params.recipient_address, "recipient_address")?;
        let instructions = [
            system_instruction::transfer(payer, &recipient, params.amount_lamports),
            Instruction::new_with_bytes(
                MEMO_PROGRAM_ID,
                params.memo.as_bytes(),
                vec![AccountMeta::new_readonly(*payer, true)],
            ),
        ];
        let mut transaction = Transaction::new_with_payer(&instructions, Some(payer));
        transaction.message.recent_blockhash = self
            .rpc
            .get_latest_blockhash()
            .await
            .map_err(|e| rpc_failure("Failed to fetch recent blockhash", e))?;
        Ok(transaction)
    }

    /// Builds the unsigned transaction for a gateway payment.
    ///
    /// # Errors
    ///
    /// Same as [`create_payment_transaction`](Self::create_payment_transaction).
    pub async fn create_payment_from_details(
        &self,
        payer: &Pubkey,
        details: &PaymentDetails,
    ) -> Result<Transaction, SdkError> {
        self.create_payment_transaction(payer, &TransferParams::from(details))
            .await
    }

    /// Builds, signs and submits a payment, waiting for `confirmed`.
    ///
    /// Never fails: every error ends up in [`SendOutcome::Failed`].
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "solgate.wallet.send_payment", skip(self, payer, params), fields(payer = %payer.pubkey()))
    )]
    pub async fn send_payment(&self, payer: &Keypair, params: &TransferParams) -> SendOutcome {
        match self.try_send_payment(payer, params).await {
            Ok(signature) => {
                #[cfg(feature = "telemetry")]
                tracing::debug!(%signature, network = %self.network, "payment sent");
                SendOutcome::Sent { signature }
            }
            Err(error) => {
                #[cfg(feature = "telemetry")]
                tracing::warn!(%error, "payment failed");
                SendOutcome::Failed { error }
            }
        }
    }

    /// Pays a gateway payment: recipient, amount and reference come from
    /// `details`.
    pub async fn send_payment_from_details(
        &self,
        payer: &Keypair,
        details: &PaymentDetails,
    ) -> SendOutcome {
        self.send_payment(payer, &TransferParams::from(details))
            .await
    }

    async fn try_send_payment(
        &self,
        payer: &Keypair,
        params: &TransferParams,
    ) -> Result<Signature, SdkError> {
        let mut transaction = self
            .create_payment_transaction(&payer.pubkey(), params)
            .await?;
        let blockhash = transaction.message.recent_blockhash;
        transaction
            .try_sign(&[payer], blockhash)
            .map_err(|e| SdkError::wallet(format!("Failed to sign transaction: {e}")))?;
        self.rpc
            .send_and_confirm_transaction(&transaction)
            .await
            .map_err(|e| SdkError::Wallet {
                message: format!("Failed to send transaction: {e}"),
                signature: transaction.signatures.first().map(ToString::to_string),
            })
    }

    /// Balance of `address` in lamports.
    ///
    /// # Errors
    ///
    /// Returns [`SdkError::Validation`] for a malformed address and
    /// [`SdkError::Network`] if the node cannot be queried.
    pub async fn get_balance(&self, address: &str) -> Result<u64, SdkError> {
        let address = parse_address(address, "address")?;
        self.rpc
            .get_balance(&address)
            .await
            .map_err(|e| rpc_failure("Failed to fetch balance", e))
    }

    /// Balance of `address` in SOL.
    ///
    /// # Errors
    ///
    /// Same as [`get_balance`](Self::get_balance).
    pub async fn get_balance_sol(&self, address: &str) -> Result<f64, SdkError> {
        self.get_balance(address).await.map(lamports_to_sol)
    }

    /// Polls once a second until `signature` is confirmed or `timeout` has
    /// elapsed. Returns whether it was confirmed.
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "solgate.wallet.wait_for_confirmation", skip(self, signature), fields(%signature))
    )]
    pub async fn wait_for_confirmation(&self, signature: &Signature, timeout: Duration) -> bool {
        let start = Instant::now();
        loop {
            if self.is_transaction_confirmed(signature).await {
                return true;
            }
            if start.elapsed() >= timeout {
                #[cfg(feature = "telemetry")]
                tracing::warn!(?timeout, "confirmation timed out");
                return false;
            }
            sleep(POLL_INTERVAL).await;
        }
    }

    /// Single confirmation check. Any RPC error counts as unconfirmed.
    pub async fn is_transaction_confirmed(&self, signature: &Signature) -> bool {
        match self.rpc.is_signature_confirmed(signature).await {
            Ok(confirmed) => confirmed,
            #[cfg(feature = "telemetry")]
            Err(error) => {
                tracing::debug!(%error, "signature status lookup failed");
                false
            }
            #[cfg(not(feature = "telemetry"))]
            Err(_) => false,
        }
    }
}
