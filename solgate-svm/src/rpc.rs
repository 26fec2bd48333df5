//! RPC abstraction used by the wallet.
//!
//! [`SolanaRpc`] covers exactly the node calls a payment needs. It is
//! implemented for the nonblocking [`RpcClient`]; tests substitute a scripted
//! implementation.

use async_trait::async_trait;
use solana_client::client_error::ClientError;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_commitment_config::CommitmentConfig;
use solana_message::Hash;
use solana_pubkey::Pubkey;
use solana_signature::Signature;
use solana_transaction::Transaction;

/// Error returned by a [`SolanaRpc`] call.
#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    /// Error from the JSON-RPC client.
    #[error(transparent)]
    Client(#[from] Box<ClientError>),
    /// Any other failure.
    #[error("{0}")]
    Other(String),
}

impl From<ClientError> for RpcError {
    fn from(e: ClientError) -> Self {
        Self::Client(Box::new(e))
    }
}

/// The Solana node calls a [`PaymentWallet`](crate::PaymentWallet) makes.
#[async_trait]
pub trait SolanaRpc: Send + Sync {
    /// URL of the node.
    fn endpoint(&self) -> String;

    /// Most recent blockhash.
    async fn get_latest_blockhash(&self) -> Result<Hash, RpcError>;

    /// Balance of `address` in lamports.
    async fn get_balance(&self, address: &Pubkey) -> Result<u64, RpcError>;

    /// Submits a signed transaction and waits until it reaches `confirmed`.
    async fn send_and_confirm_transaction(
        &self,
        transaction: &Transaction,
    ) -> Result<Signature, RpcError>;

    /// Whether the node reports `signature` at `confirmed` commitment or higher.
    async fn is_signature_confirmed(&self, signature: &Signature) -> Result<bool, RpcError>;
}

#[async_trait]
impl SolanaRpc for RpcClient {
    fn endpoint(&self) -> String {
        self.url()
    }

    async fn get_latest_blockhash(&self) -> Result<Hash, RpcError> {
        Ok(Self::get_latest_blockhash(self).await?)
    }

    async fn get_balance(&self, address: &Pubkey) -> Result<u64, RpcError> {
        Ok(Self::get_balance(self, address).await?)
    }

    async fn send_and_confirm_transaction(
        &self,
        transaction: &Transaction,
    ) -> Result<Signature, RpcError> {
        Ok(Self::send_and_confirm_transaction(self, transaction).await?)
    }

    async fn is_signature_confirmed(&self, signature: &Signature) -> Result<bool, RpcError> {
        let status = self
            .get_signature_status_with_commitment(signature, CommitmentConfig::confirmed())
            .await?;
        Ok(status.is_some())
    }
}
