//! Solana cluster classification.

use std::fmt;

/// Cluster a wallet talks to, decided once from its RPC endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SolanaNetwork {
    /// Mainnet-beta, and anything not recognized as devnet.
    Mainnet,
    /// Devnet.
    Devnet,
}

impl SolanaNetwork {
    /// Classifies an RPC endpoint: any URL containing `devnet` is devnet.
    #[must_use]
    pub fn from_endpoint(endpoint: &str) -> Self {
        if endpoint.contains("devnet") {
            Self::Devnet
        } else {
            Self::Mainnet
        }
    }

    /// Cluster name as used by explorers.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mainnet => "mainnet-beta",
            Self::Devnet => "devnet",
        }
    }

    /// Solana Explorer link for a transaction signature.
    #[must_use]
    pub fn explorer_url(self, signature: &str) -> String {
        match self {
            Self::Mainnet => format!("https://explorer.solana.com/tx/{signature}"),
            Self::Devnet => format!("https://explorer.solana.com/tx/{signature}?cluster=devnet"),
        }
    }
}

impl fmt::Display for SolanaNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        assert_eq!(
            SolanaNetwork::from_endpoint("https://api.devnet.solana.com"),
            SolanaNetwork::Devnet
        );
        assert_eq!(
            SolanaNetwork::from_endpoint("https://rpc.example.com/devnet/abc"),
            SolanaNetwork::Devnet
        );
        assert_eq!(
            SolanaNetwork::from_endpoint("https://api.mainnet-beta.solana.com"),
            SolanaNetwork::Mainnet
        );
        assert_eq!(
            SolanaNetwork::from_endpoint("http://127.0.0.1:8899"),
            SolanaNetwork::Mainnet
        );
    }

    #[test]
    fn test_explorer_url() {
        assert_eq!(
            SolanaNetwork::Devnet.explorer_url("abc"),
            "https://explorer.solana.com/tx/abc?cluster=devnet"
        );
        assert_eq!(
            SolanaNetwork::Mainnet.explorer_url("abc"),
            "https://explorer.solana.com/tx/abc"
        );
    }
}
