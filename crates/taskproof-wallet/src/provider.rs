//! The wallet provider seam.

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::broadcast;

use taskproof_core::Address;

use crate::error::ProviderError;

/// JSON-RPC method names used by TaskProof.
pub mod methods {
    /// Interactive account authorisation.
    pub const REQUEST_ACCOUNTS: &str = "eth_requestAccounts";
    /// Non-interactive list of authorised accounts.
    pub const ACCOUNTS: &str = "eth_accounts";
    /// Interactive personal-message signature; params `[message, address]`.
    pub const PERSONAL_SIGN: &str = "personal_sign";
    /// Cheap liveness probe.
    pub const CHAIN_ID: &str = "eth_chainId";
}

/// An Ethereum-style wallet provider.
///
/// Implement this trait to plug a wallet into TaskProof. Every `request`
/// may surface a prompt the process cannot cancel or time out.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Send a JSON-RPC request and return its `result`.
    ///
    /// JSON-RPC error objects must be returned through
    /// [`ProviderError::from_rpc`] so user rejection is recognised.
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError>;

    /// Subscribe to account-set changes (`accountsChanged`).
    fn account_changes(&self) -> broadcast::Receiver<Vec<Address>>;
}
