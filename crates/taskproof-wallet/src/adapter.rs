//! Capability detection and request wrapper around a wallet provider.

use std::sync::Arc;

use serde_json::{json, Value};
use tokio::sync::broadcast;
use tracing::{debug, info};

use taskproof_core::{Address, Signature};

use crate::error::ProviderError;
use crate::provider::{methods, WalletProvider};

/// Thin wrapper exposing the four wallet primitives TaskProof needs.
///
/// Whether a provider exists is decided once, at construction.
#[derive(Clone)]
pub struct ProviderAdapter {
    provider: Option<Arc<dyn WalletProvider>>,
}

impl ProviderAdapter {
    /// Wrap a detected provider.
    pub fn new(provider: Arc<dyn WalletProvider>) -> Self {
        Self {
            provider: Some(provider),
        }
    }

    /// An adapter for an environment without a wallet.
    pub fn unavailable() -> Self {
        Self { provider: None }
    }

    /// True iff a wallet provider is present.
    pub fn is_available(&self) -> bool {
        self.provider.is_some()
    }

    fn provider(&self) -> Result<&Arc<dyn WalletProvider>, ProviderError> {
        self.provider.as_ref().ok_or(ProviderError::Unavailable)
    }

    /// Ask the user to authorise an account and return the first one.
    pub async fn request_accounts(&self) -> Result<Address, ProviderError> {
        let provider = self.provider()?;
        info!("Requesting wallet accounts");

        let result = provider.request(methods::REQUEST_ACCOUNTS, json!([])).await?;
        let address = parse_accounts(result)?
            .into_iter()
            .next()
            .ok_or(ProviderError::NoAccounts)?;

        info!(address = %address, "Wallet account authorised");
        Ok(address)
    }

    /// Best-effort query of already-authorised accounts. Never prompts.
    pub async fn current_account(&self) -> Option<Address> {
        let provider = self.provider.as_ref()?;

        match provider.request(methods::ACCOUNTS, json!([])).await {
            Ok(result) => match parse_accounts(result) {
                Ok(accounts) => accounts.into_iter().next(),
                Err(e) => {
                    debug!(error = %e, "Ignoring malformed eth_accounts result");
                    None
                }
            },
            Err(e) => {
                debug!(error = %e, "Account probe failed");
                None
            }
        }
    }

    /// Ask the user to sign `message` with `address` (`personal_sign`).
    pub async fn sign(&self, message: &str, address: &Address) -> Result<Signature, ProviderError> {
        let provider = self.provider()?;
        info!(address = %address, message_len = message.len(), "Requesting signature");

        let result = provider
            .request(methods::PERSONAL_SIGN, json!([message, address.as_str()]))
            .await?;

        match result {
            Value::String(s) => {
                Signature::new(s).map_err(|e| ProviderError::InvalidResponse(e.to_string()))
            }
            other => Err(ProviderError::InvalidResponse(format!(
                "expected signature string, got {}",
                other
            ))),
        }
    }

    /// Subscribe to account-set changes, if a provider is present.
    pub fn account_changes(&self) -> Option<broadcast::Receiver<Vec<Address>>> {
        self.provider.as_ref().map(|p| p.account_changes())
    }
}

/// Parse an `eth_accounts`-style result into addresses.
pub(crate) fn parse_accounts(result: Value) -> Result<Vec<Address>, ProviderError> {
    let raw: Vec<String> = serde_json::from_value(result)
        .map_err(|e| ProviderError::InvalidResponse(format!("accounts: {}", e)))?;

    raw.into_iter()
        .map(|a| Address::parse(a).map_err(|e| ProviderError::InvalidResponse(e.to_string())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockWallet;

    const ALICE: &str = "0xa11ce00000000000000000000000000000000001";

    fn alice() -> Address {
        Address::parse(ALICE).unwrap()
    }

    #[tokio::test]
    async fn test_unavailable_fails_fast() {
        let adapter = ProviderAdapter::unavailable();
        assert!(!adapter.is_available());
        assert!(matches!(
            adapter.request_accounts().await,
            Err(ProviderError::Unavailable)
        ));
        assert!(matches!(
            adapter.sign("hi", &alice()).await,
            Err(ProviderError::Unavailable)
        ));
        assert!(adapter.current_account().await.is_none());
        assert!(adapter.account_changes().is_none());
    }

    #[tokio::test]
    async fn test_request_accounts_returns_first() {
        let second = Address::parse("0xb0b0000000000000000000000000000000000002").unwrap();
        let wallet = Arc::new(MockWallet::new(vec![alice(), second]));
        let adapter = ProviderAdapter::new(wallet.clone());

        assert_eq!(adapter.request_accounts().await.unwrap(), alice());
        assert_eq!(wallet.call_count(methods::REQUEST_ACCOUNTS), 1);
    }

    #[tokio::test]
    async fn test_request_accounts_rejected() {
        let wallet = Arc::new(MockWallet::new(vec![alice()]));
        wallet.reject_connect();
        let adapter = ProviderAdapter::new(wallet);

        assert!(matches!(
            adapter.request_accounts().await,
            Err(ProviderError::UserRejected)
        ));
    }

    #[tokio::test]
    async fn test_request_accounts_empty() {
        let adapter = ProviderAdapter::new(Arc::new(MockWallet::new(vec![])));
        assert!(matches!(
            adapter.request_accounts().await,
            Err(ProviderError::NoAccounts)
        ));
    }

    #[tokio::test]
    async fn test_current_account_requires_prior_authorisation() {
        let wallet = Arc::new(MockWallet::new(vec![alice()]));
        let adapter = ProviderAdapter::new(wallet.clone());

        assert!(adapter.current_account().await.is_none());
        wallet.authorize();
        assert_eq!(adapter.current_account().await, Some(alice()));
    }

    #[tokio::test]
    async fn test_current_account_swallows_errors() {
        let wallet = Arc::new(MockWallet::new(vec![alice()]));
        wallet.authorize();
        wallet.fail_account_queries();
        let adapter = ProviderAdapter::new(wallet);

        assert!(adapter.current_account().await.is_none());
    }

    #[tokio::test]
    async fn test_sign_passes_message_and_address() {
        let wallet = Arc::new(MockWallet::new(vec![alice()]));
        let adapter = ProviderAdapter::new(wallet.clone());

        let sig = adapter.sign("hello", &alice()).await.unwrap();
        assert!(sig.as_str().starts_with("0x"));

        let signed = wallet.signed_messages();
        assert_eq!(signed, vec![("hello".to_string(), alice())]);
    }

    #[tokio::test]
    async fn test_sign_rejected() {
        let wallet = Arc::new(MockWallet::new(vec![alice()]));
        wallet.reject_signing();
        let adapter = ProviderAdapter::new(wallet);

        assert!(matches!(
            adapter.sign("hello", &alice()).await,
            Err(ProviderError::UserRejected)
        ));
    }

    #[test]
    fn test_parse_accounts_rejects_non_array() {
        assert!(parse_accounts(json!("0xabc")).is_err());
        assert!(parse_accounts(json!(["nope"])).is_err());
        assert_eq!(parse_accounts(json!([])).unwrap(), Vec::<Address>::new());
    }
}
