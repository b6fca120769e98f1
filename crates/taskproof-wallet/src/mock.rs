//! Scriptable in-process wallet for tests and demos.
//!
//! `MockWallet` answers the same JSON-RPC methods a real wallet does, but
//! every prompt is decided up front by the test.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use tokio::sync::broadcast;
use tracing::trace;

use taskproof_core::Address;

use crate::error::{ProviderError, USER_REJECTED_CODE};
use crate::provider::{methods, WalletProvider};

const METHOD_NOT_FOUND: i64 = -32601;
const INTERNAL_ERROR: i64 = -32603;

/// A wallet that approves everything unless told otherwise.
pub struct MockWallet {
    accounts: Mutex<Vec<Address>>,
    authorized: AtomicBool,
    reject_connect: AtomicBool,
    reject_signing: AtomicBool,
    fail_account_queries: AtomicBool,
    sign_counter: AtomicU64,
    calls: Mutex<Vec<String>>,
    signed: Mutex<Vec<(String, Address)>>,
    changes: broadcast::Sender<Vec<Address>>,
}

impl MockWallet {
    /// Create a wallet holding `accounts`. Nothing is authorised yet.
    pub fn new(accounts: Vec<Address>) -> Self {
        let (changes, _) = broadcast::channel(16);
        Self {
            accounts: Mutex::new(accounts),
            authorized: AtomicBool::new(false),
            reject_connect: AtomicBool::new(false),
            reject_signing: AtomicBool::new(false),
            fail_account_queries: AtomicBool::new(false),
            sign_counter: AtomicU64::new(0),
            calls: Mutex::new(Vec::new()),
            signed: Mutex::new(Vec::new()),
            changes,
        }
    }

    /// Behave as if the user already approved this site earlier.
    pub fn authorize(&self) {
        self.authorized.store(true, Ordering::SeqCst);
    }

    /// Decline every `eth_requestAccounts` prompt.
    pub fn reject_connect(&self) {
        self.reject_connect.store(true, Ordering::SeqCst);
    }

    /// Decline every `personal_sign` prompt.
    pub fn reject_signing(&self) {
        self.reject_signing.store(true, Ordering::SeqCst);
    }

    /// Make `eth_accounts` fail with an internal error.
    pub fn fail_account_queries(&self) {
        self.fail_account_queries.store(true, Ordering::SeqCst);
    }

    /// Replace the account set and notify subscribers, like a user
    /// switching or locking accounts inside the wallet.
    pub fn switch_accounts(&self, accounts: Vec<Address>) {
        *lock(&self.accounts) = accounts.clone();
        // No subscribers is fine.
        let _ = self.changes.send(accounts);
    }

    /// Methods called so far, in order.
    pub fn calls(&self) -> Vec<String> {
        lock(&self.calls).clone()
    }

    /// How many times `method` was called.
    pub fn call_count(&self, method: &str) -> usize {
        lock(&self.calls).iter().filter(|m| *m == method).count()
    }

    /// Every `(message, address)` pair that was signed.
    pub fn signed_messages(&self) -> Vec<(String, Address)> {
        lock(&self.signed).clone()
    }

    fn visible_accounts(&self) -> Vec<String> {
        if self.authorized.load(Ordering::SeqCst) {
            lock(&self.accounts).iter().map(|a| a.to_string()).collect()
        } else {
            Vec::new()
        }
    }

    fn personal_sign(&self, params: &Value) -> Result<Value, ProviderError> {
        let message = params
            .get(0)
            .and_then(Value::as_str)
            .ok_or_else(|| ProviderError::from_rpc(-32602, "missing message"))?;
        let address = params
            .get(1)
            .and_then(Value::as_str)
            .and_then(|a| Address::parse(a).ok())
            .ok_or_else(|| ProviderError::from_rpc(-32602, "missing address"))?;

        if self.reject_signing.load(Ordering::SeqCst) {
            return Err(ProviderError::from_rpc(
                USER_REJECTED_CODE,
                "User denied message signature.",
            ));
        }

        // Distinct per call so repeated signings are distinguishable.
        let nonce = self.sign_counter.fetch_add(1, Ordering::SeqCst);
        let mut hasher = Sha256::new();
        hasher.update(nonce.to_be_bytes());
        hasher.update(address.as_str().as_bytes());
        hasher.update(message.as_bytes());
        let signature = format!("0x{}", hex::encode(hasher.finalize()));

        lock(&self.signed).push((message.to_string(), address));
        Ok(Value::String(signature))
    }
}

#[async_trait]
impl WalletProvider for MockWallet {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
        trace!(method, "Mock wallet request");
        lock(&self.calls).push(method.to_string());

        match method {
            methods::REQUEST_ACCOUNTS => {
                if self.reject_connect.load(Ordering::SeqCst) {
                    return Err(ProviderError::from_rpc(
                        USER_REJECTED_CODE,
                        "User rejected the request.",
                    ));
                }
                self.authorize();
                Ok(json!(self.visible_accounts()))
            }
            methods::ACCOUNTS => {
                if self.fail_account_queries.load(Ordering::SeqCst) {
                    return Err(ProviderError::from_rpc(INTERNAL_ERROR, "wallet locked"));
                }
                Ok(json!(self.visible_accounts()))
            }
            methods::PERSONAL_SIGN => self.personal_sign(&params),
            methods::CHAIN_ID => Ok(json!("0x1")),
            other => Err(ProviderError::from_rpc(
                METHOD_NOT_FOUND,
                format!("method {} not supported", other),
            )),
        }
    }

    fn account_changes(&self) -> broadcast::Receiver<Vec<Address>> {
        self.changes.subscribe()
    }
}

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unknown_method() {
        let wallet = MockWallet::new(vec![]);
        let err = wallet.request("eth_sendTransaction", json!([])).await.unwrap_err();
        assert!(matches!(err, ProviderError::Rpc { code: METHOD_NOT_FOUND, .. }));
        assert_eq!(wallet.calls(), vec!["eth_sendTransaction".to_string()]);
    }

    #[tokio::test]
    async fn test_signatures_differ_per_call() {
        let addr = Address::parse("0xa11ce00000000000000000000000000000000001").unwrap();
        let wallet = MockWallet::new(vec![addr.clone()]);
        let params = json!(["same message", addr.as_str()]);

        let a = wallet.request(methods::PERSONAL_SIGN, params.clone()).await.unwrap();
        let b = wallet.request(methods::PERSONAL_SIGN, params).await.unwrap();
        assert_ne!(a, b);
        assert_eq!(wallet.signed_messages().len(), 2);
    }
}
