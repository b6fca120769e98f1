//! JSON-RPC over HTTP wallet provider.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use taskproof_core::Address;

use crate::adapter::parse_accounts;
use crate::error::ProviderError;
use crate::provider::{methods, WalletProvider};
use crate::rpc::{JsonRpcRequest, JsonRpcResponse};

/// Wallet provider reached over HTTP JSON-RPC, such as a desktop wallet
/// listening on localhost.
///
/// HTTP has no push channel, so `accountsChanged` is emulated by
/// [`HttpWalletProvider::spawn_account_poller`].
pub struct HttpWalletProvider {
    inner: reqwest::Client,
    endpoint: String,
    changes: broadcast::Sender<Vec<Address>>,
}

impl HttpWalletProvider {
    /// Create a new provider for `endpoint`.
    pub fn new(endpoint: &str) -> Self {
        let (changes, _) = broadcast::channel(16);
        Self {
            inner: reqwest::Client::new(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            changes,
        }
    }

    /// The JSON-RPC endpoint.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Probe `endpoint` and return a provider only if a wallet answers.
    pub async fn detect(endpoint: &str, timeout: Duration) -> Option<Arc<Self>> {
        let provider = Self::new(endpoint);
        if provider.probe(timeout).await {
            info!(endpoint = %provider.endpoint, "Wallet provider detected");
            Some(Arc::new(provider))
        } else {
            warn!(endpoint = %provider.endpoint, "No wallet provider detected");
            None
        }
    }

    /// Check whether the endpoint speaks JSON-RPC. Never fails.
    pub async fn probe(&self, timeout: Duration) -> bool {
        let request = JsonRpcRequest::new(methods::CHAIN_ID, json!([]));
        let result: Result<Value, ProviderError> = async {
            let response = self
                .inner
                .post(&self.endpoint)
                .timeout(timeout)
                .json(&request)
                .send()
                .await?;
            let body: JsonRpcResponse = response.json().await?;
            body.into_result()
        }
        .await;

        match result {
            Ok(chain_id) => {
                debug!(chain_id = %chain_id, "Wallet probe succeeded");
                true
            }
            Err(e) => {
                debug!(error = %e, "Wallet probe failed");
                false
            }
        }
    }

    /// Poll `eth_accounts` every `interval` and broadcast changes until
    /// `cancel` fires. The first poll only records a baseline.
    pub fn spawn_account_poller(
        self: &Arc<Self>,
        interval: Duration,
        cancel: CancellationToken,
    ) -> JoinHandle<()> {
        let this = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut last: Option<Vec<Address>> = None;

            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {}
                }

                let accounts = match this.request(methods::ACCOUNTS, json!([])).await {
                    Ok(result) => match parse_accounts(result) {
                        Ok(accounts) => accounts,
                        Err(e) => {
                            debug!(error = %e, "Ignoring malformed account poll");
                            continue;
                        }
                    },
                    Err(e) => {
                        debug!(error = %e, "Account poll failed");
                        continue;
                    }
                };

                if let Some(previous) = &last {
                    if *previous != accounts {
                        info!(count = accounts.len(), "Wallet accounts changed");
                        let _ = this.changes.send(accounts.clone());
                    }
                }
                last = Some(accounts);
            }

            debug!("Account poller stopped");
        })
    }
}

#[async_trait]
impl WalletProvider for HttpWalletProvider {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
        let request = JsonRpcRequest::new(method, params);
        debug!(endpoint = %self.endpoint, method, id = %request.id, "JSON-RPC request");

        // No timeout: interactive prompts wait for the user.
        let response = self.inner.post(&self.endpoint).json(&request).send().await?;

        if !response.status().is_success() {
            return Err(ProviderError::Transport(format!(
                "HTTP {} from {}",
                response.status(),
                self.endpoint
            )));
        }

        let body: JsonRpcResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;
        body.into_result()
    }

    fn account_changes(&self) -> broadcast::Receiver<Vec<Address>> {
        self.changes.subscribe()
    }
}
