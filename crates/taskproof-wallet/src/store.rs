//! Process-wide wallet connection state.
//!
//! `ConnectionStore` is the single source of truth for "which account is
//! connected". It is shared by `Arc` and observed through a
//! `tokio::sync::watch` channel. State only changes through `connect`,
//! `disconnect`, `check_connection` and the account-change reaction, and is
//! never written while a provider request is pending.

use std::sync::Arc;

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use taskproof_core::{Address, ConnectionState, ConnectionStatus};

use crate::adapter::ProviderAdapter;
use crate::error::ProviderError;

/// Shared wallet connection state.
pub struct ConnectionStore {
    adapter: Arc<ProviderAdapter>,
    state: watch::Sender<ConnectionState>,
}

impl ConnectionStore {
    /// Create a new store wrapped in Arc. Starts `Disconnected`.
    pub fn new(adapter: Arc<ProviderAdapter>) -> Arc<Self> {
        let (state, _) = watch::channel(ConnectionState::disconnected());
        Arc::new(Self { adapter, state })
    }

    /// The provider adapter this store drives.
    pub fn adapter(&self) -> &ProviderAdapter {
        &self.adapter
    }

    /// Current state.
    pub fn snapshot(&self) -> ConnectionState {
        self.state.borrow().clone()
    }

    /// Observe state changes.
    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }

    /// Interactively connect. Errors are returned, never swallowed.
    pub async fn connect(&self) -> Result<Address, ProviderError> {
        self.state.send_modify(|s| s.status = ConnectionStatus::Connecting);
        debug!("Connection status -> connecting");

        match self.adapter.request_accounts().await {
            Ok(address) => {
                self.state
                    .send_replace(ConnectionState::connected(address.clone()));
                info!(address = %address, "Wallet connected");
                Ok(address)
            }
            Err(e) => {
                self.state.send_replace(ConnectionState::disconnected());
                warn!(error = %e, "Wallet connection failed");
                Err(e)
            }
        }
    }

    /// Forget the connected account locally.
    ///
    /// The wallet keeps its own authorisation, so a later
    /// [`check_connection`](Self::check_connection) can reconnect silently.
    pub fn disconnect(&self) {
        let changed = self.state.send_if_modified(|s| {
            if *s == ConnectionState::disconnected() {
                false
            } else {
                *s = ConnectionState::disconnected();
                true
            }
        });
        if changed {
            info!("Wallet disconnected");
        }
    }

    /// Adopt an already-authorised account without prompting. Idempotent.
    pub async fn check_connection(&self) {
        if !self.adapter.is_available() {
            return;
        }

        let Some(address) = self.adapter.current_account().await else {
            debug!("No authorised account found");
            return;
        };
        self.adopt(address);
    }

    /// Re-read the authorised account after missed notifications.
    ///
    /// Unlike [`check_connection`](Self::check_connection) this disconnects
    /// when the wallet no longer reports an account.
    pub(crate) async fn resync(&self) {
        match self.adapter.current_account().await {
            Some(address) => self.adopt(address),
            None => {
                debug!("No authorised account after missed events");
                self.disconnect();
            }
        }
    }

    fn adopt(&self, address: Address) {
        let connected = ConnectionState::connected(address.clone());
        let changed = self.state.send_if_modified(|s| {
            if *s == connected {
                false
            } else {
                *s = connected;
                true
            }
        });
        if changed {
            info!(address = %address, "Adopted authorised wallet account");
        }
    }

    /// React to an `accountsChanged` notification.
    pub async fn handle_accounts_changed(&self, accounts: &[Address]) {
        if accounts.is_empty() {
            debug!("Wallet reported no accounts");
            self.disconnect();
        } else {
            debug!(count = accounts.len(), "Wallet reported new accounts");
            self.check_connection().await;
        }
    }

    /// Start reacting to account changes.
    ///
    /// Returns `None` when no provider is present. The listener stops when
    /// the returned handle is dropped or unsubscribed.
    pub fn watch_accounts(self: &Arc<Self>) -> Option<AccountSubscription> {
        let mut changes = self.adapter.account_changes()?;
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let store = Arc::clone(self);

        let handle = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    received = changes.recv() => match received {
                        Ok(accounts) => store.handle_accounts_changed(&accounts).await,
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            // Only the latest set matters; re-probe instead.
                            warn!(skipped, "Missed account change events");
                            store.resync().await;
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    },
                }
            }
            debug!("Account subscription ended");
        });

        Some(AccountSubscription {
            cancel,
            handle: Some(handle),
        })
    }
}

/// Handle for an active account-change listener. Dropping it unsubscribes.
pub struct AccountSubscription {
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl AccountSubscription {
    /// Stop listening and wait for the listener to finish.
    pub async fn unsubscribe(mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }

    /// Returns true while the listener is running.
    pub fn is_active(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for AccountSubscription {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
