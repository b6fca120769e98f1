//! Wallet access for TaskProof.
//!
//! This crate wraps an Ethereum-style wallet provider (EIP-1193 request
//! semantics) and keeps the process-wide connection state.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use taskproof_wallet::{ConnectionStore, HttpWalletProvider, ProviderAdapter};
//!
//! async fn connect() -> Result<(), Box<dyn std::error::Error>> {
//!     let adapter = match HttpWalletProvider::detect("http://127.0.0.1:1248", Duration::from_secs(3)).await {
//!         Some(provider) => ProviderAdapter::new(provider),
//!         None => ProviderAdapter::unavailable(),
//!     };
//!
//!     let store = ConnectionStore::new(Arc::new(adapter));
//!     store.check_connection().await;
//!     if !store.snapshot().is_connected() {
//!         let address = store.connect().await?;
//!         println!("Connected as {}", address);
//!     }
//!     Ok(())
//! }
//! ```

mod adapter;
mod error;
mod http;
pub mod mock;
mod provider;
mod rpc;
mod store;

pub use adapter::ProviderAdapter;
pub use error::ProviderError;
pub use http::HttpWalletProvider;
pub use provider::{methods, WalletProvider};
pub use rpc::{JsonRpcError, JsonRpcRequest, JsonRpcResponse};
pub use store::{AccountSubscription, ConnectionStore};
