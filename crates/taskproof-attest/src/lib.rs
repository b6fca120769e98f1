//! Task attestation for TaskProof.
//!
//! Ties the wallet connection and the task backend together:
//!
//! - [`AttestationFlow`] connects, signs and persists one attestation.
//! - [`presentation`] derives what a front end shows for a task.
//! - [`TaskAttestor`] is the front-end helper that gates re-entrant
//!   attestation and refreshes the task afterwards.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use taskproof_attest::{AttestationFlow, TaskAttestor, AttestOutcome};
//! use taskproof_client::HttpClient;
//! use taskproof_core::TaskId;
//! use taskproof_wallet::{ConnectionStore, ProviderAdapter};
//!
//! async fn run(adapter: ProviderAdapter) -> Result<(), Box<dyn std::error::Error>> {
//!     let store = ConnectionStore::new(Arc::new(adapter));
//!     let backend = Arc::new(HttpClient::new("http://localhost:3000/api"));
//!     let attestor = TaskAttestor::new(AttestationFlow::new(store, backend.clone()), backend.clone());
//!
//!     let task = backend.get_task(&TaskId::new("t42")).await?;
//!     if let AttestOutcome::Attested { record, .. } = attestor.attest_task(&task).await? {
//!         println!("Signed by {}", record.signer);
//!     }
//!     Ok(())
//! }
//! ```

mod controller;
mod error;
mod flow;
pub mod presentation;

pub use controller::{AttestOutcome, TaskAttestor};
pub use error::AttestError;
pub use flow::AttestationFlow;
pub use presentation::{display_state, view_state, SigningGate, SigningGuard};
