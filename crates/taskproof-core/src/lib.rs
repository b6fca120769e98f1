//! TaskProof Core Domain Types
//!
//! This crate contains pure domain types with no dependencies on:
//! - Wallet providers or JSON-RPC
//! - The task backend
//! - Runtime specifics
//!
//! All types here represent the attestation domain: who signs, what is
//! signed, and where the proof ends up.

pub mod clock;
pub mod error;
pub mod ids;
pub mod message;
pub mod status;
pub mod task;

// Re-export commonly used types
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::CoreError;
pub use ids::{Address, Signature, TaskId};
pub use message::{AttestationMessage, MESSAGE_HEADER};
pub use status::{ConnectionStatus, TaskStatus, VerificationState};
pub use task::{AttestationRecord, ConnectionState, Task};
