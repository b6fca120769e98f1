//! Core domain errors.

use thiserror::Error;

/// Core domain errors for TaskProof.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Address is not a `0x`-prefixed hex string.
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Signature string was empty.
    #[error("Invalid signature: {0}")]
    InvalidSignature(String),
}
