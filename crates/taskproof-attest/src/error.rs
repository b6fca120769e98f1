//! Attestation error taxonomy.

use thiserror::Error;

use taskproof_client::ClientError;
use taskproof_wallet::ProviderError;

/// Why an attestation attempt stopped.
///
/// Every failure of the flow maps to exactly one variant. None is retried
/// automatically; the user starts over.
#[derive(Debug, Error)]
pub enum AttestError {
    /// No wallet provider in this environment.
    #[error("no wallet provider available")]
    ProviderMissing,

    /// The signer address could not be resolved.
    #[error("wallet connection failed: {0}")]
    ConnectionRejected(#[source] ProviderError),

    /// The signature was not produced.
    #[error("signing failed: {0}")]
    SigningRejected(#[source] ProviderError),

    /// The backend did not store the signature.
    #[error("failed to persist attestation: {0}")]
    PersistenceFailed(#[source] ClientError),
}

impl AttestError {
    /// Message suitable for showing to the user.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::ProviderMissing => {
                "No wallet found. Install or start an Ethereum wallet and try again."
            }
            Self::ConnectionRejected(_) => {
                "Wallet connection was not approved. Connect your wallet to verify this task."
            }
            Self::SigningRejected(_) => {
                "The signature request was declined. The task was not verified."
            }
            Self::PersistenceFailed(_) => {
                "The signature could not be saved. Please try verifying the task again."
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_user_messages_are_distinct() {
        let errors = [
            AttestError::ProviderMissing,
            AttestError::ConnectionRejected(ProviderError::UserRejected),
            AttestError::SigningRejected(ProviderError::UserRejected),
            AttestError::PersistenceFailed(ClientError::NotFound("/tasks/x".into())),
        ];
        let messages: HashSet<_> = errors.iter().map(|e| e.user_message()).collect();
        assert_eq!(messages.len(), errors.len());
    }
}
