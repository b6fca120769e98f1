//! Error types for wallet provider access.

use thiserror::Error;

/// EIP-1193 code for "the user rejected the request".
pub const USER_REJECTED_CODE: i64 = 4001;

/// Errors that can occur when talking to the wallet provider.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    /// No wallet provider was detected.
    #[error("no wallet provider available")]
    Unavailable,

    /// The user declined the prompt.
    #[error("request rejected by user")]
    UserRejected,

    /// The provider authorised no accounts.
    #[error("wallet returned no accounts")]
    NoAccounts,

    /// Any other JSON-RPC error object.
    #[error("provider error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// Could not reach the provider.
    #[error("transport error: {0}")]
    Transport(String),

    /// The provider answered with something we cannot interpret.
    #[error("invalid provider response: {0}")]
    InvalidResponse(String),
}

impl ProviderError {
    /// Map a JSON-RPC error object onto the taxonomy.
    pub fn from_rpc(code: i64, message: impl Into<String>) -> Self {
        if code == USER_REJECTED_CODE {
            Self::UserRejected
        } else {
            Self::Rpc {
                code,
                message: message.into(),
            }
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_rejection_code() {
        assert!(matches!(
            ProviderError::from_rpc(4001, "User denied"),
            ProviderError::UserRejected
        ));
        assert!(matches!(
            ProviderError::from_rpc(-32603, "internal"),
            ProviderError::Rpc { code: -32603, .. }
        ));
    }
}
