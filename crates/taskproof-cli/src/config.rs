//! CLI configuration.

use std::time::Duration;

/// Runtime configuration for the `taskproof` binary.
#[derive(Debug, Clone)]
pub struct Config {
    /// Wallet JSON-RPC endpoint.
    pub wallet_url: String,

    /// Task backend base URL.
    pub backend_url: String,

    /// How often `watch` polls the wallet for account changes.
    pub poll_interval: Duration,

    /// How long wallet detection waits for an answer.
    pub probe_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            wallet_url: "http://127.0.0.1:1248".to_string(),
            backend_url: "http://localhost:3000/api".to_string(),
            poll_interval: Duration::from_secs(2),
            probe_timeout: Duration::from_secs(3),
        }
    }
}
