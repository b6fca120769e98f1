//! Status enums for wallet connections, tasks, and verification.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of the wallet connection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConnectionStatus {
    /// No account is connected.
    #[default]
    Disconnected,
    /// An interactive connect request is in flight.
    Connecting,
    /// An account is connected.
    Connected,
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
        };
        f.write_str(s)
    }
}

/// Workflow status of a Task, as reported by the task backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    /// Task created but not started.
    #[default]
    Pending,
    /// Task is being worked on.
    InProgress,
    /// Task work is done.
    Completed,
}

/// What a front end shows for a task's attestation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerificationState {
    /// No attestation stored yet.
    Unverified,
    /// An attestation is being produced for this task right now.
    Signing,
    /// An attestation is stored. Terminal.
    Verified,
}

impl VerificationState {
    /// Returns true once the task carries a stored attestation.
    pub fn is_verified(&self) -> bool {
        matches!(self, Self::Verified)
    }
}

impl fmt::Display for VerificationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Unverified => "unverified",
            Self::Signing => "signing",
            Self::Verified => "verified",
        };
        f.write_str(s)
    }
}
