//! Task, connection, and attestation record types.

use crate::{Address, ConnectionStatus, Signature, TaskId, TaskStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// A Task as exposed by the task backend.
///
/// Only `id`, `title` and `attestation` matter to the attestation flow; the
/// rest is carried for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Backend-assigned identifier.
    pub id: TaskId,

    /// Human-readable title, embedded in the attestation message.
    pub title: String,

    /// Optional longer description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Who the task is assigned to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,

    /// Workflow status.
    #[serde(default)]
    pub status: TaskStatus,

    /// When the task was created.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    /// Stored attestation signature. Once present it is never replaced.
    #[serde(default, deserialize_with = "blank_as_none")]
    pub attestation: Option<Signature>,
}

impl Task {
    /// Create a new, unattested Task.
    pub fn new(id: impl Into<TaskId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
            assignee: None,
            status: TaskStatus::Pending,
            created_at: None,
            attestation: None,
        }
    }

    /// Builder method to set the status.
    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    /// Builder method to set a stored attestation (useful for testing).
    pub fn with_attestation(mut self, signature: Signature) -> Self {
        self.attestation = Some(signature);
        self
    }

    /// Check whether an attestation has been stored.
    pub fn is_attested(&self) -> bool {
        self.attestation.is_some()
    }
}

/// Backends that clear a column instead of nulling it send `""`.
fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<Signature>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|s| Signature::new(s).ok()))
}

/// Snapshot of the wallet connection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionState {
    /// Connected account, if any.
    pub address: Option<Address>,

    /// Connection status.
    pub status: ConnectionStatus,
}

impl ConnectionState {
    /// The disconnected state.
    pub fn disconnected() -> Self {
        Self::default()
    }

    /// A connected state for the given account.
    pub fn connected(address: Address) -> Self {
        Self {
            address: Some(address),
            status: ConnectionStatus::Connected,
        }
    }

    /// The connected address, only when the status is `Connected`.
    pub fn connected_address(&self) -> Option<&Address> {
        match self.status {
            ConnectionStatus::Connected => self.address.as_ref(),
            _ => None,
        }
    }

    /// Returns true if an account is connected.
    pub fn is_connected(&self) -> bool {
        self.connected_address().is_some()
    }
}

/// Proof returned by a successful attestation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttestationRecord {
    /// Attested task.
    pub task_id: TaskId,

    /// Account that signed.
    pub signer: Address,

    /// Signature over `message`. This is the only persisted part.
    pub signature: Signature,

    /// Exact text that was signed.
    pub message: String,

    /// When the message was built.
    pub signed_at: DateTime<Utc>,
}
