//! Backend seams used by the attestation flow and front ends.

use async_trait::async_trait;

use taskproof_core::{Signature, Task, TaskId};

use crate::error::ClientError;

/// Where attestation signatures are persisted.
///
/// Writes are keyed by task id and idempotent: the last write wins.
#[async_trait]
pub trait AttestationSink: Send + Sync {
    /// Store `signature` as the attestation of `task_id`.
    async fn store_attestation(
        &self,
        task_id: &TaskId,
        signature: &Signature,
    ) -> Result<(), ClientError>;
}

/// Where authoritative task records are read from.
#[async_trait]
pub trait TaskSource: Send + Sync {
    /// Fetch one task.
    async fn fetch_task(&self, task_id: &TaskId) -> Result<Task, ClientError>;
}
