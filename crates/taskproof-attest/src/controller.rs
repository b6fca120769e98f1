//! Front-end helper around the attestation flow.

use std::sync::Arc;

use tracing::{debug, warn};

use taskproof_client::TaskSource;
use taskproof_core::{AttestationRecord, Task, VerificationState};

use crate::error::AttestError;
use crate::flow::AttestationFlow;
use crate::presentation::{display_state, SigningGate};

/// Result of asking to attest a task.
#[derive(Debug)]
pub enum AttestOutcome {
    /// A new attestation was stored.
    Attested {
        record: AttestationRecord,
        /// The task re-read from the backend, if that read succeeded.
        refreshed: Option<Task>,
    },
    /// The task already carries an attestation; nothing was requested.
    AlreadyVerified,
    /// An attestation for this task is already in flight.
    InProgress,
}

/// Runs attestations the way a UI should: never for a verified task,
/// never twice at once for the same task, and always followed by a re-read
/// of the authoritative task record.
pub struct TaskAttestor {
    flow: AttestationFlow,
    tasks: Arc<dyn TaskSource>,
    gate: SigningGate,
}

impl TaskAttestor {
    pub fn new(flow: AttestationFlow, tasks: Arc<dyn TaskSource>) -> Self {
        Self {
            flow,
            tasks,
            gate: SigningGate::new(),
        }
    }

    /// The underlying flow.
    pub fn flow(&self) -> &AttestationFlow {
        &self.flow
    }

    /// The signing flags this attestor maintains.
    pub fn gate(&self) -> &SigningGate {
        &self.gate
    }

    /// Current view state of `task`, including the in-flight flag.
    pub fn view_state(&self, task: &Task) -> VerificationState {
        self.gate.view_state(task)
    }

    /// Attest `task` unless it is verified or already being signed.
    pub async fn attest_task(&self, task: &Task) -> Result<AttestOutcome, AttestError> {
        if display_state(task).is_verified() {
            debug!(task_id = %task.id, "Task already verified");
            return Ok(AttestOutcome::AlreadyVerified);
        }

        let Some(_guard) = self.gate.try_begin(&task.id) else {
            debug!(task_id = %task.id, "Attestation already in progress");
            return Ok(AttestOutcome::InProgress);
        };

        let record = self.flow.attest(&task.id, &task.title).await?;

        let refreshed = match self.tasks.fetch_task(&task.id).await {
            Ok(task) => Some(task),
            Err(e) => {
                warn!(task_id = %task.id, error = %e, "Could not refresh task after attestation");
                None
            }
        };

        Ok(AttestOutcome::Attested { record, refreshed })
    }
}
