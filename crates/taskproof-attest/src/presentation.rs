//! What a front end shows for a task's attestation.
//!
//! Verification state comes from task data alone. The `Signing` state is
//! layered on top by the caller through a [`SigningGate`].

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use taskproof_core::{ConnectionState, ConnectionStatus, Task, TaskId, VerificationState};

/// `Verified` iff the task carries an attestation.
pub fn display_state(task: &Task) -> VerificationState {
    if task.is_attested() {
        VerificationState::Verified
    } else {
        VerificationState::Unverified
    }
}

/// Display state combined with the caller's in-flight flag.
///
/// A stored attestation always wins over the flag.
pub fn view_state(task: &Task, signing: bool) -> VerificationState {
    match display_state(task) {
        VerificationState::Unverified if signing => VerificationState::Signing,
        state => state,
    }
}

/// One-line description of the wallet connection.
pub fn describe_connection(state: &ConnectionState) -> String {
    match (state.status, &state.address) {
        (ConnectionStatus::Connected, Some(address)) => format!("Connected as {}", address.short()),
        (ConnectionStatus::Connecting, _) => "Connecting…".to_string(),
        _ => "Not connected".to_string(),
    }
}

/// Per-task "signing in progress" flags owned by a front end.
///
/// Cloning shares the same set of flags.
#[derive(Clone, Default)]
pub struct SigningGate {
    in_flight: Arc<Mutex<HashSet<TaskId>>>,
}

impl SigningGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the flag for `task_id`, or `None` if it is already raised.
    pub fn try_begin(&self, task_id: &TaskId) -> Option<SigningGuard> {
        if lock(&self.in_flight).insert(task_id.clone()) {
            Some(SigningGuard {
                in_flight: Arc::clone(&self.in_flight),
                task_id: task_id.clone(),
            })
        } else {
            None
        }
    }

    /// Whether `task_id` is being signed right now.
    pub fn is_signing(&self, task_id: &TaskId) -> bool {
        lock(&self.in_flight).contains(task_id)
    }

    /// [`view_state`] with this gate's flag for the task.
    pub fn view_state(&self, task: &Task) -> VerificationState {
        view_state(task, self.is_signing(&task.id))
    }
}

/// Lowers its task's signing flag when dropped, on every exit path.
pub struct SigningGuard {
    in_flight: Arc<Mutex<HashSet<TaskId>>>,
    task_id: TaskId,
}

impl SigningGuard {
    /// Task this guard covers.
    pub fn task_id(&self) -> &TaskId {
        &self.task_id
    }
}

impl Drop for SigningGuard {
    fn drop(&mut self) {
        lock(&self.in_flight).remove(&self.task_id);
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskproof_core::{Address, Signature};

    fn unverified() -> Task {
        Task::new("t1", "Write report")
    }

    fn verified() -> Task {
        Task::new("t2", "Ship release").with_attestation(Signature::new("0xfeed").unwrap())
    }

    #[test]
    fn test_display_state_has_two_values() {
        assert_eq!(display_state(&unverified()), VerificationState::Unverified);
        assert_eq!(display_state(&verified()), VerificationState::Verified);
    }

    #[test]
    fn test_view_state_signing_flag() {
        assert_eq!(view_state(&unverified(), true), VerificationState::Signing);
        assert_eq!(view_state(&unverified(), false), VerificationState::Unverified);
        assert_eq!(view_state(&verified(), true), VerificationState::Verified);
    }

    #[test]
    fn test_gate_blocks_reentry_and_clears_on_drop() {
        let gate = SigningGate::new();
        let task = unverified();

        let guard = gate.try_begin(&task.id).expect("first begin succeeds");
        assert!(gate.try_begin(&task.id).is_none());
        assert_eq!(gate.view_state(&task), VerificationState::Signing);

        // Other tasks are independent.
        assert!(gate.try_begin(&TaskId::new("other")).is_some());

        drop(guard);
        assert!(!gate.is_signing(&task.id));
        assert_eq!(gate.view_state(&task), VerificationState::Unverified);
    }

    #[test]
    fn test_gate_clones_share_flags() {
        let gate = SigningGate::new();
        let other = gate.clone();
        let _guard = gate.try_begin(&TaskId::new("t1")).unwrap();
        assert!(other.is_signing(&TaskId::new("t1")));
    }

    #[test]
    fn test_describe_connection() {
        let addr = Address::parse("0xabc0000000000000000000000000000000000123").unwrap();
        assert_eq!(
            describe_connection(&ConnectionState::connected(addr)),
            "Connected as 0xabc0…0123"
        );
        assert_eq!(
            describe_connection(&ConnectionState::disconnected()),
            "Not connected"
        );
        let connecting = ConnectionState {
            address: None,
            status: ConnectionStatus::Connecting,
        };
        assert_eq!(describe_connection(&connecting), "Connecting…");
    }
}
