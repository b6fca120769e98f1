//! In-memory task backend for tests and demos.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use tracing::debug;

use taskproof_core::{Signature, Task, TaskId};

use crate::error::ClientError;
use crate::sink::{AttestationSink, TaskSource};

/// Task backend held in memory.
///
/// Every attestation write is recorded in order, so tests can assert how
/// many writes happened and which one won.
#[derive(Default)]
pub struct MemoryBackend {
    tasks: Mutex<HashMap<TaskId, Task>>,
    writes: Mutex<Vec<(TaskId, Signature)>>,
    fail_writes: AtomicBool,
}

impl MemoryBackend {
    /// Create an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a backend holding `tasks`.
    pub fn with_tasks(tasks: impl IntoIterator<Item = Task>) -> Self {
        let backend = Self::new();
        for task in tasks {
            backend.insert(task);
        }
        backend
    }

    /// Insert or replace a task.
    pub fn insert(&self, task: Task) {
        lock(&self.tasks).insert(task.id.clone(), task);
    }

    /// Current copy of a task.
    pub fn task(&self, task_id: &TaskId) -> Option<Task> {
        lock(&self.tasks).get(task_id).cloned()
    }

    /// All attestation writes, in arrival order.
    pub fn writes(&self) -> Vec<(TaskId, Signature)> {
        lock(&self.writes).clone()
    }

    /// Make every following write fail with HTTP 503.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl AttestationSink for MemoryBackend {
    async fn store_attestation(
        &self,
        task_id: &TaskId,
        signature: &Signature,
    ) -> Result<(), ClientError> {
        let path = format!("/tasks/{}/attestation", task_id);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(ClientError::Status { status: 503, path });
        }

        let mut tasks = lock(&self.tasks);
        let task = tasks.get_mut(task_id).ok_or(ClientError::NotFound(path))?;
        task.attestation = Some(signature.clone());
        lock(&self.writes).push((task_id.clone(), signature.clone()));

        debug!(task_id = %task_id, "Stored attestation in memory");
        Ok(())
    }
}

#[async_trait]
impl TaskSource for MemoryBackend {
    async fn fetch_task(&self, task_id: &TaskId) -> Result<Task, ClientError> {
        self.task(task_id)
            .ok_or_else(|| ClientError::NotFound(format!("/tasks/{}", task_id)))
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}
