//! Connect, sign and persist one task attestation.

use std::sync::Arc;

use tracing::{info, warn};

use taskproof_client::AttestationSink;
use taskproof_core::{AttestationMessage, AttestationRecord, Clock, SystemClock, TaskId};
use taskproof_wallet::ConnectionStore;

use crate::error::AttestError;

/// Orchestrates a single attestation.
///
/// The flow does not guard against being called twice for the same task.
/// Callers gate re-entry (see [`SigningGate`](crate::SigningGate)); without
/// that gate two signatures can be produced and the backend keeps the last.
pub struct AttestationFlow {
    store: Arc<ConnectionStore>,
    sink: Arc<dyn AttestationSink>,
    clock: Arc<dyn Clock>,
}

impl AttestationFlow {
    /// Create a flow that stamps messages with the system clock.
    pub fn new(store: Arc<ConnectionStore>, sink: Arc<dyn AttestationSink>) -> Self {
        Self {
            store,
            sink,
            clock: Arc::new(SystemClock),
        }
    }

    /// Use a different clock (useful for testing).
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// The connection store this flow reads and connects through.
    pub fn store(&self) -> &Arc<ConnectionStore> {
        &self.store
    }

    /// Attest that `task_id` is complete.
    ///
    /// Steps run strictly in order and stop at the first failure:
    /// provider check, signer resolution, message, signature, persistence.
    /// A connection made along the way is kept even if a later step fails.
    /// On success the caller should re-read the task from the backend.
    pub async fn attest(
        &self,
        task_id: &TaskId,
        task_title: &str,
    ) -> Result<AttestationRecord, AttestError> {
        let adapter = self.store.adapter();
        if !adapter.is_available() {
            warn!(task_id = %task_id, "Attestation aborted: no wallet provider");
            return Err(AttestError::ProviderMissing);
        }

        let connected = self.store.snapshot().connected_address().cloned();
        let signer = match connected {
            Some(address) => address,
            None => self.store.connect().await.map_err(|e| {
                warn!(task_id = %task_id, error = %e, "Attestation aborted: no signer");
                AttestError::ConnectionRejected(e)
            })?,
        };

        let signed_at = self.clock.now();
        let message =
            AttestationMessage::new(task_id.clone(), task_title, signer.clone(), signed_at)
                .render();

        let signature = adapter.sign(&message, &signer).await.map_err(|e| {
            warn!(task_id = %task_id, error = %e, "Attestation aborted: not signed");
            AttestError::SigningRejected(e)
        })?;

        self.sink
            .store_attestation(task_id, &signature)
            .await
            .map_err(|e| {
                warn!(task_id = %task_id, error = %e, "Attestation signed but not persisted");
                AttestError::PersistenceFailed(e)
            })?;

        info!(task_id = %task_id, signer = %signer, "Task attested");
        Ok(AttestationRecord {
            task_id: task_id.clone(),
            signer,
            signature,
            message,
            signed_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    use taskproof_client::MemoryBackend;
    use taskproof_core::{
        Address, ConnectionState, ConnectionStatus, FixedClock, Task, VerificationState,
        MESSAGE_HEADER,
    };
    use taskproof_wallet::mock::MockWallet;
    use taskproof_wallet::{methods, ProviderAdapter, ProviderError};

    use crate::presentation::display_state;

    const SIGNER: &str = "0xabc0000000000000000000000000000000000123";

    fn signer() -> Address {
        Address::parse(SIGNER).unwrap()
    }

    struct Fixture {
        wallet: Arc<MockWallet>,
        backend: Arc<MemoryBackend>,
        flow: AttestationFlow,
    }

    fn fixture() -> Fixture {
        let wallet = Arc::new(MockWallet::new(vec![signer()]));
        let backend = Arc::new(MemoryBackend::with_tasks([
            Task::new("t1", "Write report"),
            Task::new("t42", "Ship release"),
        ]));
        let store = ConnectionStore::new(Arc::new(ProviderAdapter::new(wallet.clone())));
        let clock = Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2026, 10, 19, 9, 0, 0).unwrap(),
        ));
        let flow = AttestationFlow::new(store, backend.clone()).with_clock(clock);
        Fixture {
            wallet,
            backend,
            flow,
        }
    }

    #[tokio::test]
    async fn test_provider_missing() {
        let backend = Arc::new(MemoryBackend::with_tasks([Task::new("t1", "Write report")]));
        let store = ConnectionStore::new(Arc::new(ProviderAdapter::unavailable()));
        let flow = AttestationFlow::new(store.clone(), backend.clone());

        let err = flow.attest(&TaskId::new("t1"), "Write report").await.unwrap_err();
        assert!(matches!(err, AttestError::ProviderMissing));
        assert_eq!(store.snapshot(), ConnectionState::disconnected());
        assert!(backend.writes().is_empty());
    }

    #[tokio::test]
    async fn test_connection_rejected_never_signs() {
        let f = fixture();
        f.wallet.reject_connect();

        let err = f.flow.attest(&TaskId::new("t1"), "Write report").await.unwrap_err();
        assert!(matches!(
            err,
            AttestError::ConnectionRejected(ProviderError::UserRejected)
        ));
        assert_eq!(f.wallet.call_count(methods::PERSONAL_SIGN), 0);
        assert!(f.backend.writes().is_empty());
        assert_eq!(f.flow.store().snapshot().status, ConnectionStatus::Disconnected);
    }

    #[tokio::test]
    async fn test_no_accounts_is_connection_rejected() {
        let backend = Arc::new(MemoryBackend::with_tasks([Task::new("t1", "Write report")]));
        let wallet = Arc::new(MockWallet::new(vec![]));
        let store = ConnectionStore::new(Arc::new(ProviderAdapter::new(wallet.clone())));
        let flow = AttestationFlow::new(store, backend.clone());

        let err = flow.attest(&TaskId::new("t1"), "Write report").await.unwrap_err();
        assert!(matches!(
            err,
            AttestError::ConnectionRejected(ProviderError::NoAccounts)
        ));
        assert_eq!(wallet.call_count(methods::PERSONAL_SIGN), 0);
    }

    #[tokio::test]
    async fn test_signing_rejected_keeps_connection() {
        let f = fixture();
        f.wallet.reject_signing();

        let err = f.flow.attest(&TaskId::new("t1"), "Write report").await.unwrap_err();
        assert!(matches!(
            err,
            AttestError::SigningRejected(ProviderError::UserRejected)
        ));
        assert_eq!(
            f.flow.store().snapshot(),
            ConnectionState::connected(signer())
        );
        assert!(f.backend.writes().is_empty());
        assert!(!f.backend.task(&TaskId::new("t1")).unwrap().is_attested());
    }

    #[tokio::test]
    async fn test_persistence_failure() {
        let f = fixture();
        f.backend.fail_writes(true);

        let err = f.flow.attest(&TaskId::new("t1"), "Write report").await.unwrap_err();
        assert!(matches!(err, AttestError::PersistenceFailed(_)));
        assert_eq!(f.wallet.signed_messages().len(), 1);
        assert!(!f.backend.task(&TaskId::new("t1")).unwrap().is_attested());
        assert!(f.flow.store().snapshot().is_connected());
    }

    #[tokio::test]
    async fn test_full_success_path() {
        let f = fixture();
        let id = TaskId::new("t42");

        let record = f.flow.attest(&id, "Ship release").await.unwrap();
        assert_eq!(record.task_id, id);
        assert_eq!(record.signer, signer());

        let writes = f.backend.writes();
        assert_eq!(writes, vec![(id.clone(), record.signature.clone())]);

        let signed = f.wallet.signed_messages();
        assert_eq!(signed.len(), 1);
        assert_eq!(signed[0].0, record.message);
        assert_eq!(signed[0].1, signer());
        assert!(record.message.starts_with(MESSAGE_HEADER));
        assert!(record.message.contains("Task ID: t42"));
        assert!(record.message.contains("Task: Ship release"));
        assert!(record.message.contains(SIGNER));
        assert!(record.message.contains("2026-10-19T09:00:00.000Z"));

        let task = f.backend.task(&id).unwrap();
        assert_eq!(display_state(&task), VerificationState::Verified);
    }

    #[tokio::test]
    async fn test_reuses_existing_connection() {
        let f = fixture();
        f.flow.store().connect().await.unwrap();
        assert_eq!(f.wallet.call_count(methods::REQUEST_ACCOUNTS), 1);

        f.flow.attest(&TaskId::new("t1"), "Write report").await.unwrap();
        assert_eq!(f.wallet.call_count(methods::REQUEST_ACCOUNTS), 1);
    }

    #[tokio::test]
    async fn test_concurrent_same_task_last_write_wins() {
        let f = fixture();
        f.flow.store().connect().await.unwrap();
        let id = TaskId::new("t42");

        let (a, b) = tokio::join!(
            f.flow.attest(&id, "Ship release"),
            f.flow.attest(&id, "Ship release"),
        );
        let (a, b) = (a.unwrap(), b.unwrap());
        assert_ne!(a.signature, b.signature);

        let writes = f.backend.writes();
        assert_eq!(writes.len(), 2);
        let (_, last) = writes.last().unwrap();
        let stored = f.backend.task(&id).unwrap().attestation.unwrap();
        assert_eq!(&stored, last);
        assert!(stored == a.signature || stored == b.signature);
    }
}
