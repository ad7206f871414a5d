//! Side-channel operation recorder
//!
//! Producers use this to write their own audit records. Storage failures are
//! reduced to a warning: an operation must never fail merely because its own
//! log entry could not be written. Validation failures are still surfaced —
//! they indicate a caller bug, not a flaky medium.

use crate::error::{StoreError, StoreResult};
use crate::store::{LogEntry, LogStore, NewLogEntry};
use tracing::warn;

/// Recorder wrapping a [`LogStore`] with the swallow-storage-errors policy.
#[derive(Clone)]
pub struct OperationRecorder {
    store: LogStore,
    application_name: Option<String>,
    environment: Option<String>,
}

impl OperationRecorder {
    pub fn new(store: LogStore) -> Self {
        Self {
            store,
            application_name: None,
            environment: None,
        }
    }

    /// Stamp every recorded entry with an application name and environment
    /// unless the producer set them explicitly.
    pub fn with_application(
        mut self,
        application_name: impl Into<String>,
        environment: impl Into<String>,
    ) -> Self {
        self.application_name = Some(application_name.into());
        self.environment = Some(environment.into());
        self
    }

    /// Record one operation.
    ///
    /// Returns `Ok(Some(entry))` when stored, `Ok(None)` when the storage
    /// medium failed (warned, not propagated), and `Err` only for validation
    /// failures in the entry itself.
    pub async fn record(&self, mut entry: NewLogEntry) -> StoreResult<Option<LogEntry>> {
        if entry.application_name.is_none() {
            entry.application_name = self.application_name.clone();
        }
        if entry.environment.is_none() {
            entry.environment = self.environment.clone();
        }

        match self.store.insert(entry).await {
            Ok(stored) => Ok(Some(stored)),
            Err(err @ StoreError::Validation(_)) => Err(err),
            Err(err) => {
                warn!(
                    error = %err,
                    "failed to write correlation log entry, dropping it"
                );
                crate::metrics::record_dropped_entry();
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::correlation::{snapshot, CorrelationTracker, NoContext};

    async fn create_recorder() -> (OperationRecorder, LogStore) {
        let store = LogStore::in_memory().await.unwrap();
        let recorder =
            OperationRecorder::new(store.clone()).with_application("orders", "Testing");
        (recorder, store)
    }

    #[tokio::test]
    async fn test_record_stamps_application_defaults() {
        let (recorder, store) = create_recorder().await;

        let stored = recorder
            .record(NewLogEntry::new("corr-1", "API_CALL", "GetOrder"))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(stored.application_name, Some("orders".to_string()));
        assert_eq!(stored.environment, Some("Testing".to_string()));

        let fetched = store.get(&stored.id).await.unwrap();
        assert_eq!(fetched.application_name, Some("orders".to_string()));
    }

    #[tokio::test]
    async fn test_record_keeps_explicit_application() {
        let (recorder, _store) = create_recorder().await;

        let mut entry = NewLogEntry::new("corr-1", "API_CALL", "GetOrder");
        entry.application_name = Some("billing".to_string());

        let stored = recorder.record(entry).await.unwrap().unwrap();
        assert_eq!(stored.application_name, Some("billing".to_string()));
    }

    #[tokio::test]
    async fn test_record_surfaces_validation_errors() {
        let (recorder, _store) = create_recorder().await;

        let result = recorder
            .record(NewLogEntry::new("", "API_CALL", "GetOrder"))
            .await;
        assert!(matches!(result, Err(StoreError::Validation(_))));
    }

    #[tokio::test]
    async fn test_record_from_snapshot() {
        let (recorder, store) = create_recorder().await;

        let tracker = CorrelationTracker::new();
        let scope = tracker.open_scope();
        let meta = snapshot(&tracker, &NoContext, &NoContext);

        let entry = NewLogEntry::from_metadata(&meta, "BUSINESS_OPERATION", "PlaceOrder");
        let stored = recorder.record(entry).await.unwrap().unwrap();
        assert_eq!(stored.correlation_id, scope.id());

        let found = store.find_by_correlation_id(scope.id()).await.unwrap();
        assert_eq!(found.len(), 1);
    }
}
