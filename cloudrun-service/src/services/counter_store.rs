//! Counter persistence behind a trait so handlers do not care where the
//! record lives.

use async_trait::async_trait;
use service_core::error::AppError;
use tokio::sync::Mutex;

/// Single-record counter store keyed by [`crate::models::COUNTER_ID`].
///
/// Implementations must make `increment` atomic across concurrent callers.
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Current count, `0` when no record exists.
    async fn read(&self) -> Result<i64, AppError>;

    /// Create the record at zero if needed, add one, return the new count.
    async fn increment(&self) -> Result<i64, AppError>;

    /// Delete the record. Clearing an absent record is not an error.
    async fn clear(&self) -> Result<(), AppError>;

    /// Backend liveness probe.
    async fn health_check(&self) -> Result<(), AppError>;
}

/// Process-local store for tests and single-instance development.
#[derive(Default)]
pub struct InMemoryCounterStore {
    record: Mutex<Option<i64>>,
}

impl InMemoryCounterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a record currently exists. Clear removes it entirely.
    pub async fn exists(&self) -> bool {
        self.record.lock().await.is_some()
    }
}

#[async_trait]
impl CounterStore for InMemoryCounterStore {
    async fn read(&self) -> Result<i64, AppError> {
        Ok(self.record.lock().await.unwrap_or(0))
    }

    async fn increment(&self) -> Result<i64, AppError> {
        let mut record = self.record.lock().await;
        let count = record.get_or_insert(0);
        *count += 1;
        Ok(*count)
    }

    async fn clear(&self) -> Result<(), AppError> {
        if self.record.lock().await.take().is_none() {
            tracing::info!("Counter record does not exist, nothing to clear");
        }
        Ok(())
    }

    async fn health_check(&self) -> Result<(), AppError> {
        Ok(())
    }
}
