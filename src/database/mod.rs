use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::score::{Score, ScoreRecord};

#[cfg(test)]
pub mod memory;
mod sql;

pub use sql::SqlStore;

/// Any failure to reach the store or to complete an operation on it.
/// Callers treat every variant as "store unavailable" and may retry.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{operation} timed out after {timeout:?}")]
    Timeout {
        operation: &'static str,
        timeout: Duration,
    },
    #[error("{operation} failed: {source}")]
    Backend {
        operation: &'static str,
        #[source]
        source: sqlx::Error,
    },
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Runs `future` under `timeout`, mapping both timeouts and database errors to [`StoreError`].
/// A future cut off by the timeout is dropped, so it applies nothing further.
async fn bounded<T, F>(operation: &'static str, timeout: Duration, future: F) -> StoreResult<T>
where
    F: Future<Output = Result<T, sqlx::Error>>,
{
    match tokio::time::timeout(timeout, future).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(source)) => Err(StoreError::Backend { operation, source }),
        Err(_) => Err(StoreError::Timeout { operation, timeout }),
    }
}

/// Keyed collection of [`ScoreRecord`]s, one per user name.
///
/// Implementations must be safe for concurrent use without external locking,
/// and `insert_if_absent` and `update_if_greater` must each be evaluated and
/// applied as a single atomic step on the store side.
#[async_trait]
pub trait ScoreStore: Send + Sync {
    /// Point lookup. A missing key is `Ok(None)`, not an error.
    async fn get_by_key(&self, user_name: &str) -> StoreResult<Option<ScoreRecord>>;

    /// Unconditionally creates or replaces the record.
    async fn put(&self, record: &ScoreRecord) -> StoreResult<()>;

    /// Creates the record only if no record with the same key exists.
    /// Returns whether the record was written.
    async fn insert_if_absent(&self, record: &ScoreRecord) -> StoreResult<bool>;

    /// Sets the stored score to `candidate` only if the record exists and
    /// `candidate` is strictly greater than the stored score at write time.
    /// Returns whether the write was applied.
    async fn update_if_greater(&self, user_name: &str, candidate: Score) -> StoreResult<bool>;

    /// At most `n` records, highest score first, ties by user name ascending.
    async fn query_top_n(&self, n: usize) -> StoreResult<Vec<ScoreRecord>>;
}

pub type SharedStore = Arc<dyn ScoreStore>;
