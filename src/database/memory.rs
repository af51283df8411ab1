//! In-process [`ScoreStore`] used by tests.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{bounded, ScoreStore, StoreResult};
use crate::score::{Score, ScoreRecord};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

pub struct MemoryStore {
    records: Mutex<BTreeMap<String, Score>>,
    available: AtomicBool,
    delay_ms: AtomicU64,
    writes: AtomicUsize,
    timeout: Duration,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call is cut off after `timeout`, like [`super::SqlStore`] calls are.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            records: Mutex::new(BTreeMap::new()),
            available: AtomicBool::new(true),
            delay_ms: AtomicU64::new(0),
            writes: AtomicUsize::new(0),
            timeout,
        }
    }

    /// While unavailable every call fails the way a dropped connection would.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Makes every call wait `delay` before touching the records.
    pub fn set_delay(&self, delay: Duration) {
        let millis = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self.delay_ms.store(millis, Ordering::SeqCst);
    }

    /// Number of writes applied so far.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub async fn snapshot(&self) -> BTreeMap<String, Score> {
        self.records.lock().await.clone()
    }

    /// Simulated round trip: fails when unavailable, then waits out the delay.
    async fn round_trip(&self) -> Result<(), sqlx::Error> {
        if !self.available.load(Ordering::SeqCst) {
            return Err(sqlx::Error::PoolClosed);
        }
        let delay = self.delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        Ok(())
    }

    fn record_write(&self) {
        self.writes.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl ScoreStore for MemoryStore {
    async fn get_by_key(&self, user_name: &str) -> StoreResult<Option<ScoreRecord>> {
        bounded("get by key", self.timeout, async {
            self.round_trip().await?;
            let records = self.records.lock().await;
            Ok::<_, sqlx::Error>(records
                .get(user_name)
                .map(|&score| ScoreRecord::new(user_name, score)))
        })
        .await
    }

    async fn put(&self, record: &ScoreRecord) -> StoreResult<()> {
        bounded("put", self.timeout, async {
            self.round_trip().await?;
            let mut records = self.records.lock().await;
            records.insert(record.user_name.clone(), record.score);
            self.record_write();
            Ok::<_, sqlx::Error>(())
        })
        .await
    }

    async fn insert_if_absent(&self, record: &ScoreRecord) -> StoreResult<bool> {
        bounded("insert if absent", self.timeout, async {
            self.round_trip().await?;
            let mut records = self.records.lock().await;
            let inserted = !records.contains_key(&record.user_name);
            if inserted {
                records.insert(record.user_name.clone(), record.score);
                self.record_write();
            }
            Ok::<_, sqlx::Error>(inserted)
        })
        .await
    }

    async fn update_if_greater(&self, user_name: &str, candidate: Score) -> StoreResult<bool> {
        bounded("update if greater", self.timeout, async {
            self.round_trip().await?;
            let mut records = self.records.lock().await;
            let applied = match records.get_mut(user_name) {
                Some(score) if candidate > *score => {
                    *score = candidate;
                    true
                }
                _ => false,
            };
            if applied {
                self.record_write();
            }
            Ok::<_, sqlx::Error>(applied)
        })
        .await
    }

    async fn query_top_n(&self, n: usize) -> StoreResult<Vec<ScoreRecord>> {
        bounded("query top n", self.timeout, async {
            self.round_trip().await?;
            let records = self.records.lock().await;
            let mut ranked: Vec<ScoreRecord> = records
                .iter()
                .map(|(user_name, &score)| ScoreRecord::new(user_name.as_str(), score))
                .collect();
            ranked.sort();
            ranked.truncate(n);
            Ok::<_, sqlx::Error>(ranked)
        })
        .await
    }
}
