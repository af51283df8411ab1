use std::time::Duration;

use async_trait::async_trait;
use sqlx::any::{AnyPoolOptions, AnyRow};
use sqlx::Row;

use super::{bounded, ScoreStore, StoreResult};
use crate::config::Config;
use crate::score::{Score, ScoreRecord};

pub type DatabasePool = sqlx::AnyPool;

const CREATE_TABLE: &str =
    "CREATE TABLE IF NOT EXISTS scores (user_name TEXT PRIMARY KEY, score BIGINT NOT NULL)";
const CREATE_SCORE_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS scores_score_idx ON scores (score DESC)";

/// [`ScoreStore`] backed by a PostgreSQL or SQLite database through the sqlx `Any` driver.
pub struct SqlStore {
    pool: DatabasePool,
    timeout: Duration,
}

fn decode_record(row: &AnyRow) -> Result<ScoreRecord, sqlx::Error> {
    let user_name = row.try_get::<String, _>("user_name")?;
    let score = row.try_get::<Score, _>("score")?;
    Ok(ScoreRecord { user_name, score })
}

impl SqlStore {
    /// Opens a connection pool to `config.database_url`.
    pub async fn connect(config: &Config) -> StoreResult<Self> {
        sqlx::any::install_default_drivers();

        let timeout = config.store_timeout;
        let pool = bounded(
            "connect",
            timeout,
            AnyPoolOptions::new()
                .max_connections(config.max_connections)
                .acquire_timeout(timeout)
                .connect(&config.database_url),
        )
        .await?;

        tracing::info!(
            max_connections = config.max_connections,
            ?timeout,
            "connected to the score store"
        );
        Ok(Self { pool, timeout })
    }

    /// Creates the `scores` table and its score index if they are missing.
    pub async fn migrate(&self) -> StoreResult<()> {
        bounded(
            "create table",
            self.timeout,
            sqlx::query(CREATE_TABLE).execute(&self.pool),
        )
        .await?;
        bounded(
            "create index",
            self.timeout,
            sqlx::query(CREATE_SCORE_INDEX).execute(&self.pool),
        )
        .await?;
        Ok(())
    }

    /// Waits for checked out connections and closes the pool.
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::info!("score store connection closed");
    }
}

#[async_trait]
impl ScoreStore for SqlStore {
    async fn get_by_key(&self, user_name: &str) -> StoreResult<Option<ScoreRecord>> {
        bounded("get by key", self.timeout, async {
            let row = sqlx::query("SELECT user_name, score FROM scores WHERE user_name = $1")
                .bind(user_name)
                .fetch_optional(&self.pool)
                .await?;
            row.as_ref().map(decode_record).transpose()
        })
        .await
    }

    async fn put(&self, record: &ScoreRecord) -> StoreResult<()> {
        bounded(
            "put",
            self.timeout,
            sqlx::query(
                "INSERT INTO scores (user_name, score) VALUES ($1, $2) \
                 ON CONFLICT (user_name) DO UPDATE SET score = excluded.score",
            )
            .bind(record.user_name.as_str())
            .bind(record.score)
            .execute(&self.pool),
        )
        .await?;
        Ok(())
    }

    async fn insert_if_absent(&self, record: &ScoreRecord) -> StoreResult<bool> {
        let result = bounded(
            "insert if absent",
            self.timeout,
            sqlx::query(
                "INSERT INTO scores (user_name, score) VALUES ($1, $2) \
                 ON CONFLICT (user_name) DO NOTHING",
            )
            .bind(record.user_name.as_str())
            .bind(record.score)
            .execute(&self.pool),
        )
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn update_if_greater(&self, user_name: &str, candidate: Score) -> StoreResult<bool> {
        // Comparison and write happen in one statement so concurrent writers cannot interleave.
        let result = bounded(
            "update if greater",
            self.timeout,
            sqlx::query("UPDATE scores SET score = $1 WHERE user_name = $2 AND score < $3")
                .bind(candidate)
                .bind(user_name)
                .bind(candidate)
                .execute(&self.pool),
        )
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn query_top_n(&self, n: usize) -> StoreResult<Vec<ScoreRecord>> {
        let limit = i64::try_from(n).unwrap_or(i64::MAX);
        bounded("query top n", self.timeout, async {
            let rows = sqlx::query(
                "SELECT user_name, score FROM scores ORDER BY score DESC, user_name ASC LIMIT $1",
            )
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
            rows.iter().map(decode_record).collect()
        })
        .await
    }
}
