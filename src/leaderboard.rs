use rocket::serde::{Deserialize, Serialize};

use crate::database::SharedStore;
use crate::error::{LedgerError, ValidationError};
use crate::score::ScoreRecord;

/// Largest `limit` a caller may ask for.
pub const MAX_LIMIT: usize = 100;
pub const DEFAULT_LIMIT: usize = 5;

/// A ranked list of items, best first. Serialized as a plain array.
#[derive(Debug, Clone, PartialEq)]
pub struct Leaderboard<T: LeaderboardItem> {
    collection: Vec<T>,
}

impl<T: LeaderboardItem> Leaderboard<T> {
    /// Wraps items that are already in ranking order.
    pub fn new(collection: Vec<T>) -> Self {
        Self { collection }
    }
}

#[cfg(test)]
impl<T: LeaderboardItem> Leaderboard<T> {
    pub fn into_inner(self) -> Vec<T> {
        self.collection
    }
}

impl<T: LeaderboardItem> Serialize for Leaderboard<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: rocket::serde::Serializer,
    {
        self.collection.serialize(serializer)
    }
}

impl<'de, T: LeaderboardItem> Deserialize<'de> for Leaderboard<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: rocket::serde::Deserializer<'de>,
    {
        Ok(Self::new(Vec::deserialize(deserializer)?))
    }
}

/// Anything that can be ranked: `Ord` yields ranking order, best item first.
pub trait LeaderboardItem: Ord + Serialize {}

impl<T: Ord + Serialize> LeaderboardItem for T {}

/// Read path: derives the top of the leaderboard from the store on every call.
pub struct RankedView {
    store: SharedStore,
    default_limit: usize,
}

impl RankedView {
    pub fn new(store: SharedStore, default_limit: usize) -> Self {
        Self {
            store,
            default_limit,
        }
    }

    /// Returns at most `limit` records (the default limit when `None`),
    /// highest score first, ties broken by user name ascending.
    pub async fn top_scores(
        &self,
        limit: Option<i64>,
    ) -> Result<Leaderboard<ScoreRecord>, LedgerError> {
        let limit = match limit {
            None => self.default_limit,
            Some(limit) => validate_limit(limit)?,
        };

        let records = self.store.query_top_n(limit).await?;
        tracing::debug!(limit, returned = records.len(), "served top scores");
        Ok(Leaderboard::new(records))
    }
}

/// Parses a raw `limit` query value.
pub fn parse_limit(raw: &str) -> Result<i64, ValidationError> {
    raw.trim()
        .parse()
        .map_err(|_| ValidationError::MalformedLimit {
            value: raw.to_owned(),
        })
}

pub fn validate_limit(limit: i64) -> Result<usize, ValidationError> {
    match usize::try_from(limit) {
        Ok(limit) if (1..=MAX_LIMIT).contains(&limit) => Ok(limit),
        _ => Err(ValidationError::InvalidLimit {
            limit,
            max: MAX_LIMIT,
        }),
    }
}
