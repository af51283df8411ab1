use rocket::serde::{Deserialize, Serialize};

use crate::error::ValidationError;

pub type Score = i64;

/// Best known score of a single player. `user_name` is the primary key.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq, Debug)]
#[serde(crate = "rocket::serde", rename_all = "camelCase")]
pub struct ScoreRecord {
    pub user_name: String,
    pub score: Score,
}

impl ScoreRecord {
    pub fn new(user_name: impl Into<String>, score: Score) -> Self {
        Self {
            user_name: user_name.into(),
            score,
        }
    }
}

/// Records compare in ranking order: higher scores first, then user names ascending.
impl Ord for ScoreRecord {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        other
            .score
            .cmp(&self.score)
            .then_with(|| self.user_name.cmp(&other.user_name))
    }
}

impl PartialOrd for ScoreRecord {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// Inbound submission body: `{ "userName": "...", "score": 10 }`.
#[derive(Clone, Deserialize, Debug)]
#[serde(crate = "rocket::serde", rename_all = "camelCase")]
pub struct ScoreSubmission {
    pub user_name: String,
    pub score: Score,
}

/// Checks that `user_name` can be used as a record key.
pub fn validate_user_name(user_name: &str) -> Result<(), ValidationError> {
    if user_name.trim().is_empty() {
        return Err(ValidationError::EmptyUserName);
    }
    Ok(())
}
