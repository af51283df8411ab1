use rocket::serde::Serialize;

use crate::database::SharedStore;
use crate::error::LedgerError;
use crate::score::{validate_user_name, Score, ScoreRecord};

/// What a submission did to the stored record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(crate = "rocket::serde", rename_all = "lowercase")]
pub enum SubmitOutcome {
    Created,
    Updated,
    Unchanged,
}

/// Applies the accept-if-better policy: a player's stored score only moves up,
/// and is set to the submitted value when it does.
pub struct ScoreLedger {
    store: SharedStore,
}

impl ScoreLedger {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Records `score` for `user_name`.
    ///
    /// Applies at most one write. Store errors are returned as they are,
    /// without retrying; resubmitting the same score is always safe.
    pub async fn submit(&self, user_name: &str, score: Score) -> Result<SubmitOutcome, LedgerError> {
        validate_user_name(user_name)?;

        let outcome = self.apply(user_name, score).await.map_err(|err| {
            tracing::warn!(user_name, score, "submission failed: {}", err);
            err
        })?;

        tracing::debug!(user_name, score, ?outcome, "submission applied");
        Ok(outcome)
    }

    async fn apply(&self, user_name: &str, score: Score) -> Result<SubmitOutcome, LedgerError> {
        if self.store.get_by_key(user_name).await?.is_none() {
            let record = ScoreRecord::new(user_name, score);
            if self.store.insert_if_absent(&record).await? {
                return Ok(SubmitOutcome::Created);
            }
            // Another submission created the record first.
        }

        if self.store.update_if_greater(user_name, score).await? {
            Ok(SubmitOutcome::Updated)
        } else {
            Ok(SubmitOutcome::Unchanged)
        }
    }
}
