use rocket::http::Status;
use rocket::response::{self, status, Responder};
use rocket::serde::json::Json;
use rocket::serde::Serialize;
use rocket::Request;
use thiserror::Error;

use crate::database::StoreError;

/// Input rejected before anything reaches the store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("user name must not be empty")]
    EmptyUserName,
    #[error("limit must be a whole number, got {value:?}")]
    MalformedLimit { value: String },
    #[error("limit must be between 1 and {max}, got {limit}")]
    InvalidLimit { limit: i64, max: usize },
}

/// Failures of the submission and retrieval paths.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("score store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),
}

impl LedgerError {
    pub fn status(&self) -> Status {
        match self {
            Self::Validation(_) => Status::BadRequest,
            Self::StoreUnavailable(_) => Status::ServiceUnavailable,
        }
    }
}

pub type RequestResult<T, E = LedgerError> = std::result::Result<T, E>;

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
struct ErrorBody {
    error: String,
}

impl<'r> Responder<'r, 'static> for LedgerError {
    fn respond_to(self, request: &'r Request<'_>) -> response::Result<'static> {
        let status = self.status();
        match &self {
            Self::Validation(err) => tracing::debug!(uri = %request.uri(), "rejected request: {}", err),
            Self::StoreUnavailable(err) => tracing::warn!(uri = %request.uri(), "store failure: {}", err),
        }
        let body = ErrorBody {
            error: self.to_string(),
        };
        status::Custom(status, Json(body)).respond_to(request)
    }
}
