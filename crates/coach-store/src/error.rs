//! Errors originating from the store.

use coach_core::CoachError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("not found: {0}")]
    NotFound(String),
}

impl From<StoreError> for CoachError {
    fn from(e: StoreError) -> Self {
        CoachError::Store(e.to_string())
    }
}
