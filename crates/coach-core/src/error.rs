//! Error types for the coaching engine.

use thiserror::Error;

/// Unified error type the orchestrator and CLI deal with.
///
/// Concrete collaborator errors (`coach-market::MarketDataError`,
/// `coach-store::StoreError`) convert into this via `From` impls owned by
/// their respective crates, so `coach-core` never depends on them directly.
#[derive(Error, Debug)]
pub enum CoachError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("market data error: {0}")]
    MarketData(String),

    #[error("store error: {0}")]
    Store(String),

    #[error("operation cancelled")]
    Cancelled,

    #[error("internal error: {0}")]
    Internal(String),
}

impl CoachError {
    /// Process exit code for this error, per the CLI's contract.
    pub fn exit_code(&self) -> i32 {
        match self {
            CoachError::InvalidInput(_) => 2,
            CoachError::MarketData(_) => 3,
            CoachError::Store(_) => 4,
            CoachError::Cancelled | CoachError::Internal(_) => 1,
        }
    }
}

/// Result type alias for coaching-engine operations.
pub type Result<T> = std::result::Result<T, CoachError>;
