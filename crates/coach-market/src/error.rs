//! Errors originating from market-data adapters.

use coach_core::CoachError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MarketDataError {
    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("symbol not found: {0}")]
    NotFound(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("provider returned no bars for {symbol}")]
    Empty { symbol: String },
}

impl From<MarketDataError> for CoachError {
    fn from(e: MarketDataError) -> Self {
        CoachError::MarketData(e.to_string())
    }
}
