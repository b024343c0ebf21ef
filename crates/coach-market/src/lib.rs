//! Coach Market - market-data adapters for the trade coaching engine.
//!
//! Defines the `MarketData` trait the orchestrator depends on, plus two
//! implementations: a deterministic mock for tests and `--mock` CLI runs,
//! and a live broker-backed adapter for real use.

pub mod error;
pub mod live;
pub mod provider;

pub use error::MarketDataError;
pub use live::{LiveCredentials, LiveMarketData, DEFAULT_BASE_URL};
pub use provider::{MarketData, MockMarketData};
