//! Append-only persistence for trades and their analyses.

mod error;
mod payload;
mod store;

pub use error::StoreError;
pub use payload::AnalysisPayload;
pub use store::Store;
