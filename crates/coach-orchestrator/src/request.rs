//! The orchestrator's request type.

use chrono::NaiveDate;
use coach_core::BehavioralAttributes;
use serde::{Deserialize, Serialize};

/// Which market-data adapter should service a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataSource {
    Live,
    Mock,
}

/// A single coaching request, as gathered from the CLI (or any future
/// caller) before it reaches the orchestrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    pub symbol: String,
    pub entry_price: f64,
    pub entry_date: NaiveDate,
    pub horizon_days: u32,
    pub behavioral: Option<BehavioralAttributes>,
    pub source: DataSource,
    /// Whether to persist the trade and its analyses. When `false`, the
    /// request is evaluated against history but leaves no trace.
    pub save: bool,
}
