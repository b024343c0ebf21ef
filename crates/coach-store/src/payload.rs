//! Opaque analysis payloads.
//!
//! Stored as a single JSON column so new analysis kinds never require a
//! schema migration; the tag lives in the enum variant name.

use coach_core::{BehavioralReport, TimingReport};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AnalysisPayload {
    Timing(TimingReport),
    Behavioral(BehavioralReport),
}

impl AnalysisPayload {
    /// The `analyses.kind` column value for this payload.
    pub fn kind(&self) -> &'static str {
        match self {
            AnalysisPayload::Timing(_) => "timing",
            AnalysisPayload::Behavioral(_) => "behavioral",
        }
    }
}
