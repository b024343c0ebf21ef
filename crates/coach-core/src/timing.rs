//! Entry-timing efficiency analysis.

use serde::{Deserialize, Serialize};

use crate::bar::BarSeries;
use crate::error::CoachError;

/// Coarse bucket for how well an entry was timed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Excellent,
    Good,
    Fair,
    Poor,
    /// No post-entry bars were available to judge the entry against.
    Unknown,
}

impl Verdict {
    fn from_score(score: f64) -> Self {
        if score >= 0.0 {
            Verdict::Excellent
        } else if score >= -5.0 {
            Verdict::Good
        } else if score >= -10.0 {
            Verdict::Fair
        } else {
            Verdict::Poor
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Excellent => "EXCELLENT",
            Verdict::Good => "GOOD",
            Verdict::Fair => "FAIR",
            Verdict::Poor => "POOR",
            Verdict::Unknown => "UNKNOWN",
        }
    }
}

/// Result of analyzing how well a trade's entry was timed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimingReport {
    pub mfe: f64,
    pub mae: f64,
    pub mfe_percent: f64,
    pub mae_percent: f64,
    pub ideal_entry: f64,
    pub entry_timing_score: f64,
    pub missed_profit_potential: f64,
    pub verdict: Verdict,
}

impl TimingReport {
    fn unknown() -> Self {
        Self {
            mfe: 0.0,
            mae: 0.0,
            mfe_percent: 0.0,
            mae_percent: 0.0,
            ideal_entry: 0.0,
            entry_timing_score: 0.0,
            missed_profit_potential: 0.0,
            verdict: Verdict::Unknown,
        }
    }
}

/// Analyze entry timing against the post-entry window of `bars`.
///
/// `bars` must already be restricted to the window the caller wants
/// judged (strictly after the entry date, bounded by horizon) — this
/// function performs no date filtering of its own.
pub fn analyze_timing(entry_price: f64, bars: &BarSeries) -> Result<TimingReport, CoachError> {
    if entry_price <= 0.0 || !entry_price.is_finite() {
        return Err(CoachError::InvalidInput(format!(
            "entry_price must be positive, got {entry_price}"
        )));
    }

    let (Some(high), Some(low)) = (bars.max_high(), bars.min_low()) else {
        return Ok(TimingReport::unknown());
    };

    let mfe = high - entry_price;
    let mae = low - entry_price;
    let mfe_percent = 100.0 * mfe / entry_price;
    let mae_percent = 100.0 * mae / entry_price;
    let ideal_entry = low;
    let entry_timing_score = 100.0 * (ideal_entry - entry_price) / entry_price;
    let missed_profit_potential = if ideal_entry > 0.0 {
        (100.0 * (high - ideal_entry) / ideal_entry).max(0.0)
    } else {
        0.0
    };

    Ok(TimingReport {
        mfe,
        mae,
        mfe_percent,
        mae_percent,
        ideal_entry,
        entry_timing_score,
        missed_profit_potential,
        verdict: Verdict::from_score(entry_timing_score),
    })
}
