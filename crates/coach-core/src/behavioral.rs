//! Behavioral anomaly detection against a trader's own history.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::trade::{NewTrade, Trade};

const Z_SCORE_THRESHOLD: f64 = 2.0;
const MIN_HISTORY_SAMPLES: usize = 2;

/// Which behavioral attribute an anomaly was raised against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttributeKind {
    PositionSize,
    StockBeta,
}

impl AttributeKind {
    fn label(&self) -> &'static str {
        match self {
            AttributeKind::PositionSize => "position size",
            AttributeKind::StockBeta => "stock beta",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anomaly {
    pub kind: AttributeKind,
    pub message: String,
    pub current_value: f64,
    pub historical_mean: f64,
    pub z_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorWarning {
    pub message: String,
    pub current_sector: String,
    pub known_sectors: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BehavioralMetrics {
    pub position_size_mean: Option<f64>,
    pub position_size_std: Option<f64>,
    pub position_size_z_score: Option<f64>,
    pub stock_beta_mean: Option<f64>,
    pub stock_beta_std: Option<f64>,
    pub stock_beta_z_score: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BehavioralReport {
    pub is_anomaly: bool,
    pub anomalies: Vec<Anomaly>,
    pub warnings: Vec<SectorWarning>,
    pub metrics: BehavioralMetrics,
}

struct SampleStats {
    mean: f64,
    std: f64,
}

/// Bessel-corrected sample mean/std. `None` if fewer than 2 observations.
fn sample_stats(values: &[f64]) -> Option<SampleStats> {
    let n = values.len();
    if n < 2 {
        return None;
    }
    let mean = values.iter().sum::<f64>() / n as f64;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    Some(SampleStats {
        mean,
        std: variance.sqrt(),
    })
}

/// Analyze `candidate` for sizing/beta anomalies and sector novelty against
/// the trader's own `history`.
///
/// `candidate_id` excludes the candidate's own row from history when it is
/// already persisted (re-analysis of an existing trade). A candidate with
/// no behavioral attributes produces an empty report: it cannot be judged
/// and cannot serve as a history sample either.
pub fn analyze_behavior(
    candidate: &NewTrade,
    candidate_id: Option<i64>,
    history: &[Trade],
) -> BehavioralReport {
    let Some(attrs) = &candidate.behavioral else {
        return BehavioralReport::default();
    };

    let filtered: Vec<&Trade> = history
        .iter()
        .filter(|t| t.is_eligible_history())
        .filter(|t| Some(t.id) != candidate_id)
        .collect();

    if filtered.len() < MIN_HISTORY_SAMPLES {
        return BehavioralReport::default();
    }

    let mut metrics = BehavioralMetrics::default();
    let mut anomalies = Vec::new();

    let position_sizes: Vec<f64> = filtered
        .iter()
        .map(|t| t.behavioral.as_ref().unwrap().position_size)
        .collect();
    if let Some(stats) = sample_stats(&position_sizes) {
        metrics.position_size_mean = Some(stats.mean);
        metrics.position_size_std = Some(stats.std);
        if stats.std > 0.0 {
            let z = (attrs.position_size - stats.mean) / stats.std;
            metrics.position_size_z_score = Some(z);
            if z.abs() >= Z_SCORE_THRESHOLD {
                anomalies.push(anomaly_for(
                    AttributeKind::PositionSize,
                    attrs.position_size,
                    stats.mean,
                    z,
                ));
            }
        }
    }

    let betas: Vec<f64> = filtered
        .iter()
        .map(|t| t.behavioral.as_ref().unwrap().stock_beta)
        .collect();
    if let Some(stats) = sample_stats(&betas) {
        metrics.stock_beta_mean = Some(stats.mean);
        metrics.stock_beta_std = Some(stats.std);
        if stats.std > 0.0 {
            let z = (attrs.stock_beta - stats.mean) / stats.std;
            metrics.stock_beta_z_score = Some(z);
            if z.abs() >= Z_SCORE_THRESHOLD {
                anomalies.push(anomaly_for(AttributeKind::StockBeta, attrs.stock_beta, stats.mean, z));
            }
        }
    }

    let known_sectors_lower: BTreeSet<String> = filtered
        .iter()
        .map(|t| t.behavioral.as_ref().unwrap().sector.to_lowercase())
        .collect();

    let mut warnings = Vec::new();
    if !known_sectors_lower.contains(&attrs.sector.to_lowercase()) {
        // Original-case sectors, deduplicated case-insensitively.
        let mut known_sectors: Vec<String> = Vec::new();
        for t in &filtered {
            let sector = &t.behavioral.as_ref().unwrap().sector;
            if !known_sectors
                .iter()
                .any(|s| s.eq_ignore_ascii_case(sector))
            {
                known_sectors.push(sector.clone());
            }
        }
        known_sectors.sort();

        warnings.push(SectorWarning {
            message: format!(
                "{} is a sector you haven't traded before",
                attrs.sector
            ),
            current_sector: attrs.sector.clone(),
            known_sectors,
        });
    }

    BehavioralReport {
        is_anomaly: !anomalies.is_empty(),
        anomalies,
        warnings,
        metrics,
    }
}

fn anomaly_for(kind: AttributeKind, current: f64, mean: f64, z: f64) -> Anomaly {
    let direction = if current > mean { "above" } else { "below" };
    let multiplier = if mean != 0.0 { current / mean } else { 0.0 };
    Anomaly {
        message: format!(
            "{} is {:.1}x your historical average, {} your usual range (z={:.2})",
            kind.label(),
            multiplier,
            direction,
            z
        ),
        kind,
        current_value: current,
        historical_mean: mean,
        z_score: z,
    }
}
