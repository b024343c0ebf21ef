//! The coaching pipeline: validate, fetch, analyze, persist.

use std::sync::Arc;

use coach_core::{analyze_behavior, analyze_timing, BarSeries, BehavioralReport, CoachError, NewTrade, TimingReport};
use coach_market::MarketData;
use coach_store::{AnalysisPayload, Store};
use tracing::{info, warn};

use crate::cancellation::Cancellation;
use crate::request::{AnalyzeRequest, DataSource};

/// Sentinel id for an unsaved trade. Never a valid row id (SQLite
/// `AUTOINCREMENT` ids start at 1).
const UNSAVED_TRADE_ID: i64 = 0;

/// The full result of running one request through the pipeline.
#[derive(Debug, Clone)]
pub struct CoachingReport {
    pub trade_id: i64,
    pub trade: NewTrade,
    pub timing: TimingReport,
    pub behavioral: BehavioralReport,
    pub bars: BarSeries,
    /// `false` when the trade was saved but writing its analyses failed.
    pub persisted_analysis: bool,
}

/// Wires a market-data adapter and the store into the single entry point
/// the CLI calls.
pub struct Orchestrator {
    market: Arc<dyn MarketData>,
    mock: Arc<dyn MarketData>,
    store: Store,
}

impl Orchestrator {
    /// `market` services `DataSource::Live` requests; `mock` services
    /// `DataSource::Mock` ones. Kept as two adapters rather than one
    /// behind a runtime switch so `--mock` never depends on broker
    /// credentials being present.
    pub fn new(market: Arc<dyn MarketData>, mock: Arc<dyn MarketData>, store: Store) -> Self {
        Self { market, mock, store }
    }

    pub async fn analyze(
        &self,
        request: &AnalyzeRequest,
        cancellation: &Cancellation,
    ) -> Result<CoachingReport, CoachError> {
        let candidate = NewTrade {
            symbol: request.symbol.clone(),
            entry_price: request.entry_price,
            entry_date: request.entry_date,
            horizon_days: request.horizon_days,
            behavioral: request.behavioral.clone(),
        };

        // Step 1: validate, fail on the first invalid field.
        candidate.validate()?;
        if cancellation.is_cancelled() {
            return Err(CoachError::Cancelled);
        }

        // Step 2: fetch bars from the adapter selected by source.
        let adapter: &Arc<dyn MarketData> = match request.source {
            DataSource::Live => &self.market,
            DataSource::Mock => &self.mock,
        };
        let bars = adapter
            .fetch(&candidate.normalized_symbol(), candidate.horizon_days)
            .await?;
        if cancellation.is_cancelled() {
            return Err(CoachError::Cancelled);
        }

        // Step 3: timing analysis, restricted to the post-entry window.
        let window = BarSeries::new(bars.after(candidate.entry_date).to_vec())?;
        let timing = analyze_timing(candidate.entry_price, &window)?;
        if cancellation.is_cancelled() {
            return Err(CoachError::Cancelled);
        }

        // Step 4: persist the trade, if requested.
        let trade_id = if request.save {
            self.store.save_trade(&candidate)?
        } else {
            UNSAVED_TRADE_ID
        };

        // Step 5: behavioral analysis against history, unconditionally.
        let history = self.store.get_trades_for_behavioral_history()?;
        if cancellation.is_cancelled() {
            return Err(CoachError::Cancelled);
        }
        let candidate_id = request.save.then_some(trade_id);
        let behavioral = analyze_behavior(&candidate, candidate_id, &history);

        // Step 6: persist analyses, if the trade itself was persisted.
        let mut persisted_analysis = true;
        if request.save {
            let timing_write = self
                .store
                .save_analysis(trade_id, &AnalysisPayload::Timing(timing.clone()));
            let behavioral_write = self
                .store
                .save_analysis(trade_id, &AnalysisPayload::Behavioral(behavioral.clone()));
            if timing_write.is_err() || behavioral_write.is_err() {
                warn!(trade_id, "trade persisted but analysis storage failed");
                persisted_analysis = false;
            }
        } else {
            // Nothing was ever meant to be persisted for an unsaved request.
            persisted_analysis = false;
        }

        info!(
            symbol = %candidate.normalized_symbol(),
            verdict = timing.verdict.as_str(),
            anomaly = behavioral.is_anomaly,
            "analyzed trade"
        );

        Ok(CoachingReport {
            trade_id,
            trade: candidate,
            timing,
            behavioral,
            bars,
            persisted_analysis,
        })
    }
}
