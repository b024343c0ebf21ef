//! End-to-end coaching scenarios driven through the orchestrator.
//!
//! Market data comes from a fixed test adapter rather than `MockMarketData`
//! so each scenario can pin exact post-entry highs/lows without depending
//! on the deterministic RNG's output sequence.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use coach_core::{Bar, BarSeries, BehavioralAttributes, CoachError, Verdict};
use coach_market::{MarketData, MarketDataError, MockMarketData};
use coach_orchestrator::{AnalyzeRequest, Cancellation, DataSource, Orchestrator};
use coach_store::Store;

struct FixedMarketData {
    bars: BarSeries,
}

#[async_trait]
impl MarketData for FixedMarketData {
    async fn fetch(&self, _symbol: &str, _horizon_days: u32) -> Result<BarSeries, MarketDataError> {
        Ok(self.bars.clone())
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn bars_with_extremes(entry_date: NaiveDate, low: f64, high: f64) -> BarSeries {
    let bars = vec![
        Bar::new(entry_date, 100.0, 100.0, 100.0, 100.0, 1_000_000).unwrap(),
        Bar::new(entry_date + chrono::Duration::days(1), 100.0, high, low, 100.0, 1_000_000).unwrap(),
    ];
    BarSeries::new(bars).unwrap()
}

fn orchestrator_with_bars(bars: BarSeries, store: Store) -> Orchestrator {
    let fixed = Arc::new(FixedMarketData { bars });
    let mock = Arc::new(MockMarketData::default());
    Orchestrator::new(fixed, mock, store)
}

fn request(save: bool, behavioral: Option<BehavioralAttributes>) -> AnalyzeRequest {
    AnalyzeRequest {
        symbol: "AAPL".to_string(),
        entry_price: 100.0,
        entry_date: date(2025, 1, 1),
        horizon_days: 7,
        behavioral,
        source: DataSource::Live,
        save,
    }
}

/// S1: happy path, mock series with post-entry low 95 / high 110 yields a
/// FAIR verdict.
#[tokio::test]
async fn test_s1_happy_path_fair_verdict() {
    let store = Store::open_in_memory().unwrap();
    let bars = bars_with_extremes(date(2025, 1, 1), 95.0, 110.0);
    let orchestrator = orchestrator_with_bars(bars, store);

    let report = orchestrator
        .analyze(&request(true, None), &Cancellation::new())
        .await
        .unwrap();

    assert!((report.timing.mfe_percent - 10.0).abs() < 1e-9);
    assert!((report.timing.mae_percent - (-5.0)).abs() < 1e-9);
    assert!((report.timing.ideal_entry - 95.0).abs() < 1e-9);
    assert!((report.timing.entry_timing_score - (-5.0)).abs() < 1e-9);
    assert_eq!(report.timing.verdict, Verdict::Fair);
    assert!(report.trade_id > 0);
    assert!(report.persisted_analysis);
}

/// S2: same series shape but post-entry low of 101 produces an EXCELLENT
/// verdict instead.
#[tokio::test]
async fn test_s2_excellent_timing() {
    let store = Store::open_in_memory().unwrap();
    let bars = bars_with_extremes(date(2025, 1, 1), 101.0, 110.0);
    let orchestrator = orchestrator_with_bars(bars, store);

    let report = orchestrator
        .analyze(&request(false, None), &Cancellation::new())
        .await
        .unwrap();

    assert!((report.timing.ideal_entry - 101.0).abs() < 1e-9);
    assert!((report.timing.entry_timing_score - 1.0).abs() < 1e-9);
    assert_eq!(report.timing.verdict, Verdict::Excellent);
}

/// S3: cold-start behavioral analysis against an empty store never flags
/// an anomaly, regardless of how unusual the candidate's attributes are.
#[tokio::test]
async fn test_s3_cold_start_no_anomaly() {
    let store = Store::open_in_memory().unwrap();
    let bars = bars_with_extremes(date(2025, 1, 1), 95.0, 110.0);
    let orchestrator = orchestrator_with_bars(bars, store);

    let behavioral = BehavioralAttributes {
        position_size: 50_000.0,
        stock_beta: 3.0,
        sector: "Technology".to_string(),
    };
    let report = orchestrator
        .analyze(&request(true, Some(behavioral)), &Cancellation::new())
        .await
        .unwrap();

    assert!(!report.behavioral.is_anomaly);
    assert!(report.behavioral.anomalies.is_empty());
}

/// S4: a position ten times the historical average trips the position
/// size anomaly once enough history has accumulated.
#[tokio::test]
async fn test_s4_oversized_position_anomaly() {
    let store = Store::open_in_memory().unwrap();

    for i in 0..10 {
        let historical = orchestrator_with_bars(
            bars_with_extremes(date(2025, 1, 1), 95.0, 110.0),
            store.clone(),
        );
        let behavioral = BehavioralAttributes {
            position_size: 5_000.0,
            stock_beta: 1.0,
            sector: "Technology".to_string(),
        };
        let mut req = request(true, Some(behavioral));
        req.symbol = format!("HIST{i}");
        historical
            .analyze(&req, &Cancellation::new())
            .await
            .unwrap();
    }

    let orchestrator = orchestrator_with_bars(
        bars_with_extremes(date(2025, 1, 1), 95.0, 110.0),
        store,
    );
    let behavioral = BehavioralAttributes {
        position_size: 50_000.0,
        stock_beta: 1.0,
        sector: "Technology".to_string(),
    };
    let report = orchestrator
        .analyze(&request(true, Some(behavioral)), &Cancellation::new())
        .await
        .unwrap();

    assert!(report.behavioral.is_anomaly);
    assert_eq!(
        report.behavioral.anomalies[0].kind,
        coach_core::AttributeKind::PositionSize
    );
}

/// S5: an unseen sector produces a warning, not an anomaly, as long as
/// the numeric attributes stay in range.
#[tokio::test]
async fn test_s5_new_sector_warning_only() {
    let store = Store::open_in_memory().unwrap();
    let sectors = ["Technology", "Healthcare"];
    for (i, sector) in sectors.iter().enumerate() {
        let historical = orchestrator_with_bars(
            bars_with_extremes(date(2025, 1, 1), 95.0, 110.0),
            store.clone(),
        );
        let behavioral = BehavioralAttributes {
            position_size: 5_000.0,
            stock_beta: 1.0,
            sector: sector.to_string(),
        };
        let mut req = request(true, Some(behavioral));
        req.symbol = format!("HIST{i}");
        historical
            .analyze(&req, &Cancellation::new())
            .await
            .unwrap();
    }

    let orchestrator = orchestrator_with_bars(
        bars_with_extremes(date(2025, 1, 1), 95.0, 110.0),
        store,
    );
    let behavioral = BehavioralAttributes {
        position_size: 5_000.0,
        stock_beta: 1.0,
        sector: "Cryptocurrency".to_string(),
    };
    let report = orchestrator
        .analyze(&request(true, Some(behavioral)), &Cancellation::new())
        .await
        .unwrap();

    assert!(!report.behavioral.is_anomaly);
    assert_eq!(report.behavioral.warnings.len(), 1);
    assert_eq!(report.behavioral.warnings[0].known_sectors.len(), 2);
}

/// S6: both numeric attributes breach the threshold against tightly
/// clustered history, producing two anomalies in a fixed order.
#[tokio::test]
async fn test_s6_multi_anomaly_ordered() {
    let store = Store::open_in_memory().unwrap();
    for i in 0..10 {
        let historical = orchestrator_with_bars(
            bars_with_extremes(date(2025, 1, 1), 95.0, 110.0),
            store.clone(),
        );
        let behavioral = BehavioralAttributes {
            position_size: 5_000.0,
            stock_beta: 1.0,
            sector: "Technology".to_string(),
        };
        let mut req = request(true, Some(behavioral));
        req.symbol = format!("HIST{i}");
        historical
            .analyze(&req, &Cancellation::new())
            .await
            .unwrap();
    }

    let orchestrator = orchestrator_with_bars(
        bars_with_extremes(date(2025, 1, 1), 95.0, 110.0),
        store,
    );
    let behavioral = BehavioralAttributes {
        position_size: 50_000.0,
        stock_beta: 5.0,
        sector: "Technology".to_string(),
    };
    let report = orchestrator
        .analyze(&request(true, Some(behavioral)), &Cancellation::new())
        .await
        .unwrap();

    assert!(report.behavioral.is_anomaly);
    assert_eq!(report.behavioral.anomalies.len(), 2);
    assert_eq!(
        report.behavioral.anomalies[0].kind,
        coach_core::AttributeKind::PositionSize
    );
    assert_eq!(
        report.behavioral.anomalies[1].kind,
        coach_core::AttributeKind::StockBeta
    );
}

#[tokio::test]
async fn test_unsaved_request_leaves_no_trade_row() {
    let store = Store::open_in_memory().unwrap();
    let bars = bars_with_extremes(date(2025, 1, 1), 95.0, 110.0);
    let orchestrator = orchestrator_with_bars(bars, store.clone());

    let report = orchestrator
        .analyze(&request(false, None), &Cancellation::new())
        .await
        .unwrap();

    assert_eq!(report.trade_id, 0);
    assert!(!report.persisted_analysis);
    assert!(store.get_last_n_trades(10).unwrap().is_empty());
}

#[tokio::test]
async fn test_market_data_failure_saves_nothing() {
    struct AlwaysFails;

    #[async_trait]
    impl MarketData for AlwaysFails {
        async fn fetch(&self, symbol: &str, _horizon_days: u32) -> Result<BarSeries, MarketDataError> {
            Err(MarketDataError::NotFound(symbol.to_string()))
        }
    }

    let store = Store::open_in_memory().unwrap();
    let orchestrator = Orchestrator::new(
        Arc::new(AlwaysFails),
        Arc::new(MockMarketData::default()),
        store.clone(),
    );

    let result = orchestrator
        .analyze(&request(true, None), &Cancellation::new())
        .await;

    assert!(matches!(result, Err(CoachError::MarketData(_))));
    assert!(store.get_last_n_trades(10).unwrap().is_empty());
}

#[tokio::test]
async fn test_cancelled_before_fetch_short_circuits() {
    let store = Store::open_in_memory().unwrap();
    let bars = bars_with_extremes(date(2025, 1, 1), 95.0, 110.0);
    let orchestrator = orchestrator_with_bars(bars, store);

    let cancellation = Cancellation::new();
    cancellation.cancel();

    let result = orchestrator.analyze(&request(true, None), &cancellation).await;
    assert!(matches!(result, Err(CoachError::Cancelled)));
}
