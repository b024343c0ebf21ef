//! The `MarketData` trait: the coaching engine's only dependency on an
//! external price-data source.

use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use coach_core::{Bar, BarSeries};

use crate::error::MarketDataError;

/// Fetches a bounded window of daily bars for a symbol.
///
/// Implementations return at most `horizon_days` consecutive trading-day
/// bars ending on or before today, ascending by date. Returning fewer bars
/// than requested is acceptable; returning zero bars is not — that is an
/// `Empty` error, not an empty successful series.
#[async_trait]
pub trait MarketData: Send + Sync {
    async fn fetch(&self, symbol: &str, horizon_days: u32) -> Result<BarSeries, MarketDataError>;
}

/// Deterministic bar generator for tests and `--mock` CLI runs.
///
/// The RNG is seeded purely from `(symbol, horizon_days)` so the same
/// request always produces the same prices, but the window itself still
/// ends on today's date, matching the `MarketData` contract every other
/// implementation honours ("bars ending on or before today"). A caller
/// entering a trade on any recent date needs bars after that date to
/// grade it against — an anchor frozen in the past would silently starve
/// every such request of a post-entry window.
pub struct MockMarketData {
    /// The date the mock series' last bar lands on.
    anchor_date: NaiveDate,
}

impl Default for MockMarketData {
    fn default() -> Self {
        Self {
            anchor_date: chrono::Utc::now().date_naive(),
        }
    }
}

impl MockMarketData {
    pub fn new(anchor_date: NaiveDate) -> Self {
        Self { anchor_date }
    }

    fn seed(symbol: &str, horizon_days: u32) -> u64 {
        use std::hash::{Hash, Hasher};
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        symbol.to_ascii_uppercase().hash(&mut hasher);
        horizon_days.hash(&mut hasher);
        hasher.finish()
    }
}

#[async_trait]
impl MarketData for MockMarketData {
    async fn fetch(&self, symbol: &str, horizon_days: u32) -> Result<BarSeries, MarketDataError> {
        if symbol.trim().is_empty() {
            return Err(MarketDataError::NotFound(symbol.to_string()));
        }

        use rand::rngs::SmallRng;
        use rand::{Rng, SeedableRng};

        let mut rng = SmallRng::seed_from_u64(Self::seed(symbol, horizon_days));
        let start_date = self.anchor_date - Duration::days(horizon_days as i64);

        let mut price = 100.0_f64;
        let mut bars = Vec::with_capacity(horizon_days as usize);
        let mut date = start_date;
        while date <= self.anchor_date {
            // Skip weekends so dates read as plausible trading days.
            if matches!(date.format("%u").to_string().as_str(), "6" | "7") {
                date += Duration::days(1);
                continue;
            }
            let open = price;
            let drift = rng.gen_range(-0.02..0.022) * price;
            let close = (price + drift).max(0.01);
            let high = open.max(close) + rng.gen_range(0.0..0.01) * price;
            let low = (open.min(close) - rng.gen_range(0.0..0.01) * price).max(0.01);
            let volume = rng.gen_range(100_000..5_000_000);

            bars.push(
                Bar::new(date, open, high, low, close, volume)
                    .map_err(|e| MarketDataError::Transport(e.to_string()))?,
            );
            price = close;
            date += Duration::days(1);
        }

        if bars.is_empty() {
            return Err(MarketDataError::Empty {
                symbol: symbol.to_string(),
            });
        }

        BarSeries::new(bars).map_err(|e| MarketDataError::Transport(e.to_string()))
    }
}
