//! Trade records and the behavioral attributes attached to them.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoachError;

pub const RECOGNIZED_HORIZONS: [u32; 3] = [7, 30, 90];

/// Position sizing and context attributes used by the behavioral analyzer.
///
/// Modeled as a single nested struct rather than three independent
/// `Option` fields: a trade either carries all three or none, and the
/// behavioral analyzer treats a trade missing this struct as ineligible
/// to serve as history or to receive a verdict of its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BehavioralAttributes {
    /// Position size in currency units.
    pub position_size: f64,
    /// Beta of the underlying relative to the market.
    pub stock_beta: f64,
    /// Free-form sector label, case-preserved (compared case-insensitively).
    pub sector: String,
}

/// Inputs required to record a new trade, before the store assigns an id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTrade {
    pub symbol: String,
    pub entry_price: f64,
    pub entry_date: NaiveDate,
    pub horizon_days: u32,
    pub behavioral: Option<BehavioralAttributes>,
}

impl NewTrade {
    /// Validate this request against the invariants in the data model.
    ///
    /// Rejects on the first invalid field, matching the orchestrator's
    /// "validate once, fail fast" policy.
    pub fn validate(&self) -> Result<(), CoachError> {
        let symbol = self.symbol.trim();
        if symbol.is_empty()
            || symbol.len() > 10
            || !symbol.chars().all(|c| c.is_ascii_graphic() || c == ' ')
        {
            return Err(CoachError::InvalidInput(format!(
                "symbol must be 1-10 printable ASCII characters, got {:?}",
                self.symbol
            )));
        }
        if self.entry_price <= 0.0 || !self.entry_price.is_finite() {
            return Err(CoachError::InvalidInput(format!(
                "entry_price must be positive, got {}",
                self.entry_price
            )));
        }
        if self.horizon_days == 0 {
            return Err(CoachError::InvalidInput(
                "horizon_days must be > 0".to_string(),
            ));
        }
        if let Some(b) = &self.behavioral {
            if b.position_size < 0.0 || !b.position_size.is_finite() {
                return Err(CoachError::InvalidInput(format!(
                    "position_size must be >= 0, got {}",
                    b.position_size
                )));
            }
            if b.stock_beta < 0.0 || !b.stock_beta.is_finite() {
                return Err(CoachError::InvalidInput(format!(
                    "stock_beta must be >= 0, got {}",
                    b.stock_beta
                )));
            }
            if b.sector.trim().is_empty() {
                return Err(CoachError::InvalidInput(
                    "sector must not be empty".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Upper-cased ticker, per the data model's `symbol` invariant.
    pub fn normalized_symbol(&self) -> String {
        self.symbol.trim().to_ascii_uppercase()
    }
}

/// A persisted trade record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub id: i64,
    pub symbol: String,
    pub entry_price: f64,
    pub entry_date: NaiveDate,
    pub horizon_days: u32,
    pub behavioral: Option<BehavioralAttributes>,
    pub created_at: DateTime<Utc>,
}

impl Trade {
    /// True if this trade carries all behavioral attributes and can serve
    /// as a data point in another trade's behavioral history.
    pub fn is_eligible_history(&self) -> bool {
        self.behavioral.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> NewTrade {
        NewTrade {
            symbol: "AAPL".to_string(),
            entry_price: 150.0,
            entry_date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            horizon_days: 30,
            behavioral: Some(BehavioralAttributes {
                position_size: 10_000.0,
                stock_beta: 1.1,
                sector: "Technology".to_string(),
            }),
        }
    }

    #[test]
    fn test_valid_trade_passes() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn test_rejects_non_positive_entry_price() {
        let mut t = sample();
        t.entry_price = 0.0;
        assert!(t.validate().is_err());
    }

    #[test]
    fn test_rejects_empty_symbol() {
        let mut t = sample();
        t.symbol = "".to_string();
        assert!(t.validate().is_err());
    }

    #[test]
    fn test_rejects_negative_position_size() {
        let mut t = sample();
        t.behavioral.as_mut().unwrap().position_size = -1.0;
        assert!(t.validate().is_err());
    }

    #[test]
    fn test_rejects_non_printable_symbol() {
        let mut t = sample();
        t.symbol = "AA\tPL".to_string();
        assert!(t.validate().is_err());
        t.symbol = "AA\0PL".to_string();
        assert!(t.validate().is_err());
    }

    #[test]
    fn test_normalized_symbol_uppercases() {
        let mut t = sample();
        t.symbol = "  aapl ".to_string();
        assert_eq!(t.normalized_symbol(), "AAPL");
    }

    #[test]
    fn test_trade_without_behavioral_is_ineligible_history() {
        let trade = Trade {
            id: 1,
            symbol: "AAPL".to_string(),
            entry_price: 100.0,
            entry_date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            horizon_days: 30,
            behavioral: None,
            created_at: Utc::now(),
        };
        assert!(!trade.is_eligible_history());
    }
}
