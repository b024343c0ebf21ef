//! Bar (OHLCV) data types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::CoachError;

/// A single daily OHLCV bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// Calendar day this bar covers (no time zone).
    pub date: NaiveDate,

    /// Opening price.
    pub open: f64,

    /// Highest price during the day.
    pub high: f64,

    /// Lowest price during the day.
    pub low: f64,

    /// Closing price.
    pub close: f64,

    /// Trading volume.
    pub volume: u64,
}

impl Bar {
    /// Build a bar, rejecting values that violate `low <= open,close <= high`.
    pub fn new(
        date: NaiveDate,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: u64,
    ) -> Result<Self, CoachError> {
        for (name, value) in [("open", open), ("high", high), ("low", low), ("close", close)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(CoachError::InvalidInput(format!(
                    "bar {date}: {name} ({value}) must be a positive, finite price"
                )));
            }
        }
        if low > high {
            return Err(CoachError::InvalidInput(format!(
                "bar {date}: low ({low}) > high ({high})"
            )));
        }
        if open < low || open > high {
            return Err(CoachError::InvalidInput(format!(
                "bar {date}: open ({open}) outside [{low}, {high}]"
            )));
        }
        if close < low || close > high {
            return Err(CoachError::InvalidInput(format!(
                "bar {date}: close ({close}) outside [{low}, {high}]"
            )));
        }
        Ok(Self {
            date,
            open,
            high,
            low,
            close,
            volume,
        })
    }
}

/// An ordered, gap-tolerant sequence of daily bars.
///
/// Bars are kept strictly increasing by date; construction rejects any
/// out-of-order or duplicate-date input rather than silently re-sorting it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BarSeries {
    bars: Vec<Bar>,
}

impl BarSeries {
    /// Build a series from bars already in ascending date order.
    pub fn new(bars: Vec<Bar>) -> Result<Self, CoachError> {
        for pair in bars.windows(2) {
            if pair[1].date <= pair[0].date {
                return Err(CoachError::InvalidInput(format!(
                    "bar series not strictly increasing by date at {} -> {}",
                    pair[0].date, pair[1].date
                )));
            }
        }
        Ok(Self { bars })
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn as_slice(&self) -> &[Bar] {
        &self.bars
    }

    /// Bars strictly after `date`, in original order.
    pub fn after(&self, date: NaiveDate) -> &[Bar] {
        let start = self.bars.partition_point(|b| b.date <= date);
        &self.bars[start..]
    }

    /// Highest `high` across the series. `None` if empty.
    pub fn max_high(&self) -> Option<f64> {
        self.bars
            .iter()
            .map(|b| b.high)
            .fold(None, |acc: Option<f64>, h| Some(acc.map_or(h, |a| a.max(h))))
    }

    /// Lowest `low` across the series. `None` if empty.
    pub fn min_low(&self) -> Option<f64> {
        self.bars
            .iter()
            .map(|b| b.low)
            .fold(None, |acc: Option<f64>, l| Some(acc.map_or(l, |a| a.min(l))))
    }
}
