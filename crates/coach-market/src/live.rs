//! Live broker-backed market-data adapter.
//!
//! Credentials are read from the environment at construction time
//! (`TIGER_ID`, `PRIVATE_KEY_PK1`, `ACCOUNT`); the wire format and broker
//! identity are deliberately opaque to the rest of the crate — this
//! adapter is the only place that knows them.

use async_trait::async_trait;
use coach_core::{Bar, BarSeries};
use serde::Deserialize;
use std::time::Duration as StdDuration;

use crate::error::MarketDataError;
use crate::provider::MarketData;

const MAX_RETRIES: u32 = 2;

/// Default broker API root, used when no override is configured.
pub const DEFAULT_BASE_URL: &str = "https://openapi.tigerfintech.com";

#[derive(Debug, Clone)]
pub struct LiveCredentials {
    pub tiger_id: String,
    pub private_key: String,
    pub account: String,
}

impl LiveCredentials {
    /// Read credentials from `TIGER_ID`, `PRIVATE_KEY_PK1`, `ACCOUNT`.
    pub fn from_env() -> Result<Self, MarketDataError> {
        let var = |name: &str| {
            std::env::var(name)
                .map_err(|_| MarketDataError::Auth(format!("missing environment variable {name}")))
        };
        Ok(Self {
            tiger_id: var("TIGER_ID")?,
            private_key: var("PRIVATE_KEY_PK1")?,
            account: var("ACCOUNT")?,
        })
    }
}

#[derive(Debug, Deserialize)]
struct BrokerBar {
    date: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: u64,
}

pub struct LiveMarketData {
    client: reqwest::Client,
    base_url: String,
    credentials: LiveCredentials,
}

impl LiveMarketData {
    pub fn new(base_url: impl Into<String>, credentials: LiveCredentials) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            credentials,
        }
    }

    pub fn from_env(base_url: impl Into<String>) -> Result<Self, MarketDataError> {
        Ok(Self::new(base_url, LiveCredentials::from_env()?))
    }

    async fn fetch_once(
        &self,
        symbol: &str,
        horizon_days: u32,
    ) -> Result<Vec<BrokerBar>, MarketDataError> {
        let response = self
            .client
            .get(format!("{}/quote/history", self.base_url))
            .query(&[
                ("symbol", symbol),
                ("days", &horizon_days.to_string()),
                ("tiger_id", &self.credentials.tiger_id),
                ("account", &self.credentials.account),
            ])
            .bearer_auth(&self.credentials.private_key)
            .send()
            .await
            .map_err(|e| MarketDataError::Transport(e.to_string()))?;

        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Err(MarketDataError::Auth("broker rejected credentials".to_string()));
        }
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(MarketDataError::NotFound(symbol.to_string()));
        }
        if !response.status().is_success() {
            return Err(MarketDataError::Transport(format!(
                "unexpected status {}",
                response.status()
            )));
        }

        response
            .json::<Vec<BrokerBar>>()
            .await
            .map_err(|e| MarketDataError::Transport(e.to_string()))
    }
}

#[async_trait]
impl MarketData for LiveMarketData {
    async fn fetch(&self, symbol: &str, horizon_days: u32) -> Result<BarSeries, MarketDataError> {
        let mut last_err = None;
        for attempt in 0..=MAX_RETRIES {
            match self.fetch_once(symbol, horizon_days).await {
                Ok(raw) => {
                    if raw.is_empty() {
                        return Err(MarketDataError::Empty {
                            symbol: symbol.to_string(),
                        });
                    }
                    let mut bars = Vec::with_capacity(raw.len());
                    for b in raw {
                        let date = b.date.parse().map_err(|_| {
                            MarketDataError::Transport(format!("unparseable date {}", b.date))
                        })?;
                        bars.push(
                            Bar::new(date, b.open, b.high, b.low, b.close, b.volume)
                                .map_err(|e| MarketDataError::Transport(e.to_string()))?,
                        );
                    }
                    return BarSeries::new(bars)
                        .map_err(|e| MarketDataError::Transport(e.to_string()));
                }
                // Auth and NotFound are not transient: fail fast.
                Err(e @ MarketDataError::Auth(_)) | Err(e @ MarketDataError::NotFound(_)) => {
                    return Err(e)
                }
                Err(e) => {
                    tracing::warn!(attempt, error = %e, "market data fetch failed, retrying");
                    last_err = Some(e);
                    if attempt < MAX_RETRIES {
                        let backoff = StdDuration::from_millis(200 * 2u64.pow(attempt));
                        tokio::time::sleep(backoff).await;
                    }
                }
            }
        }
        Err(last_err.unwrap_or(MarketDataError::Transport("retries exhausted".to_string())))
    }
}
