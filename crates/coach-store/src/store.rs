//! The append-only SQLite-backed store.

use std::path::Path;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, NaiveDate, Utc};
use coach_core::{BehavioralAttributes, NewTrade, Trade};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::error::StoreError;
use crate::payload::AnalysisPayload;

const SCHEMA: &str = include_str!("schema.sql");

/// Durable, append-only persistence for trades and their analyses.
///
/// Backed by a single SQLite file (bundled, no system dependency). Writes
/// are serialized through a mutex: the spec's concurrency model is a
/// linear pipeline per request, so contention is expected to be rare, and
/// correctness matters more here than parallel write throughput.
#[derive(Clone)]
pub struct Store {
    conn: Arc<Mutex<Connection>>,
}

impl Store {
    /// Open (or create) the database file at `path` and ensure the schema
    /// exists. Safe to call repeatedly; schema creation is idempotent.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    /// Open an in-memory database. Useful for tests.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Re-apply the schema. A no-op against an already-initialized database.
    pub fn init(&self) -> Result<(), StoreError> {
        let conn = self.conn.lock().expect("store mutex poisoned");
        conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    pub fn save_trade(&self, trade: &NewTrade) -> Result<i64, StoreError> {
        let conn = self.conn.lock().expect("store mutex poisoned");
        let created_at = Utc::now();
        let symbol = trade.normalized_symbol();

        conn.execute(
            "INSERT INTO trades
                (symbol, entry_price, entry_date, horizon_days, position_size, stock_beta, sector, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                symbol,
                trade.entry_price,
                trade.entry_date.to_string(),
                trade.horizon_days,
                trade.behavioral.as_ref().map(|b| b.position_size),
                trade.behavioral.as_ref().map(|b| b.stock_beta),
                trade.behavioral.as_ref().map(|b| b.sector.clone()),
                created_at.to_rfc3339(),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn save_analysis(&self, trade_id: i64, payload: &AnalysisPayload) -> Result<(), StoreError> {
        let conn = self.conn.lock().expect("store mutex poisoned");
        let json = serde_json::to_string(payload)?;
        conn.execute(
            "INSERT INTO analyses (trade_id, kind, payload, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![trade_id, payload.kind(), json, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    pub fn get_trade(&self, id: i64) -> Result<Option<Trade>, StoreError> {
        let conn = self.conn.lock().expect("store mutex poisoned");
        conn.query_row(
            "SELECT id, symbol, entry_price, entry_date, horizon_days,
                    position_size, stock_beta, sector, created_at
             FROM trades WHERE id = ?1",
            params![id],
            row_to_trade,
        )
        .optional()
        .map_err(StoreError::from)
    }

    /// The `n` most recently created trades, newest first, ties broken by
    /// descending id. Filters globally across all stored trades.
    pub fn get_last_n_trades(&self, n: usize) -> Result<Vec<Trade>, StoreError> {
        let conn = self.conn.lock().expect("store mutex poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, symbol, entry_price, entry_date, horizon_days,
                    position_size, stock_beta, sector, created_at
             FROM trades ORDER BY created_at DESC, id DESC LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![n as i64], row_to_trade)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(StoreError::from)
    }

    /// All trades eligible to serve as behavioral history (those carrying
    /// all three behavioral attributes), across the whole store.
    pub fn get_trades_for_behavioral_history(&self) -> Result<Vec<Trade>, StoreError> {
        let conn = self.conn.lock().expect("store mutex poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, symbol, entry_price, entry_date, horizon_days,
                    position_size, stock_beta, sector, created_at
             FROM trades
             WHERE position_size IS NOT NULL AND stock_beta IS NOT NULL AND sector IS NOT NULL",
        )?;
        let rows = stmt.query_map([], row_to_trade)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(StoreError::from)
    }

    pub fn get_analyses(&self, trade_id: i64) -> Result<Vec<(String, AnalysisPayload, DateTime<Utc>)>, StoreError> {
        let conn = self.conn.lock().expect("store mutex poisoned");
        let mut stmt = conn.prepare(
            "SELECT kind, payload, created_at FROM analyses WHERE trade_id = ?1 ORDER BY id ASC",
        )?;
        let rows = stmt.query_map(params![trade_id], |row| {
            let kind: String = row.get(0)?;
            let payload: String = row.get(1)?;
            let created_at: String = row.get(2)?;
            Ok((kind, payload, created_at))
        })?;

        let mut out = Vec::new();
        for row in rows {
            let (kind, payload, created_at) = row?;
            let payload: AnalysisPayload = serde_json::from_str(&payload)?;
            let created_at = DateTime::parse_from_rfc3339(&created_at)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| StoreError::NotFound(format!("bad timestamp: {e}")))?;
            out.push((kind, payload, created_at));
        }
        Ok(out)
    }
}

fn row_to_trade(row: &Row) -> rusqlite::Result<Trade> {
    let entry_date: String = row.get(3)?;
    let created_at: String = row.get(8)?;
    let position_size: Option<f64> = row.get(5)?;
    let stock_beta: Option<f64> = row.get(6)?;
    let sector: Option<String> = row.get(7)?;

    let behavioral = match (position_size, stock_beta, sector) {
        (Some(position_size), Some(stock_beta), Some(sector)) => Some(BehavioralAttributes {
            position_size,
            stock_beta,
            sector,
        }),
        _ => None,
    };

    Ok(Trade {
        id: row.get(0)?,
        symbol: row.get(1)?,
        entry_price: row.get(2)?,
        entry_date: entry_date.parse::<NaiveDate>().unwrap_or_default(),
        horizon_days: row.get(4)?,
        behavioral,
        created_at: DateTime::parse_from_rfc3339(&created_at)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now()),
    })
}
