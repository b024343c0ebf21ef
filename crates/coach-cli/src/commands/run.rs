//! Execute a single coaching request and render its report.

use std::sync::Arc;

use anyhow::Result;
use chrono::NaiveDate;
use coach_core::{BehavioralAttributes, CoachError, RECOGNIZED_HORIZONS};
use coach_market::{LiveMarketData, MarketData, MockMarketData, DEFAULT_BASE_URL};
use coach_orchestrator::{AnalyzeRequest, Cancellation, CoachingReport, DataSource, Orchestrator};
use coach_store::Store;
use colored::Colorize;

use super::terminal::{color_value, print_section};

/// Parsed coaching request, one step removed from clap's raw arguments.
pub struct RunArgs {
    pub symbol: String,
    pub entry_price: f64,
    pub entry_date: NaiveDate,
    pub horizon_days: u32,
    pub position_size: Option<f64>,
    pub stock_beta: Option<f64>,
    pub sector: Option<String>,
    pub use_mock: bool,
    pub save: bool,
}

impl RunArgs {
    fn behavioral(&self) -> Option<BehavioralAttributes> {
        match (self.position_size, self.stock_beta, &self.sector) {
            (Some(position_size), Some(stock_beta), Some(sector)) => Some(BehavioralAttributes {
                position_size,
                stock_beta,
                sector: sector.clone(),
            }),
            _ => None,
        }
    }
}

/// Run one coaching request end to end: build the orchestrator, call it,
/// and print the report. Returns the error the caller should map to an
/// exit code; prints nothing on failure (the caller does that).
pub async fn execute(args: &RunArgs, db_path: &str) -> Result<(), CoachError> {
    let store = Store::open(db_path).map_err(CoachError::from)?;

    let mock: Arc<dyn MarketData> = Arc::new(MockMarketData::default());
    let live: Arc<dyn MarketData> = if args.use_mock {
        mock.clone()
    } else {
        match LiveMarketData::from_env(DEFAULT_BASE_URL) {
            Ok(adapter) => Arc::new(adapter),
            Err(e) => return Err(CoachError::from(e)),
        }
    };

    let orchestrator = Orchestrator::new(live, mock, store);

    let request = AnalyzeRequest {
        symbol: args.symbol.clone(),
        entry_price: args.entry_price,
        entry_date: args.entry_date,
        horizon_days: args.horizon_days,
        behavioral: args.behavioral(),
        source: if args.use_mock { DataSource::Mock } else { DataSource::Live },
        save: args.save,
    };

    let report = orchestrator.analyze(&request, &Cancellation::new()).await?;
    render_report(&report, args.horizon_days);
    Ok(())
}

fn render_report(report: &CoachingReport, horizon_days: u32) {
    println!("\n{}", "═".repeat(70).cyan());
    println!(
        "  {} {}",
        "COACHING REPORT".cyan().bold(),
        report.trade.symbol.dimmed()
    );
    println!("{}\n", "═".repeat(70).cyan());

    print_section("TRADE SUMMARY");
    println!("  {} {}", "Symbol:".dimmed(), report.trade.symbol.white());
    println!(
        "  {} {}",
        "Entry price:".dimmed(),
        format_currency(report.trade.entry_price)
    );
    println!(
        "  {} {}",
        "Entry date:".dimmed(),
        report.trade.entry_date.to_string().white()
    );
    if RECOGNIZED_HORIZONS.contains(&horizon_days) {
        println!("  {} {} days", "Horizon:".dimmed(), horizon_days);
    } else {
        println!(
            "  {} {} days {}",
            "Horizon:".dimmed(),
            horizon_days,
            "(unrecognized)".yellow()
        );
    }

    print_section("TIMING EFFICIENCY ANALYSIS");
    let t = &report.timing;
    println!(
        "  {} {}",
        "Max favorable excursion:".dimmed(),
        color_value(t.mfe_percent, format!("{:.2}%", t.mfe_percent), false)
    );
    println!(
        "  {} {}",
        "Max adverse excursion:".dimmed(),
        color_value(t.mae_percent, format!("{:.2}%", t.mae_percent), true)
    );
    println!(
        "  {} {}",
        "Ideal entry:".dimmed(),
        format_currency(t.ideal_entry)
    );
    println!(
        "  {} {}",
        "Entry timing score:".dimmed(),
        color_value(
            t.entry_timing_score,
            format!("{:.2}%", t.entry_timing_score),
            false
        )
    );
    println!(
        "  {} {:.2}%",
        "Missed profit potential:".dimmed(),
        t.missed_profit_potential
    );
    println!("  {} {}", "Verdict:".dimmed(), t.verdict.as_str().bold());

    print_section("BEHAVIORAL PATTERN ANALYSIS");
    let b = &report.behavioral;
    if b.anomalies.is_empty() && b.warnings.is_empty() {
        println!("  {}", "No anomalies detected.".green());
    }
    for anomaly in &b.anomalies {
        println!("  {} {}", "Anomaly:".red().bold(), anomaly.message);
    }
    for warning in &b.warnings {
        println!("  {} {}", "Notice:".yellow().bold(), warning.message);
    }

    print_section("COACHING ADVICE");
    println!("  {}", coaching_advice(report));

    if !report.persisted_analysis && report.trade_id > 0 {
        println!(
            "\n{}",
            "Warning: trade was saved but its analysis could not be persisted.".yellow()
        );
    }
}

fn coaching_advice(report: &CoachingReport) -> String {
    use coach_core::Verdict;

    let timing_line = match report.timing.verdict {
        Verdict::Excellent => "Entry timing was excellent; little room to improve.",
        Verdict::Good => "Entry timing was solid.",
        Verdict::Fair => "Entry timing was fair; consider waiting for better confirmation.",
        Verdict::Poor => "Entry timing was poor; review what triggered this entry.",
        Verdict::Unknown => "Not enough post-entry data to grade this entry.",
    };

    if report.behavioral.is_anomaly {
        format!(
            "{} Additionally, this trade deviates from your typical pattern: review the flagged anomalies above before sizing similarly again.",
            timing_line
        )
    } else {
        timing_line.to_string()
    }
}

/// Format a currency amount with two decimals and thousands separators.
fn format_currency(value: f64) -> String {
    let negative = value < 0.0;
    let value = value.abs();
    let integer_part = value.trunc() as i64;
    let fractional = (value.fract() * 100.0).round() as i64;

    let mut grouped = String::new();
    let digits = integer_part.to_string();
    for (i, c) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    let grouped: String = grouped.chars().rev().collect();

    format!(
        "{}${}.{:02}",
        if negative { "-" } else { "" },
        grouped,
        fractional
    )
}
