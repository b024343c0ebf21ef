//! coach - post-trade entry timing and behavioral coaching.

mod commands;

use chrono::NaiveDate;
use clap::Parser;
use coach_core::CoachError;
use coach_logging::LogConfig;
use colored::Colorize;

use commands::run::{execute, RunArgs};

#[derive(Parser)]
#[command(name = "coach")]
#[command(author, version, about = "Grade entry timing and flag behavioral anomalies for a trade", long_about = None)]
struct Cli {
    /// Ticker symbol, e.g. AAPL
    #[arg(required_unless_present = "init_db")]
    symbol: Option<String>,

    /// Entry price
    #[arg(required_unless_present = "init_db")]
    entry_price: Option<f64>,

    /// Entry date, YYYY-MM-DD
    #[arg(required_unless_present = "init_db")]
    entry_date: Option<String>,

    /// Position size in currency units
    #[arg(short = 'p', long = "position-size")]
    position_size: Option<f64>,

    /// Beta of the underlying relative to the market
    #[arg(short = 'b', long = "stock-beta")]
    stock_beta: Option<f64>,

    /// Free-form sector label
    #[arg(short = 's', long = "sector")]
    sector: Option<String>,

    /// Evaluation horizon in days. Recognized values: 7, 30, 90
    #[arg(short = 'H', long = "horizon", default_value_t = 30)]
    horizon: u32,

    /// Use the deterministic mock market-data adapter instead of the live broker
    #[arg(long)]
    mock: bool,

    /// Evaluate the trade without persisting it or its analyses
    #[arg(long)]
    no_save: bool,

    /// Initialize the database schema and exit
    #[arg(long)]
    init_db: bool,
}

fn print_error_and_hint(err: &CoachError) {
    eprintln!("{} {}", "error:".red().bold(), err);
    if matches!(err, CoachError::MarketData(_)) {
        eprintln!("{}", "hint: retry with --mock to use simulated price data".dimmed());
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let _log_guard = coach_logging::init_cli_logging(&LogConfig::from_env());

    let db_path = std::env::var("COACH_DB_PATH").unwrap_or_else(|_| "coach.db".to_string());

    if cli.init_db {
        match coach_store::Store::open(&db_path) {
            Ok(_) => {
                println!("Initialized database at {db_path}");
                std::process::exit(0);
            }
            Err(e) => {
                let err = CoachError::from(e);
                print_error_and_hint(&err);
                std::process::exit(err.exit_code());
            }
        }
    }

    let entry_date = match cli
        .entry_date
        .as_deref()
        .map(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d"))
    {
        Some(Ok(date)) => date,
        Some(Err(_)) => {
            let err = CoachError::InvalidInput(format!(
                "entry_date must be YYYY-MM-DD, got {:?}",
                cli.entry_date
            ));
            print_error_and_hint(&err);
            std::process::exit(err.exit_code());
        }
        None => unreachable!("clap enforces entry_date is present unless --init-db"),
    };

    let args = RunArgs {
        symbol: cli.symbol.expect("clap enforces symbol is present"),
        entry_price: cli.entry_price.expect("clap enforces entry_price is present"),
        entry_date,
        horizon_days: cli.horizon,
        position_size: cli.position_size,
        stock_beta: cli.stock_beta,
        sector: cli.sector,
        use_mock: cli.mock,
        save: !cli.no_save,
    };

    if let Err(err) = execute(&args, &db_path).await {
        print_error_and_hint(&err);
        std::process::exit(err.exit_code());
    }
}
