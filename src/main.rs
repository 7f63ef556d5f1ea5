mod config;
mod error;
mod indicator;
mod model;
mod pipeline;
mod provider;
mod render;
mod server;

use std::path::Path;
use std::sync::Arc;

use chrono::{Days, Utc};
use clap::Parser;
use derive_more::{Display, Error};
use error_stack::{Report, ResultExt};
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::AppConfig;
use model::{SignalSummary, normalize_bars};
use pipeline::IndicatorPipeline;
use provider::MarketData;
use provider::yahoo::YahooProvider;
use render::Renderer;
use render::terminal::TerminalRenderer;
use server::DashboardSnapshot;

#[derive(Debug, Display, Error)]
pub enum AppError {
    #[display("configuration error")]
    Config,
    #[display("market data error")]
    MarketData,
    #[display("indicator pipeline error")]
    Pipeline,
    #[display("dashboard server error")]
    Server,
}

#[derive(Parser)]
#[command(name = "stock-dashboard", about = "Equity indicator dashboard")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Ticker symbol, overriding the config file
    #[arg(short, long)]
    ticker: Option<String>,
}

#[tokio::main]
async fn main() {
    if let Err(report) = run().await {
        eprintln!("{report:?}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Report<AppError>> {
    let cli = Cli::parse();
    let mut config = config::load(Path::new(&cli.config)).change_context(AppError::Config)?;
    if let Some(ticker) = cli.ticker {
        config.market.ticker = ticker;
    }

    init_tracing(&config);

    let ticker = config.market.ticker.clone();
    let end = Utc::now().date_naive();
    let start = end - Days::new(config.market.lookback_days as u64);

    let pipeline = IndicatorPipeline::new(&config.indicators, config.signals)
        .change_context(AppError::Pipeline)?;

    // ── Fetch ─────────────────────────────────────────────────────────────────
    let provider = YahooProvider::new();
    info!(ticker = %ticker, start = %start, end = %end, provider = provider.name(), "fetching daily bars");

    let bars = provider
        .fetch_daily(&ticker, start, end)
        .await
        .change_context(AppError::MarketData)
        .attach_with(|| format!("ticker: {ticker}"))?;
    let bars = normalize_bars(bars);

    // ── Compute ───────────────────────────────────────────────────────────────
    let rows = pipeline.compute(&bars);
    let summary = SignalSummary::from_rows(&rows);

    TerminalRenderer.render(&ticker, &rows, &summary);

    // ── Dashboard ─────────────────────────────────────────────────────────────
    if config.server.enabled {
        let snapshot = Arc::new(DashboardSnapshot {
            ticker,
            rows,
            summary,
        });
        server::serve(&config.server.bind_addr, snapshot)
            .await
            .change_context(AppError::Server)?;
    }

    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::new(&config.general.log_level);
    match config.general.log_format.as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter)
                .init();
        }
        _ => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
        }
    }
}
