//! Stock signal pipeline, one-shot run
//!
//! Ingests daily bars (optional), computes indicators, detects signals and
//! persists everything for the configured tickers, then exits.

use dotenvy::dotenv;
use stocksignal::config::Config;
use stocksignal::core::bootstrap::build_pipeline;
use stocksignal::logging;
use stocksignal::metrics::Metrics;
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Load environment variables from .env if present
    dotenv().ok();

    logging::init_logging();

    let config = Config::from_env()?;
    info!("Starting stock signal pipeline");
    info!(environment = %config.environment, "Environment");
    info!(
        tickers = ?config.tickers,
        "Tickers: {}",
        config.tickers.join(", ")
    );

    let metrics = Arc::new(Metrics::new()?);
    let pipeline = build_pipeline(&config, Some(metrics.clone())).await?;

    let report = pipeline.run(&config.tickers).await;
    for result in &report.results {
        match &result.result {
            Ok(outcome) => info!(
                ticker = %outcome.ticker,
                bars = outcome.bars,
                indicators = outcome.indicators_persisted,
                skipped = outcome.indicators_skipped,
                signals = outcome.signals_persisted,
                rejected = outcome.signals_rejected,
                "{}: {} bars, {} indicator rows, {} signals",
                outcome.ticker,
                outcome.bars,
                outcome.indicators_persisted,
                outcome.signals_persisted
            ),
            Err(e) => error!(ticker = %result.ticker, error = %e, "{} failed", result.ticker),
        }
    }

    if let Some(ref path) = config.metrics_textfile {
        metrics.write_textfile(path)?;
        info!(path = %path.display(), "Metrics written to {}", path.display());
    }

    if !report.results.is_empty() && report.succeeded() == 0 {
        return Err(format!("all {} tickers failed", report.failed()).into());
    }

    Ok(())
}
