//! Stock signal worker
//!
//! Runs the pipeline over the configured tickers on a cron schedule
//! until interrupted.

use dotenvy::dotenv;
use stocksignal::config::Config;
use stocksignal::core::bootstrap::build_pipeline;
use stocksignal::core::scheduler::PipelineScheduler;
use stocksignal::logging;
use stocksignal::metrics::Metrics;
use std::sync::Arc;
use tokio::signal;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Load environment variables from .env if present
    dotenv().ok();

    // Initialize logging based on environment
    logging::init_logging();

    let config = Config::from_env()?;
    info!("Starting stock signal worker");
    info!(environment = %config.environment, "Environment");
    info!(concurrency = config.concurrency, "Worker concurrency: {}", config.concurrency);

    let metrics = Arc::new(Metrics::new()?);
    let pipeline = build_pipeline(&config, Some(metrics)).await?;

    let mut scheduler = PipelineScheduler::new(pipeline, config.tickers.clone(), &config.schedule)
        .map_err(|e| format!("Failed to create scheduler: {}", e))?;
    if let Some(path) = config.metrics_textfile.clone() {
        scheduler = scheduler.with_metrics_textfile(path);
    }
    if let Some(next) = scheduler.next_run() {
        info!(next_run = %next, "Next pipeline run at {}", next);
    }
    scheduler
        .start()
        .await
        .map_err(|e| format!("Failed to start scheduler: {}", e))?;

    // Graceful shutdown
    info!("Worker started, waiting for shutdown signal...");
    tokio::select! {
        _ = signal::ctrl_c() => {
            info!("Shutting down worker...");
            scheduler.stop().await;
            info!("Worker stopped");
        }
    }

    Ok(())
}
