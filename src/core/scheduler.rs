//! Cron-based scheduler running the pipeline over the ticker universe

use crate::core::pipeline::Pipeline;
use chrono::{DateTime, Utc};
use cron::Schedule;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

pub struct PipelineScheduler {
    pipeline: Arc<Pipeline>,
    tickers: Vec<String>,
    schedule: Schedule,
    metrics_textfile: Option<PathBuf>,
    handle: Arc<RwLock<Option<tokio::task::JoinHandle<()>>>>,
}

impl PipelineScheduler {
    /// Create a new scheduler
    ///
    /// # Arguments
    /// * `pipeline` - Pipeline run on every tick
    /// * `tickers` - Universe handed to each run
    /// * `cron_expr` - Six-field cron expression (second minute hour day month weekday), UTC
    pub fn new(
        pipeline: Arc<Pipeline>,
        tickers: Vec<String>,
        cron_expr: &str,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let schedule = Schedule::from_str(cron_expr).map_err(|e| {
            Box::new(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("Invalid cron expression '{}': {}", cron_expr, e),
            )) as Box<dyn std::error::Error + Send + Sync>
        })?;

        info!(
            cron = %cron_expr,
            tickers = ?tickers,
            "PipelineScheduler: created with cron '{}'",
            cron_expr
        );

        Ok(Self {
            pipeline,
            tickers,
            schedule,
            metrics_textfile: None,
            handle: Arc::new(RwLock::new(None)),
        })
    }

    /// Rewrite Prometheus metrics to `path` after each run.
    pub fn with_metrics_textfile(mut self, path: PathBuf) -> Self {
        self.metrics_textfile = Some(path);
        self
    }

    /// Next tick after now.
    pub fn next_run(&self) -> Option<DateTime<Utc>> {
        self.schedule.upcoming(Utc).next()
    }

    /// Start the scheduler
    pub async fn start(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let pipeline = self.pipeline.clone();
        let tickers = self.tickers.clone();
        let schedule = self.schedule.clone();
        let textfile = self.metrics_textfile.clone();

        let handle = tokio::spawn(async move {
            info!("PipelineScheduler: started, waiting for cron schedule...");

            loop {
                let Some(next_tick) = schedule.upcoming(Utc).next() else {
                    warn!("PipelineScheduler: schedule has no upcoming ticks, stopping");
                    break;
                };
                let now = Utc::now();
                if next_tick > now {
                    let duration = (next_tick - now).to_std().unwrap_or_default();
                    tokio::time::sleep(duration).await;
                }

                info!(
                    ticker_count = tickers.len(),
                    "PipelineScheduler: cron tick, running pipeline for {} tickers",
                    tickers.len()
                );
                let report = pipeline.run(&tickers).await;
                for (ticker, err) in report.failures() {
                    warn!(ticker = %ticker, error = %err, "PipelineScheduler: {} failed this run", ticker);
                }

                if let (Some(path), Some(metrics)) = (textfile.as_ref(), pipeline.metrics()) {
                    if let Err(e) = metrics.write_textfile(path) {
                        error!(path = %path.display(), error = %e, "PipelineScheduler: failed to write metrics");
                    }
                }
            }
        });

        {
            let mut h = self.handle.write().await;
            *h = Some(handle);
        }

        info!("PipelineScheduler: started successfully");
        Ok(())
    }

    /// Stop the scheduler
    pub async fn stop(&self) {
        let mut handle = self.handle.write().await;
        if let Some(h) = handle.take() {
            h.abort();
            info!("PipelineScheduler: stopped");
        }
    }

    /// Check if the scheduler is running
    pub async fn is_running(&self) -> bool {
        let handle = self.handle.read().await;
        handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}
