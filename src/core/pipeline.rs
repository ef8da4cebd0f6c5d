//! Per-ticker orchestration: fetch, indicators, detection, materialization, persistence.

use crate::config::Config;
use crate::core::retry::{with_retry, BoxError};
use crate::db::{BarStore, IndicatorSink, SignalSink};
use crate::indicators::{calculate_indicators, IndicatorError};
use crate::metrics::Metrics;
use crate::models::bar::find_bar;
use crate::models::indicators::IndicatorParams;
use crate::services::market_data::BarSource;
use crate::signals::{DetectorConfig, SignalDetector, SignalError, SignalMaterializer, StopLossTakeProfit};
use futures_util::future::join_all;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("failed to ingest bars: {0}")]
    Ingest(#[source] BoxError),
    #[error("failed to fetch bars: {0}")]
    Fetch(#[source] BoxError),
    #[error("indicator calculation failed: {0}")]
    Indicators(#[from] IndicatorError),
    #[error("signal detection failed: {0}")]
    Detection(#[from] SignalError),
    #[error("failed to persist indicators: {0}")]
    PersistIndicators(#[source] BoxError),
    #[error("failed to persist signal: {0}")]
    PersistSignal(#[source] BoxError),
    #[error("ticker task aborted: {0}")]
    Task(String),
}

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub indicators: IndicatorParams,
    pub detector: DetectorConfig,
    pub levels: StopLossTakeProfit,
    pub concurrency: usize,
    pub retry_max_times: usize,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            indicators: IndicatorParams::default(),
            detector: DetectorConfig::default(),
            levels: StopLossTakeProfit::default(),
            concurrency: 4,
            retry_max_times: 3,
        }
    }
}

impl From<&Config> for PipelineSettings {
    fn from(config: &Config) -> Self {
        Self {
            indicators: config.indicators,
            detector: config.detector,
            levels: config.levels,
            concurrency: config.concurrency,
            retry_max_times: config.retry_max_times,
        }
    }
}

/// Counts for one successful ticker run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickerOutcome {
    pub ticker: String,
    pub bars_ingested: usize,
    pub bars: usize,
    pub indicators_persisted: usize,
    pub indicators_skipped: usize,
    pub signals_detected: usize,
    pub signals_persisted: usize,
    pub signals_rejected: usize,
}

#[derive(Debug)]
pub struct TickerResult {
    pub ticker: String,
    pub result: Result<TickerOutcome, PipelineError>,
}

/// Per-ticker results in the order the tickers were given.
#[derive(Debug, Default)]
pub struct PipelineReport {
    pub results: Vec<TickerResult>,
}

impl PipelineReport {
    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.result.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.results.len() - self.succeeded()
    }

    pub fn outcome(&self, ticker: &str) -> Option<&Result<TickerOutcome, PipelineError>> {
        self.results.iter().find(|r| r.ticker == ticker).map(|r| &r.result)
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &PipelineError)> {
        self.results
            .iter()
            .filter_map(|r| r.result.as_ref().err().map(|e| (r.ticker.as_str(), e)))
    }

    pub fn signals_persisted(&self) -> usize {
        self.results
            .iter()
            .filter_map(|r| r.result.as_ref().ok())
            .map(|o| o.signals_persisted)
            .sum()
    }
}

/// Remote source whose bars are copied into the store before each run.
#[derive(Clone)]
pub struct Ingest {
    pub remote: Arc<dyn BarSource>,
    pub store: Arc<dyn BarStore>,
}

pub struct Pipeline {
    source: Arc<dyn BarSource>,
    indicator_sink: Arc<dyn IndicatorSink>,
    signal_sink: Arc<dyn SignalSink>,
    ingest: Option<Ingest>,
    settings: PipelineSettings,
    detector: SignalDetector,
    materializer: SignalMaterializer,
    metrics: Option<Arc<Metrics>>,
}

impl Pipeline {
    pub fn new(
        source: Arc<dyn BarSource>,
        indicator_sink: Arc<dyn IndicatorSink>,
        signal_sink: Arc<dyn SignalSink>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            source,
            indicator_sink,
            signal_sink,
            ingest: None,
            detector: SignalDetector::new(settings.detector),
            materializer: SignalMaterializer::new(settings.levels),
            settings,
            metrics: None,
        }
    }

    /// Use one store for bars, indicators and signals.
    pub fn from_store<S>(store: Arc<S>, settings: PipelineSettings) -> Self
    where
        S: BarStore + IndicatorSink + SignalSink + 'static,
    {
        Self::new(store.clone(), store.clone(), store, settings)
    }

    pub fn with_ingest(mut self, remote: Arc<dyn BarSource>, store: Arc<dyn BarStore>) -> Self {
        self.ingest = Some(Ingest { remote, store });
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    pub fn metrics(&self) -> Option<&Arc<Metrics>> {
        self.metrics.as_ref()
    }

    /// Run every ticker as its own task and gather the results.
    ///
    /// At most `concurrency` tickers run at once. A failing or panicking ticker is
    /// reported and the others carry on.
    pub async fn run(self: &Arc<Self>, tickers: &[String]) -> PipelineReport {
        let semaphore = Arc::new(Semaphore::new(self.settings.concurrency.max(1)));
        info!(
            tickers = tickers.len(),
            concurrency = self.settings.concurrency,
            "Pipeline: starting run for {} tickers",
            tickers.len()
        );

        let handles = tickers.iter().map(|ticker| {
            let pipeline = Arc::clone(self);
            let semaphore = Arc::clone(&semaphore);
            let ticker = ticker.clone();
            let handle = tokio::spawn({
                let ticker = ticker.clone();
                async move {
                    let _permit = semaphore.acquire_owned().await.ok();
                    pipeline.run_ticker(&ticker).await
                }
            });
            async move {
                let result = handle
                    .await
                    .unwrap_or_else(|e| Err(PipelineError::Task(e.to_string())));
                TickerResult { ticker, result }
            }
        });

        let report = PipelineReport {
            results: join_all(handles).await,
        };

        for (ticker, err) in report.failures() {
            if matches!(err, PipelineError::Task(_)) {
                error!(ticker = %ticker, error = %err, "Pipeline: task for {} aborted", ticker);
                if let Some(ref metrics) = self.metrics {
                    metrics.tickers_processed_total.with_label_values(&["failure"]).inc();
                }
            }
        }

        info!(
            succeeded = report.succeeded(),
            failed = report.failed(),
            signals = report.signals_persisted(),
            "Pipeline: run finished, {} succeeded, {} failed",
            report.succeeded(),
            report.failed()
        );
        report
    }

    /// Full pipeline for one ticker, with timing, metrics and logging.
    pub async fn run_ticker(&self, ticker: &str) -> Result<TickerOutcome, PipelineError> {
        let start = Instant::now();
        let result = self.process_ticker(ticker).await;

        match &result {
            Ok(outcome) => info!(
                ticker = %ticker,
                bars = outcome.bars,
                indicators = outcome.indicators_persisted,
                signals = outcome.signals_persisted,
                "Pipeline: {} done, {} bars, {} signals",
                ticker,
                outcome.bars,
                outcome.signals_persisted
            ),
            Err(e) => error!(ticker = %ticker, error = %e, "Pipeline: {} failed", ticker),
        }

        if let Some(ref metrics) = self.metrics {
            let label = if result.is_ok() { "success" } else { "failure" };
            metrics.tickers_processed_total.with_label_values(&[label]).inc();
            metrics
                .ticker_pipeline_duration_seconds
                .observe(start.elapsed().as_secs_f64());
        }
        result
    }

    async fn process_ticker(&self, ticker: &str) -> Result<TickerOutcome, PipelineError> {
        let retries = self.settings.retry_max_times;
        let mut outcome = TickerOutcome {
            ticker: ticker.to_string(),
            ..Default::default()
        };

        if let Some(ref ingest) = self.ingest {
            outcome.bars_ingested = self.ingest_bars(ingest, ticker).await?;
        }

        let source = self.source.as_ref();
        let bars = with_retry("fetch_bars", ticker, retries, move || async move {
            source.fetch_bars(ticker).await
        })
        .await
        .map_err(PipelineError::Fetch)?;
        outcome.bars = bars.len();

        if bars.is_empty() {
            warn!(ticker = %ticker, source = source.name(), "Pipeline: no bars stored for {}", ticker);
            return Ok(outcome);
        }

        let points = calculate_indicators(&bars, &self.settings.indicators)?;

        let sink = self.indicator_sink.as_ref();
        for point in &points {
            let persisted = with_retry("persist_indicator", ticker, retries, move || async move {
                sink.persist_indicator(ticker, point).await
            })
            .await
            .map_err(PipelineError::PersistIndicators)?;
            if persisted {
                outcome.indicators_persisted += 1;
            } else {
                outcome.indicators_skipped += 1;
            }
        }
        if outcome.indicators_skipped > 0 {
            debug!(
                ticker = %ticker,
                skipped = outcome.indicators_skipped,
                "Pipeline: {} indicator rows had no stored bar",
                outcome.indicators_skipped
            );
        }

        let detected = self.detector.detect(&bars, &points)?;
        outcome.signals_detected = detected.len();

        let sink = self.signal_sink.as_ref();
        for signal in &detected {
            let Some(bar) = find_bar(&bars, signal.date) else {
                warn!(ticker = %ticker, date = %signal.date, "Pipeline: no bar for signal date");
                outcome.signals_rejected += 1;
                continue;
            };
            let event = match self.materializer.materialize(ticker, signal, bar) {
                Ok(event) => event,
                Err(e) => {
                    warn!(
                        ticker = %ticker,
                        signal_type = %signal.signal_type,
                        error = %e,
                        "Pipeline: rejected {} signal for {}",
                        signal.signal_type,
                        ticker
                    );
                    outcome.signals_rejected += 1;
                    continue;
                }
            };

            // appends are not idempotent: no retry
            sink.persist_signal(&event).await.map_err(PipelineError::PersistSignal)?;
            outcome.signals_persisted += 1;

            if let Some(ref metrics) = self.metrics {
                metrics
                    .signals_emitted_total
                    .with_label_values(&[event.signal_type.as_str()])
                    .inc();
            }
        }

        if let Some(ref metrics) = self.metrics {
            metrics
                .indicator_rows_persisted_total
                .inc_by(outcome.indicators_persisted as u64);
            metrics
                .indicator_rows_skipped_total
                .inc_by(outcome.indicators_skipped as u64);
        }

        Ok(outcome)
    }

    async fn ingest_bars(&self, ingest: &Ingest, ticker: &str) -> Result<usize, PipelineError> {
        let retries = self.settings.retry_max_times;
        let remote = ingest.remote.as_ref();
        let bars = with_retry("fetch_remote_bars", ticker, retries, move || async move {
            remote.fetch_bars(ticker).await
        })
        .await
        .map_err(PipelineError::Ingest)?;

        let store = ingest.store.as_ref();
        let fetched = &bars;
        let inserted = with_retry("store_bars", ticker, retries, move || async move {
            store.store_bars(ticker, fetched).await
        })
        .await
        .map_err(PipelineError::Ingest)?;

        info!(
            ticker = %ticker,
            source = remote.name(),
            fetched = bars.len(),
            inserted,
            "Pipeline: ingested {} new of {} bars for {}",
            inserted,
            bars.len(),
            ticker
        );
        Ok(inserted)
    }
}
