//! Prometheus metrics for pipeline runs.

use prometheus::{Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};
use std::path::Path;

pub struct Metrics {
    registry: Registry,
    pub tickers_processed_total: IntCounterVec,
    pub signals_emitted_total: IntCounterVec,
    pub indicator_rows_persisted_total: IntCounter,
    pub indicator_rows_skipped_total: IntCounter,
    pub ticker_pipeline_duration_seconds: Histogram,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let tickers_processed_total = IntCounterVec::new(
            Opts::new("tickers_processed_total", "Ticker pipeline runs by outcome"),
            &["outcome"],
        )?;
        let signals_emitted_total = IntCounterVec::new(
            Opts::new("signals_emitted_total", "Signal records persisted by type"),
            &["signal_type"],
        )?;
        let indicator_rows_persisted_total = IntCounter::new(
            "indicator_rows_persisted_total",
            "Indicator rows written onto stored bars",
        )?;
        let indicator_rows_skipped_total = IntCounter::new(
            "indicator_rows_skipped_total",
            "Indicator rows with no stored bar to attach to",
        )?;
        let ticker_pipeline_duration_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "ticker_pipeline_duration_seconds",
                "Wall time of one ticker's pipeline",
            )
            .buckets(vec![0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 15.0, 60.0]),
        )?;

        registry.register(Box::new(tickers_processed_total.clone()))?;
        registry.register(Box::new(signals_emitted_total.clone()))?;
        registry.register(Box::new(indicator_rows_persisted_total.clone()))?;
        registry.register(Box::new(indicator_rows_skipped_total.clone()))?;
        registry.register(Box::new(ticker_pipeline_duration_seconds.clone()))?;

        Ok(Self {
            registry,
            tickers_processed_total,
            signals_emitted_total,
            indicator_rows_persisted_total,
            indicator_rows_skipped_total,
            ticker_pipeline_duration_seconds,
        })
    }

    /// Prometheus text exposition format.
    pub fn export(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }

    /// Write the export to `path` for a node_exporter textfile collector.
    pub fn write_textfile(&self, path: &Path) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let text = self.export()?;
        let tmp = path.with_extension("prom.tmp");
        std::fs::write(&tmp, text)?;
        std::fs::rename(&tmp, path)?;
        Ok(())
    }
}
