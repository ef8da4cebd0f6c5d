//! Wiring of collaborators into a [`Pipeline`] from configuration.

use crate::config::Config;
use crate::core::pipeline::{Pipeline, PipelineSettings};
use crate::db::{BarStore, IndicatorSink, MemoryStore, PostgresStore, SignalSink};
use crate::metrics::Metrics;
use crate::services::yahoo::YahooBarSource;
use std::sync::Arc;
use tracing::{info, warn};

/// PostgreSQL when `DATABASE_URL` is set, otherwise an in-memory store.
pub async fn build_pipeline(
    config: &Config,
    metrics: Option<Arc<Metrics>>,
) -> Result<Arc<Pipeline>, Box<dyn std::error::Error + Send + Sync>> {
    let pipeline = match config.database_url {
        Some(ref url) => {
            info!("Initializing PostgreSQL connection...");
            let store = Arc::new(PostgresStore::connect(url).await?);
            info!("PostgreSQL connected");
            assemble(store, config)?
        }
        None => {
            warn!("DATABASE_URL not set, results are kept in memory only");
            assemble(Arc::new(MemoryStore::new()), config)?
        }
    };

    Ok(Arc::new(match metrics {
        Some(m) => pipeline.with_metrics(m),
        None => pipeline,
    }))
}

fn assemble<S>(store: Arc<S>, config: &Config) -> Result<Pipeline, Box<dyn std::error::Error + Send + Sync>>
where
    S: BarStore + IndicatorSink + SignalSink + 'static,
{
    let pipeline = Pipeline::from_store(store.clone(), PipelineSettings::from(config));
    if !config.ingest {
        return Ok(pipeline);
    }

    let remote = YahooBarSource::new(config.yahoo_base_url.clone(), config.start_date, config.end_date)?;
    info!(
        start = %config.start_date,
        end = %config.end_date,
        "Ingesting daily bars from {} to {}",
        config.start_date,
        config.end_date
    );
    Ok(pipeline.with_ingest(Arc::new(remote), store))
}
