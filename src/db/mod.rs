//! Persistence collaborators for bars, indicator values and signal records.

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

use crate::models::bar::Bar;
use crate::models::indicators::IndicatorPoint;
use crate::models::signal::SignalEvent;
use crate::services::market_data::BarSource;
use async_trait::async_trait;

/// Writable bar storage; stored bars are read back through [`BarSource`].
#[async_trait]
pub trait BarStore: BarSource {
    /// Insert bars for `ticker`, ignoring dates already stored. Returns rows inserted.
    async fn store_bars(
        &self,
        ticker: &str,
        bars: &[Bar],
    ) -> Result<usize, Box<dyn std::error::Error + Send + Sync>>;
}

#[async_trait]
pub trait IndicatorSink: Send + Sync {
    /// Upsert indicator values onto the stored bar of the same ticker and date.
    /// Returns `Ok(false)` without error when no such bar is stored.
    async fn persist_indicator(
        &self,
        ticker: &str,
        point: &IndicatorPoint,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>>;
}

#[async_trait]
pub trait SignalSink: Send + Sync {
    /// Append a signal record. Duplicates are not filtered.
    async fn persist_signal(
        &self,
        event: &SignalEvent,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}
