//! In-process store used for dry runs and tests.

use super::{BarStore, IndicatorSink, SignalSink};
use crate::models::bar::Bar;
use crate::models::indicators::IndicatorPoint;
use crate::models::signal::SignalEvent;
use crate::services::market_data::BarSource;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct StoredRow {
    bar: Bar,
    indicators: Option<IndicatorPoint>,
}

#[derive(Default)]
pub struct MemoryStore {
    stocks: RwLock<HashMap<String, BTreeMap<chrono::NaiveDate, StoredRow>>>,
    signals: RwLock<Vec<SignalEvent>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-built bars, e.g. fixtures.
    pub async fn with_bars(self, ticker: &str, bars: &[Bar]) -> Self {
        {
            let mut stocks = self.stocks.write().await;
            insert_rows(stocks.entry(ticker.to_string()).or_default(), bars);
        }
        self
    }

    pub async fn indicators(&self, ticker: &str) -> Vec<IndicatorPoint> {
        let stocks = self.stocks.read().await;
        stocks
            .get(ticker)
            .map(|rows| rows.values().filter_map(|r| r.indicators).collect())
            .unwrap_or_default()
    }

    pub async fn signals(&self, ticker: Option<&str>) -> Vec<SignalEvent> {
        let signals = self.signals.read().await;
        signals
            .iter()
            .filter(|s| ticker.map_or(true, |t| s.ticker == t))
            .cloned()
            .collect()
    }
}

fn insert_rows(rows: &mut BTreeMap<chrono::NaiveDate, StoredRow>, bars: &[Bar]) -> usize {
    let mut inserted = 0;
    for bar in bars {
        if !rows.contains_key(&bar.date) {
            rows.insert(
                bar.date,
                StoredRow {
                    bar: *bar,
                    indicators: None,
                },
            );
            inserted += 1;
        }
    }
    inserted
}

#[async_trait]
impl BarSource for MemoryStore {
    async fn fetch_bars(
        &self,
        ticker: &str,
    ) -> Result<Vec<Bar>, Box<dyn std::error::Error + Send + Sync>> {
        let stocks = self.stocks.read().await;
        Ok(stocks
            .get(ticker)
            .map(|rows| rows.values().map(|r| r.bar).collect())
            .unwrap_or_default())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

#[async_trait]
impl BarStore for MemoryStore {
    async fn store_bars(
        &self,
        ticker: &str,
        bars: &[Bar],
    ) -> Result<usize, Box<dyn std::error::Error + Send + Sync>> {
        let mut stocks = self.stocks.write().await;
        Ok(insert_rows(stocks.entry(ticker.to_string()).or_default(), bars))
    }
}

#[async_trait]
impl IndicatorSink for MemoryStore {
    async fn persist_indicator(
        &self,
        ticker: &str,
        point: &IndicatorPoint,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        let mut stocks = self.stocks.write().await;
        match stocks.get_mut(ticker).and_then(|rows| rows.get_mut(&point.date)) {
            Some(row) => {
                row.indicators = Some(*point);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl SignalSink for MemoryStore {
    async fn persist_signal(
        &self,
        event: &SignalEvent,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.signals.write().await.push(event.clone());
        Ok(())
    }
}
