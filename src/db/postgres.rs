//! PostgreSQL storage for bars, indicators and signals

use super::{BarStore, IndicatorSink, SignalSink};
use crate::models::bar::Bar;
use crate::models::indicators::IndicatorPoint;
use crate::models::signal::{SignalEvent, SignalType};
use crate::services::market_data::BarSource;
use async_trait::async_trait;
use chrono::NaiveDate;
use tokio_postgres::{Client, NoTls};
use tracing::{debug, error};

pub struct PostgresStore {
    client: Client,
}

impl PostgresStore {
    pub async fn connect(database_url: &str) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let (client, connection) = tokio_postgres::connect(database_url, NoTls)
            .await
            .map_err(|e| {
                Box::new(std::io::Error::new(
                    std::io::ErrorKind::ConnectionRefused,
                    format!("Failed to connect to PostgreSQL: {}", e),
                )) as Box<dyn std::error::Error + Send + Sync>
            })?;

        tokio::spawn(async move {
            if let Err(e) = connection.await {
                error!(error = %e, "PostgreSQL connection error");
            }
        });

        let store = Self { client };
        store.init_schema().await?;
        Ok(store)
    }

    async fn init_schema(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.client
            .batch_execute(
                "CREATE TABLE IF NOT EXISTS stocks (
                    id SERIAL PRIMARY KEY,
                    ticker TEXT NOT NULL,
                    date DATE NOT NULL,
                    open DOUBLE PRECISION NOT NULL,
                    high DOUBLE PRECISION NOT NULL,
                    low DOUBLE PRECISION NOT NULL,
                    close DOUBLE PRECISION NOT NULL,
                    volume DOUBLE PRECISION NOT NULL,
                    ten_day_ma DOUBLE PRECISION,
                    fifty_day_ma DOUBLE PRECISION,
                    two_hundred_day_ma DOUBLE PRECISION,
                    rsi DOUBLE PRECISION,
                    macd DOUBLE PRECISION,
                    signal_line DOUBLE PRECISION,
                    UNIQUE (ticker, date)
                );
                CREATE INDEX IF NOT EXISTS stocks_ticker_idx ON stocks (ticker);
                CREATE TABLE IF NOT EXISTS signals (
                    id SERIAL PRIMARY KEY,
                    ticker TEXT NOT NULL,
                    signal_type TEXT NOT NULL,
                    date DATE NOT NULL,
                    stock_price DOUBLE PRECISION NOT NULL,
                    volume BIGINT NOT NULL,
                    stop_loss DOUBLE PRECISION NOT NULL,
                    take_profit DOUBLE PRECISION NOT NULL
                );
                CREATE INDEX IF NOT EXISTS signals_ticker_idx ON signals (ticker);",
            )
            .await
            .map_err(|e| {
                Box::new(std::io::Error::other(format!(
                    "Failed to create schema: {}",
                    e
                ))) as Box<dyn std::error::Error + Send + Sync>
            })?;
        Ok(())
    }

    /// Signals ordered by date, optionally for one ticker.
    pub async fn get_signals(
        &self,
        ticker: Option<&str>,
    ) -> Result<Vec<SignalEvent>, Box<dyn std::error::Error + Send + Sync>> {
        let rows = match ticker {
            Some(t) => {
                self.client
                    .query(
                        "SELECT ticker, signal_type, date, stock_price, volume, stop_loss, take_profit
                         FROM signals WHERE ticker = $1 ORDER BY date, id",
                        &[&t],
                    )
                    .await
            }
            None => {
                self.client
                    .query(
                        "SELECT ticker, signal_type, date, stock_price, volume, stop_loss, take_profit
                         FROM signals ORDER BY date, id",
                        &[],
                    )
                    .await
            }
        }
        .map_err(|e| {
            Box::new(std::io::Error::other(format!("Failed to query signals: {}", e)))
                as Box<dyn std::error::Error + Send + Sync>
        })?;

        let mut signals = Vec::with_capacity(rows.len());
        for row in rows {
            let signal_type: String = row.get(1);
            let volume: i64 = row.get(4);
            signals.push(SignalEvent {
                ticker: row.get(0),
                signal_type: signal_type
                    .parse::<SignalType>()
                    .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?,
                date: row.get(2),
                stock_price: row.get(3),
                volume: u64::try_from(volume)?,
                stop_loss: row.get(5),
                take_profit: row.get(6),
            });
        }
        Ok(signals)
    }
}

#[async_trait]
impl BarSource for PostgresStore {
    async fn fetch_bars(
        &self,
        ticker: &str,
    ) -> Result<Vec<Bar>, Box<dyn std::error::Error + Send + Sync>> {
        let rows = self
            .client
            .query(
                "SELECT date, open, high, low, close, volume
                 FROM stocks WHERE ticker = $1 ORDER BY date",
                &[&ticker],
            )
            .await
            .map_err(|e| {
                Box::new(std::io::Error::other(format!("Failed to query bars: {}", e)))
                    as Box<dyn std::error::Error + Send + Sync>
            })?;

        Ok(rows
            .iter()
            .map(|row| {
                let date: NaiveDate = row.get(0);
                Bar::new(date, row.get(1), row.get(2), row.get(3), row.get(4), row.get(5))
            })
            .collect())
    }

    fn name(&self) -> &'static str {
        "postgres"
    }
}

#[async_trait]
impl BarStore for PostgresStore {
    async fn store_bars(
        &self,
        ticker: &str,
        bars: &[Bar],
    ) -> Result<usize, Box<dyn std::error::Error + Send + Sync>> {
        let statement = self
            .client
            .prepare(
                "INSERT INTO stocks (ticker, date, open, high, low, close, volume)
                 VALUES ($1, $2, $3, $4, $5, $6, $7)
                 ON CONFLICT (ticker, date) DO NOTHING",
            )
            .await?;

        let mut inserted = 0;
        for bar in bars {
            inserted += self
                .client
                .execute(
                    &statement,
                    &[
                        &ticker,
                        &bar.date,
                        &bar.open,
                        &bar.high,
                        &bar.low,
                        &bar.close,
                        &bar.volume,
                    ],
                )
                .await
                .map_err(|e| {
                    Box::new(std::io::Error::other(format!(
                        "Failed to store bar {} for {}: {}",
                        bar.date, ticker, e
                    ))) as Box<dyn std::error::Error + Send + Sync>
                })? as usize;
        }
        debug!(ticker = %ticker, inserted, total = bars.len(), "Stored {} of {} bars for {}", inserted, bars.len(), ticker);
        Ok(inserted)
    }
}

#[async_trait]
impl IndicatorSink for PostgresStore {
    async fn persist_indicator(
        &self,
        ticker: &str,
        point: &IndicatorPoint,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        let updated = self
            .client
            .execute(
                "UPDATE stocks
                 SET ten_day_ma = $3, fifty_day_ma = $4, two_hundred_day_ma = $5,
                     rsi = $6, macd = $7, signal_line = $8
                 WHERE ticker = $1 AND date = $2",
                &[
                    &ticker,
                    &point.date,
                    &point.ten_day_ma,
                    &point.fifty_day_ma,
                    &point.two_hundred_day_ma,
                    &point.rsi,
                    &point.macd,
                    &point.signal_line,
                ],
            )
            .await
            .map_err(|e| {
                Box::new(std::io::Error::other(format!(
                    "Failed to update indicators: {}",
                    e
                ))) as Box<dyn std::error::Error + Send + Sync>
            })?;
        Ok(updated > 0)
    }
}

#[async_trait]
impl SignalSink for PostgresStore {
    async fn persist_signal(
        &self,
        event: &SignalEvent,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let volume = i64::try_from(event.volume)?;
        self.client
            .execute(
                "INSERT INTO signals (ticker, signal_type, date, stock_price, volume, stop_loss, take_profit)
                 VALUES ($1, $2, $3, $4, $5, $6, $7)",
                &[
                    &event.ticker,
                    &event.signal_type.as_str(),
                    &event.date,
                    &event.stock_price,
                    &volume,
                    &event.stop_loss,
                    &event.take_profit,
                ],
            )
            .await
            .map_err(|e| {
                Box::new(std::io::Error::other(format!("Failed to store signal: {}", e)))
                    as Box<dyn std::error::Error + Send + Sync>
            })?;
        Ok(())
    }
}
