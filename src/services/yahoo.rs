//! Yahoo Finance chart endpoint as a daily bar source.

use crate::models::bar::Bar;
use crate::services::market_data::BarSource;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const USER_AGENT: &str = "Mozilla/5.0 (compatible; stocksignal/0.1)";

#[derive(Debug, Error)]
pub enum YahooError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
    #[error("base url '{0}' cannot take path segments")]
    BaseUrl(String),
    #[error("api error [{code}]: {description}")]
    Api { code: String, description: String },
    #[error("no chart data returned for {0}")]
    NoData(String),
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    quote: Vec<QuoteColumns>,
}

#[derive(Debug, Default, Deserialize)]
struct QuoteColumns {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

/// Daily bars for a fixed `[start, end)` range.
#[derive(Debug, Clone)]
pub struct YahooBarSource {
    base_url: String,
    client: reqwest::Client,
    start: NaiveDate,
    end: NaiveDate,
}

impl YahooBarSource {
    pub fn new(base_url: impl Into<String>, start: NaiveDate, end: NaiveDate) -> Result<Self, YahooError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self::with_client(base_url, client, start, end))
    }

    pub fn with_client(
        base_url: impl Into<String>,
        client: reqwest::Client,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            client,
            start,
            end,
        }
    }

    fn chart_url(&self, ticker: &str) -> Result<Url, YahooError> {
        let mut url = Url::parse(&self.base_url)?;
        url.path_segments_mut()
            .map_err(|_| YahooError::BaseUrl(self.base_url.clone()))?
            .pop_if_empty()
            .push(ticker);
        url.query_pairs_mut()
            .append_pair("period1", &unix_midnight(self.start).to_string())
            .append_pair("period2", &unix_midnight(self.end).to_string())
            .append_pair("interval", "1d")
            .append_pair("events", "history");
        Ok(url)
    }

    pub async fn fetch(&self, ticker: &str) -> Result<Vec<Bar>, YahooError> {
        let url = self.chart_url(ticker)?;
        debug!(ticker = %ticker, url = %url, "Yahoo: requesting daily bars for {}", ticker);

        let response: ChartResponse = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if let Some(err) = response.chart.error {
            return Err(YahooError::Api {
                code: err.code,
                description: err.description,
            });
        }
        let data = response
            .chart
            .result
            .and_then(|r| r.into_iter().next())
            .ok_or_else(|| YahooError::NoData(ticker.to_string()))?;

        let bars = chart_to_bars(data);
        debug!(ticker = %ticker, count = bars.len(), "Yahoo: parsed {} bars for {}", bars.len(), ticker);
        Ok(bars)
    }
}

#[async_trait]
impl BarSource for YahooBarSource {
    async fn fetch_bars(
        &self,
        ticker: &str,
    ) -> Result<Vec<Bar>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.fetch(ticker).await?)
    }

    fn name(&self) -> &'static str {
        "yahoo"
    }
}

fn cell(column: &[Option<f64>], i: usize) -> Option<f64> {
    column.get(i).copied().flatten()
}

fn unix_midnight(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or_default()
}

/// Rows with any missing OHLC value are dropped; a missing volume counts as zero.
/// Output is sorted by date with duplicate dates collapsed to the first row.
fn chart_to_bars(data: ChartData) -> Vec<Bar> {
    let quote = data.indicators.quote.into_iter().next().unwrap_or_default();
    let mut bars: Vec<Bar> = data
        .timestamp
        .iter()
        .enumerate()
        .filter_map(|(i, &ts)| {
            let date = DateTime::from_timestamp(ts, 0)?.date_naive();
            Some(Bar::new(
                date,
                cell(&quote.open, i)?,
                cell(&quote.high, i)?,
                cell(&quote.low, i)?,
                cell(&quote.close, i)?,
                cell(&quote.volume, i).unwrap_or(0.0),
            ))
        })
        .collect();

    bars.sort_by_key(|b| b.date);
    bars.dedup_by_key(|b| b.date);
    bars
}
