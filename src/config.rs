//! Environment-driven configuration.
//!
//! Binaries load `.env` with `dotenvy` first; every setting has a default so an empty
//! environment yields a runnable in-memory configuration.

use crate::models::indicators::IndicatorParams;
use crate::services::yahoo::DEFAULT_BASE_URL;
use crate::signals::{DetectorConfig, StopLossTakeProfit, TriggerMode};
use chrono::NaiveDate;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

pub const DEFAULT_TICKERS: [&str; 8] = ["AAPL", "TSLA", "AMD", "F", "NVDA", "INTC", "AMZN", "CSX"];
pub const DEFAULT_SCHEDULE: &str = "0 30 22 * * Mon-Fri";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid value '{value}' for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
    #[error("validation error: {0}")]
    Validation(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub environment: String,
    pub tickers: Vec<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// `None` selects the in-memory store.
    pub database_url: Option<String>,
    pub yahoo_base_url: String,
    pub ingest: bool,
    pub concurrency: usize,
    pub schedule: String,
    pub retry_max_times: usize,
    pub metrics_textfile: Option<PathBuf>,
    pub indicators: IndicatorParams,
    pub detector: DetectorConfig,
    pub levels: StopLossTakeProfit,
}

impl Default for Config {
    fn default() -> Self {
        let tickers: Vec<String> = DEFAULT_TICKERS.iter().map(|t| t.to_string()).collect();
        Self {
            environment: "sandbox".to_string(),
            concurrency: tickers.len(),
            tickers,
            start_date: NaiveDate::from_ymd_opt(2022, 1, 1).unwrap_or_default(),
            end_date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap_or_default(),
            database_url: None,
            yahoo_base_url: DEFAULT_BASE_URL.to_string(),
            ingest: true,
            schedule: DEFAULT_SCHEDULE.to_string(),
            retry_max_times: 3,
            metrics_textfile: None,
            indicators: IndicatorParams::default(),
            detector: DetectorConfig::default(),
            levels: StopLossTakeProfit::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = Config::default();

        if let Some(env) = get("APP_ENV").or_else(|| get("ENVIRONMENT")) {
            config.environment = env.to_lowercase();
        }
        if let Some(raw) = get("TICKERS") {
            config.tickers = parse_tickers(&raw);
            config.concurrency = config.tickers.len();
        }
        if let Some(raw) = get("START_DATE") {
            config.start_date = parse_value("START_DATE", &raw)?;
        }
        if let Some(raw) = get("END_DATE") {
            config.end_date = parse_value("END_DATE", &raw)?;
        }
        config.database_url = get("DATABASE_URL");
        if let Some(raw) = get("YAHOO_BASE_URL") {
            config.yahoo_base_url = raw;
        }
        if let Some(raw) = get("INGEST") {
            config.ingest = parse_value("INGEST", &raw.to_lowercase())?;
        }
        if let Some(raw) = get("WORKER_CONCURRENCY") {
            config.concurrency = parse_value("WORKER_CONCURRENCY", &raw)?;
        }
        if let Some(raw) = get("PIPELINE_SCHEDULE") {
            config.schedule = raw;
        }
        if let Some(raw) = get("RETRY_MAX_TIMES") {
            config.retry_max_times = parse_value("RETRY_MAX_TIMES", &raw)?;
        }
        config.metrics_textfile = get("METRICS_TEXTFILE").map(PathBuf::from);
        if let Some(raw) = get("TRIGGER_MODE") {
            config.detector.trigger_mode = parse_value::<TriggerMode>("TRIGGER_MODE", &raw)?;
        }
        if let Some(raw) = get("RSI_OVERSOLD") {
            config.detector.rsi_oversold = parse_value("RSI_OVERSOLD", &raw)?;
        }
        if let Some(raw) = get("RSI_OVERBOUGHT") {
            config.detector.rsi_overbought = parse_value("RSI_OVERBOUGHT", &raw)?;
        }
        if let Some(raw) = get("STOP_LOSS_FACTOR") {
            config.levels.stop_loss_factor = parse_value("STOP_LOSS_FACTOR", &raw)?;
        }
        if let Some(raw) = get("TAKE_PROFIT_FACTOR") {
            config.levels.take_profit_factor = parse_value("TAKE_PROFIT_FACTOR", &raw)?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tickers.is_empty() {
            return Err(ConfigError::Validation("no tickers configured".into()));
        }
        if self.start_date >= self.end_date {
            return Err(ConfigError::Validation(format!(
                "START_DATE {} must be before END_DATE {}",
                self.start_date, self.end_date
            )));
        }
        if self.concurrency == 0 {
            return Err(ConfigError::Validation("WORKER_CONCURRENCY must be > 0".into()));
        }
        let d = &self.detector;
        if !(0.0..=100.0).contains(&d.rsi_oversold)
            || !(0.0..=100.0).contains(&d.rsi_overbought)
            || d.rsi_oversold >= d.rsi_overbought
        {
            return Err(ConfigError::Validation(format!(
                "RSI thresholds must satisfy 0 <= oversold ({}) < overbought ({}) <= 100",
                d.rsi_oversold, d.rsi_overbought
            )));
        }
        let l = &self.levels;
        if !(l.stop_loss_factor.is_finite() && l.stop_loss_factor > 0.0)
            || !(l.take_profit_factor.is_finite() && l.take_profit_factor > 0.0)
        {
            return Err(ConfigError::Validation(format!(
                "STOP_LOSS_FACTOR ({}) and TAKE_PROFIT_FACTOR ({}) must be finite and > 0",
                l.stop_loss_factor, l.take_profit_factor
            )));
        }
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        is_production(&self.environment)
    }
}

/// Deployment environment name, lowercased; `sandbox` when unset.
pub fn get_environment() -> String {
    std::env::var("APP_ENV")
        .or_else(|_| std::env::var("ENVIRONMENT"))
        .map(|e| e.trim().to_lowercase())
        .ok()
        .filter(|e| !e.is_empty())
        .unwrap_or_else(|| "sandbox".to_string())
}

pub fn is_production(environment: &str) -> bool {
    matches!(environment, "production" | "prod")
}

/// Comma-separated, trimmed, upper-cased, de-duplicated in first-seen order.
pub fn parse_tickers(raw: &str) -> Vec<String> {
    let mut tickers: Vec<String> = Vec::new();
    for ticker in raw.split(',').map(|t| t.trim().to_uppercase()) {
        if !ticker.is_empty() && !tickers.contains(&ticker) {
            tickers.push(ticker);
        }
    }
    tickers
}

fn parse_value<T>(key: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse::<T>().map_err(|e| ConfigError::Invalid {
        key,
        value: raw.to_string(),
        reason: e.to_string(),
    })
}
