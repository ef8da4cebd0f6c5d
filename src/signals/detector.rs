//! Rule engine turning indicator trajectories into discrete signals.

use crate::indicators::trend::short_above_long;
use crate::models::bar::Bar;
use crate::models::indicators::IndicatorPoint;
use crate::models::signal::{DetectedSignal, SignalType};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// How threshold rules (RSI band, MACD vs signal line) fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerMode {
    /// Every date inside the band emits.
    #[default]
    Level,
    /// Only the date the condition turns true emits.
    Edge,
}

impl FromStr for TriggerMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "level" => Ok(TriggerMode::Level),
            "edge" => Ok(TriggerMode::Edge),
            other => Err(format!("unknown trigger mode '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectorConfig {
    pub rsi_oversold: f64,
    pub rsi_overbought: f64,
    pub trigger_mode: TriggerMode,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            rsi_oversold: 30.0,
            rsi_overbought: 70.0,
            trigger_mode: TriggerMode::Level,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SignalError {
    #[error("{bars} bars but {points} indicator points")]
    LengthMismatch { bars: usize, points: usize },
    #[error("bar dated {bar} paired with indicator point dated {point}")]
    MisalignedSeries { bar: NaiveDate, point: NaiveDate },
}

/// Conditions evaluated on one included date.
#[derive(Debug, Clone, Copy)]
struct RowState {
    short_above_long: bool,
    oversold: bool,
    overbought: bool,
    macd_above: bool,
    macd_below: bool,
}

pub struct SignalDetector {
    config: DetectorConfig,
}

impl SignalDetector {
    pub fn new(config: DetectorConfig) -> Self {
        Self { config }
    }

    /// Run every rule over the joined series.
    ///
    /// Only rows with all six indicators defined take part; "previous" always means
    /// the previous included row. Signals come out in date order, and within a date
    /// in rule order: crossover, RSI, MACD.
    pub fn detect(
        &self,
        bars: &[Bar],
        points: &[IndicatorPoint],
    ) -> Result<Vec<DetectedSignal>, SignalError> {
        if bars.len() != points.len() {
            return Err(SignalError::LengthMismatch {
                bars: bars.len(),
                points: points.len(),
            });
        }
        if let Some((bar, point)) = bars.iter().zip(points).find(|(b, p)| b.date != p.date) {
            return Err(SignalError::MisalignedSeries {
                bar: bar.date,
                point: point.date,
            });
        }

        let mut signals = Vec::new();
        let mut previous: Option<RowState> = None;

        for point in points.iter().filter(|p| p.is_complete()) {
            let Some(state) = self.row_state(point) else {
                continue;
            };
            let mut emit = |signal_type| {
                signals.push(DetectedSignal {
                    signal_type,
                    date: point.date,
                })
            };

            if let Some(prev) = previous {
                if state.short_above_long && !prev.short_above_long {
                    emit(SignalType::Buy);
                }
                if !state.short_above_long && prev.short_above_long {
                    emit(SignalType::Sell);
                }
            }

            let fires = |now: bool, before: Option<bool>| match self.config.trigger_mode {
                TriggerMode::Level => now,
                TriggerMode::Edge => now && before == Some(false),
            };

            if fires(state.oversold, previous.map(|p| p.oversold)) {
                emit(SignalType::PotentialBuyOversold);
            }
            if fires(state.overbought, previous.map(|p| p.overbought)) {
                emit(SignalType::PotentialSellOverbought);
            }
            if fires(state.macd_above, previous.map(|p| p.macd_above)) {
                emit(SignalType::PotentialBuyMacd);
            }
            if fires(state.macd_below, previous.map(|p| p.macd_below)) {
                emit(SignalType::PotentialSellMacd);
            }

            previous = Some(state);
        }

        Ok(signals)
    }

    fn row_state(&self, point: &IndicatorPoint) -> Option<RowState> {
        let rsi = point.rsi?;
        Some(RowState {
            short_above_long: short_above_long(point.ten_day_ma, point.fifty_day_ma)?,
            oversold: rsi < self.config.rsi_oversold,
            overbought: rsi > self.config.rsi_overbought,
            macd_above: point.macd > point.signal_line,
            macd_below: point.macd < point.signal_line,
        })
    }
}

impl Default for SignalDetector {
    fn default() -> Self {
        Self::new(DetectorConfig::default())
    }
}
