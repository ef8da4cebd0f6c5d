//! Turns a detected signal and its bar into a persistable record.

use crate::models::bar::Bar;
use crate::models::signal::{DetectedSignal, SignalEvent};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum MaterializeError {
    #[error("volume {volume} on {date} is not a non-negative number")]
    InvalidVolume { date: NaiveDate, volume: f64 },
    #[error("signal dated {signal} paired with bar dated {bar}")]
    DateMismatch { signal: NaiveDate, bar: NaiveDate },
}

/// Price multipliers for protective levels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StopLossTakeProfit {
    pub stop_loss_factor: f64,
    pub take_profit_factor: f64,
}

impl Default for StopLossTakeProfit {
    fn default() -> Self {
        Self {
            stop_loss_factor: 0.97,
            take_profit_factor: 1.03,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SignalMaterializer {
    levels: StopLossTakeProfit,
}

impl SignalMaterializer {
    pub fn new(levels: StopLossTakeProfit) -> Self {
        Self { levels }
    }

    /// Fractional volumes are rounded to the nearest share; negative or non-finite
    /// volumes are rejected.
    pub fn materialize(
        &self,
        ticker: &str,
        detected: &DetectedSignal,
        bar: &Bar,
    ) -> Result<SignalEvent, MaterializeError> {
        if detected.date != bar.date {
            return Err(MaterializeError::DateMismatch {
                signal: detected.date,
                bar: bar.date,
            });
        }
        let volume = normalize_volume(bar)?;
        let price = bar.close;

        Ok(SignalEvent {
            ticker: ticker.to_string(),
            signal_type: detected.signal_type,
            date: detected.date,
            stock_price: price,
            volume,
            stop_loss: price * self.levels.stop_loss_factor,
            take_profit: price * self.levels.take_profit_factor,
        })
    }
}

fn normalize_volume(bar: &Bar) -> Result<u64, MaterializeError> {
    if !bar.volume.is_finite() || bar.volume < 0.0 {
        return Err(MaterializeError::InvalidVolume {
            date: bar.date,
            volume: bar.volume,
        });
    }
    Ok(bar.volume.round() as u64)
}
