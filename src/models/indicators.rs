use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Indicator values aligned with the bar of the same date.
///
/// Moving averages and RSI are `None` until their look-back window is full; RSI is
/// also `None` over a window of unchanged closes.
/// MACD and its signal line are seeded from the first close and always defined.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorPoint {
    pub date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ten_day_ma: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fifty_day_ma: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub two_hundred_day_ma: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rsi: Option<f64>,
    pub macd: f64,
    pub signal_line: f64,
}

impl IndicatorPoint {
    /// All six indicator fields are defined.
    pub fn is_complete(&self) -> bool {
        self.ten_day_ma.is_some()
            && self.fifty_day_ma.is_some()
            && self.two_hundred_day_ma.is_some()
            && self.rsi.is_some()
            && self.macd.is_finite()
            && self.signal_line.is_finite()
    }
}

/// Window lengths for every derived series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorParams {
    pub short_ma: usize,
    pub medium_ma: usize,
    pub long_ma: usize,
    pub rsi_period: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            short_ma: 10,
            medium_ma: 50,
            long_ma: 200,
            rsi_period: 14,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
        }
    }
}
