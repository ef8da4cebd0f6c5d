//! MACD (Moving Average Convergence Divergence) indicator
//!
//! MACD = EMA(12) - EMA(26)
//! Signal = EMA(9) of MACD

use crate::common::math::ema_series;

/// MACD line and its signal line, one value each per close.
pub fn macd_series(
    closes: &[f64],
    fast_period: usize,
    slow_period: usize,
    signal_period: usize,
) -> (Vec<f64>, Vec<f64>) {
    let fast = ema_series(closes, fast_period);
    let slow = ema_series(closes, slow_period);
    let macd: Vec<f64> = fast.iter().zip(&slow).map(|(f, s)| f - s).collect();
    let signal = ema_series(&macd, signal_period);
    (macd, signal)
}
