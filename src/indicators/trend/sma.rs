//! SMA (Simple Moving Average) indicator

use crate::common::math;
use crate::models::bar::Bar;

/// Rolling mean of closes over `window` bars; `None` until the window is full.
pub fn calculate_sma(bars: &[Bar], window: usize) -> Vec<Option<f64>> {
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    math::sma_series(&closes, window)
}

/// Short-over-long state for one index, `None` while either average is absent.
pub fn short_above_long(short: Option<f64>, long: Option<f64>) -> Option<bool> {
    Some(short? > long?)
}
