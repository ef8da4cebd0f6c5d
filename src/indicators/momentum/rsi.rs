//! RSI (Relative Strength Index) indicator
//!
//! RSI = 100 - (100 / (1 + RS))
//! RS = Average Gain / Average Loss
//!
//! Averages are simple means over the last `period` close-to-close changes. The
//! first bar has no prior close and counts as an unchanged day, so the first
//! defined value sits at index `period - 1`.

use crate::common::math;

/// RSI when the window holds gains but no losses.
pub const ZERO_LOSS_RSI: f64 = 100.0;

/// RSI from average gain and loss.
///
/// A window with no losses yields [`ZERO_LOSS_RSI`]; a window with neither gains nor
/// losses (flat closes) has no defined RSI.
pub fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> Option<f64> {
    if avg_loss == 0.0 {
        return (avg_gain > 0.0).then_some(ZERO_LOSS_RSI);
    }
    let rs = avg_gain / avg_loss;
    Some(100.0 - (100.0 / (1.0 + rs)))
}

/// RSI for every close; `None` until `period` changes are in the window, and on
/// flat windows.
pub fn rsi_series(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut gains = Vec::with_capacity(closes.len());
    let mut losses = Vec::with_capacity(closes.len());
    for (i, close) in closes.iter().enumerate() {
        let change = if i == 0 { 0.0 } else { close - closes[i - 1] };
        gains.push(change.max(0.0));
        losses.push((-change).max(0.0));
    }

    let avg_gains = math::sma_series(&gains, period);
    let avg_losses = math::sma_series(&losses, period);

    avg_gains
        .into_iter()
        .zip(avg_losses)
        .map(|(gain, loss)| rsi_from_averages(gain?, loss?))
        .collect()
}
