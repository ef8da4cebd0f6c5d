//! Per-ticker indicator calculation.

use super::error::IndicatorError;
use super::momentum::{macd_series, rsi_series};
use super::trend::calculate_sma;
use super::validation::validate_bars;
use crate::models::bar::Bar;
use crate::models::indicators::{IndicatorParams, IndicatorPoint};

/// Derive one [`IndicatorPoint`] per bar.
///
/// The series is validated first; out-of-order or duplicate dates fail before any
/// exponential state is built. Windows longer than the series simply leave their
/// values absent.
pub fn calculate_indicators(
    bars: &[Bar],
    params: &IndicatorParams,
) -> Result<Vec<IndicatorPoint>, IndicatorError> {
    validate_bars(bars)?;

    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let short_ma = calculate_sma(bars, params.short_ma);
    let medium_ma = calculate_sma(bars, params.medium_ma);
    let long_ma = calculate_sma(bars, params.long_ma);
    let rsi = rsi_series(&closes, params.rsi_period);
    let (macd, signal_line) = macd_series(
        &closes,
        params.macd_fast,
        params.macd_slow,
        params.macd_signal,
    );

    Ok(bars
        .iter()
        .enumerate()
        .map(|(i, bar)| IndicatorPoint {
            date: bar.date,
            ten_day_ma: short_ma[i],
            fifty_day_ma: medium_ma[i],
            two_hundred_day_ma: long_ma[i],
            rsi: rsi[i],
            macd: macd[i],
            signal_line: signal_line[i],
        })
        .collect())
}

/// [`calculate_indicators`] with the 10/50/200, RSI(14), MACD(12, 26, 9) defaults.
pub fn calculate_indicators_default(bars: &[Bar]) -> Result<Vec<IndicatorPoint>, IndicatorError> {
    calculate_indicators(bars, &IndicatorParams::default())
}
