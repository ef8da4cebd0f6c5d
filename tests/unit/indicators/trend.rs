//! Unit tests for SMA over bars

use crate::fixtures::{bars_from_closes, crossover_closes};
use stocksignal::common::math::sma_series;
use stocksignal::indicators::trend::{calculate_sma, short_above_long};

#[test]
fn test_sma_over_bars_uses_closes() {
    let closes = crossover_closes();
    let bars = bars_from_closes(&closes);
    assert_eq!(calculate_sma(&bars, 10), sma_series(&closes, 10));
}

#[test]
fn test_sma_absent_until_window_full() {
    let bars = bars_from_closes(&crossover_closes());
    let sma = calculate_sma(&bars, 50);
    assert_eq!(sma.iter().filter(|v| v.is_none()).count(), 49);
    assert_eq!(sma[49], Some(100.5));
}

#[test]
fn test_short_above_long() {
    assert_eq!(short_above_long(Some(101.0), Some(100.0)), Some(true));
    assert_eq!(short_above_long(Some(100.0), Some(100.0)), Some(false));
    assert_eq!(short_above_long(Some(99.0), Some(100.0)), Some(false));
    assert_eq!(short_above_long(None, Some(100.0)), None);
    assert_eq!(short_above_long(Some(100.0), None), None);
}
