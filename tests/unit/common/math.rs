//! Unit tests for rolling and exponential statistics

use stocksignal::common::math::{ema_alpha, ema_series, mean, sma_series, Ema};

#[test]
fn test_mean() {
    assert_eq!(mean(&[1.0, 2.0, 3.0, 6.0]), Some(3.0));
    assert_eq!(mean(&[]), None);
}

#[test]
fn test_sma_exact_window_means() {
    let sma = sma_series(&[1.0, 2.0, 3.0, 4.0, 5.0], 3);
    assert_eq!(sma, vec![None, None, Some(2.0), Some(3.0), Some(4.0)]);
}

#[test]
fn test_sma_window_longer_than_series() {
    let sma = sma_series(&[1.0, 2.0, 3.0], 10);
    assert_eq!(sma.len(), 3);
    assert!(sma.iter().all(Option::is_none));
}

#[test]
fn test_sma_zero_window() {
    assert!(sma_series(&[1.0, 2.0], 0).iter().all(Option::is_none));
}

#[test]
fn test_ema_alpha() {
    assert_eq!(ema_alpha(3), 0.5);
    assert_eq!(ema_alpha(9), 0.2);
}

#[test]
fn test_ema_hand_computed_values() {
    let ema = ema_series(&[10.0, 11.0, 12.0, 13.0, 14.0], 3);
    assert_eq!(ema, vec![10.0, 10.5, 11.25, 12.125, 13.0625]);
}

#[test]
fn test_ema_seeded_with_first_value() {
    let ema = ema_series(&[42.0, 0.0], 12);
    assert_eq!(ema[0], 42.0);
    assert!(ema[1] < 42.0);
    assert!(ema_series(&[], 12).is_empty());
}

#[test]
fn test_ema_accumulator_matches_series() {
    let values = [3.0, 1.0, 4.0, 1.0, 5.0, 9.0, 2.0, 6.0];
    let mut ema = Ema::new(4);
    assert_eq!(ema.value(), None);

    let folded: Vec<f64> = values.iter().map(|&v| ema.next(v)).collect();
    assert_eq!(folded, ema_series(&values, 4));
    assert_eq!(ema.value(), folded.last().copied());
}
