//! Unit tests for the per-ticker indicator calculator

use crate::fixtures::{bars_from_closes, day, random_walk, sinusoid_closes};
use stocksignal::indicators::{calculate_indicators, calculate_indicators_default, IndicatorError};
use stocksignal::models::indicators::IndicatorParams;

#[test]
fn test_one_point_per_bar_with_matching_dates() {
    let bars = bars_from_closes(&sinusoid_closes(300));
    let points = calculate_indicators_default(&bars).unwrap();

    assert_eq!(points.len(), bars.len());
    assert!(bars.iter().zip(&points).all(|(b, p)| b.date == p.date));
}

#[test]
fn test_absent_counts_per_window() {
    let bars = bars_from_closes(&sinusoid_closes(300));
    let points = calculate_indicators_default(&bars).unwrap();

    assert_eq!(points.iter().filter(|p| p.ten_day_ma.is_none()).count(), 9);
    assert_eq!(points.iter().filter(|p| p.fifty_day_ma.is_none()).count(), 49);
    assert_eq!(points.iter().filter(|p| p.two_hundred_day_ma.is_none()).count(), 199);
    assert_eq!(points.iter().filter(|p| p.rsi.is_none()).count(), 13);
    assert!(points[13..].iter().all(|p| p.rsi.is_some()));
    assert_eq!(points.iter().filter(|p| p.is_complete()).count(), 101);
}

#[test]
fn test_short_series_has_partial_indicators() {
    let bars = bars_from_closes(&random_walk(11, 30));
    let points = calculate_indicators_default(&bars).unwrap();

    assert!(points.iter().all(|p| p.two_hundred_day_ma.is_none()));
    assert!(points.iter().all(|p| p.fifty_day_ma.is_none()));
    assert!(points[29].ten_day_ma.is_some());
    assert!(points.iter().all(|p| p.macd.is_finite() && p.signal_line.is_finite()));
    assert!(points.iter().all(|p| !p.is_complete()));
}

#[test]
fn test_empty_series() {
    assert!(calculate_indicators_default(&[]).unwrap().is_empty());
}

#[test]
fn test_custom_windows() {
    let bars = bars_from_closes(&random_walk(5, 40));
    let params = IndicatorParams {
        short_ma: 3,
        medium_ma: 5,
        long_ma: 8,
        rsi_period: 4,
        ..IndicatorParams::default()
    };
    let points = calculate_indicators(&bars, &params).unwrap();

    assert!(points[6].two_hundred_day_ma.is_none());
    assert!(points[7].two_hundred_day_ma.is_some());
    assert!(points[2].rsi.is_none());
    assert!(points[3].rsi.is_some());
    assert!(points[7].is_complete());
}

#[test]
fn test_duplicate_date_rejected() {
    let mut bars = bars_from_closes(&random_walk(1, 20));
    bars[10].date = bars[9].date;

    let err = calculate_indicators_default(&bars).unwrap_err();
    assert_eq!(
        err,
        IndicatorError::MisalignedInput {
            index: 10,
            previous: day(9),
            current: day(9),
        }
    );
}

#[test]
fn test_unsorted_dates_rejected() {
    let mut bars = bars_from_closes(&random_walk(2, 20));
    bars.swap(4, 5);

    assert!(matches!(
        calculate_indicators_default(&bars),
        Err(IndicatorError::MisalignedInput { index: 5, .. })
    ));
}

#[test]
fn test_non_finite_close_rejected() {
    let mut bars = bars_from_closes(&random_walk(3, 20));
    bars[7].close = f64::NAN;

    assert_eq!(
        calculate_indicators_default(&bars).unwrap_err(),
        IndicatorError::NonFiniteClose { index: 7, date: day(7) }
    );
}
