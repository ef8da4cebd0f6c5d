//! Unit tests for bar helpers

use crate::fixtures::{bars_from_closes, day};
use stocksignal::models::bar::{find_bar, Bar};

#[test]
fn test_find_bar() {
    let bars = bars_from_closes(&[10.0, 11.0, 12.0]);
    assert_eq!(find_bar(&bars, day(1)).map(|b| b.close), Some(11.0));
    assert!(find_bar(&bars, day(7)).is_none());
}

#[test]
fn test_flat_bar() {
    let bar = Bar::flat(day(0), 42.0, 100.0);
    assert_eq!((bar.open, bar.high, bar.low, bar.close), (42.0, 42.0, 42.0, 42.0));
}
