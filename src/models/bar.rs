use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One trading day for one ticker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    pub fn new(date: NaiveDate, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Bar whose open, high, low and close are all `close`.
    pub fn flat(date: NaiveDate, close: f64, volume: f64) -> Self {
        Self::new(date, close, close, close, close, volume)
    }
}

/// Locate the bar for `date` in a date-ascending series.
pub fn find_bar(bars: &[Bar], date: NaiveDate) -> Option<&Bar> {
    bars.binary_search_by_key(&date, |b| b.date)
        .ok()
        .map(|idx| &bars[idx])
}
