//! Input checks run before any recurrence is computed.

use super::error::IndicatorError;
use crate::models::bar::Bar;

/// Reject series that are not strictly ascending by date or carry unusable closes.
pub fn validate_bars(bars: &[Bar]) -> Result<(), IndicatorError> {
    for (index, bar) in bars.iter().enumerate() {
        if !bar.close.is_finite() {
            return Err(IndicatorError::NonFiniteClose {
                index,
                date: bar.date,
            });
        }
        if index > 0 {
            let previous = bars[index - 1].date;
            if bar.date <= previous {
                return Err(IndicatorError::MisalignedInput {
                    index,
                    previous,
                    current: bar.date,
                });
            }
        }
    }
    Ok(())
}
