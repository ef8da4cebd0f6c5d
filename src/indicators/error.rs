use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum IndicatorError {
    /// Dates must be strictly increasing; EMA state is order-sensitive.
    #[error("bar {index} dated {current} does not follow {previous}")]
    MisalignedInput {
        index: usize,
        previous: NaiveDate,
        current: NaiveDate,
    },
    #[error("bar {index} dated {date} has a non-finite close")]
    NonFiniteClose { index: usize, date: NaiveDate },
}
