//! Rolling and exponential statistics over ordered series.

/// Simple mean of `values`, `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Rolling simple moving average aligned with `values`.
///
/// Index `i` holds the mean of `values[i + 1 - window..=i]`; the first `window - 1`
/// entries are `None`. A zero window yields all `None`.
pub fn sma_series(values: &[f64], window: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if window == 0 || values.len() < window {
        return out;
    }
    for (offset, slice) in values.windows(window).enumerate() {
        out[offset + window - 1] = mean(slice);
    }
    out
}

/// Smoothing factor for an EMA with the given span.
pub fn ema_alpha(span: usize) -> f64 {
    2.0 / (span as f64 + 1.0)
}

/// Exponential moving average state.
///
/// The first observed value seeds the average; every later value is folded in with
/// `alpha * value + (1 - alpha) * previous`. Values must be fed in date order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ema {
    alpha: f64,
    current: Option<f64>,
}

impl Ema {
    pub fn new(span: usize) -> Self {
        Self {
            alpha: ema_alpha(span),
            current: None,
        }
    }

    pub fn next(&mut self, value: f64) -> f64 {
        let updated = match self.current {
            None => value,
            Some(prev) => self.alpha * value + (1.0 - self.alpha) * prev,
        };
        self.current = Some(updated);
        updated
    }

    pub fn value(&self) -> Option<f64> {
        self.current
    }
}

/// EMA of `values` with no warm-up: element 0 is the seed.
pub fn ema_series(values: &[f64], span: usize) -> Vec<f64> {
    values
        .iter()
        .scan(Ema::new(span), |ema, &v| Some(ema.next(v)))
        .collect()
}
