//! Trailing-window indicator helpers.
//!
//! Every value is recomputed from scratch for the bar being evaluated;
//! nothing is carried between calls, so signal evaluation stays a pure
//! function of (series, index). Callers that precompute per-series vectors
//! must reproduce these numbers exactly.

use crate::domain::ohlcv::OhlcvBar;

/// Stand-in loss average when a window has no losses at all.
const LOSS_EPSILON: f64 = 1e-9;

/// Arithmetic mean. An empty window yields NaN, which fails every signal
/// comparison downstream instead of panicking.
pub fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Exponential moving average with smoothing constant 2/(period+1), seeded
/// with the first value of the window. An empty window yields NaN.
pub fn ema(values: &[f64], period: usize) -> f64 {
    let k = 2.0 / (period as f64 + 1.0);
    let mut iter = values.iter();
    let Some(&seed) = iter.next() else {
        return f64::NAN;
    };
    iter.fold(seed, |ema, &v| v * k + ema * (1.0 - k))
}

/// RSI over the `period` trailing close-to-close changes ending at `idx`.
/// With fewer than `period` bars of history the value is a neutral 50.
pub fn rsi(bars: &[OhlcvBar], idx: usize, period: usize) -> f64 {
    if idx < period {
        return 50.0;
    }

    let mut gains = 0.0;
    let mut losses = 0.0;
    for i in idx + 1 - period..=idx {
        let change = bars[i].close - bars[i - 1].close;
        if change > 0.0 {
            gains += change;
        } else {
            losses -= change;
        }
    }

    let avg_gain = gains / period as f64;
    let avg_loss = if losses != 0.0 {
        losses / period as f64
    } else {
        LOSS_EPSILON
    };
    let rs = avg_gain / avg_loss;
    100.0 - (100.0 / (1.0 + rs))
}
