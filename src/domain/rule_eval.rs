//! Per-bar signal evaluation.
//!
//! Evaluates a [`RuleSpec`] against a series at one bar index, using only
//! bars up to and including that index. Indicator windows exclude or include
//! the current bar per family:
//!
//! - sma_crossover: fast/slow means over `[idx-n, idx)` — current bar excluded
//! - rsi: changes over the `period` bars ending at `idx`
//! - macd: EMAs over close windows ending at `idx`
//! - price_cross / custom_threshold: the current bar only

use crate::domain::indicator::{ema, mean, rsi};
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::rule::{CrossDirection, RuleSpec, Signal, ThresholdOp};

pub fn evaluate(spec: &RuleSpec, bars: &[OhlcvBar], idx: usize) -> Option<Signal> {
    match spec {
        RuleSpec::SmaCrossover { fast, slow } => sma_crossover(bars, idx, *fast, *slow),
        RuleSpec::Rsi {
            period,
            overbought,
            oversold,
        } => {
            let value = rsi(bars, idx, *period);
            if value > *overbought {
                Some(Signal::Sell)
            } else if value < *oversold {
                Some(Signal::Buy)
            } else {
                None
            }
        }
        RuleSpec::Macd { fast, slow, signal } => macd_crossover(bars, idx, *fast, *slow, *signal),
        RuleSpec::PriceCross { level, direction } => {
            let price = bars[idx].close;
            if price > *level && matches!(direction, CrossDirection::Both | CrossDirection::Above) {
                return Some(Signal::Buy);
            }
            if price < *level && matches!(direction, CrossDirection::Both | CrossDirection::Below) {
                return Some(Signal::Sell);
            }
            None
        }
        RuleSpec::CustomThreshold {
            indicator,
            threshold,
            op,
            action,
        } => {
            let value = bars[idx].field(indicator)?;
            let fires = match op {
                ThresholdOp::Gt => value > *threshold,
                ThresholdOp::Lt => value < *threshold,
            };
            fires.then_some(*action)
        }
    }
}

fn sma_crossover(bars: &[OhlcvBar], idx: usize, fast: usize, slow: usize) -> Option<Signal> {
    // Needs `slow` bars of history; a fast window longer than the available
    // history cannot be formed either.
    if idx < slow || idx < fast {
        return None;
    }

    let fast_ma = mean(&close_window(bars, idx - fast, idx));
    let slow_ma = mean(&close_window(bars, idx - slow, idx));

    if fast_ma > slow_ma {
        Some(Signal::Buy)
    } else if fast_ma < slow_ma {
        Some(Signal::Sell)
    } else {
        None
    }
}

fn macd_crossover(
    bars: &[OhlcvBar],
    idx: usize,
    fast: usize,
    slow: usize,
    signal: usize,
) -> Option<Signal> {
    if idx < slow + signal {
        return None;
    }

    let closes = close_window(bars, 0, idx + 1);

    let macd_line = ema(&closes[closes.len().saturating_sub(fast)..], fast)
        - ema(&closes[closes.len().saturating_sub(slow)..], slow);

    // MACD-line history from the first bar with a full slow window onward,
    // each entry over close windows ending at i.
    let history: Vec<f64> = (slow..=idx)
        .map(|i| {
            let fast_ema = ema(&closes[(i + 1).saturating_sub(fast)..=i], fast);
            let slow_ema = ema(&closes[(i + 1).saturating_sub(slow)..=i], slow);
            fast_ema - slow_ema
        })
        .collect();
    let signal_line = ema(&history, signal);

    if macd_line > signal_line {
        Some(Signal::Buy)
    } else if macd_line < signal_line {
        Some(Signal::Sell)
    } else {
        None
    }
}

fn close_window(bars: &[OhlcvBar], start: usize, end: usize) -> Vec<f64> {
    bars[start..end].iter().map(|b| b.close).collect()
}
