#![allow(dead_code)]

use serde_json::{json, Value};
use stratsim::domain::ohlcv::{OhlcvBar, Timestamp};

/// One bar per close, spaced a day apart starting 2024-01-01 UTC.
pub fn make_bars(closes: &[f64]) -> Vec<OhlcvBar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| OhlcvBar {
            timestamp: Timestamp::Epoch(1_704_067_200 + i as i64 * 86_400),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 1000.0,
        })
        .collect()
}

pub fn make_bars_with_volumes(closes: &[f64], volumes: &[f64]) -> Vec<OhlcvBar> {
    let mut bars = make_bars(closes);
    for (bar, &volume) in bars.iter_mut().zip(volumes) {
        bar.volume = volume;
    }
    bars
}

pub fn sma_rules(fast: u64, slow: u64) -> Value {
    json!({"type": "sma_crossover", "params": {"fast": fast, "slow": slow}})
}

pub fn price_cross_rules(level: f64, direction: &str) -> Value {
    json!({"type": "price_cross", "params": {"level": level, "direction": direction}})
}

pub fn custom_threshold_rules(indicator: &str, threshold: f64, op: &str, action: &str) -> Value {
    json!({
        "type": "custom_threshold",
        "params": {"indicator": indicator, "threshold": threshold, "op": op, "action": action}
    })
}

/// Render a series as the CSV shape the data adapter reads.
pub fn bars_to_csv(bars: &[OhlcvBar]) -> String {
    let mut out = String::from("timestamp,open,high,low,close,volume\n");
    for bar in bars {
        out.push_str(&format!(
            "{},{},{},{},{},{}\n",
            bar.timestamp, bar.open, bar.high, bar.low, bar.close, bar.volume
        ));
    }
    out
}
