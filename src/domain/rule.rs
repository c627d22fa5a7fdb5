//! Strategy rule descriptions.
//!
//! A [`RuleSpec`] is the typed form of a declarative strategy: one of five
//! indicator families with their parameters. Free-text descriptions are valid
//! pipeline input but never reach this type; they fail in the parser until a
//! natural-language parser exists.

use serde::{Deserialize, Serialize};

/// Per-bar directional instruction. "No signal" is `Option::None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Signal {
    Buy,
    Sell,
}

/// Which side(s) of a price level may fire for `price_cross`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrossDirection {
    Both,
    Above,
    Below,
}

/// Comparison operator for `custom_threshold`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThresholdOp {
    Gt,
    Lt,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RuleSpec {
    SmaCrossover {
        fast: usize,
        slow: usize,
    },
    Rsi {
        period: usize,
        overbought: f64,
        oversold: f64,
    },
    Macd {
        fast: usize,
        slow: usize,
        signal: usize,
    },
    PriceCross {
        level: f64,
        direction: CrossDirection,
    },
    CustomThreshold {
        indicator: String,
        threshold: f64,
        op: ThresholdOp,
        action: Signal,
    },
}

impl RuleSpec {
    /// The family tag this rule was parsed from.
    pub fn family(&self) -> &'static str {
        match self {
            RuleSpec::SmaCrossover { .. } => "sma_crossover",
            RuleSpec::Rsi { .. } => "rsi",
            RuleSpec::Macd { .. } => "macd",
            RuleSpec::PriceCross { .. } => "price_cross",
            RuleSpec::CustomThreshold { .. } => "custom_threshold",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signal_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Signal::Buy).unwrap(), "\"buy\"");
        assert_eq!(serde_json::to_string(&Signal::Sell).unwrap(), "\"sell\"");
    }

    #[test]
    fn family_tags() {
        let spec = RuleSpec::SmaCrossover { fast: 10, slow: 30 };
        assert_eq!(spec.family(), "sma_crossover");

        let spec = RuleSpec::PriceCross {
            level: 100.0,
            direction: CrossDirection::Both,
        };
        assert_eq!(spec.family(), "price_cross");
    }

    #[test]
    fn custom_threshold_fields() {
        let spec = RuleSpec::CustomThreshold {
            indicator: "volume".into(),
            threshold: 1000.0,
            op: ThresholdOp::Gt,
            action: Signal::Sell,
        };
        match spec {
            RuleSpec::CustomThreshold { indicator, op, action, .. } => {
                assert_eq!(indicator, "volume");
                assert_eq!(op, ThresholdOp::Gt);
                assert_eq!(action, Signal::Sell);
            }
            _ => panic!("expected CustomThreshold"),
        }
    }
}
