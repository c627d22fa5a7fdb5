//! Rule description parser.
//!
//! Turns a JSON rule description into a [`RuleSpec`]. Accepted shapes:
//! an object `{"type": <family>, "params": {...}}`, or a bare string
//! (free text, which always fails until a natural-language parser exists).
//! Family defaults: sma_crossover fast=10/slow=30, rsi period=14/
//! overbought=70/oversold=30, macd fast=12/slow=26/signal=9,
//! price_cross direction=both, custom_threshold op=gt/action=buy.

use serde_json::{Map, Value};

use crate::domain::error::StrategyParseError;
use crate::domain::rule::{CrossDirection, RuleSpec, Signal, ThresholdOp};

type Params<'a> = Option<&'a Map<String, Value>>;

/// Placeholder for natural-language strategy parsing. Free text is accepted
/// as input, but compiling it always fails until a real parser lands.
fn parse_free_text(_text: &str) -> Result<RuleSpec, StrategyParseError> {
    Err(StrategyParseError::AiNotImplemented)
}

pub fn parse(rules: &Value) -> Result<RuleSpec, StrategyParseError> {
    if let Some(obj) = rules.as_object() {
        return parse_typed(obj);
    }
    if let Some(text) = rules.as_str() {
        return parse_free_text(text);
    }
    Err(StrategyParseError::UnrecognizedFormat)
}

fn parse_typed(obj: &Map<String, Value>) -> Result<RuleSpec, StrategyParseError> {
    let tag = obj.get("type");
    let params = obj.get("params").and_then(Value::as_object);

    match tag.and_then(Value::as_str) {
        Some("sma_crossover") => Ok(RuleSpec::SmaCrossover {
            fast: period_param(params, "sma_crossover", "fast", 10)?,
            slow: period_param(params, "sma_crossover", "slow", 30)?,
        }),
        Some("rsi") => Ok(RuleSpec::Rsi {
            period: period_param(params, "rsi", "period", 14)?,
            overbought: number_param(params, "rsi", "overbought", 70.0)?,
            oversold: number_param(params, "rsi", "oversold", 30.0)?,
        }),
        Some("macd") => Ok(RuleSpec::Macd {
            fast: period_param(params, "macd", "fast", 12)?,
            slow: period_param(params, "macd", "slow", 26)?,
            signal: period_param(params, "macd", "signal", 9)?,
        }),
        Some("price_cross") => Ok(RuleSpec::PriceCross {
            level: required_number(params, "price_cross", "level")?,
            direction: direction_param(params)?,
        }),
        Some("custom_threshold") => Ok(RuleSpec::CustomThreshold {
            indicator: required_string(params, "custom_threshold", "indicator")?,
            threshold: required_number(params, "custom_threshold", "threshold")?,
            op: op_param(params)?,
            action: action_param(params)?,
        }),
        _ => Err(StrategyParseError::UnsupportedRuleType(render_tag(tag))),
    }
}

fn render_tag(tag: Option<&Value>) -> String {
    match tag {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => "null".into(),
    }
}

/// A `params` entry; JSON null counts as absent.
fn get<'a>(params: Params<'a>, name: &str) -> Option<&'a Value> {
    params.and_then(|p| p.get(name)).filter(|v| !v.is_null())
}

fn invalid(family: &'static str, param: &'static str, value: &Value) -> StrategyParseError {
    StrategyParseError::InvalidParam {
        family,
        param,
        value: value.to_string(),
    }
}

fn period_param(
    params: Params<'_>,
    family: &'static str,
    param: &'static str,
    default: usize,
) -> Result<usize, StrategyParseError> {
    match get(params, param) {
        None => Ok(default),
        Some(v) => v
            .as_u64()
            .map(|n| n as usize)
            .ok_or_else(|| invalid(family, param, v)),
    }
}

fn number_param(
    params: Params<'_>,
    family: &'static str,
    param: &'static str,
    default: f64,
) -> Result<f64, StrategyParseError> {
    match get(params, param) {
        None => Ok(default),
        Some(v) => v.as_f64().ok_or_else(|| invalid(family, param, v)),
    }
}

fn required_number(
    params: Params<'_>,
    family: &'static str,
    param: &'static str,
) -> Result<f64, StrategyParseError> {
    match get(params, param) {
        None => Err(StrategyParseError::MissingParam { family, param }),
        Some(v) => v.as_f64().ok_or_else(|| invalid(family, param, v)),
    }
}

fn required_string(
    params: Params<'_>,
    family: &'static str,
    param: &'static str,
) -> Result<String, StrategyParseError> {
    match get(params, param) {
        None => Err(StrategyParseError::MissingParam { family, param }),
        Some(v) => v
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| invalid(family, param, v)),
    }
}

fn direction_param(params: Params<'_>) -> Result<CrossDirection, StrategyParseError> {
    match get(params, "direction") {
        None => Ok(CrossDirection::Both),
        Some(v) => match v.as_str() {
            Some("both") => Ok(CrossDirection::Both),
            Some("above") => Ok(CrossDirection::Above),
            Some("below") => Ok(CrossDirection::Below),
            _ => Err(invalid("price_cross", "direction", v)),
        },
    }
}

fn op_param(params: Params<'_>) -> Result<ThresholdOp, StrategyParseError> {
    match get(params, "op") {
        None => Ok(ThresholdOp::Gt),
        Some(v) => match v.as_str() {
            Some("gt") => Ok(ThresholdOp::Gt),
            Some("lt") => Ok(ThresholdOp::Lt),
            _ => Err(invalid("custom_threshold", "op", v)),
        },
    }
}

fn action_param(params: Params<'_>) -> Result<Signal, StrategyParseError> {
    match get(params, "action") {
        None => Ok(Signal::Buy),
        Some(v) => match v.as_str() {
            Some("buy") => Ok(Signal::Buy),
            Some("sell") => Ok(Signal::Sell),
            _ => Err(invalid("custom_threshold", "action", v)),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sma_crossover_defaults() {
        let spec = parse(&json!({"type": "sma_crossover"})).unwrap();
        assert_eq!(spec, RuleSpec::SmaCrossover { fast: 10, slow: 30 });
    }

    #[test]
    fn sma_crossover_explicit_params() {
        let spec = parse(&json!({
            "type": "sma_crossover",
            "params": {"fast": 5, "slow": 20}
        }))
        .unwrap();
        assert_eq!(spec, RuleSpec::SmaCrossover { fast: 5, slow: 20 });
    }

    #[test]
    fn rsi_defaults() {
        let spec = parse(&json!({"type": "rsi", "params": {}})).unwrap();
        assert_eq!(
            spec,
            RuleSpec::Rsi {
                period: 14,
                overbought: 70.0,
                oversold: 30.0
            }
        );
    }

    #[test]
    fn macd_partial_params() {
        let spec = parse(&json!({"type": "macd", "params": {"signal": 5}})).unwrap();
        assert_eq!(
            spec,
            RuleSpec::Macd {
                fast: 12,
                slow: 26,
                signal: 5
            }
        );
    }

    #[test]
    fn price_cross_requires_level() {
        let err = parse(&json!({"type": "price_cross"})).unwrap_err();
        assert_eq!(
            err,
            StrategyParseError::MissingParam {
                family: "price_cross",
                param: "level"
            }
        );
    }

    #[test]
    fn price_cross_null_level_is_missing() {
        let err = parse(&json!({"type": "price_cross", "params": {"level": null}})).unwrap_err();
        assert!(matches!(err, StrategyParseError::MissingParam { .. }));
    }

    #[test]
    fn price_cross_direction_values() {
        for (text, expected) in [
            ("both", CrossDirection::Both),
            ("above", CrossDirection::Above),
            ("below", CrossDirection::Below),
        ] {
            let spec = parse(&json!({
                "type": "price_cross",
                "params": {"level": 100.0, "direction": text}
            }))
            .unwrap();
            assert_eq!(
                spec,
                RuleSpec::PriceCross {
                    level: 100.0,
                    direction: expected
                }
            );
        }
    }

    #[test]
    fn price_cross_unknown_direction() {
        let err = parse(&json!({
            "type": "price_cross",
            "params": {"level": 100.0, "direction": "sideways"}
        }))
        .unwrap_err();
        assert!(matches!(err, StrategyParseError::InvalidParam { .. }));
    }

    #[test]
    fn custom_threshold_requires_indicator_and_threshold() {
        let err = parse(&json!({
            "type": "custom_threshold",
            "params": {"threshold": 1000.0}
        }))
        .unwrap_err();
        assert_eq!(
            err,
            StrategyParseError::MissingParam {
                family: "custom_threshold",
                param: "indicator"
            }
        );

        let err = parse(&json!({
            "type": "custom_threshold",
            "params": {"indicator": "volume"}
        }))
        .unwrap_err();
        assert_eq!(
            err,
            StrategyParseError::MissingParam {
                family: "custom_threshold",
                param: "threshold"
            }
        );
    }

    #[test]
    fn custom_threshold_full() {
        let spec = parse(&json!({
            "type": "custom_threshold",
            "params": {"indicator": "volume", "threshold": 1000.0, "op": "gt", "action": "sell"}
        }))
        .unwrap();
        assert_eq!(
            spec,
            RuleSpec::CustomThreshold {
                indicator: "volume".into(),
                threshold: 1000.0,
                op: ThresholdOp::Gt,
                action: Signal::Sell,
            }
        );
    }

    #[test]
    fn unsupported_rule_type() {
        let err = parse(&json!({"type": "bollinger"})).unwrap_err();
        assert_eq!(
            err,
            StrategyParseError::UnsupportedRuleType("bollinger".into())
        );
    }

    #[test]
    fn missing_rule_type() {
        let err = parse(&json!({"params": {"fast": 5}})).unwrap_err();
        assert_eq!(err, StrategyParseError::UnsupportedRuleType("null".into()));
    }

    #[test]
    fn free_text_always_fails() {
        let err = parse(&json!("buy when RSI low")).unwrap_err();
        assert_eq!(err, StrategyParseError::AiNotImplemented);
        assert_eq!(err.to_string(), "AI-powered parsing not implemented yet");
    }

    #[test]
    fn non_object_non_text_is_unrecognized() {
        for value in [json!(42), json!([1, 2, 3]), json!(null), json!(true)] {
            let err = parse(&value).unwrap_err();
            assert_eq!(err, StrategyParseError::UnrecognizedFormat);
        }
    }

    #[test]
    fn wrong_typed_period_is_invalid() {
        let err = parse(&json!({
            "type": "sma_crossover",
            "params": {"fast": 10.5}
        }))
        .unwrap_err();
        assert!(matches!(err, StrategyParseError::InvalidParam { .. }));
    }
}
