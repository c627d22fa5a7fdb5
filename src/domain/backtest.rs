//! Trade simulation loop.
//!
//! Drives a single-position state machine over the series, one signal per
//! bar in index order. Entries and exits always fill at the bar's close.
//! A position still open at the final bar is force-closed there, so every
//! trade in the ledger has both an entry and an exit.

use serde_json::Value;

use crate::domain::metrics::{self, MetricsReport};
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::position::{ClosedTrade, Direction, Position};
use crate::domain::rule::{RuleSpec, Signal};
use crate::domain::rule_eval;
use crate::domain::rule_parser;

/// Full pipeline: parse the rule description, simulate, summarize.
///
/// A parse failure does not propagate; the run degrades to an empty ledger
/// and an error-carrying report.
pub fn run_backtest(bars: &[OhlcvBar], rules: &Value) -> (Vec<ClosedTrade>, MetricsReport) {
    let spec = match rule_parser::parse(rules) {
        Ok(spec) => spec,
        Err(err) => return (Vec::new(), MetricsReport::error(err.to_string())),
    };

    let trades = simulate(bars, &spec);
    let report = MetricsReport::Stats(metrics::compute(&trades));
    (trades, report)
}

pub fn simulate(bars: &[OhlcvBar], spec: &RuleSpec) -> Vec<ClosedTrade> {
    let mut trades = Vec::new();
    let mut position = Position::Flat;
    let last = bars.len().checked_sub(1);

    for (idx, bar) in bars.iter().enumerate() {
        let signal = rule_eval::evaluate(spec, bars, idx);
        let price = bar.close;
        let at_last = Some(idx) == last;

        position = match (position, signal) {
            // Entry happens before exit is considered, so a position can
            // never close on the bar that opened it. An entry on the final
            // bar opens nothing that could ever close and yields no trade.
            (Position::Flat, Some(Signal::Buy)) => Position::Long {
                entry_price: price,
                entry_index: idx,
            },
            (Position::Flat, Some(Signal::Sell)) => Position::Short {
                entry_price: price,
                entry_index: idx,
            },
            (
                Position::Long {
                    entry_price,
                    entry_index,
                },
                signal,
            ) if signal == Some(Signal::Sell) || at_last => {
                trades.push(close_trade(
                    bars,
                    Direction::Long,
                    entry_index,
                    entry_price,
                    idx,
                    price,
                ));
                Position::Flat
            }
            (
                Position::Short {
                    entry_price,
                    entry_index,
                },
                signal,
            ) if signal == Some(Signal::Buy) || at_last => {
                trades.push(close_trade(
                    bars,
                    Direction::Short,
                    entry_index,
                    entry_price,
                    idx,
                    price,
                ));
                Position::Flat
            }
            (position, _) => position,
        };
    }

    trades
}

fn close_trade(
    bars: &[OhlcvBar],
    direction: Direction,
    entry_index: usize,
    entry_price: f64,
    exit_index: usize,
    exit_price: f64,
) -> ClosedTrade {
    let pnl = match direction {
        Direction::Long => exit_price - entry_price,
        Direction::Short => entry_price - exit_price,
    };

    ClosedTrade {
        direction,
        entry_index,
        entry_time: bars[entry_index].timestamp.clone(),
        entry_price,
        exit_index,
        exit_time: bars[exit_index].timestamp.clone(),
        exit_price,
        pnl,
    }
}
