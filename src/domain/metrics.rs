//! Performance metrics over a closed-trade ledger.
//!
//! Everything here is a pure reduction of the ledger. The return series used
//! for Sharpe/Sortino/stddev is the first-difference of per-trade pnl
//! (`returns[0] = pnl[0]`, `returns[i] = pnl[i] - pnl[i-1]`), not a
//! percentage return series, and the annualization factor is a fixed √252
//! regardless of bar frequency. Downstream consumers depend on these exact
//! figures; do not "correct" them.

use std::collections::BTreeMap;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::domain::position::{ClosedTrade, Direction};

const TRADING_DAYS_PER_YEAR: f64 = 252.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overview {
    pub net_profit: f64,
    pub gross_profit: f64,
    pub gross_loss: f64,
    pub total_trades: usize,
    pub win_rate: f64,
    pub max_drawdown: f64,
    pub profit_factor: f64,
    pub sharpe_ratio: f64,
    pub avg_win: f64,
    pub avg_loss: f64,
    pub avg_trade: f64,
    pub longs_won: usize,
    pub shorts_won: usize,
    pub avg_bars_in_trade: f64,
    pub largest_win: f64,
    pub largest_loss: f64,
    pub max_consec_wins: usize,
    pub max_consec_losses: usize,
    pub recovery_factor: f64,
    pub equity_curve: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Performance {
    pub total_return: f64,
    /// Literally net profit; no time-based annualization is applied.
    pub annual_return: f64,
    pub monthly_return: BTreeMap<String, f64>,
    pub best_trade: ClosedTrade,
    pub worst_trade: ClosedTrade,
    pub calmar_ratio: f64,
    pub sortino_ratio: f64,
    pub expectancy: f64,
    pub stddev: f64,
    pub avg_win: f64,
    pub avg_loss: f64,
    pub avg_r_multiple: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeAnalysis {
    pub trade_length_dist: BTreeMap<usize, usize>,
    pub direction_dist: BTreeMap<String, usize>,
    pub r_multiple_dist: BTreeMap<String, usize>,
    pub trade_log: Vec<ClosedTrade>,
}

/// Statistics for one run. The three groups are absent exactly when the
/// ledger was empty; they serialize as empty objects in that case.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsReport {
    #[serde(serialize_with = "group_or_empty")]
    pub overview: Option<Overview>,
    #[serde(serialize_with = "group_or_empty")]
    pub performance: Option<Performance>,
    #[serde(serialize_with = "group_or_empty")]
    pub trade_analysis: Option<TradeAnalysis>,
    pub equity_curve: Vec<f64>,
    pub trade_log: Vec<ClosedTrade>,
}

/// What a run reports back: statistics, or the strategy-parse failure that
/// prevented the run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetricsReport {
    Error { error: String },
    Stats(StatsReport),
}

impl MetricsReport {
    pub fn error(message: impl Into<String>) -> Self {
        MetricsReport::Error {
            error: message.into(),
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            MetricsReport::Error { error } => Some(error),
            MetricsReport::Stats(_) => None,
        }
    }

    pub fn stats(&self) -> Option<&StatsReport> {
        match self {
            MetricsReport::Error { .. } => None,
            MetricsReport::Stats(stats) => Some(stats),
        }
    }
}

fn group_or_empty<T, S>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
where
    T: Serialize,
    S: Serializer,
{
    match value {
        Some(group) => group.serialize(serializer),
        None => serializer.serialize_map(Some(0))?.end(),
    }
}

pub fn compute(trades: &[ClosedTrade]) -> StatsReport {
    if trades.is_empty() {
        return StatsReport {
            overview: None,
            performance: None,
            trade_analysis: None,
            equity_curve: Vec::new(),
            trade_log: Vec::new(),
        };
    }

    let total = trades.len();
    let net_profit: f64 = trades.iter().map(|t| t.pnl).sum();
    let gross_profit: f64 = trades.iter().map(|t| t.pnl).filter(|p| *p > 0.0).sum();
    let gross_loss: f64 = trades.iter().map(|t| t.pnl).filter(|p| *p < 0.0).sum();

    // Zero-pnl trades count as losses throughout.
    let wins: Vec<&ClosedTrade> = trades.iter().filter(|t| t.pnl > 0.0).collect();
    let losses: Vec<&ClosedTrade> = trades.iter().filter(|t| t.pnl <= 0.0).collect();

    let win_rate = wins.len() as f64 / total as f64 * 100.0;

    let profit_factor = if gross_loss < 0.0 {
        gross_profit / gross_loss.abs()
    } else if gross_profit > 0.0 {
        f64::INFINITY
    } else {
        0.0
    };

    let avg_win = if wins.is_empty() {
        0.0
    } else {
        wins.iter().map(|t| t.pnl).sum::<f64>() / wins.len() as f64
    };
    let avg_loss = if losses.is_empty() {
        0.0
    } else {
        losses.iter().map(|t| t.pnl).sum::<f64>() / losses.len() as f64
    };
    let avg_trade = net_profit / total as f64;

    let longs_won = trades
        .iter()
        .filter(|t| t.direction == Direction::Long && t.pnl > 0.0)
        .count();
    let shorts_won = trades
        .iter()
        .filter(|t| t.direction == Direction::Short && t.pnl > 0.0)
        .count();

    let avg_bars_in_trade =
        trades.iter().map(|t| t.bars_held()).sum::<usize>() as f64 / total as f64;

    let largest_win = trades.iter().map(|t| t.pnl).fold(f64::NEG_INFINITY, f64::max);
    let largest_loss = trades.iter().map(|t| t.pnl).fold(f64::INFINITY, f64::min);

    let (max_consec_wins, max_consec_losses) = consecutive_streaks(trades);

    let mut equity = 0.0;
    let mut equity_curve = Vec::with_capacity(total);
    for trade in trades {
        equity += trade.pnl;
        equity_curve.push(equity);
    }
    let max_drawdown = max_drawdown(&equity_curve);

    let recovery_factor = if max_drawdown > 0.0 {
        net_profit / max_drawdown
    } else {
        0.0
    };

    let returns = return_series(trades);
    let mean_return = returns.iter().sum::<f64>() / returns.len() as f64;
    let std_return = if returns.len() > 1 {
        let variance = returns
            .iter()
            .map(|r| (r - mean_return).powi(2))
            .sum::<f64>()
            / returns.len() as f64;
        variance.sqrt()
    } else {
        0.0
    };
    let sharpe_ratio = if std_return > 0.0 {
        (mean_return / std_return) * TRADING_DAYS_PER_YEAR.sqrt()
    } else {
        0.0
    };

    let expectancy = avg_win * (win_rate / 100.0) + avg_loss * (1.0 - win_rate / 100.0);

    let total_return = net_profit;
    let annual_return = net_profit;
    let calmar_ratio = if max_drawdown > 0.0 {
        annual_return / max_drawdown
    } else {
        0.0
    };

    let downside: Vec<f64> = returns.iter().copied().filter(|r| *r < 0.0).collect();
    let downside_std = if downside.is_empty() {
        0.0
    } else {
        let variance = downside
            .iter()
            .map(|r| (r - mean_return).powi(2))
            .sum::<f64>()
            / downside.len() as f64;
        variance.sqrt()
    };
    let sortino_ratio = if downside_std > 0.0 {
        (mean_return / downside_std) * TRADING_DAYS_PER_YEAR.sqrt()
    } else {
        0.0
    };

    // First strictly-better trade wins ties.
    let mut best_trade = &trades[0];
    let mut worst_trade = &trades[0];
    for trade in trades {
        if trade.pnl > best_trade.pnl {
            best_trade = trade;
        }
        if trade.pnl < worst_trade.pnl {
            worst_trade = trade;
        }
    }

    let mut monthly_return: BTreeMap<String, f64> = BTreeMap::new();
    for trade in trades {
        if let Some(key) = trade.exit_time.month_key() {
            *monthly_return.entry(key).or_insert(0.0) += trade.pnl;
        }
    }

    let mut trade_length_dist: BTreeMap<usize, usize> = BTreeMap::new();
    for trade in trades {
        *trade_length_dist.entry(trade.bars_held()).or_insert(0) += 1;
    }

    let mut direction_dist: BTreeMap<String, usize> = BTreeMap::new();
    for trade in trades {
        *direction_dist
            .entry(trade.direction.as_str().to_string())
            .or_insert(0) += 1;
    }

    // 1R is the average loss magnitude; with no losses, fall back to 1.
    let avg_loss_abs = if avg_loss != 0.0 { avg_loss.abs() } else { 1.0 };
    let r_multiples: Vec<f64> = trades.iter().map(|t| t.pnl / avg_loss_abs).collect();
    let avg_r_multiple = r_multiples.iter().sum::<f64>() / r_multiples.len() as f64;

    let mut r_multiple_dist: BTreeMap<String, usize> = BTreeMap::new();
    for r in &r_multiples {
        *r_multiple_dist.entry(r_multiple_key(*r)).or_insert(0) += 1;
    }

    StatsReport {
        overview: Some(Overview {
            net_profit,
            gross_profit,
            gross_loss,
            total_trades: total,
            win_rate,
            max_drawdown,
            profit_factor,
            sharpe_ratio,
            avg_win,
            avg_loss,
            avg_trade,
            longs_won,
            shorts_won,
            avg_bars_in_trade,
            largest_win,
            largest_loss,
            max_consec_wins,
            max_consec_losses,
            recovery_factor,
            equity_curve: equity_curve.clone(),
        }),
        performance: Some(Performance {
            total_return,
            annual_return,
            monthly_return,
            best_trade: best_trade.clone(),
            worst_trade: worst_trade.clone(),
            calmar_ratio,
            sortino_ratio,
            expectancy,
            stddev: std_return,
            avg_win,
            avg_loss,
            avg_r_multiple,
        }),
        trade_analysis: Some(TradeAnalysis {
            trade_length_dist,
            direction_dist,
            r_multiple_dist,
            trade_log: trades.to_vec(),
        }),
        equity_curve,
        trade_log: trades.to_vec(),
    }
}

/// First-difference of per-trade pnl, seeded with the first trade's pnl.
fn return_series(trades: &[ClosedTrade]) -> Vec<f64> {
    let mut returns = Vec::with_capacity(trades.len());
    returns.push(trades[0].pnl);
    for pair in trades.windows(2) {
        returns.push(pair[1].pnl - pair[0].pnl);
    }
    returns
}

/// Running peak minus equity, maximized. The peak is seeded at zero, so a
/// curve that never rises above its starting capital still draws down.
fn max_drawdown(equity_curve: &[f64]) -> f64 {
    let mut peak = 0.0_f64;
    let mut max_dd = 0.0_f64;
    for &equity in equity_curve {
        peak = peak.max(equity);
        max_dd = max_dd.max(peak - equity);
    }
    max_dd
}

fn consecutive_streaks(trades: &[ClosedTrade]) -> (usize, usize) {
    let mut max_wins = 0;
    let mut max_losses = 0;
    let mut cur_wins = 0;
    let mut cur_losses = 0;
    for trade in trades {
        if trade.pnl > 0.0 {
            cur_wins += 1;
            cur_losses = 0;
        } else {
            cur_losses += 1;
            cur_wins = 0;
        }
        max_wins = max_wins.max(cur_wins);
        max_losses = max_losses.max(cur_losses);
    }
    (max_wins, max_losses)
}

/// Histogram key for an R-multiple: one decimal place, with negative zero
/// folded into "0.0".
fn r_multiple_key(r: f64) -> String {
    let rounded = (r * 10.0).round() / 10.0;
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    format!("{rounded:.1}")
}
