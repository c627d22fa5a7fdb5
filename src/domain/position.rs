//! Position state and closed trades.

use serde::{Deserialize, Serialize};

use crate::domain::ohlcv::Timestamp;

/// The simulator's transient open-trade state. At most one position exists at
/// a time; it is consumed when the trade closes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Position {
    Flat,
    Long { entry_price: f64, entry_index: usize },
    Short { entry_price: f64, entry_index: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Long => "long",
            Direction::Short => "short",
        }
    }
}

/// One completed entry-to-exit round trip with realized P&L.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClosedTrade {
    pub direction: Direction,
    pub entry_index: usize,
    pub entry_time: Timestamp,
    pub entry_price: f64,
    pub exit_index: usize,
    pub exit_time: Timestamp,
    pub exit_price: f64,
    pub pnl: f64,
}

impl ClosedTrade {
    /// Number of bars the position was held.
    pub fn bars_held(&self) -> usize {
        self.exit_index - self.entry_index
    }
}
