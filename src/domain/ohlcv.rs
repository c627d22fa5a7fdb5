//! OHLCV bar representation and timestamp normalization.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// Bar timestamp as it arrives from callers: epoch seconds or ISO-8601 text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Timestamp {
    Epoch(i64),
    Text(String),
}

impl Timestamp {
    /// Normalize to a calendar datetime. Epoch seconds are read as UTC; text
    /// is tried as RFC 3339 (wall-clock time kept), then as a naive datetime,
    /// then as a bare date at midnight. Unparseable text yields `None`.
    pub fn to_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            Timestamp::Epoch(secs) => DateTime::from_timestamp(*secs, 0).map(|dt| dt.naive_utc()),
            Timestamp::Text(text) => DateTime::parse_from_rfc3339(text)
                .map(|dt| dt.naive_local())
                .ok()
                .or_else(|| text.parse::<NaiveDateTime>().ok())
                .or_else(|| {
                    text.parse::<NaiveDate>()
                        .ok()
                        .map(|d| d.and_time(NaiveTime::MIN))
                }),
        }
    }

    /// "YYYY-MM" bucket used for monthly profit grouping.
    pub fn month_key(&self) -> Option<String> {
        self.to_datetime()
            .map(|dt| format!("{}-{:02}", dt.year(), dt.month()))
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Timestamp::Epoch(secs) => write!(f, "{secs}"),
            Timestamp::Text(text) => f.write_str(text),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OhlcvBar {
    pub timestamp: Timestamp,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl OhlcvBar {
    /// Numeric field lookup by name, for threshold rules over arbitrary bar
    /// fields. `timestamp` resolves only when it carries an epoch value;
    /// unknown names yield `None`.
    pub fn field(&self, name: &str) -> Option<f64> {
        match name {
            "open" => Some(self.open),
            "high" => Some(self.high),
            "low" => Some(self.low),
            "close" => Some(self.close),
            "volume" => Some(self.volume),
            "timestamp" => match &self.timestamp {
                Timestamp::Epoch(secs) => Some(*secs as f64),
                Timestamp::Text(_) => None,
            },
            _ => None,
        }
    }
}
