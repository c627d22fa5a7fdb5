//! CSV file series adapter.
//!
//! Expects a header row of `timestamp,open,high,low,close,volume`. The
//! timestamp cell may be integer epoch seconds or ISO-8601 text. Rows are
//! returned in file order — the file order is the chronological order, and
//! no resorting happens anywhere in the pipeline.

use std::fs;
use std::path::PathBuf;

use crate::domain::error::StratsimError;
use crate::domain::ohlcv::{OhlcvBar, Timestamp};
use crate::ports::data_port::DataPort;

pub struct CsvAdapter {
    path: PathBuf,
}

impl CsvAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn numeric_column(
        record: &csv::StringRecord,
        index: usize,
        name: &str,
    ) -> Result<f64, StratsimError> {
        record
            .get(index)
            .ok_or_else(|| StratsimError::Data {
                reason: format!("missing {name} column"),
            })?
            .trim()
            .parse()
            .map_err(|e| StratsimError::Data {
                reason: format!("invalid {name} value: {e}"),
            })
    }
}

impl DataPort for CsvAdapter {
    fn load_series(&self) -> Result<Vec<OhlcvBar>, StratsimError> {
        let content = fs::read_to_string(&self.path).map_err(|e| StratsimError::Data {
            reason: format!("failed to read {}: {}", self.path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| StratsimError::Data {
                reason: format!("CSV parse error: {e}"),
            })?;

            let raw_timestamp = record
                .get(0)
                .ok_or_else(|| StratsimError::Data {
                    reason: "missing timestamp column".into(),
                })?
                .trim();
            let timestamp = match raw_timestamp.parse::<i64>() {
                Ok(epoch) => Timestamp::Epoch(epoch),
                Err(_) => Timestamp::Text(raw_timestamp.to_string()),
            };

            bars.push(OhlcvBar {
                timestamp,
                open: Self::numeric_column(&record, 1, "open")?,
                high: Self::numeric_column(&record, 2, "high")?,
                low: Self::numeric_column(&record, 3, "low")?,
                close: Self::numeric_column(&record, 4, "close")?,
                volume: Self::numeric_column(&record, 5, "volume")?,
            });
        }

        Ok(bars)
    }

    fn series_range(&self) -> Result<Option<(Timestamp, Timestamp, usize)>, StratsimError> {
        let bars = self.load_series()?;
        Ok(match (bars.first(), bars.last()) {
            (Some(first), Some(last)) => {
                Some((first.timestamp.clone(), last.timestamp.clone(), bars.len()))
            }
            _ => None,
        })
    }
}
