//! JSON report adapter.
//!
//! Writes the run result as `{"trades": [...], "metrics": {...}}` — the
//! payload shape the transport layer returns to callers — either to a file
//! or to stdout.

use std::fs;
use std::path::PathBuf;

use serde_json::json;

use crate::domain::error::StratsimError;
use crate::domain::metrics::MetricsReport;
use crate::domain::position::ClosedTrade;
use crate::ports::report_port::ReportPort;

pub struct JsonReportAdapter {
    output: Option<PathBuf>,
    pretty: bool,
}

impl JsonReportAdapter {
    /// `output = None` writes to stdout.
    pub fn new(output: Option<PathBuf>, pretty: bool) -> Self {
        Self { output, pretty }
    }

    fn render(
        &self,
        trades: &[ClosedTrade],
        metrics: &MetricsReport,
    ) -> Result<String, StratsimError> {
        let payload = json!({
            "trades": trades,
            "metrics": metrics,
        });
        let rendered = if self.pretty {
            serde_json::to_string_pretty(&payload)
        } else {
            serde_json::to_string(&payload)
        };
        rendered.map_err(|e| StratsimError::Report {
            reason: e.to_string(),
        })
    }
}

impl ReportPort for JsonReportAdapter {
    fn write(&self, trades: &[ClosedTrade], metrics: &MetricsReport) -> Result<(), StratsimError> {
        let rendered = self.render(trades, metrics)?;
        match &self.output {
            Some(path) => fs::write(path, rendered + "\n").map_err(StratsimError::Io),
            None => {
                println!("{rendered}");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::metrics;
    use crate::domain::ohlcv::Timestamp;
    use crate::domain::position::Direction;
    use tempfile::TempDir;

    fn sample_trade() -> ClosedTrade {
        ClosedTrade {
            direction: Direction::Long,
            entry_index: 1,
            entry_time: Timestamp::Epoch(1_705_276_800),
            entry_price: 101.0,
            exit_index: 2,
            exit_time: Timestamp::Epoch(1_705_363_200),
            exit_price: 99.0,
            pnl: -2.0,
        }
    }

    #[test]
    fn payload_has_trades_and_metrics() {
        let trades = vec![sample_trade()];
        let report = MetricsReport::Stats(metrics::compute(&trades));

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.json");
        let adapter = JsonReportAdapter::new(Some(path.clone()), true);
        adapter.write(&trades, &report).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();

        assert_eq!(value["trades"][0]["direction"], "long");
        assert_eq!(value["trades"][0]["pnl"], -2.0);
        assert_eq!(value["metrics"]["overview"]["total_trades"], 1);
        assert_eq!(value["metrics"]["trade_log"][0]["entry_index"], 1);
    }

    #[test]
    fn error_report_payload() {
        let report = MetricsReport::error("AI-powered parsing not implemented yet");

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.json");
        let adapter = JsonReportAdapter::new(Some(path.clone()), false);
        adapter.write(&[], &report).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();

        assert_eq!(value["trades"], serde_json::json!([]));
        assert_eq!(
            value["metrics"],
            serde_json::json!({"error": "AI-powered parsing not implemented yet"})
        );
    }
}
