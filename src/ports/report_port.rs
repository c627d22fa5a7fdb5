//! Report output port trait.

use crate::domain::error::StratsimError;
use crate::domain::metrics::MetricsReport;
use crate::domain::position::ClosedTrade;

/// Port for writing the result of one run.
pub trait ReportPort {
    fn write(&self, trades: &[ClosedTrade], metrics: &MetricsReport) -> Result<(), StratsimError>;
}
