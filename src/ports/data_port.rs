//! Series access port trait.

use crate::domain::error::StratsimError;
use crate::domain::ohlcv::{OhlcvBar, Timestamp};

pub trait DataPort {
    /// The full series, in source order. Index `i` of the result is
    /// chronological position `i`; implementations must not resort.
    fn load_series(&self) -> Result<Vec<OhlcvBar>, StratsimError>;

    /// First/last timestamp and bar count, or `None` for an empty source.
    fn series_range(&self) -> Result<Option<(Timestamp, Timestamp, usize)>, StratsimError>;
}
