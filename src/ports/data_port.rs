//! Market data port trait.

use crate::domain::error::AutotradeError;
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::period::Period;

pub trait DataPort {
    /// Daily bars for `symbol` covering `period`, oldest first.
    ///
    /// An unknown symbol may yield either an empty vector or
    /// `AutotradeError::DataUnavailable`; callers treat both as fatal.
    fn fetch_bars(&self, symbol: &str, period: Period) -> Result<Vec<OhlcvBar>, AutotradeError>;
}
