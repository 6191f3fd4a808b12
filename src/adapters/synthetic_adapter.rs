//! Offline data adapter serving seeded random-walk bars.

use crate::domain::error::AutotradeError;
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::period::Period;
use crate::domain::synthetic::{generate_bars, synthetic_end_date};
use crate::ports::data_port::DataPort;
use tracing::debug;

pub struct SyntheticAdapter {
    rows: usize,
    seed: u64,
}

impl SyntheticAdapter {
    pub fn new(rows: usize, seed: u64) -> Self {
        Self { rows, seed }
    }
}

impl DataPort for SyntheticAdapter {
    /// Generates `rows` bars, then keeps those inside `period` measured back
    /// from the fixed end date.
    fn fetch_bars(&self, symbol: &str, period: Period) -> Result<Vec<OhlcvBar>, AutotradeError> {
        let bars = generate_bars(symbol, self.rows, self.seed);
        let bars: Vec<OhlcvBar> = match period.start_date(synthetic_end_date()) {
            Some(start) => bars.into_iter().filter(|b| b.date >= start).collect(),
            None => bars,
        };
        debug!(symbol, rows = bars.len(), seed = self.seed, "generated synthetic bars");
        Ok(bars)
    }
}
