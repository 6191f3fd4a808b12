//! Visualization sink port trait.

use crate::domain::backtest::BacktestResult;
use crate::domain::error::AutotradeError;
use std::path::Path;

pub trait PlotPort {
    /// Render the backtest and the (name, importance) pairs to `output_path`,
    /// creating parent directories as needed.
    fn render(
        &self,
        result: &BacktestResult,
        importances: &[(&str, f64)],
        output_path: &Path,
    ) -> Result<(), AutotradeError>;
}
