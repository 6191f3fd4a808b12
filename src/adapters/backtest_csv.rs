//! CSV export of backtest rows.

use crate::domain::backtest::BacktestResult;
use crate::domain::error::AutotradeError;
use std::fs;
use std::path::Path;
use tracing::info;

/// Write one CSV record per backtest row, with a header, creating parent
/// directories as needed.
pub fn write_backtest_csv(path: &Path, result: &BacktestResult) -> Result<(), AutotradeError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let csv_err = |e: csv::Error| AutotradeError::DataFormat {
        reason: format!("failed to write {}: {}", path.display(), e),
    };

    let mut writer = csv::Writer::from_path(path).map_err(csv_err)?;
    for row in &result.rows {
        writer.serialize(row).map_err(csv_err)?;
    }
    writer.flush()?;

    info!(path = %path.display(), rows = result.rows.len(), "wrote backtest rows");
    Ok(())
}
