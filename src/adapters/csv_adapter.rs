//! CSV file data adapter.
//!
//! Reads `<base_path>/<SYMBOL>.csv` with header
//! `date,open,high,low,close,volume`. The look-back period is measured back
//! from the last date in the file, not from today.

use crate::domain::error::AutotradeError;
use crate::domain::ohlcv::{normalize, OhlcvBar};
use crate::domain::period::Period;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;
use tracing::debug;

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }
}

fn parse_field<T: std::str::FromStr>(
    record: &csv::StringRecord,
    index: usize,
    name: &str,
) -> Result<T, AutotradeError>
where
    T::Err: std::fmt::Display,
{
    record
        .get(index)
        .ok_or_else(|| AutotradeError::DataFormat {
            reason: format!("missing {} column", name),
        })?
        .trim()
        .parse()
        .map_err(|e| AutotradeError::DataFormat {
            reason: format!("invalid {} value: {}", name, e),
        })
}

impl DataPort for CsvAdapter {
    fn fetch_bars(&self, symbol: &str, period: Period) -> Result<Vec<OhlcvBar>, AutotradeError> {
        let path = self.csv_path(symbol);
        let content = fs::read_to_string(&path).map_err(|e| {
            debug!(path = %path.display(), error = %e, "csv file unreadable");
            AutotradeError::DataUnavailable {
                symbol: symbol.to_string(),
                period: period.to_string(),
            }
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| AutotradeError::DataFormat {
                reason: format!("CSV parse error: {}", e),
            })?;

            let date_str = record.get(0).ok_or_else(|| AutotradeError::DataFormat {
                reason: "missing date column".into(),
            })?;
            let date = NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d").map_err(|e| {
                AutotradeError::DataFormat {
                    reason: format!("invalid date format: {}", e),
                }
            })?;

            bars.push(OhlcvBar {
                symbol: symbol.to_string(),
                date,
                open: parse_field(&record, 1, "open")?,
                high: parse_field(&record, 2, "high")?,
                low: parse_field(&record, 3, "low")?,
                close: parse_field(&record, 4, "close")?,
                volume: parse_field(&record, 5, "volume")?,
            });
        }

        let bars = normalize(bars);
        let Some(last) = bars.last().map(|b| b.date) else {
            return Ok(bars);
        };
        let bars: Vec<OhlcvBar> = match period.start_date(last) {
            Some(start) => bars.into_iter().filter(|b| b.date >= start).collect(),
            None => bars,
        };

        debug!(path = %path.display(), rows = bars.len(), "loaded csv bars");
        Ok(bars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup_test_data() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().to_path_buf();

        let csv_content = "date,open,high,low,close,volume\n\
            2024-01-15,100.0,110.0,90.0,105.0,50000\n\
            2024-01-16,105.0,115.0,100.0,110.0,60000\n\
            2024-01-17,110.0,120.0,105.0,115.0,55000\n";

        fs::write(path.join("BHP.csv"), csv_content).unwrap();
        fs::write(path.join("EMPTY.csv"), "date,open,high,low,close,volume\n").unwrap();

        (dir, path)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn fetch_bars_returns_correct_data() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let bars = adapter.fetch_bars("BHP", Period::Max).unwrap();

        assert_eq!(bars.len(), 3);
        assert_eq!(bars[0].symbol, "BHP");
        assert_eq!(bars[0].date, date(2024, 1, 15));
        assert_eq!(bars[0].open, 100.0);
        assert_eq!(bars[0].high, 110.0);
        assert_eq!(bars[0].low, 90.0);
        assert_eq!(bars[0].close, 105.0);
        assert_eq!(bars[0].volume, 50000);
    }

    #[test]
    fn fetch_bars_filters_by_period_from_last_date() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let bars = adapter.fetch_bars("BHP", Period::Days(5)).unwrap();

        assert_eq!(bars.len(), 3);
        assert_eq!(bars[0].date, date(2024, 1, 15));
    }

    #[test]
    fn one_day_period_keeps_only_last_bar() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let bars = adapter.fetch_bars("BHP", Period::Days(1)).unwrap();

        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].date, date(2024, 1, 17));
    }

    #[test]
    fn fetch_bars_sorts_and_dedups() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("MIX.csv"),
            "date,open,high,low,close,volume\n\
             2024-02-02,1,1,1,2.0,10\n\
             2024-02-01,1,1,1,1.0,10\n\
             2024-02-02,1,1,1,3.0,10\n",
        )
        .unwrap();
        let adapter = CsvAdapter::new(dir.path().to_path_buf());

        let bars = adapter.fetch_bars("MIX", Period::Max).unwrap();

        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].date, date(2024, 2, 1));
        assert_eq!(bars[1].close, 3.0);
    }

    #[test]
    fn fetch_bars_missing_file_is_unavailable() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let err = adapter.fetch_bars("XYZ", Period::Years(2)).unwrap_err();

        assert!(
            matches!(err, AutotradeError::DataUnavailable { symbol, period }
                if symbol == "XYZ" && period == "2y")
        );
    }

    #[test]
    fn fetch_bars_header_only_is_empty() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        assert!(adapter.fetch_bars("EMPTY", Period::Max).unwrap().is_empty());
    }

    #[test]
    fn fetch_bars_rejects_bad_number() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("BAD.csv"),
            "date,open,high,low,close,volume\n2024-01-15,abc,1,1,1,1\n",
        )
        .unwrap();
        let adapter = CsvAdapter::new(dir.path().to_path_buf());

        let err = adapter.fetch_bars("BAD", Period::Max).unwrap_err();

        assert!(matches!(err, AutotradeError::DataFormat { .. }));
    }

    #[test]
    fn fetch_bars_rejects_bad_date() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("BAD.csv"),
            "date,open,high,low,close,volume\n15/01/2024,1,1,1,1,1\n",
        )
        .unwrap();
        let adapter = CsvAdapter::new(dir.path().to_path_buf());

        assert!(matches!(
            adapter.fetch_bars("BAD", Period::Max),
            Err(AutotradeError::DataFormat { .. })
        ));
    }
}
