//! Look-back period tokens (`1mo`, `2y`, `ytd`, `max`, ...).

use crate::domain::error::AutotradeError;
use chrono::{Datelike, Days, Months, NaiveDate};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Days(u32),
    Months(u32),
    Years(u32),
    YearToDate,
    Max,
}

impl Period {
    /// Canonical token, also the `range` value understood by the chart API.
    pub fn as_str(&self) -> String {
        match self {
            Period::Days(n) => format!("{}d", n),
            Period::Months(n) => format!("{}mo", n),
            Period::Years(n) => format!("{}y", n),
            Period::YearToDate => "ytd".to_string(),
            Period::Max => "max".to_string(),
        }
    }

    /// First calendar date covered when the window ends on `end`, so that
    /// `1d` covers `end` alone. `None` means unbounded.
    pub fn start_date(&self, end: NaiveDate) -> Option<NaiveDate> {
        let before = match *self {
            Period::Days(n) => end.checked_sub_days(Days::new(u64::from(n))),
            Period::Months(n) => end.checked_sub_months(Months::new(n)),
            Period::Years(n) => end.checked_sub_months(Months::new(n.saturating_mul(12))),
            Period::YearToDate => return NaiveDate::from_ymd_opt(end.year(), 1, 1),
            Period::Max => return None,
        };
        before.and_then(|d| d.checked_add_days(Days::new(1)))
    }
}

/// Look-back tokens the chart API accepts as `range`.
pub const SUPPORTED_PERIODS: [&str; 11] = [
    "1d", "5d", "1mo", "3mo", "6mo", "1y", "2y", "5y", "10y", "ytd", "max",
];

impl FromStr for Period {
    type Err = AutotradeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim().to_lowercase();
        let invalid = || AutotradeError::InvalidPeriod {
            value: s.to_string(),
        };
        if !SUPPORTED_PERIODS.contains(&token.as_str()) {
            return Err(invalid());
        }

        match token.as_str() {
            "ytd" => return Ok(Period::YearToDate),
            "max" => return Ok(Period::Max),
            _ => {}
        }

        let split = token
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(invalid)?;
        let (count, unit) = token.split_at(split);
        let count: u32 = count.parse().map_err(|_| invalid())?;
        if count == 0 {
            return Err(invalid());
        }

        match unit {
            "d" => Ok(Period::Days(count)),
            "mo" => Ok(Period::Months(count)),
            "y" => Ok(Period::Years(count)),
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str())
    }
}
