//! Seeded synthetic daily bars.
//!
//! Closes follow a random walk with a small upward drift,
//! `close_t = close_{t-1} + 0.5 * N(0, 1) + 0.02`, starting from 100. Bars sit
//! on business days (Monday to Friday) ending on `synthetic_end_date()`, so the
//! same seed always yields the same series.

use crate::domain::ohlcv::OhlcvBar;
use chrono::{Datelike, Days, NaiveDate, Weekday};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, StandardNormal};

pub const START_PRICE: f64 = 100.0;
pub const STEP_SCALE: f64 = 0.5;
pub const DRIFT: f64 = 0.02;

const MIN_PRICE: f64 = 0.01;

pub fn synthetic_end_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 31).unwrap_or(NaiveDate::MIN)
}

/// The `n` business days ending on `end` (inclusive when `end` is a weekday).
pub fn business_days_ending(end: NaiveDate, n: usize) -> Vec<NaiveDate> {
    let mut dates = Vec::with_capacity(n);
    let mut day = end;
    while dates.len() < n {
        if !matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
            dates.push(day);
        }
        match day.checked_sub_days(Days::new(1)) {
            Some(prev) => day = prev,
            None => break,
        }
    }
    dates.reverse();
    dates
}

pub fn generate_bars(symbol: &str, n: usize, seed: u64) -> Vec<OhlcvBar> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let dates = business_days_ending(synthetic_end_date(), n);

    let mut close = START_PRICE;
    dates
        .into_iter()
        .map(|date| {
            let shock: f64 = StandardNormal.sample(&mut rng);
            close = (close + shock * STEP_SCALE + DRIFT).max(MIN_PRICE);

            let open_shock: f64 = StandardNormal.sample(&mut rng);
            let open = (close + open_shock * 0.3).max(MIN_PRICE);
            let high = open.max(close) + rng.gen_range(0.1..1.0);
            let low = (open.min(close) - rng.gen_range(0.1..1.0)).max(MIN_PRICE);

            OhlcvBar {
                symbol: symbol.to_string(),
                date,
                open,
                high,
                low,
                close,
                volume: rng.gen_range(1_000_000..10_000_000),
            }
        })
        .collect()
}
