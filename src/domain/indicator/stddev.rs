//! Rolling standard deviation.
//!
//! Sample standard deviation (n-1 denominator) over a trailing window of n
//! values. Input values may be undefined; a window containing any undefined
//! value produces an undefined output.
//! Warmup: at least (n-1) values are undefined.

pub fn calculate_rolling_std(series: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    if period < 2 {
        return vec![None; series.len()];
    }

    (0..series.len())
        .map(|i| {
            if i + 1 < period {
                return None;
            }
            let window: Option<Vec<f64>> = series[i + 1 - period..=i].iter().copied().collect();
            let window = window?;

            let mean = window.iter().sum::<f64>() / period as f64;
            let variance = window
                .iter()
                .map(|v| {
                    let diff = v - mean;
                    diff * diff
                })
                .sum::<f64>()
                / (period - 1) as f64;

            Some(variance.sqrt())
        })
        .collect()
}
