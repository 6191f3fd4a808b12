//! RSI (Relative Strength Index).
//!
//! Day-over-day changes are split into gains and losses, each averaged with a
//! plain trailing mean over `n` changes:
//!
//! RSI = 100 - (100 / (1 + avg_gain / avg_loss))
//!
//! If avg_loss == 0: RSI = 100. The first n values have no full window of
//! changes and are treated the same way (no losses observed yet), so the
//! output is defined everywhere.

pub const DEFAULT_PERIOD: usize = 14;

pub fn calculate_rsi(series: &[f64], period: usize) -> Vec<f64> {
    let mut values = vec![100.0; series.len()];
    if period == 0 {
        return values;
    }

    let mut gains: Vec<f64> = Vec::with_capacity(series.len());
    let mut losses: Vec<f64> = Vec::with_capacity(series.len());
    // index 0 has no prior close
    gains.push(0.0);
    losses.push(0.0);
    for i in 1..series.len() {
        let change = series[i] - series[i - 1];
        gains.push(if change > 0.0 { change } else { 0.0 });
        losses.push(if change < 0.0 { -change } else { 0.0 });
    }

    for i in period..series.len() {
        let start = i + 1 - period;
        let avg_gain = gains[start..=i].iter().sum::<f64>() / period as f64;
        let avg_loss = losses[start..=i].iter().sum::<f64>() / period as f64;
        values[i] = rsi_from_averages(avg_gain, avg_loss);
    }

    values
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        return 100.0;
    }
    let rsi = 100.0 - (100.0 / (1.0 + avg_gain / avg_loss));
    rsi.clamp(0.0, 100.0)
}
