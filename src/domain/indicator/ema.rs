//! Exponential Moving Average.
//!
//! k = 2/(n+1), seeded with the first observation, then
//! EMA[i] = C[i]*k + EMA[i-1]*(1-k).
//! No warmup: defined from the first value onward.

pub fn calculate_ema(series: &[f64], span: usize) -> Vec<f64> {
    if span == 0 || series.is_empty() {
        return Vec::new();
    }

    let k = 2.0 / (span as f64 + 1.0);
    let mut values = Vec::with_capacity(series.len());
    let mut ema = series[0];
    values.push(ema);

    for &price in &series[1..] {
        ema = price * k + ema * (1.0 - k);
        values.push(ema);
    }

    values
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ema_seeded_with_first_value() {
        let ema = calculate_ema(&[10.0, 20.0, 30.0], 3);
        assert!((ema[0] - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn ema_recursive_calculation() {
        let ema = calculate_ema(&[10.0, 20.0, 30.0, 40.0], 3);
        let k = 2.0 / 4.0;

        let e1 = 20.0 * k + 10.0 * (1.0 - k);
        let e2 = 30.0 * k + e1 * (1.0 - k);
        let e3 = 40.0 * k + e2 * (1.0 - k);

        assert!((ema[1] - e1).abs() < f64::EPSILON);
        assert!((ema[2] - e2).abs() < f64::EPSILON);
        assert!((ema[3] - e3).abs() < f64::EPSILON);
    }

    #[test]
    fn ema_span_1_tracks_input() {
        let ema = calculate_ema(&[10.0, 20.0, 30.0], 1);
        assert_eq!(ema, vec![10.0, 20.0, 30.0]);
    }

    #[test]
    fn ema_equal_prices() {
        let ema = calculate_ema(&[100.0; 5], 3);
        assert!(ema.iter().all(|v| (v - 100.0).abs() < f64::EPSILON));
    }

    #[test]
    fn ema_same_length_as_input() {
        assert_eq!(calculate_ema(&[1.0, 2.0, 3.0, 4.0, 5.0], 26).len(), 5);
    }

    #[test]
    fn ema_empty_series() {
        assert!(calculate_ema(&[], 3).is_empty());
    }

    #[test]
    fn ema_span_0() {
        assert!(calculate_ema(&[10.0, 20.0], 0).is_empty());
    }
}
