//! PNG renderer for backtest diagnostics.
//!
//! Writes a 2x2 panel figure: cumulative strategy return against buy-and-hold,
//! the close price with long signals marked, a histogram of non-zero daily
//! strategy returns, and the model's feature importances.

use crate::domain::backtest::BacktestResult;
use crate::domain::error::AutotradeError;
use crate::ports::plot_port::PlotPort;
use plotters::prelude::*;
use std::error::Error;
use std::fs;
use std::ops::Range;
use std::path::Path;
use tracing::info;

const HISTOGRAM_BINS: usize = 30;

pub struct PlotterAdapter {
    width: u32,
    height: u32,
}

impl PlotterAdapter {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Default for PlotterAdapter {
    fn default() -> Self {
        Self::new(1600, 1200)
    }
}

impl PlotPort for PlotterAdapter {
    fn render(
        &self,
        result: &BacktestResult,
        importances: &[(&str, f64)],
        output_path: &Path,
    ) -> Result<(), AutotradeError> {
        if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        draw(result, importances, output_path, (self.width, self.height)).map_err(|e| {
            AutotradeError::Plot {
                reason: format!("failed to render {}: {}", output_path.display(), e),
            }
        })?;

        info!(path = %output_path.display(), "wrote analysis plot");
        Ok(())
    }
}

fn draw(
    result: &BacktestResult,
    importances: &[(&str, f64)],
    output_path: &Path,
    size: (u32, u32),
) -> Result<(), Box<dyn Error>> {
    let root = BitMapBackend::new(output_path, size).into_drawing_area();
    root.fill(&WHITE)?;
    let panels = root.split_evenly((2, 2));

    draw_cumulative(&panels[0], result)?;
    draw_price(&panels[1], result)?;
    draw_histogram(&panels[2], result)?;
    draw_importances(&panels[3], importances)?;

    root.present()?;
    Ok(())
}

fn date_label(result: &BacktestResult, i: usize) -> String {
    result
        .rows
        .get(i)
        .map(|r| r.date.format("%Y-%m").to_string())
        .unwrap_or_default()
}

fn draw_cumulative<DB: DrawingBackend>(
    area: &DrawingArea<DB, plotters::coord::Shift>,
    result: &BacktestResult,
) -> Result<(), Box<dyn Error>>
where
    DB::ErrorType: 'static,
{
    let n = result.rows.len().max(1);
    let strategy: Vec<f64> = result.rows.iter().map(|r| r.cumulative_return).collect();
    let market: Vec<f64> = result
        .rows
        .iter()
        .map(|r| r.market_cumulative_return)
        .collect();
    let y_range = padded_range(strategy.iter().chain(market.iter()).copied());

    let mut chart = ChartBuilder::on(area)
        .caption("Cumulative return", ("sans-serif", 24).into_font())
        .margin(10)
        .x_label_area_size(35)
        .y_label_area_size(55)
        .build_cartesian_2d(0usize..n, y_range)?;

    chart
        .configure_mesh()
        .x_labels(6)
        .x_label_formatter(&|i| date_label(result, *i))
        .y_label_formatter(&|y| format!("{:.0}%", y * 100.0))
        .draw()?;

    chart
        .draw_series(LineSeries::new(strategy.iter().copied().enumerate(), &BLUE))?
        .label("Strategy")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &BLUE));

    chart
        .draw_series(LineSeries::new(market.iter().copied().enumerate(), &BLACK.mix(0.6)))?
        .label("Buy and hold")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &BLACK.mix(0.6)));

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;
    Ok(())
}

fn draw_price<DB: DrawingBackend>(
    area: &DrawingArea<DB, plotters::coord::Shift>,
    result: &BacktestResult,
) -> Result<(), Box<dyn Error>>
where
    DB::ErrorType: 'static,
{
    let n = result.rows.len().max(1);
    let y_range = padded_range(result.rows.iter().map(|r| r.close));

    let mut chart = ChartBuilder::on(area)
        .caption("Close with long signals", ("sans-serif", 24).into_font())
        .margin(10)
        .x_label_area_size(35)
        .y_label_area_size(55)
        .build_cartesian_2d(0usize..n, y_range)?;

    chart
        .configure_mesh()
        .x_labels(6)
        .x_label_formatter(&|i| date_label(result, *i))
        .draw()?;

    chart
        .draw_series(LineSeries::new(
            result.rows.iter().enumerate().map(|(i, r)| (i, r.close)),
            &BLUE,
        ))?
        .label("Close")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &BLUE));

    chart
        .draw_series(
            result
                .rows
                .iter()
                .enumerate()
                .filter(|(_, r)| r.signal == 1)
                .map(|(i, r)| TriangleMarker::new((i, r.close), 4, GREEN.filled())),
        )?
        .label("Long")
        .legend(|(x, y)| TriangleMarker::new((x, y), 4, GREEN.filled()));

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;
    Ok(())
}

fn draw_histogram<DB: DrawingBackend>(
    area: &DrawingArea<DB, plotters::coord::Shift>,
    result: &BacktestResult,
) -> Result<(), Box<dyn Error>>
where
    DB::ErrorType: 'static,
{
    let returns: Vec<f64> = result
        .rows
        .iter()
        .map(|r| r.strategy_return)
        .filter(|&r| r != 0.0)
        .collect();
    let x_range = padded_range(returns.iter().copied());
    let bins = histogram(&returns, &x_range, HISTOGRAM_BINS);
    let width = (x_range.end - x_range.start) / HISTOGRAM_BINS as f64;
    let max_count = bins.iter().copied().max().unwrap_or(0).max(1);

    let mut chart = ChartBuilder::on(area)
        .caption("Daily strategy returns", ("sans-serif", 24).into_font())
        .margin(10)
        .x_label_area_size(35)
        .y_label_area_size(55)
        .build_cartesian_2d(x_range.clone(), 0u32..(max_count as u32 + 1))?;

    chart
        .configure_mesh()
        .x_label_formatter(&|x| format!("{:.1}%", x * 100.0))
        .draw()?;

    chart.draw_series(bins.iter().enumerate().map(|(b, &count)| {
        let left = x_range.start + b as f64 * width;
        Rectangle::new(
            [(left, 0u32), (left + width, count as u32)],
            BLUE.mix(0.6).filled(),
        )
    }))?;
    Ok(())
}

fn draw_importances<DB: DrawingBackend>(
    area: &DrawingArea<DB, plotters::coord::Shift>,
    importances: &[(&str, f64)],
) -> Result<(), Box<dyn Error>>
where
    DB::ErrorType: 'static,
{
    let mut sorted: Vec<(&str, f64)> = importances.to_vec();
    sorted.sort_by(|a, b| a.1.total_cmp(&b.1));
    let k = sorted.len().max(1) as f64;
    let x_max = sorted.iter().map(|(_, v)| *v).fold(0.0, f64::max).max(1e-6) * 1.15;

    let mut chart = ChartBuilder::on(area)
        .caption("Feature importance", ("sans-serif", 24).into_font())
        .margin(10)
        .x_label_area_size(35)
        .y_label_area_size(10)
        .build_cartesian_2d(0.0..x_max, 0.0..k)?;

    chart.configure_mesh().disable_y_axis().disable_mesh().draw()?;

    chart.draw_series(sorted.iter().enumerate().map(|(i, (_, value))| {
        let y = i as f64;
        Rectangle::new([(0.0, y + 0.15), (*value, y + 0.85)], GREEN.mix(0.7).filled())
    }))?;

    chart.draw_series(sorted.iter().enumerate().map(|(i, (name, value))| {
        Text::new(
            format!("{} ({:.3})", name, value),
            (x_max * 0.02, i as f64 + 0.65),
            ("sans-serif", 15).into_font(),
        )
    }))?;
    Ok(())
}

/// Range covering all values with a 5% margin; never empty.
fn padded_range(values: impl Iterator<Item = f64>) -> Range<f64> {
    let (lo, hi) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if !lo.is_finite() {
        return -0.01..0.01;
    }
    let span = hi - lo;
    let pad = if span > 0.0 { span * 0.05 } else { lo.abs().max(0.01) * 0.05 };
    (lo - pad)..(hi + pad)
}

/// Counts of `values` in `bins` equal-width buckets over `range`.
fn histogram(values: &[f64], range: &Range<f64>, bins: usize) -> Vec<usize> {
    let mut counts = vec![0; bins];
    let width = (range.end - range.start) / bins as f64;
    if bins == 0 || width <= 0.0 {
        return counts;
    }
    for &v in values {
        if v < range.start || v > range.end {
            continue;
        }
        let b = (((v - range.start) / width) as usize).min(bins - 1);
        counts[b] += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::backtest::BacktestRow;
    use crate::domain::metrics::PerformanceSummary;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn sample_result(n: usize) -> BacktestResult {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let rows: Vec<BacktestRow> = (0..n)
            .map(|i| BacktestRow {
                date: start + chrono::Duration::days(i as i64),
                close: 100.0 + (i as f64).sin() * 5.0,
                return_1d: 0.01 * (i as f64).cos(),
                signal: (i % 3 == 0) as u8,
                strategy_return: if i % 2 == 0 { 0.0 } else { 0.005 },
                cumulative_return: i as f64 * 0.001,
                market_cumulative_return: i as f64 * 0.0015,
            })
            .collect();
        let strategy: Vec<f64> = rows.iter().map(|r| r.strategy_return).collect();
        BacktestResult {
            summary: PerformanceSummary::compute(&strategy, &strategy, &[], 0.0),
            rows,
        }
    }

    #[test]
    fn padded_range_covers_values() {
        let r = padded_range([1.0, 3.0, 2.0].into_iter());
        assert!(r.start < 1.0 && r.end > 3.0);
    }

    #[test]
    fn padded_range_handles_constant_and_empty() {
        let r = padded_range([5.0, 5.0].into_iter());
        assert!(r.start < 5.0 && r.end > 5.0);
        let r = padded_range(std::iter::empty());
        assert!(r.start < r.end);
    }

    #[test]
    fn histogram_counts_every_value() {
        let values = [-0.02, -0.01, 0.0, 0.01, 0.02];
        let range = padded_range(values.iter().copied());
        let counts = histogram(&values, &range, 4);
        assert_eq!(counts.iter().sum::<usize>(), values.len());
    }

    #[test]
    fn histogram_puts_max_in_last_bin() {
        let counts = histogram(&[1.0], &(0.0..1.0), 5);
        assert_eq!(counts, vec![0, 0, 0, 0, 1]);
    }

    #[test]
    #[ignore = "needs system fonts"]
    fn renders_png_and_creates_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/img/analysis.png");
        let importances = [("sma_10", 0.4), ("rsi_14", 0.35), ("macd", 0.25)];

        PlotterAdapter::default()
            .render(&sample_result(120), &importances, &path)
            .unwrap();

        assert!(path.exists());
        assert!(fs::metadata(&path).unwrap().len() > 0);
    }
}
