//! Classification and backtest performance metrics.

use std::fmt;

const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Precision/recall/F1 for one class label.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationReport {
    /// Indexed by class label (0 = down, 1 = up).
    pub classes: [ClassMetrics; 2],
    pub accuracy: f64,
    pub macro_avg: ClassMetrics,
    pub weighted_avg: ClassMetrics,
}

impl ClassificationReport {
    /// Build a report for binary labels. Undefined ratios (zero division)
    /// are reported as 0.
    pub fn compute(actual: &[u8], predicted: &[u8]) -> Self {
        let total = actual.len().min(predicted.len());
        let pairs = || actual.iter().zip(predicted.iter());

        let correct = pairs().filter(|(a, p)| a == p).count();
        let accuracy = ratio(correct, total);

        let classes = [0u8, 1u8].map(|label| {
            let tp = pairs().filter(|&(&a, &p)| a == label && p == label).count();
            let predicted_pos = pairs().filter(|&(_, &p)| p == label).count();
            let support = pairs().filter(|&(&a, _)| a == label).count();

            let precision = ratio(tp, predicted_pos);
            let recall = ratio(tp, support);
            let f1 = if precision + recall > 0.0 {
                2.0 * precision * recall / (precision + recall)
            } else {
                0.0
            };

            ClassMetrics {
                precision,
                recall,
                f1,
                support,
            }
        });

        let macro_avg = ClassMetrics {
            precision: (classes[0].precision + classes[1].precision) / 2.0,
            recall: (classes[0].recall + classes[1].recall) / 2.0,
            f1: (classes[0].f1 + classes[1].f1) / 2.0,
            support: total,
        };

        let weighted = |f: fn(&ClassMetrics) -> f64| {
            if total == 0 {
                return 0.0;
            }
            classes
                .iter()
                .map(|c| f(c) * c.support as f64)
                .sum::<f64>()
                / total as f64
        };
        let weighted_avg = ClassMetrics {
            precision: weighted(|c| c.precision),
            recall: weighted(|c| c.recall),
            f1: weighted(|c| c.f1),
            support: total,
        };

        ClassificationReport {
            classes,
            accuracy,
            macro_avg,
            weighted_avg,
        }
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:>14} {:>10} {:>10} {:>10} {:>10}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        writeln!(f)?;
        for (label, c) in self.classes.iter().enumerate() {
            writeln!(
                f,
                "{:>14} {:>10.2} {:>10.2} {:>10.2} {:>10}",
                label, c.precision, c.recall, c.f1, c.support
            )?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>14} {:>10} {:>10} {:>10.2} {:>10}",
            "accuracy", "", "", self.accuracy, self.macro_avg.support
        )?;
        for (name, c) in [
            ("macro avg", &self.macro_avg),
            ("weighted avg", &self.weighted_avg),
        ] {
            writeln!(
                f,
                "{:>14} {:>10.2} {:>10.2} {:>10.2} {:>10}",
                name, c.precision, c.recall, c.f1, c.support
            )?;
        }
        Ok(())
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

/// Summary statistics for a strategy return series.
#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceSummary {
    pub total_return: f64,
    pub buy_and_hold_return: f64,
    pub annualized_return: f64,
    pub sharpe_ratio: f64,
    pub max_drawdown: f64,
    /// Fraction of days spent long.
    pub exposure: f64,
    pub trading_days: usize,
}

impl PerformanceSummary {
    /// `strategy_returns` and `market_returns` are daily simple returns;
    /// `positions[i]` is the position held over day i (0 or 1).
    pub fn compute(
        strategy_returns: &[f64],
        market_returns: &[f64],
        positions: &[u8],
        risk_free_rate: f64,
    ) -> Self {
        let total_return = compound(strategy_returns);
        let buy_and_hold_return = compound(market_returns);

        let trading_days = strategy_returns.len();
        let years = trading_days as f64 / TRADING_DAYS_PER_YEAR;
        let annualized_return = if years > 0.0 && total_return > -1.0 {
            (1.0 + total_return).powf(1.0 / years) - 1.0
        } else {
            0.0
        };

        let exposure = if positions.is_empty() {
            0.0
        } else {
            positions.iter().filter(|&&p| p == 1).count() as f64 / positions.len() as f64
        };

        let equity: Vec<f64> = strategy_returns
            .iter()
            .scan(1.0, |acc, r| {
                *acc *= 1.0 + r;
                Some(*acc)
            })
            .collect();

        PerformanceSummary {
            total_return,
            buy_and_hold_return,
            annualized_return,
            sharpe_ratio: compute_sharpe(
                strategy_returns,
                risk_free_rate / TRADING_DAYS_PER_YEAR,
            ),
            max_drawdown: compute_drawdown(&equity),
            exposure,
            trading_days,
        }
    }
}

/// prod(1 + r) - 1
pub fn compound(returns: &[f64]) -> f64 {
    returns.iter().fold(1.0, |acc, r| acc * (1.0 + r)) - 1.0
}

fn compute_drawdown(equity_curve: &[f64]) -> f64 {
    let Some(&first) = equity_curve.first() else {
        return 0.0;
    };

    let mut peak = first.max(1.0);
    let mut max_dd = 0.0_f64;

    for &equity in equity_curve {
        if equity > peak {
            peak = equity;
        } else if peak > 0.0 {
            let dd = (peak - equity) / peak;
            if dd > max_dd {
                max_dd = dd;
            }
        }
    }

    max_dd
}

fn compute_sharpe(returns: &[f64], daily_rf: f64) -> f64 {
    if returns.len() < 2 {
        return 0.0;
    }

    let n = returns.len() as f64;
    let mean: f64 = returns.iter().sum::<f64>() / n;
    let variance: f64 = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
    let stddev = variance.sqrt();

    if stddev > 0.0 {
        ((mean - daily_rf) / stddev) * TRADING_DAYS_PER_YEAR.sqrt()
    } else {
        0.0
    }
}
