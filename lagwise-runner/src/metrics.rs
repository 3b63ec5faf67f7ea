//! Performance metrics — pure functions over a realized return series.
//!
//! Every metric takes a per-period return slice and yields a scalar. NaN
//! entries (warmup periods) are dropped before computing. Degenerate inputs
//! (too short, zero variance) yield 0.0 rather than NaN or infinity.

use serde::{Deserialize, Serialize};

/// Aggregate metrics for a single return series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReturnsSummary {
    pub sharpe: f64,
    pub opt_f: f64,
    pub g_ratio: f64,
    pub geometric_growth: f64,
    pub k_ratio: f64,
    pub periods: usize,
}

impl ReturnsSummary {
    pub fn compute(returns: &[f64]) -> Self {
        let clean = drop_nan(returns);
        Self {
            sharpe: sharpe(returns),
            opt_f: opt_f(returns),
            g_ratio: g_ratio(returns),
            geometric_growth: geometric_growth(returns, 1.0),
            k_ratio: k_ratio(returns),
            periods: clean.len(),
        }
    }
}

/// Mean return over its standard deviation, per period (not annualised).
pub fn sharpe(returns: &[f64]) -> f64 {
    let clean = drop_nan(returns);
    if clean.len() < 2 {
        return 0.0;
    }
    let std = std_dev(&clean);
    if std < 1e-15 {
        return 0.0;
    }
    mean(&clean) / std
}

/// Optimal fixed fraction: mean over variance.
pub fn opt_f(returns: &[f64]) -> f64 {
    let clean = drop_nan(returns);
    if clean.len() < 2 {
        return 0.0;
    }
    let var = std_dev(&clean).powi(2);
    if var < 1e-15 {
        return 0.0;
    }
    mean(&clean) / var
}

/// Sharpe-derived growth proxy: sqrt((1 + S^2)^2 - S^2) - 1.
pub fn g_ratio(returns: &[f64]) -> f64 {
    let s_sqd = sharpe(returns).powi(2);
    ((1.0 + s_sqd).powi(2) - s_sqd).sqrt() - 1.0
}

/// Variance-drag-adjusted geometric growth over `n` periods.
///
/// Base term (1 + mean)^2 - variance; the sign of the base survives the
/// square root so that deeply negative series stay negative.
pub fn geometric_growth(returns: &[f64], n: f64) -> f64 {
    let clean = drop_nan(returns);
    if clean.is_empty() {
        return 0.0;
    }
    let var = if clean.len() < 2 { 0.0 } else { std_dev(&clean).powi(2) };
    let base = (1.0 + mean(&clean)).powi(2) - var;
    base.signum() * base.abs().sqrt().powf(n) - 1.0
}

/// Slope-to-noise of the cumulative log-equity curve.
///
/// Least-squares slope through the origin of cumulative log(1 + r) against
/// the period index, divided by the root-mean-square residual, scaled by
/// sqrt(250) / n. Returns 0.0 when the fit is degenerate.
pub fn k_ratio(returns: &[f64]) -> f64 {
    let clean = drop_nan(returns);
    if clean.len() < 2 {
        return 0.0;
    }
    let n = clean.len();
    let mut log_equity = Vec::with_capacity(n);
    let mut cumulative = 0.0;
    for r in &clean {
        cumulative += (1.0 + r).ln();
        log_equity.push(cumulative);
    }

    // regression through the origin: slope = sum(x*y) / sum(x^2)
    let mut xy = 0.0;
    let mut xx = 0.0;
    for (i, y) in log_equity.iter().enumerate() {
        let x = (i + 1) as f64;
        xy += x * y;
        xx += x * x;
    }
    let slope = xy / xx;

    let residual_sq: f64 = log_equity
        .iter()
        .enumerate()
        .map(|(i, y)| {
            let pred = slope * (i + 1) as f64;
            (pred - y) * (pred - y)
        })
        .sum();
    let std_error = (residual_sq / n as f64).sqrt();
    if std_error < 1e-15 {
        return 0.0;
    }
    (250.0_f64.sqrt() / n as f64) * (slope / std_error)
}

// ─── helpers ─────────────────────────────────────────────────────────

fn drop_nan(values: &[f64]) -> Vec<f64> {
    values.iter().copied().filter(|v| !v.is_nan()).collect()
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1 denominator).
fn std_dev(values: &[f64]) -> f64 {
    let m = mean(values);
    let var = values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / (values.len() as f64 - 1.0);
    var.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sharpe_known_values() {
        // mean = 0.05, sample std of [0.1, 0.0] = sqrt(0.005)
        let returns = [0.1, 0.0];
        let expected = 0.05 / 0.005_f64.sqrt();
        assert!((sharpe(&returns) - expected).abs() < 1e-12);
    }

    #[test]
    fn sharpe_ignores_nan_warmup() {
        let with_nan = [f64::NAN, f64::NAN, 0.1, 0.0];
        let without = [0.1, 0.0];
        assert_eq!(sharpe(&with_nan), sharpe(&without));
    }

    #[test]
    fn sharpe_of_constant_series_is_zero() {
        assert_eq!(sharpe(&[0.02, 0.02, 0.02]), 0.0);
    }

    #[test]
    fn opt_f_is_mean_over_variance() {
        let returns = [0.1, 0.0];
        let expected = 0.05 / 0.005;
        assert!((opt_f(&returns) - expected).abs() < 1e-9);
    }

    #[test]
    fn g_ratio_is_zero_for_zero_sharpe() {
        let returns = [0.1, -0.1, 0.1, -0.1];
        assert!(g_ratio(&returns).abs() < 1e-12);
    }

    #[test]
    fn geometric_growth_of_constant_returns_is_the_return() {
        let returns = [0.05, 0.05, 0.05];
        assert!((geometric_growth(&returns, 1.0) - 0.05).abs() < 1e-12);
    }

    #[test]
    fn geometric_growth_penalises_variance() {
        let steady = [0.05, 0.05, 0.05, 0.05];
        let choppy = [0.15, -0.05, 0.15, -0.05];
        assert!(geometric_growth(&choppy, 1.0) < geometric_growth(&steady, 1.0));
    }

    #[test]
    fn k_ratio_sign_follows_the_trend() {
        let gains: Vec<f64> = (0..30).map(|i| 0.01 + 0.001 * (i % 3) as f64).collect();
        let losses: Vec<f64> = gains.iter().map(|r| -r).collect();
        assert!(k_ratio(&gains) > 0.0);
        assert!(k_ratio(&losses) < 0.0);
    }

    #[test]
    fn k_ratio_degenerate_fit_is_zero() {
        // constant returns produce an exactly linear log-equity curve
        assert_eq!(k_ratio(&[0.01, 0.01, 0.01]), 0.0);
    }

    #[test]
    fn summary_counts_clean_periods() {
        let returns = [f64::NAN, 0.1, 0.0, -0.05];
        let summary = ReturnsSummary::compute(&returns);
        assert_eq!(summary.periods, 3);
        assert_eq!(summary.sharpe, sharpe(&returns));
    }

    #[test]
    fn summary_serializes() {
        let summary = ReturnsSummary::compute(&[0.1, 0.0, -0.05]);
        let json = serde_json::to_string(&summary).unwrap();
        let back: ReturnsSummary = serde_json::from_str(&json).unwrap();
        assert_eq!(back.periods, summary.periods);
    }
}
