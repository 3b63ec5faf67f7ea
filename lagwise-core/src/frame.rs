//! Dense numeric table: dates down, tickers across.
//!
//! Column-major f64 storage with a shared date index. Missing values are
//! strict NaN (no forward-fill of price-derived data). Every transform
//! allocates a fresh buffer; no two frames ever share backing storage, so a
//! shift can never leak into an alias of its source.

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    #[error("expected {expected} values in column '{ticker}', got {actual}")]
    ColumnLength {
        ticker: String,
        expected: usize,
        actual: usize,
    },

    #[error("expected {expected} columns, got {actual}")]
    ColumnCount { expected: usize, actual: usize },

    #[error("frames are not on the same index (dates or tickers differ)")]
    Misaligned,
}

/// A 2-D time-indexed numeric table.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    dates: Vec<NaiveDate>,
    tickers: Vec<String>,
    /// Column-major values; `columns[j].len() == dates.len()` for all j.
    columns: Vec<Vec<f64>>,
}

impl Frame {
    /// Build a frame from per-ticker columns. Every column must match the
    /// length of the date index.
    pub fn new(
        dates: Vec<NaiveDate>,
        tickers: Vec<String>,
        columns: Vec<Vec<f64>>,
    ) -> Result<Self, FrameError> {
        if columns.len() != tickers.len() {
            return Err(FrameError::ColumnCount {
                expected: tickers.len(),
                actual: columns.len(),
            });
        }
        for (ticker, column) in tickers.iter().zip(&columns) {
            if column.len() != dates.len() {
                return Err(FrameError::ColumnLength {
                    ticker: ticker.clone(),
                    expected: dates.len(),
                    actual: column.len(),
                });
            }
        }
        Ok(Self { dates, tickers, columns })
    }

    /// A frame of the given shape with every cell set to `value`.
    pub fn filled(dates: Vec<NaiveDate>, tickers: Vec<String>, value: f64) -> Self {
        let columns = vec![vec![value; dates.len()]; tickers.len()];
        Self { dates, tickers, columns }
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn tickers(&self) -> &[String] {
        &self.tickers
    }

    pub fn num_rows(&self) -> usize {
        self.dates.len()
    }

    pub fn num_cols(&self) -> usize {
        self.tickers.len()
    }

    /// Column values for a ticker, or `None` if the ticker is absent.
    pub fn column(&self, ticker: &str) -> Option<&[f64]> {
        self.tickers
            .iter()
            .position(|t| t == ticker)
            .map(|j| self.columns[j].as_slice())
    }

    /// Row values for a date (one per ticker), or `None` if the date is absent.
    pub fn row(&self, date: NaiveDate) -> Option<Vec<f64>> {
        self.dates
            .iter()
            .position(|&d| d == date)
            .map(|i| self.columns.iter().map(|col| col[i]).collect())
    }

    /// True when `other` has the same dates and tickers.
    pub fn same_index(&self, other: &Frame) -> bool {
        self.dates == other.dates && self.tickers == other.tickers
    }

    /// Shift values forward along the time axis: the value at date t becomes
    /// associated with date t+periods, and the first `periods` rows fill with
    /// NaN. The classic lag operation. `shift(0)` is an equal-valued copy.
    pub fn shift(&self, periods: usize) -> Frame {
        let n = self.num_rows();
        let columns = self
            .columns
            .iter()
            .map(|col| {
                let mut shifted = vec![f64::NAN; n];
                for i in periods..n {
                    shifted[i] = col[i - periods];
                }
                shifted
            })
            .collect();
        Frame {
            dates: self.dates.clone(),
            tickers: self.tickers.clone(),
            columns,
        }
    }

    /// Elementwise map over every cell.
    pub fn map(&self, f: impl Fn(f64) -> f64) -> Frame {
        let columns = self
            .columns
            .iter()
            .map(|col| col.iter().map(|&v| f(v)).collect())
            .collect();
        Frame {
            dates: self.dates.clone(),
            tickers: self.tickers.clone(),
            columns,
        }
    }

    /// Elementwise combine with another frame on the same index.
    pub fn zip_with(
        &self,
        other: &Frame,
        f: impl Fn(f64, f64) -> f64,
    ) -> Result<Frame, FrameError> {
        if !self.same_index(other) {
            return Err(FrameError::Misaligned);
        }
        let columns = self
            .columns
            .iter()
            .zip(&other.columns)
            .map(|(a, b)| a.iter().zip(b).map(|(&x, &y)| f(x, y)).collect())
            .collect();
        Ok(Frame {
            dates: self.dates.clone(),
            tickers: self.tickers.clone(),
            columns,
        })
    }

    /// Difference over `periods` rows: value[t] - value[t - periods].
    /// The first `periods` rows are NaN.
    pub fn diff(&self, periods: usize) -> Frame {
        let n = self.num_rows();
        let columns = self
            .columns
            .iter()
            .map(|col| {
                let mut out = vec![f64::NAN; n];
                for i in periods..n {
                    out[i] = col[i] - col[i - periods];
                }
                out
            })
            .collect();
        Frame {
            dates: self.dates.clone(),
            tickers: self.tickers.clone(),
            columns,
        }
    }

    /// Simple one-period returns: value[t] / value[t-1] - 1. First row NaN.
    pub fn simple_returns(&self) -> Frame {
        let n = self.num_rows();
        let columns = self
            .columns
            .iter()
            .map(|col| {
                let mut out = vec![f64::NAN; n];
                for i in 1..n {
                    out[i] = col[i] / col[i - 1] - 1.0;
                }
                out
            })
            .collect();
        Frame {
            dates: self.dates.clone(),
            tickers: self.tickers.clone(),
            columns,
        }
    }

    /// Rolling sum over a trailing window. NaN until the window fills; a NaN
    /// anywhere in the window taints that cell.
    pub fn rolling_sum(&self, window: usize) -> Frame {
        self.rolling(window, |slice| slice.iter().sum())
    }

    /// Rolling sample standard deviation over a trailing window.
    pub fn rolling_std(&self, window: usize) -> Frame {
        self.rolling(window, std_dev)
    }

    fn rolling(&self, window: usize, f: impl Fn(&[f64]) -> f64) -> Frame {
        let n = self.num_rows();
        let columns = self
            .columns
            .iter()
            .map(|col| {
                let mut out = vec![f64::NAN; n];
                if window == 0 || window > n {
                    return out;
                }
                for i in (window - 1)..n {
                    let slice = &col[i + 1 - window..=i];
                    if slice.iter().any(|v| v.is_nan()) {
                        continue;
                    }
                    out[i] = f(slice);
                }
                out
            })
            .collect();
        Frame {
            dates: self.dates.clone(),
            tickers: self.tickers.clone(),
            columns,
        }
    }

    /// Exponentially weighted mean with smoothing alpha = 2 / (span + 1),
    /// seeded from the first non-NaN value per column.
    pub fn ewm_mean(&self, span: usize) -> Frame {
        self.ewm(span, |_, mean| mean)
    }

    /// Exponentially weighted standard deviation with the same smoothing,
    /// via West's incremental variance update.
    pub fn ewm_std(&self, span: usize) -> Frame {
        self.ewm(span, |var, _| var.sqrt())
    }

    fn ewm(&self, span: usize, output: impl Fn(f64, f64) -> f64) -> Frame {
        let n = self.num_rows();
        let alpha = 2.0 / (span as f64 + 1.0);
        let columns = self
            .columns
            .iter()
            .map(|col| {
                let mut out = vec![f64::NAN; n];
                let mut state: Option<(f64, f64)> = None; // (mean, variance)
                for i in 0..n {
                    let x = col[i];
                    if x.is_nan() {
                        continue;
                    }
                    let (mean, var) = match state {
                        None => (x, 0.0),
                        Some((m, v)) => {
                            let delta = x - m;
                            let mean = m + alpha * delta;
                            let var = (1.0 - alpha) * (v + alpha * delta * delta);
                            (mean, var)
                        }
                    };
                    state = Some((mean, var));
                    out[i] = output(var, mean);
                }
                out
            })
            .collect();
        Frame {
            dates: self.dates.clone(),
            tickers: self.tickers.clone(),
            columns,
        }
    }

    /// NaN-aware approximate equality, cell by cell.
    pub fn approx_eq(&self, other: &Frame, epsilon: f64) -> bool {
        if !self.same_index(other) {
            return false;
        }
        self.columns.iter().zip(&other.columns).all(|(a, b)| {
            a.iter()
                .zip(b)
                .all(|(&x, &y)| (x.is_nan() && y.is_nan()) || (x - y).abs() <= epsilon)
        })
    }
}

impl std::ops::Index<&str> for Frame {
    type Output = [f64];

    /// Column access by ticker. Panics if the ticker is absent, like map
    /// indexing; use [`Frame::column`] for a fallible lookup.
    fn index(&self, ticker: &str) -> &[f64] {
        self.column(ticker)
            .unwrap_or_else(|| panic!("no column for ticker '{ticker}'"))
    }
}

/// Sample standard deviation (n - 1 denominator) of a slice.
fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / (n - 1.0);
    var.sqrt()
}


#[cfg(test)]
mod tests {
    use super::testing::{make_frame, make_series};
    use super::*;

    #[test]
    fn column_length_mismatch_is_rejected() {
        let base = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let err = Frame::new(
            vec![base, base + chrono::Duration::days(1)],
            vec!["A".into()],
            vec![vec![1.0]],
        )
        .unwrap_err();
        assert!(matches!(err, FrameError::ColumnLength { .. }));
    }

    #[test]
    fn shift_moves_values_forward_and_fills_nan() {
        let frame = make_series(&[1.0, 2.0, 3.0, 4.0]);
        let shifted = frame.shift(2);
        let col = &shifted["TEST"];
        assert!(col[0].is_nan());
        assert!(col[1].is_nan());
        assert_eq!(col[2], 1.0);
        assert_eq!(col[3], 2.0);
        // receiver untouched
        assert_eq!(frame["TEST"][0], 1.0);
    }

    #[test]
    fn shift_zero_is_an_equal_valued_copy() {
        let frame = make_series(&[1.0, 2.0, 3.0]);
        let copy = frame.shift(0);
        assert!(copy.approx_eq(&frame, 0.0));
    }

    #[test]
    fn shift_past_length_is_all_nan() {
        let frame = make_series(&[1.0, 2.0]);
        let shifted = frame.shift(5);
        assert!(shifted["TEST"].iter().all(|v| v.is_nan()));
    }

    #[test]
    fn zip_with_requires_same_index() {
        let a = make_frame(&["A"], &[&[1.0, 2.0]]);
        let b = make_frame(&["B"], &[&[1.0, 2.0]]);
        assert_eq!(a.zip_with(&b, |x, y| x + y).unwrap_err(), FrameError::Misaligned);
    }

    #[test]
    fn diff_and_returns() {
        let frame = make_series(&[100.0, 110.0, 99.0]);
        let diff = frame.diff(1);
        assert!(diff["TEST"][0].is_nan());
        assert_eq!(diff["TEST"][1], 10.0);
        assert_eq!(diff["TEST"][2], -11.0);

        let rtns = frame.simple_returns();
        assert!(rtns["TEST"][0].is_nan());
        assert!((rtns["TEST"][1] - 0.1).abs() < 1e-12);
        assert!((rtns["TEST"][2] + 0.1).abs() < 1e-12);
    }

    #[test]
    fn rolling_sum_known_values() {
        let frame = make_series(&[1.0, 2.0, 3.0, 4.0]);
        let sums = frame.rolling_sum(2);
        assert!(sums["TEST"][0].is_nan());
        assert_eq!(sums["TEST"][1], 3.0);
        assert_eq!(sums["TEST"][2], 5.0);
        assert_eq!(sums["TEST"][3], 7.0);
    }

    #[test]
    fn rolling_std_known_values() {
        // std of [1, 3] with n-1 denominator = sqrt(2)
        let frame = make_series(&[1.0, 3.0, 3.0]);
        let std = frame.rolling_std(2);
        assert!((std["TEST"][1] - 2.0_f64.sqrt()).abs() < 1e-12);
        assert_eq!(std["TEST"][2], 0.0);
    }

    #[test]
    fn rolling_window_with_nan_is_tainted() {
        let frame = make_series(&[1.0, f64::NAN, 3.0, 4.0]);
        let sums = frame.rolling_sum(2);
        assert!(sums["TEST"][1].is_nan());
        assert!(sums["TEST"][2].is_nan());
        assert_eq!(sums["TEST"][3], 7.0);
    }

    #[test]
    fn ewm_mean_of_constant_series_is_constant() {
        let frame = make_series(&[5.0, 5.0, 5.0, 5.0]);
        let mean = frame.ewm_mean(3);
        assert!(mean["TEST"].iter().all(|&v| (v - 5.0).abs() < 1e-12));
    }

    #[test]
    fn ewm_std_of_constant_series_is_zero() {
        let frame = make_series(&[5.0, 5.0, 5.0, 5.0]);
        let std = frame.ewm_std(3);
        assert!(std["TEST"].iter().all(|&v| v.abs() < 1e-12));
    }

    #[test]
    fn ewm_skips_leading_nan() {
        let frame = make_series(&[f64::NAN, 5.0, 5.0]);
        let mean = frame.ewm_mean(3);
        assert!(mean["TEST"][0].is_nan());
        assert!((mean["TEST"][1] - 5.0).abs() < 1e-12);
    }

    #[test]
    fn row_access_by_date() {
        let frame = make_frame(&["A", "B"], &[&[1.0, 2.0], &[3.0, 4.0]]);
        let second = frame.dates()[1];
        assert_eq!(frame.row(second), Some(vec![2.0, 4.0]));
    }

    #[test]
    #[should_panic(expected = "no column for ticker")]
    fn index_with_unknown_ticker_panics() {
        let frame = make_series(&[1.0]);
        let _ = &frame["MISSING"];
    }
}
