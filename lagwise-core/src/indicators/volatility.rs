//! Volatility measures: annualised standard deviation of daily returns.

use super::Formula;
use crate::frame::Frame;

/// sqrt(256): annualises a daily standard deviation.
const ANNUALISATION_FACTOR: f64 = 16.0;

/// Annualised rolling standard deviation of daily returns.
#[derive(Debug, Clone)]
pub struct StdDevRolling {
    period: usize,
}

impl StdDevRolling {
    pub fn new(period: usize) -> Self {
        assert!(period >= 2, "rolling std-dev period must be >= 2");
        Self { period }
    }
}

impl Formula for StdDevRolling {
    fn name(&self) -> String {
        format!("std_dev_rolling_{}", self.period)
    }

    fn compute(&self, prices: &Frame) -> Frame {
        prices
            .simple_returns()
            .rolling_std(self.period)
            .map(|v| ANNUALISATION_FACTOR * v)
    }
}

/// Annualised exponentially weighted standard deviation of daily returns.
#[derive(Debug, Clone)]
pub struct StdDevEma {
    span: usize,
}

impl StdDevEma {
    pub fn new(span: usize) -> Self {
        assert!(span >= 1, "EMA std-dev span must be >= 1");
        Self { span }
    }
}

impl Formula for StdDevEma {
    fn name(&self) -> String {
        format!("std_dev_ema_{}", self.span)
    }

    fn compute(&self, prices: &Frame) -> Frame {
        prices
            .simple_returns()
            .ewm_std(self.span)
            .map(|v| ANNUALISATION_FACTOR * v)
    }
}
