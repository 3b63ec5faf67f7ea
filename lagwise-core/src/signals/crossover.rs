//! Moving-average crossover signals.

use crate::frame::Frame;
use crate::indicators::{Ema, Formula};
use crate::stages::{SignalStage, StageError};
use crate::strategy::Strategy;
use std::collections::BTreeMap;

/// Compares a fast and a slow EMA: +1 where fast > slow, -1 otherwise.
/// NaN while either average is warming up.
#[derive(Debug, Clone)]
pub struct Crossover {
    fast: Ema,
    slow: Ema,
}

impl Crossover {
    pub fn new(fast: Ema, slow: Ema) -> Self {
        assert!(
            fast.span() < slow.span(),
            "fast span must be shorter than slow span"
        );
        Self { fast, slow }
    }
}

impl SignalStage for Crossover {
    fn name(&self) -> String {
        format!("{}x{}", self.fast.name(), self.slow.name())
    }

    fn params(&self) -> BTreeMap<String, f64> {
        let mut m = BTreeMap::new();
        m.insert("fast".into(), self.fast.span() as f64);
        m.insert("slow".into(), self.slow.span() as f64);
        m
    }

    fn execute(&self, strategy: &mut Strategy) -> Result<Frame, StageError> {
        let prices = strategy.indicator_prices();
        let fast = self.fast.compute(prices);
        let slow = self.slow.compute(prices);
        Ok(fast.zip_with(&slow, direction)?)
    }
}

/// Three averages: +1 where fast > mid and mid > slow, -1 otherwise.
#[derive(Debug, Clone)]
pub struct TripleCrossover {
    fast: Ema,
    mid: Ema,
    slow: Ema,
}

impl TripleCrossover {
    pub fn new(fast: Ema, mid: Ema, slow: Ema) -> Self {
        assert!(
            fast.span() < mid.span() && mid.span() < slow.span(),
            "spans must be strictly increasing fast < mid < slow"
        );
        Self { fast, mid, slow }
    }
}

impl SignalStage for TripleCrossover {
    fn name(&self) -> String {
        format!(
            "{}x{}x{}",
            self.fast.name(),
            self.mid.name(),
            self.slow.name()
        )
    }

    fn params(&self) -> BTreeMap<String, f64> {
        let mut m = BTreeMap::new();
        m.insert("fast".into(), self.fast.span() as f64);
        m.insert("mid".into(), self.mid.span() as f64);
        m.insert("slow".into(), self.slow.span() as f64);
        m
    }

    fn execute(&self, strategy: &mut Strategy) -> Result<Frame, StageError> {
        let prices = strategy.indicator_prices();
        let fast = self.fast.compute(prices);
        let mid = self.mid.compute(prices);
        let slow = self.slow.compute(prices);
        let upper = fast.zip_with(&mid, direction)?;
        let lower = mid.zip_with(&slow, direction)?;
        Ok(upper.zip_with(&lower, |a, b| {
            if a.is_nan() || b.is_nan() {
                f64::NAN
            } else if a > 0.0 && b > 0.0 {
                1.0
            } else {
                -1.0
            }
        })?)
    }
}

fn direction(fast: f64, slow: f64) -> f64 {
    if fast.is_nan() || slow.is_nan() {
        f64::NAN
    } else if fast > slow {
        1.0
    } else {
        -1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::testing::make_frame;
    use crate::strategy::Market;
    use crate::timing::TimingModel;

    fn strategy(closes: &[f64]) -> Strategy {
        let open = make_frame(&["AAA"], &[closes]);
        let close = make_frame(&["AAA"], &[closes]);
        Strategy::new(
            TimingModel::from_codes("CC", "C").unwrap(),
            Market::new(open, close).unwrap(),
        )
    }

    #[test]
    fn rising_prices_go_long() {
        let mut strat = strategy(&[10.0, 12.0, 14.0, 16.0, 18.0]);
        let stage = Crossover::new(Ema::new(2), Ema::new(4));
        let signal = stage.execute(&mut strat).unwrap();
        // fast EMA pulls ahead of slow in a steady uptrend
        assert_eq!(signal["AAA"][4], 1.0);
    }

    #[test]
    fn falling_prices_go_short() {
        let mut strat = strategy(&[18.0, 16.0, 14.0, 12.0, 10.0]);
        let stage = Crossover::new(Ema::new(2), Ema::new(4));
        let signal = stage.execute(&mut strat).unwrap();
        assert_eq!(signal["AAA"][4], -1.0);
    }

    #[test]
    fn triple_crossover_requires_full_ordering() {
        let mut strat = strategy(&[10.0, 12.0, 14.0, 16.0, 18.0, 20.0]);
        let stage = TripleCrossover::new(Ema::new(2), Ema::new(3), Ema::new(5));
        let signal = stage.execute(&mut strat).unwrap();
        assert_eq!(signal["AAA"][5], 1.0);
    }

    #[test]
    fn name_joins_component_names() {
        let stage = Crossover::new(Ema::new(10), Ema::new(50));
        assert_eq!(stage.name(), "ema_10xema_50");
    }

    #[test]
    #[should_panic(expected = "fast span must be shorter")]
    fn inverted_spans_are_rejected() {
        Crossover::new(Ema::new(50), Ema::new(10));
    }
}
