//! Concrete position rules.

use crate::frame::Frame;
use crate::stages::{PositionRule, SignalStage, StageCategory, StageError};
use crate::strategy::Strategy;
use crate::temporal::TemporalFrame;
use std::collections::BTreeMap;

/// Takes the sign of the strategy's signal, aligned to entry timing.
///
/// The signal is obtained through the memoization protocol, so a parameter
/// sweep over position rules reuses the cached signal. It is then aligned
/// against the entry-timed prices this rule trades at, which applies the
/// decision-to-entry lag plus whatever lag the consumer already carries —
/// under close-to-close trading with close-computed indicators this is one
/// period: yesterday's signal drives today's entry.
pub struct SignalAlignedPositions {
    signal: Box<dyn SignalStage>,
}

impl SignalAlignedPositions {
    pub fn new(signal: Box<dyn SignalStage>) -> Self {
        Self { signal }
    }
}

impl PositionRule for SignalAlignedPositions {
    fn name(&self) -> String {
        format!("signal_aligned({})", self.signal.name())
    }

    fn params(&self) -> BTreeMap<String, f64> {
        self.signal.params()
    }

    fn execute(&self, strategy: &mut Strategy) -> Result<Frame, StageError> {
        let signal = strategy.run_signal(self.signal.as_ref())?;
        let consumer = TemporalFrame::new(
            strategy.trade_prices().clone(),
            StageCategory::PositionRule.calculation_timing(),
            strategy.timing_model(),
        );
        let aligned = signal.align_with(&consumer)?;
        Ok(aligned.data().map(f64::signum))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::testing::make_frame;
    use crate::stages::StageCategory;
    use crate::strategy::Market;
    use crate::timing::TimingModel;

    struct FixedSignal {
        values: Vec<f64>,
    }

    impl SignalStage for FixedSignal {
        fn name(&self) -> String {
            "fixed".into()
        }

        fn params(&self) -> BTreeMap<String, f64> {
            BTreeMap::new()
        }

        fn execute(&self, _strategy: &mut Strategy) -> Result<Frame, StageError> {
            Ok(make_frame(&["AAA"], &[self.values.as_slice()]))
        }
    }

    fn strategy() -> Strategy {
        let prices = make_frame(&["AAA"], &[&[10.0, 11.0, 12.0, 13.0]]);
        Strategy::new(
            TimingModel::from_codes("CC", "C").unwrap(),
            Market::new(prices.clone(), prices).unwrap(),
        )
    }

    #[test]
    fn positions_are_the_lagged_signal_sign() {
        let mut strat = strategy();
        let rule = SignalAlignedPositions::new(Box::new(FixedSignal {
            values: vec![0.7, -0.2, 0.9, 0.1],
        }));
        let positions = strat.run_position_rule(&rule).unwrap();

        // decision → entry under CC is one period
        assert!(positions["AAA"][0].is_nan());
        assert_eq!(positions["AAA"][1], 1.0);
        assert_eq!(positions["AAA"][2], -1.0);
        assert_eq!(positions["AAA"][3], 1.0);
    }

    #[test]
    fn positions_match_the_signal_aligned_to_entry_timing() {
        let mut strat = strategy();
        let rule = SignalAlignedPositions::new(Box::new(FixedSignal {
            values: vec![0.7, -0.2, 0.9, 0.1],
        }));
        let positions = strat.run_position_rule(&rule).unwrap();

        let signal = strat.cached(StageCategory::Signal).unwrap();
        let consumer = TemporalFrame::new(
            strat.trade_prices().clone(),
            StageCategory::PositionRule.calculation_timing(),
            strat.timing_model(),
        );
        let expected = signal.align_with(&consumer).unwrap().data().map(f64::signum);
        assert!(positions.data().approx_eq(&expected, 0.0));
    }

    #[test]
    fn executing_the_rule_also_caches_the_signal() {
        let mut strat = strategy();
        let rule = SignalAlignedPositions::new(Box::new(FixedSignal {
            values: vec![1.0, 1.0, 1.0, 1.0],
        }));
        strat.run_position_rule(&rule).unwrap();
        assert!(strat.cached(StageCategory::Signal).is_some());
        assert!(strat.cached(StageCategory::PositionRule).is_some());
    }
}
