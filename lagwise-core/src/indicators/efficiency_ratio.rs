//! Kaufman's efficiency ratio.
//!
//! The ratio of the absolute price change over a period to the sum of
//! absolute daily changes within it. Near 1 in a clean trend, near 0 in
//! churn. Refer New Trading Systems and Methods 4th Ed (p732).

use super::Formula;
use crate::frame::Frame;

#[derive(Debug, Clone)]
pub struct EfficiencyRatio {
    period: usize,
}

impl EfficiencyRatio {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "efficiency ratio period must be >= 1");
        Self { period }
    }
}

impl Formula for EfficiencyRatio {
    fn name(&self) -> String {
        format!("efficiency_ratio_{}", self.period)
    }

    fn compute(&self, prices: &Frame) -> Frame {
        let overall_change = prices.diff(self.period).map(f64::abs);
        let daily_sum = prices.diff(1).map(f64::abs).rolling_sum(self.period);
        overall_change
            .zip_with(&daily_sum, |overall, daily| overall / daily)
            .expect("derived frames share the price index")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::testing::make_series;

    #[test]
    fn monotone_trend_has_ratio_one() {
        let prices = make_series(&[10.0, 11.0, 12.0, 13.0, 14.0]);
        let ratio = EfficiencyRatio::new(3).compute(&prices);
        // |14-11| / (1+1+1) = 1
        assert!((ratio["TEST"][4] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn round_trip_has_ratio_zero() {
        let prices = make_series(&[10.0, 12.0, 10.0]);
        let ratio = EfficiencyRatio::new(2).compute(&prices);
        // |10-10| / (2+2) = 0
        assert_eq!(ratio["TEST"][2], 0.0);
    }

    #[test]
    fn warmup_is_nan() {
        let prices = make_series(&[10.0, 11.0, 12.0, 13.0]);
        let ratio = EfficiencyRatio::new(3).compute(&prices);
        assert!(ratio["TEST"][0].is_nan());
        assert!(ratio["TEST"][2].is_nan());
        assert!(!ratio["TEST"][3].is_nan());
    }
}
