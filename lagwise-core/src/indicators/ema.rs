//! Exponential moving average, span convention: alpha = 2 / (span + 1).

use super::Formula;
use crate::frame::Frame;

#[derive(Debug, Clone)]
pub struct Ema {
    span: usize,
}

impl Ema {
    pub fn new(span: usize) -> Self {
        assert!(span >= 1, "EMA span must be >= 1");
        Self { span }
    }

    pub fn span(&self) -> usize {
        self.span
    }
}

impl Formula for Ema {
    fn name(&self) -> String {
        format!("ema_{}", self.span)
    }

    fn compute(&self, prices: &Frame) -> Frame {
        prices.ewm_mean(self.span)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::testing::make_series;

    #[test]
    fn span_1_tracks_prices_exactly() {
        let prices = make_series(&[10.0, 20.0, 30.0]);
        let ema = Ema::new(1).compute(&prices);
        assert_eq!(&ema["TEST"], &[10.0, 20.0, 30.0][..]);
    }

    #[test]
    fn span_3_known_values() {
        // alpha = 0.5; seeded at the first value
        // ema[0] = 10, ema[1] = 0.5*12 + 0.5*10 = 11, ema[2] = 0.5*14 + 0.5*11 = 12.5
        let prices = make_series(&[10.0, 12.0, 14.0]);
        let ema = Ema::new(3).compute(&prices);
        assert!((ema["TEST"][0] - 10.0).abs() < 1e-12);
        assert!((ema["TEST"][1] - 11.0).abs() < 1e-12);
        assert!((ema["TEST"][2] - 12.5).abs() < 1e-12);
    }

    #[test]
    fn name_includes_span() {
        assert_eq!(Ema::new(20).name(), "ema_20");
    }

    #[test]
    #[should_panic(expected = "EMA span must be >= 1")]
    fn zero_span_is_rejected() {
        Ema::new(0);
    }
}
