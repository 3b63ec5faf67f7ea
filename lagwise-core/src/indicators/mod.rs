//! Pure formula objects: price table in, derived table out.
//!
//! Formulas never see or mutate lag/timing metadata. They are invoked only
//! from inside a stage's `execute`; the stage wraps the output with timing
//! tags via the invocation protocol.

pub mod ema;
pub mod efficiency_ratio;
pub mod volatility;

pub use efficiency_ratio::EfficiencyRatio;
pub use ema::Ema;
pub use volatility::{StdDevEma, StdDevRolling};

use crate::frame::Frame;

/// A pure numeric transform over a price table.
///
/// Output shape matches the input shape; warmup cells are NaN.
pub trait Formula: Send + Sync {
    /// Derived name including parameters (e.g. "ema_20").
    fn name(&self) -> String;

    fn compute(&self, prices: &Frame) -> Frame;
}
