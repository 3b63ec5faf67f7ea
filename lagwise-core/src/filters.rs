//! Concrete trade filters: pure predicates over realized trades.

use crate::collection::Trade;
use crate::stages::TradeFilter;

/// Keeps trades whose unleveraged return meets a threshold.
#[derive(Debug, Clone)]
pub struct MinReturnFilter {
    threshold: f64,
}

impl MinReturnFilter {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }
}

impl TradeFilter for MinReturnFilter {
    fn name(&self) -> String {
        format!("min_return_{}", self.threshold)
    }

    fn accepted_trade(&self, trade: &Trade) -> bool {
        trade.base_return() >= self.threshold
    }
}

/// Keeps trades held no longer than a maximum number of calendar days.
#[derive(Debug, Clone)]
pub struct MaxDurationFilter {
    max_days: i64,
}

impl MaxDurationFilter {
    pub fn new(max_days: i64) -> Self {
        Self { max_days }
    }
}

impl TradeFilter for MaxDurationFilter {
    fn name(&self) -> String {
        format!("max_duration_{}", self.max_days)
    }

    fn accepted_trade(&self, trade: &Trade) -> bool {
        trade.duration_days() <= self.max_days
    }
}
