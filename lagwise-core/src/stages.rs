//! Calculation stages and the memoization protocol.
//!
//! A stage is a unit of calculation (signal, position rule, trade filter)
//! that derives one data object from strategy state. Signal and position-rule
//! stages produce temporal frames and memoize them onto the strategy; trade
//! filters are pure predicates over realized trades and carry no timing.
//!
//! Stage identity is value-based: the id is a hash of the stage's name and
//! parameter map. Reconfiguring a stage therefore changes its id and busts
//! the cache, while two identically configured instances share one cache
//! entry. There is no explicit invalidation call.

use crate::frame::{Frame, FrameError};
use crate::strategy::Strategy;
use crate::temporal::{AlignError, TemporalFrame};
use crate::timing::{CalculationTiming, TimingLabel};
use crate::collection::Trade;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StageError {
    #[error(transparent)]
    Frame(#[from] FrameError),

    #[error(transparent)]
    Align(#[from] AlignError),
}

/// Value-based identity of a calculation stage.
///
/// Hash of the stage's name plus the canonical JSON of its parameter map
/// (`BTreeMap` keys serialize in sorted order, so the encoding is
/// deterministic).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StageId([u8; 32]);

impl StageId {
    pub fn from_config(name: &str, params: &BTreeMap<String, f64>) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(name.as_bytes());
        hasher.update(&[0]);
        let json = serde_json::to_string(params).expect("parameter map must serialize");
        hasher.update(json.as_bytes());
        Self(*hasher.finalize().as_bytes())
    }
}

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0[..8] {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

/// The two stage categories that participate in the lag algebra.
///
/// Each has a fixed calculation timing: signals complete at decision time,
/// position rules at entry time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageCategory {
    Signal,
    PositionRule,
}

impl StageCategory {
    pub fn calculation_timing(self) -> CalculationTiming {
        match self {
            StageCategory::Signal => CalculationTiming::Point(TimingLabel::Decision),
            StageCategory::PositionRule => CalculationTiming::Point(TimingLabel::Entry),
        }
    }
}

/// A stage that produces a decision-timed signal frame.
pub trait SignalStage: Send + Sync {
    /// Stable stage name (e.g. "ema_crossover"); part of the identity.
    fn name(&self) -> String;

    /// Parameter map; part of the identity. `BTreeMap` keeps the hash
    /// encoding deterministic.
    fn params(&self) -> BTreeMap<String, f64>;

    /// Numeric transform from strategy state to a signal table. Never sees
    /// or sets timing metadata; the invocation protocol stamps that on.
    fn execute(&self, strategy: &mut Strategy) -> Result<Frame, StageError>;

    /// Base lag applied to a freshly produced result. Zero unless the stage
    /// needs a nonzero offset.
    fn starting_lag(&self) -> usize {
        0
    }

    fn stage_id(&self) -> StageId {
        StageId::from_config(&self.name(), &self.params())
    }
}

/// A stage that produces an entry-timed positions frame.
pub trait PositionRule: Send + Sync {
    fn name(&self) -> String;

    fn params(&self) -> BTreeMap<String, f64>;

    fn execute(&self, strategy: &mut Strategy) -> Result<Frame, StageError>;

    fn starting_lag(&self) -> usize {
        0
    }

    fn stage_id(&self) -> StageId {
        StageId::from_config(&self.name(), &self.params())
    }
}

/// A pure predicate over realized trades.
///
/// Filters operate post-hoc on trade records rather than on time-series
/// tables, so they carry no timing metadata and are never cached.
pub trait TradeFilter: Send + Sync {
    fn name(&self) -> String;

    fn accepted_trade(&self, trade: &Trade) -> bool;
}

/// Per-strategy cache: one slot per stage category.
///
/// Each slot records the result and, through the frame's creator field, the
/// identity of the stage that produced it. A hit requires the recorded
/// identity to equal the invoking stage's identity.
#[derive(Debug, Clone, Default)]
pub struct StageCache {
    signal: Option<Arc<TemporalFrame>>,
    positions: Option<Arc<TemporalFrame>>,
}

impl StageCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, category: StageCategory) -> Option<&Arc<TemporalFrame>> {
        match category {
            StageCategory::Signal => self.signal.as_ref(),
            StageCategory::PositionRule => self.positions.as_ref(),
        }
    }

    pub fn set(&mut self, category: StageCategory, result: Arc<TemporalFrame>) {
        match category {
            StageCategory::Signal => self.signal = Some(result),
            StageCategory::PositionRule => self.positions = Some(result),
        }
    }
}
