//! Lagwise Core — temporal alignment and memoization for backtests.
//!
//! This crate contains the heart of the backtesting framework:
//! - Timing model: reduces trading-lifecycle labels to same-day buckets
//! - Lag algebra: the single rule deciding how far data must be shifted
//!   before it is usable without lookahead
//! - Temporal frames: time-indexed tables that carry their production timing
//!   and compose alignment shifts exactly
//! - Calculation stages (signal, position rule, trade filter) with a
//!   value-identity memoization protocol on the strategy context
//! - Pure formula objects (EMA, efficiency ratio, volatility measures) and
//!   concrete crossover signals built on them

pub mod collection;
pub mod filters;
pub mod frame;
pub mod indicators;
pub mod position_rules;
pub mod signals;
pub mod stages;
pub mod strategy;
pub mod temporal;
pub mod timing;

pub use collection::{Trade, TradeCollection};
pub use frame::{Frame, FrameError};
pub use stages::{
    PositionRule, SignalStage, StageCache, StageCategory, StageError, StageId, TradeFilter,
};
pub use strategy::{Market, Strategy};
pub use temporal::{AlignError, TemporalFrame};
pub use timing::{
    Bucket, CalculationTiming, IndicatorTiming, TimingError, TimingLabel, TimingModel, TradeTiming,
};
