//! Strategy context: market prices, per-category cache slots, trades.
//!
//! The strategy exclusively owns its cache slots; stages read and write them
//! only through the invocation protocol here. Cached results are shared
//! immutably via `Arc` — since alignment operations always return new frames,
//! downstream consumers can hold a cached frame without any copy.

use crate::collection::TradeCollection;
use crate::frame::{Frame, FrameError};
use crate::stages::{PositionRule, SignalStage, StageCache, StageCategory, StageError, TradeFilter};
use crate::temporal::TemporalFrame;
use crate::timing::{Bucket, CalculationTiming, TimingLabel, TimingModel};
use std::sync::Arc;

/// Open and close price tables on a shared time index.
#[derive(Debug, Clone)]
pub struct Market {
    open: Frame,
    close: Frame,
}

impl Market {
    /// Both tables must share the same dates and tickers.
    pub fn new(open: Frame, close: Frame) -> Result<Self, FrameError> {
        if !open.same_index(&close) {
            return Err(FrameError::Misaligned);
        }
        Ok(Self { open, close })
    }

    pub fn open(&self) -> &Frame {
        &self.open
    }

    pub fn close(&self) -> &Frame {
        &self.close
    }
}

/// The backtest context a calculation chain runs against.
pub struct Strategy {
    timing_model: TimingModel,
    market: Market,
    cache: StageCache,
    trades: TradeCollection,
}

impl Strategy {
    pub fn new(timing_model: TimingModel, market: Market) -> Self {
        Self {
            timing_model,
            market,
            cache: StageCache::new(),
            trades: TradeCollection::default(),
        }
    }

    /// The timing model shared by every temporal frame this strategy produces.
    pub fn timing_model(&self) -> TimingModel {
        self.timing_model
    }

    pub fn market(&self) -> &Market {
        &self.market
    }

    /// Prices at the bucket where trading decisions are made.
    pub fn indicator_prices(&self) -> &Frame {
        match self.timing_model.indicator_timing.bucket() {
            Bucket::Open => self.market.open(),
            Bucket::Close => self.market.close(),
        }
    }

    /// Prices at the entry leg of the trade timing.
    pub fn trade_prices(&self) -> &Frame {
        match self.timing_model.trade_timing.entry_bucket() {
            Bucket::Open => self.market.open(),
            Bucket::Close => self.market.close(),
        }
    }

    /// Market return series under this strategy's trade timing.
    pub fn market_returns(&self) -> Result<Frame, FrameError> {
        self.timing_model.market_returns(&self.market)
    }

    pub fn trades(&self) -> &TradeCollection {
        &self.trades
    }

    pub fn set_trades(&mut self, trades: TradeCollection) {
        self.trades = trades;
    }

    /// The currently cached result for a stage category, if any.
    pub fn cached(&self, category: StageCategory) -> Option<&Arc<TemporalFrame>> {
        self.cache.get(category)
    }

    /// Invoke a signal stage under the memoization protocol.
    ///
    /// If the signal slot holds a result whose creator id equals the stage's
    /// id, it is returned unchanged — no recomputation, no side effects.
    /// Otherwise the stage executes once and its result is stamped with the
    /// stage's identity, the category's fixed calculation timing, this
    /// strategy's timing model, and the stage's starting lag, then cached.
    pub fn run_signal(&mut self, stage: &dyn SignalStage) -> Result<Arc<TemporalFrame>, StageError> {
        let id = stage.stage_id();
        if let Some(hit) = self.cache.get(StageCategory::Signal) {
            if hit.creator() == Some(id) {
                return Ok(Arc::clone(hit));
            }
        }
        let data = stage.execute(self)?;
        let result = Arc::new(TemporalFrame::produced(
            data,
            StageCategory::Signal.calculation_timing(),
            self.timing_model,
            id,
            stage.starting_lag(),
        ));
        self.cache.set(StageCategory::Signal, Arc::clone(&result));
        Ok(result)
    }

    /// Invoke a position rule under the memoization protocol.
    ///
    /// Same contract as [`Strategy::run_signal`], against the positions slot.
    pub fn run_position_rule(
        &mut self,
        rule: &dyn PositionRule,
    ) -> Result<Arc<TemporalFrame>, StageError> {
        let id = rule.stage_id();
        if let Some(hit) = self.cache.get(StageCategory::PositionRule) {
            if hit.creator() == Some(id) {
                return Ok(Arc::clone(hit));
            }
        }
        let data = rule.execute(self)?;
        let result = Arc::new(TemporalFrame::produced(
            data,
            StageCategory::PositionRule.calculation_timing(),
            self.timing_model,
            id,
            rule.starting_lag(),
        ));
        self.cache.set(StageCategory::PositionRule, Arc::clone(&result));
        Ok(result)
    }

    /// Partition the trade collection through a filter's predicate.
    /// No caching, no timing metadata.
    pub fn filter_trades(&self, filter: &dyn TradeFilter) -> TradeCollection {
        self.trades.filter(|t| filter.accepted_trade(t))
    }

    /// Realized strategy returns: positions aligned past their entry boundary
    /// and past the market-return span start, multiplied element-wise by the
    /// market returns.
    pub fn strategy_returns(&mut self, rule: &dyn PositionRule) -> Result<Frame, StageError> {
        let positions = self.run_position_rule(rule)?;
        let market_returns = TemporalFrame::new(
            self.market_returns()?,
            CalculationTiming::Span(TimingLabel::Entry, TimingLabel::Exit),
            self.timing_model,
        );
        let aligned = positions.align_with(&market_returns)?;
        Ok(aligned.data().zip_with(market_returns.data(), |p, r| p * r)?)
    }
}
