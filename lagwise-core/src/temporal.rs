//! Temporal frames: numeric tables that know when they become knowable.
//!
//! A `TemporalFrame` wraps a [`Frame`] with the calculation timing of the
//! stage that produced it, the cumulative lag already applied, the producing
//! stage's identity, and the timing model used for further alignment. All
//! alignment operations return a new frame with a freshly allocated data
//! buffer and an incremented lag; the receiver is never mutated.

use crate::frame::Frame;
use crate::stages::StageId;
use crate::timing::{CalculationTiming, TimingLabel, TimingModel};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AlignError {
    /// Aligning across different timing models would produce a
    /// plausible-looking but unit-mismatched lag. Fail instead.
    #[error("cannot align frames built under different timing models ({ours:?} vs {theirs:?})")]
    TimingModelMismatch {
        ours: TimingModel,
        theirs: TimingModel,
    },
}

/// A time-indexed numeric table tagged with its production timing.
#[derive(Debug, Clone)]
pub struct TemporalFrame {
    data: Frame,
    calculation_timing: CalculationTiming,
    lag: usize,
    creator: Option<StageId>,
    timing_model: TimingModel,
}

impl TemporalFrame {
    /// Wrap raw data at its native calculation completion (lag 0, no creator).
    pub fn new(data: Frame, calculation_timing: CalculationTiming, timing_model: TimingModel) -> Self {
        Self {
            data,
            calculation_timing,
            lag: 0,
            creator: None,
            timing_model,
        }
    }

    /// Wrap a stage's freshly executed result, stamped with the producing
    /// stage's identity and its starting lag. Used by the memoization
    /// protocol; everything else goes through [`TemporalFrame::new`].
    pub fn produced(
        data: Frame,
        calculation_timing: CalculationTiming,
        timing_model: TimingModel,
        creator: StageId,
        starting_lag: usize,
    ) -> Self {
        Self {
            data,
            calculation_timing,
            lag: starting_lag,
            creator: Some(creator),
            timing_model,
        }
    }

    pub fn data(&self) -> &Frame {
        &self.data
    }

    pub fn calculation_timing(&self) -> CalculationTiming {
        self.calculation_timing
    }

    /// Cumulative periods this frame has been shifted past its native
    /// calculation completion.
    pub fn lag(&self) -> usize {
        self.lag
    }

    pub fn creator(&self) -> Option<StageId> {
        self.creator
    }

    pub fn timing_model(&self) -> TimingModel {
        self.timing_model
    }

    pub fn dates(&self) -> &[chrono::NaiveDate] {
        self.data.dates()
    }

    pub fn tickers(&self) -> &[String] {
        self.data.tickers()
    }

    /// Row values for a date (one per ticker). Pure pass-through to the
    /// underlying frame; carries no alignment semantics.
    pub fn row(&self, date: chrono::NaiveDate) -> Option<Vec<f64>> {
        self.data.row(date)
    }

    /// Shift forward by `periods` along the time axis.
    ///
    /// Returns a new frame whose data buffer is a private copy and whose lag
    /// is `self.lag + periods`. Composes exactly: shifting by a then b is
    /// equivalent to shifting once by a + b.
    pub fn shift(&self, periods: usize) -> TemporalFrame {
        TemporalFrame {
            data: self.data.shift(periods),
            calculation_timing: self.calculation_timing,
            lag: self.lag + periods,
            creator: self.creator,
            timing_model: self.timing_model,
        }
    }

    /// The minimal safe lag to make this frame consumable at `target`.
    pub fn get_lag(&self, target: TimingLabel) -> usize {
        self.timing_model
            .get_lag(self.calculation_timing.end(), target)
    }

    /// Shift by the minimal safe lag for consumption at `target`.
    pub fn at(&self, target: TimingLabel) -> TemporalFrame {
        self.shift(self.get_lag(target))
    }

    /// Lag this frame so it is expressed on the same absolute timeline as
    /// `other` and can be combined with it element-wise without lookahead.
    ///
    /// The total lag is the alignment lag from this frame's calculation end
    /// to the other's calculation start, plus whatever lag the other already
    /// carries from its own production chain.
    pub fn align_with(&self, other: &TemporalFrame) -> Result<TemporalFrame, AlignError> {
        if self.timing_model != other.timing_model {
            return Err(AlignError::TimingModelMismatch {
                ours: self.timing_model,
                theirs: other.timing_model,
            });
        }
        let alignment_lag = self
            .timing_model
            .get_lag(self.calculation_timing.end(), other.calculation_timing.start());
        let total_lag = alignment_lag + other.lag;
        Ok(self.shift(total_lag))
    }
}

impl std::ops::Index<&str> for TemporalFrame {
    type Output = [f64];

    /// Pure pass-through to the underlying frame's column; carries no
    /// alignment semantics.
    fn index(&self, ticker: &str) -> &[f64] {
        &self.data[ticker]
    }
}
