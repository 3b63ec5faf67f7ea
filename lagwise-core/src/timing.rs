//! Timing model and lag algebra.
//!
//! Every derived data object in a strategy is tagged with the point in the
//! trading day at which its computation completes. The timing model reduces
//! those points to same-day open/close buckets under the strategy's trading
//! convention, and the lag rule decides how many periods a series must be
//! shifted before it is safely usable at another point — the single rule all
//! higher-level alignment reduces to.

use crate::frame::{Frame, FrameError};
use crate::strategy::Market;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors raised by timing model construction and label parsing.
///
/// All of these indicate misconfiguration or a programming error in a stage's
/// declared timing. None are retriable and none are silently defaulted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimingError {
    #[error("trade timing must be one of 'OO', 'CC', got '{0}'")]
    InvalidTradeTiming(String),

    #[error("indicator timing must be one of 'O', 'C', got '{0}'")]
    InvalidIndicatorTiming(String),

    #[error("timing label must be one of decision, entry, exit, open, close, got '{0}'")]
    UnknownLabel(String),
}

/// A named point in the daily trading lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimingLabel {
    /// When the decision to trade is made (indicator timing).
    Decision,
    /// When a trade is entered (first leg of the trade timing).
    Entry,
    /// When a trade is exited (last leg of the trade timing).
    Exit,
    /// Market open, unconditionally.
    Open,
    /// Market close, unconditionally.
    Close,
}

impl TimingLabel {
    /// All recognized labels, in declaration order.
    pub const ALL: [TimingLabel; 5] = [
        TimingLabel::Decision,
        TimingLabel::Entry,
        TimingLabel::Exit,
        TimingLabel::Open,
        TimingLabel::Close,
    ];
}

impl FromStr for TimingLabel {
    type Err = TimingError;

    /// Case-insensitive parse of the five recognized labels.
    fn from_str(s: &str) -> Result<Self, TimingError> {
        match s.to_ascii_lowercase().as_str() {
            "decision" => Ok(TimingLabel::Decision),
            "entry" => Ok(TimingLabel::Entry),
            "exit" => Ok(TimingLabel::Exit),
            "open" => Ok(TimingLabel::Open),
            "close" => Ok(TimingLabel::Close),
            _ => Err(TimingError::UnknownLabel(s.to_string())),
        }
    }
}

impl fmt::Display for TimingLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TimingLabel::Decision => "decision",
            TimingLabel::Entry => "entry",
            TimingLabel::Exit => "exit",
            TimingLabel::Open => "open",
            TimingLabel::Close => "close",
        };
        f.write_str(s)
    }
}

/// Same-day bucket a timing label reduces to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Bucket {
    Open,
    Close,
}

/// Whether trades are assumed entered and exited at open-to-open or
/// close-to-close.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TradeTiming {
    #[serde(rename = "OO")]
    OpenToOpen,
    #[serde(rename = "CC")]
    CloseToClose,
}

impl TradeTiming {
    /// Bucket of the entry leg.
    pub fn entry_bucket(self) -> Bucket {
        match self {
            TradeTiming::OpenToOpen => Bucket::Open,
            TradeTiming::CloseToClose => Bucket::Close,
        }
    }

    /// Bucket of the exit leg.
    pub fn exit_bucket(self) -> Bucket {
        match self {
            TradeTiming::OpenToOpen => Bucket::Open,
            TradeTiming::CloseToClose => Bucket::Close,
        }
    }
}

impl FromStr for TradeTiming {
    type Err = TimingError;

    fn from_str(s: &str) -> Result<Self, TimingError> {
        match s {
            "OO" => Ok(TradeTiming::OpenToOpen),
            "CC" => Ok(TradeTiming::CloseToClose),
            _ => Err(TimingError::InvalidTradeTiming(s.to_string())),
        }
    }
}

/// The bucket at which the decision to trade is made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IndicatorTiming {
    #[serde(rename = "O")]
    Open,
    #[serde(rename = "C")]
    Close,
}

impl IndicatorTiming {
    pub fn bucket(self) -> Bucket {
        match self {
            IndicatorTiming::Open => Bucket::Open,
            IndicatorTiming::Close => Bucket::Close,
        }
    }
}

impl FromStr for IndicatorTiming {
    type Err = TimingError;

    fn from_str(s: &str) -> Result<Self, TimingError> {
        match s {
            "O" => Ok(IndicatorTiming::Open),
            "C" => Ok(IndicatorTiming::Close),
            _ => Err(TimingError::InvalidIndicatorTiming(s.to_string())),
        }
    }
}

/// When a stage's underlying computation logically starts and ends.
///
/// A point timing (e.g. a signal computed at decision time) has one label; a
/// span timing (e.g. a realized return held from entry to exit) has two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CalculationTiming {
    Point(TimingLabel),
    Span(TimingLabel, TimingLabel),
}

impl CalculationTiming {
    /// Label at which the computation logically starts.
    pub fn start(&self) -> TimingLabel {
        match *self {
            CalculationTiming::Point(label) => label,
            CalculationTiming::Span(start, _) => start,
        }
    }

    /// Label at which the computation completes.
    pub fn end(&self) -> TimingLabel {
        match *self {
            CalculationTiming::Point(label) => label,
            CalculationTiming::Span(_, end) => end,
        }
    }
}

/// Immutable trading-convention configuration.
///
/// Maps the five timing labels onto same-day open/close buckets:
/// decision → indicator timing, entry/exit → the trade timing legs,
/// open/close → themselves. The mapping is fixed and total; invalid
/// configuration values are rejected at construction, never defaulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimingModel {
    pub trade_timing: TradeTiming,
    pub indicator_timing: IndicatorTiming,
}

impl TimingModel {
    pub fn new(trade_timing: TradeTiming, indicator_timing: IndicatorTiming) -> Self {
        Self { trade_timing, indicator_timing }
    }

    /// Construct from the string codes used in configuration files
    /// (`"OO"`/`"CC"` and `"O"`/`"C"`).
    pub fn from_codes(trade_timing: &str, indicator_timing: &str) -> Result<Self, TimingError> {
        Ok(Self {
            trade_timing: trade_timing.parse()?,
            indicator_timing: indicator_timing.parse()?,
        })
    }

    /// Reduce a timing label to its same-day bucket under this convention.
    pub fn bucket(&self, label: TimingLabel) -> Bucket {
        match label {
            TimingLabel::Decision => self.indicator_timing.bucket(),
            TimingLabel::Entry => self.trade_timing.entry_bucket(),
            TimingLabel::Exit => self.trade_timing.exit_bucket(),
            TimingLabel::Open => Bucket::Open,
            TimingLabel::Close => Bucket::Close,
        }
    }

    /// Periods a series completed at `start` must be shifted before it is
    /// safely usable at `end`.
    ///
    /// Zero only when start falls at the open and end at the close of the same
    /// day — the one bucket pair with no information gap. Everything else
    /// waits one period.
    pub fn get_lag(&self, start: TimingLabel, end: TimingLabel) -> usize {
        bucket_lag(self.bucket(start), self.bucket(end))
    }

    /// Return series of holding from the entry leg to the exit leg of the
    /// trade timing, lagging the exit-leg series by the same-day bucket lag
    /// before dividing.
    ///
    /// Not part of the alignment core proper, but it shares the bucket rule.
    pub fn market_returns(&self, market: &Market) -> Result<Frame, FrameError> {
        let entry_series = match self.trade_timing.entry_bucket() {
            Bucket::Open => market.open(),
            Bucket::Close => market.close(),
        };
        let exit_series = match self.trade_timing.exit_bucket() {
            Bucket::Open => market.open(),
            Bucket::Close => market.close(),
        };
        let lag = bucket_lag(
            self.trade_timing.entry_bucket(),
            self.trade_timing.exit_bucket(),
        );
        entry_series.zip_with(&exit_series.shift(lag), |entry, exit| entry / exit - 1.0)
    }
}

/// The core alignment rule: (Open, Close) is a same-day relationship with no
/// information gap, so no lag; any other pair waits one period.
fn bucket_lag(start: Bucket, end: Bucket) -> usize {
    match (start, end) {
        (Bucket::Open, Bucket::Close) => 0,
        _ => 1,
    }
}
