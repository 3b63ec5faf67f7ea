//! Run configuration: toml description of a backtest run.
//!
//! Maps a config file onto core timing and stage identity types, and derives
//! a deterministic run id for result bookkeeping — two runs with the same
//! configuration get the same id.

use anyhow::{Context, Result};
use lagwise_core::{StageId, TimingError, TimingModel};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimingSection {
    /// "OO" or "CC".
    pub trade_timing: String,
    /// "O" or "C".
    pub indicator_timing: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageSection {
    pub name: String,
    /// `BTreeMap` keeps the run id encoding deterministic.
    #[serde(default)]
    pub params: BTreeMap<String, f64>,
}

/// A complete run description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    pub timing: TimingSection,
    pub signal: StageSection,
}

impl RunConfig {
    pub fn from_toml_str(input: &str) -> Result<Self> {
        toml::from_str(input).context("failed to parse run configuration")
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let input = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config at {}", path.display()))?;
        Self::from_toml_str(&input)
    }

    /// Validate and build the core timing model. Invalid codes fail here,
    /// never silently default.
    pub fn timing_model(&self) -> Result<TimingModel, TimingError> {
        TimingModel::from_codes(&self.timing.trade_timing, &self.timing.indicator_timing)
    }

    /// The configured signal stage's value identity.
    pub fn signal_id(&self) -> StageId {
        StageId::from_config(&self.signal.name, &self.signal.params)
    }

    /// Deterministic run id: hash of the canonical JSON of the whole config.
    pub fn run_id(&self) -> String {
        let json = serde_json::to_string(self).expect("run config must serialize");
        let hash = blake3::hash(json.as_bytes());
        hash.to_hex()[..16].to_string()
    }
}
