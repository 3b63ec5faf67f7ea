//! Lagwise Runner — post-hoc analysis over realized return series.
//!
//! Nothing here touches the alignment core: metrics are pure functions over
//! an already-realized return series, and the run configuration maps a toml
//! description onto core timing and stage types.

pub mod config;
pub mod metrics;

pub use config::RunConfig;
pub use metrics::ReturnsSummary;
