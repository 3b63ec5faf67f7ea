//! Concrete signal stages.

pub mod crossover;

pub use crossover::{Crossover, TripleCrossover};
