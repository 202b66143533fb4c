//! The incremental hand calculator and what it exposes to scoring.

pub mod hand_calculator;
pub mod meld;
pub mod scoring;

pub use hand_calculator::{HandCalculator, HandState};
pub use meld::{Meld, MeldKind};
pub use scoring::ScoringData;
