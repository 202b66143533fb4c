//! Incremental shanten and ukeire calculation for riichi mahjong.
//!
//! The heavy lifting happens offline: [`build`] compiles every legal group
//! configuration into minimized, compacted lookup tables, and
//! [`calc::HandCalculator`] keeps a hand's position in those tables up to
//! date with a handful of array reads per draw or discard.

mod macros;

pub mod algo;
pub mod build;
pub mod calc;
pub mod classifier;
pub mod hand;
pub mod tile;

pub use calc::HandCalculator;
pub use classifier::Tables;
pub use tile::TileType;
