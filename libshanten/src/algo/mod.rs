pub mod analyzer;
pub mod arrangement;
pub mod combination;
pub mod shanten;
