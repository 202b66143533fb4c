//! Runtime classifiers over the compiled tables.

pub mod chiitoitsu;
pub mod honor;
pub mod io;
pub mod kokushi;
pub mod suit;

use crate::algo::arrangement::ArrangementSet;
use crate::build::{self, BuildConfig, BuildStats};
use anyhow::Result;

/// Follows `symbol` from the row starting at `pos`.
#[inline]
pub(crate) fn table_step(table: &[i32], pos: u32, symbol: usize) -> u32 {
    let next = table[pos as usize + 1 + symbol];
    debug_assert!(next >= 0, "null transition on {symbol} at {pos}");
    next as u32
}

/// The compiled tables, immutable once built or loaded. Every table starts
/// with its entry row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tables {
    /// Meld phase of the suit automaton, results are count phase entries.
    pub suit_melds: Vec<i32>,
    /// Count phase of the suit automaton, results are registry ids.
    pub suit_counts: Vec<i32>,
    /// Progressive honors, results are registry ids.
    pub honors: Vec<i32>,
    /// Progressive thirteen orphans, results are useful tile counts.
    pub kokushi: Vec<i32>,
    /// Three suit ids then one honor id, results are useful tile counts.
    pub combiner: Vec<i32>,
    /// Arrangement sets by registry id.
    pub registry: Vec<ArrangementSet>,
}

impl Tables {
    pub fn build(config: &BuildConfig) -> Result<Self> {
        Self::build_with_stats(config).map(|(tables, _)| tables)
    }

    pub fn build_with_stats(config: &BuildConfig) -> Result<(Self, BuildStats)> {
        build::build(config)
    }

    #[must_use]
    pub fn registry_set(&self, id: u32) -> ArrangementSet {
        self.registry[id as usize]
    }

    /// Useful tiles of a regular hand made of the given groups.
    #[inline]
    #[must_use]
    pub fn combine(&self, suits: [u32; 3], honors: u32) -> u8 {
        let pos = suits
            .into_iter()
            .fold(0, |pos, id| table_step(&self.combiner, pos, id as usize));
        let pos = table_step(&self.combiner, pos, honors as usize);
        self.combiner[pos as usize] as u8
    }

    /// Integers across all tables.
    #[must_use]
    pub fn cells(&self) -> usize {
        self.suit_melds.len()
            + self.suit_counts.len()
            + self.honors.len()
            + self.kokushi.len()
            + self.combiner.len()
    }
}

#[cfg(test)]
static TEST_TABLES: std::sync::LazyLock<std::sync::Arc<Tables>> = std::sync::LazyLock::new(|| {
    let config = BuildConfig {
        progress: false,
        ..Default::default()
    };
    std::sync::Arc::new(Tables::build(&config).unwrap())
});

/// Tables shared by every test of the crate, compiled on first use.
#[cfg(test)]
pub fn test_tables() -> std::sync::Arc<Tables> {
    std::sync::Arc::clone(&TEST_TABLES)
}

#[cfg(test)]
pub mod test {
    use super::*;
    use crate::algo::analyzer::{GroupKind, analyze};

    #[test]
    pub fn combine() {
        let tables = test_tables();
        let id = |set: ArrangementSet| tables.registry.iter().position(|&s| s == set).unwrap() as u32;
        let empty_suit = id(analyze(GroupKind::Suit, &[0; 9], &[0; 9], 0));
        let empty_honors = id(analyze(GroupKind::Honor, &[0; 7], &[0; 7], 0));
        let chuuren = id(analyze(GroupKind::Suit, &[3, 1, 1, 1, 1, 1, 1, 1, 3], &[0; 9], 0));
        assert_eq!(tables.combine([empty_suit, chuuren, empty_suit], empty_honors), 13);
        assert_eq!(tables.combine([empty_suit; 3], empty_honors), 0);
    }

    #[test]
    pub fn entries() {
        let tables = test_tables();
        // the empty hand has no useful tiles in any form
        let empty = tables.honors[0] as u32;
        assert_eq!(tables.registry_set(empty), ArrangementSet::UNIT);
        assert_eq!(tables.kokushi[0], 0);
        assert_eq!(tables.suit_melds[0], 0);
        let pos = (0..9).fold(0, |pos, _| table_step(&tables.suit_counts, pos, 0));
        assert_eq!(tables.registry_set(tables.suit_counts[pos as usize] as u32), ArrangementSet::UNIT);
    }
}
