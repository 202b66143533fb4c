//! Thirteen orphans automaton, enumerated directly over `(kinds, pairs)`.

use super::BuildStats;
use super::compact::{Compacted, compact};
use super::dfa::Dfa;
use super::hopcroft::minimize;
use crate::classifier::kokushi::KOKUSHI_ACTIONS;
use anyhow::Result;

const KINDS: u8 = 13;

/// `kinds` distinct terminal and honor types held, `pairs` of them at least
/// twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct KokushiState {
    kinds: u8,
    pairs: u8,
}

impl KokushiState {
    fn index(self) -> u32 {
        self.kinds as u32 * (KINDS as u32 + 1) + self.pairs as u32
    }

    fn is_legal(self) -> bool {
        self.kinds <= KINDS && self.pairs <= self.kinds && self.kinds + self.pairs <= 14
    }

    /// Follows action `code`, see [`crate::classifier::kokushi::KokushiAction::code`].
    fn apply(self, code: u8) -> Option<Self> {
        let Self { kinds, pairs } = self;
        let next = match code {
            0 => Self { kinds: kinds + 1, pairs },
            1 if pairs < kinds => Self { kinds, pairs: pairs + 1 },
            3 if kinds > pairs => Self { kinds: kinds - 1, pairs },
            4 if pairs > 0 => Self { kinds, pairs: pairs - 1 },
            2 | 5 if pairs > 0 => self,
            _ => return None,
        };
        next.is_legal().then_some(next)
    }

    const fn useful(self) -> i32 {
        self.kinds as i32 + (self.pairs > 0) as i32
    }
}

/// Returns the compacted table, entry at row 0.
pub fn build() -> Result<(Compacted, BuildStats)> {
    let mut dfa = Dfa::new(KOKUSHI_ACTIONS);
    for _ in 0..(KINDS as u32 + 1) * (KINDS as u32 + 1) {
        dfa.add_state();
    }
    dfa.entries.push(0);
    for kinds in 0..=KINDS {
        for pairs in 0..=kinds {
            let state = KokushiState { kinds, pairs };
            if !state.is_legal() {
                continue;
            }
            let s = state.index();
            dfa.set_result(s, state.useful())?;
            for code in 0..KOKUSHI_ACTIONS as u8 {
                if let Some(next) = state.apply(code) {
                    dfa.set_transition(s, code as usize, next.index());
                }
            }
        }
    }

    let min = minimize(&dfa);
    let table = compact(&min);
    let stats = BuildStats {
        words: 0,
        states: dfa.len(),
        minimized: min.len(),
        cells: table.data.len(),
    };
    log::info!(
        "kokushi: {} states, {} minimized, {} cells",
        stats.states,
        stats.minimized,
        stats.cells,
    );
    Ok((table, stats))
}

#[cfg(test)]
pub mod test {
    use super::*;

    #[test]
    pub fn transitions() {
        let s = KokushiState { kinds: 0, pairs: 0 };
        assert_eq!(s.apply(1), None);
        assert_eq!(s.apply(2), None);
        assert_eq!(s.apply(0), Some(KokushiState { kinds: 1, pairs: 0 }));

        let s = KokushiState { kinds: 7, pairs: 7 };
        assert_eq!(s.apply(0), None);
        assert_eq!(s.apply(2), Some(s));
        assert_eq!(s.apply(4), Some(KokushiState { kinds: 7, pairs: 6 }));
        assert_eq!(s.apply(3), None);
    }

    #[test]
    pub fn table() {
        let (table, _) = build().unwrap();
        // 12 kinds and a pair, then the 13th kind completes the hand
        let mut word = vec![0; 12];
        word.push(1);
        assert_eq!(table.walk(0, &word), Some(13));
        word.push(0);
        assert_eq!(table.walk(0, &word), Some(14));
        assert_eq!(table.walk(0, &[]), Some(0));
    }
}
