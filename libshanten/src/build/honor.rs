//! Progressive honor automaton.
//!
//! Honor types are interchangeable, so the group is fully described by how
//! many types sit in each situation. The automaton is built directly over
//! these states with one symbol per [`HonorAction`].

use super::BuildStats;
use super::compact::{Compacted, compact};
use super::dfa::Dfa;
use super::hopcroft::minimize;
use super::registry::Registry;
use crate::algo::analyzer::{Analyzer, GroupKind};
use crate::algo::combination::HONOR_LEN;
use crate::classifier::honor::{HONOR_ACTIONS, HonorAction};
use ahash::AHashMap;
use anyhow::{Context, Result};
use std::collections::VecDeque;

const PONNED: usize = 5;
const PONNED_SPARE: usize = 6;
const KANNED: usize = 7;

/// Number of honor types per situation: held 0 to 4 times without a meld,
/// ponned, ponned with the fourth copy in hand, kanned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct HonorState([u8; 8]);

impl HonorState {
    const INITIAL: Self = Self([HONOR_LEN as u8, 0, 0, 0, 0, 0, 0, 0]);

    const fn melds(self) -> u8 {
        self.0[PONNED] + self.0[PONNED_SPARE] + self.0[KANNED]
    }

    fn concealed(self) -> u8 {
        (0..5).map(|i| i as u8 * self.0[i]).sum::<u8>() + self.0[PONNED_SPARE]
    }

    fn is_legal(self) -> bool {
        self.melds() <= 4 && self.concealed() + 3 * self.melds() <= 14
    }

    /// Moves one type from one situation to another.
    fn apply(self, action: HonorAction) -> Option<Self> {
        let (from, to) = match action {
            HonorAction::Draw { prior } => (prior as usize, prior as usize + 1),
            HonorAction::Discard { prior } => (prior as usize, prior as usize - 1),
            HonorAction::DrawOnPon => (PONNED, PONNED_SPARE),
            HonorAction::DiscardOnPon => (PONNED_SPARE, PONNED),
            HonorAction::Pon { prior: 2 } => (2, PONNED),
            HonorAction::Pon { .. } => (3, PONNED_SPARE),
            HonorAction::Daiminkan => (3, KANNED),
            HonorAction::Shouminkan => (PONNED_SPARE, KANNED),
            HonorAction::Ankan => (4, KANNED),
        };
        if self.0[from] == 0 {
            return None;
        }
        let mut ret = self;
        ret.0[from] -= 1;
        ret.0[to] += 1;
        ret.is_legal().then_some(ret)
    }

    /// One concrete honor group in this state.
    fn counts(self) -> ([u8; HONOR_LEN], [u8; HONOR_LEN]) {
        let mut concealed = [0; HONOR_LEN];
        let mut melded = [0; HONOR_LEN];
        let shapes = [
            (PONNED, 0, 3),
            (PONNED_SPARE, 1, 3),
            (KANNED, 0, 4),
            (4, 4, 0),
            (3, 3, 0),
            (2, 2, 0),
            (1, 1, 0),
        ];
        let mut i = 0;
        for (slot, c, m) in shapes {
            for _ in 0..self.0[slot] {
                concealed[i] = c;
                melded[i] = m;
                i += 1;
            }
        }
        (concealed, melded)
    }
}

/// Returns the compacted table, entry at row 0. The arrangement sets of all
/// honor states are interned into `registry`.
pub fn build(registry: &mut Registry) -> Result<(Compacted, BuildStats)> {
    let mut analyzer = Analyzer::new(GroupKind::Honor);
    let mut dfa = Dfa::new(HONOR_ACTIONS);
    let mut index = AHashMap::new();
    let mut queue = VecDeque::new();

    let root = dfa.add_state();
    dfa.entries.push(root);
    index.insert(HonorState::INITIAL, root);
    queue.push_back(HonorState::INITIAL);

    while let Some(state) = queue.pop_front() {
        let s = index[&state];
        let (concealed, melded) = state.counts();
        let set = analyzer.analyze(&concealed, &melded, state.melds());
        dfa.set_result(s, registry.intern(set) as i32)
            .with_context(|| format!("honor state {state:?}"))?;

        for code in 0..HONOR_ACTIONS as u8 {
            let Some(action) = HonorAction::from_code(code) else {
                continue;
            };
            let Some(next) = state.apply(action) else {
                continue;
            };
            let t = *index.entry(next).or_insert_with(|| {
                queue.push_back(next);
                dfa.add_state()
            });
            dfa.set_transition(s, code as usize, t);
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
        "honors: {} states, {} minimized, {} cells",
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
    pub fn states() {
        let s = HonorState::INITIAL;
        assert_eq!(s.apply(HonorAction::Discard { prior: 1 }), None);
        assert_eq!(s.apply(HonorAction::Pon { prior: 2 }), None);

        let s = s.apply(HonorAction::Draw { prior: 0 }).unwrap();
        let s = s.apply(HonorAction::Draw { prior: 1 }).unwrap();
        let s = s.apply(HonorAction::Pon { prior: 2 }).unwrap();
        assert_eq!(s.melds(), 1);
        assert_eq!(s.concealed(), 0);
        let (concealed, melded) = s.counts();
        assert_eq!(concealed, [0; 7]);
        assert_eq!(melded, [3, 0, 0, 0, 0, 0, 0]);

        // 14 concealed tiles leave no room to grow
        let full = HonorState([0, 0, 7, 0, 0, 0, 0, 0]);
        assert!(full.is_legal());
        assert_eq!(full.apply(HonorAction::Draw { prior: 2 }), None);
        assert!(full.apply(HonorAction::Discard { prior: 2 }).is_some());
    }

    #[test]
    pub fn table() {
        let mut registry = Registry::new();
        let (table, stats) = build(&mut registry).unwrap();
        assert!(stats.minimized <= stats.states);
        assert_eq!(table.entries, vec![0]);
        assert!(!registry.is_empty());
    }
}
