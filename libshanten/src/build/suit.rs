//! Two phase suit automaton.
//!
//! The meld phase reads the ids of the declared melds of one suit and ends in
//! a state whose result is an entry row of the count phase. The count phase
//! reads the nine concealed counts and ends in the id of the suit's
//! arrangement set. Every distinct locked-away vector gets its own entry, so
//! the count tries stay small and are built independently.

use super::compact::{Compacted, compact};
use super::dfa::{Dfa, TrieBuilder};
use super::hopcroft::minimize;
use super::registry::Registry;
use super::{BuildConfig, BuildStats, progress_bar};
use crate::algo::analyzer::{Analyzer, GroupKind};
use crate::algo::arrangement::ArrangementSet;
use crate::algo::combination::{CombinationEnumerator, SUIT_LEN, mirrored};
use crate::classifier::suit::{MAX_SUIT_MELDS, SUIT_MELD_IDS, SuitMeld};
use ahash::AHashMap;
use anyhow::{Context, Result, ensure};
use indicatif::ParallelProgressIterator;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use std::collections::VecDeque;

/// Alphabet of the count phase, 0 to 4 copies.
const COUNT_SYMBOLS: usize = 5;

/// Melds of one suit, as far as the count phase cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeldState {
    pub melds: u8,
    pub melded: [u8; SUIT_LEN],
}

impl MeldState {
    const EMPTY: Self = Self {
        melds: 0,
        melded: [0; SUIT_LEN],
    };

    fn with(self, meld: SuitMeld) -> Option<Self> {
        if self.melds as usize == MAX_SUIT_MELDS {
            return None;
        }
        let mut ret = self;
        meld.add_to(&mut ret.melded);
        ret.melds += 1;
        ret.melded.iter().all(|&c| c <= 4).then_some(ret)
    }

    fn mirrored(self) -> Self {
        let mut melded = self.melded;
        melded.reverse();
        Self { melds: self.melds, melded }
    }

    /// Most concealed tiles one suit can hold next to these melds.
    const fn max_concealed(self) -> u8 {
        14 - 3 * self.melds
    }
}

/// Built tables of both phases.
#[derive(Debug)]
pub struct SuitTables {
    pub melds: Compacted,
    pub counts: Compacted,
    /// Registry ids the count phase can produce, ascending.
    pub ids: Vec<u32>,
}

/// All meld states in breadth first order, and the meld phase automaton over
/// them without results.
fn meld_phase() -> (Vec<MeldState>, Dfa) {
    let mut dfa = Dfa::new(SUIT_MELD_IDS);
    let mut states = vec![];
    let mut index = AHashMap::new();
    let mut queue = VecDeque::new();

    let root = dfa.add_state();
    dfa.entries.push(root);
    states.push(MeldState::EMPTY);
    index.insert(MeldState::EMPTY, root);
    queue.push_back(MeldState::EMPTY);

    while let Some(state) = queue.pop_front() {
        let s = index[&state];
        for id in 0..SUIT_MELD_IDS as u8 {
            let Some(next) = SuitMeld::from_id(id).and_then(|m| state.with(m)) else {
                continue;
            };
            let t = *index.entry(next).or_insert_with(|| {
                states.push(next);
                queue.push_back(next);
                dfa.add_state()
            });
            dfa.set_transition(s, id as usize, t);
        }
    }
    (states, dfa)
}

/// One unit of parallel work: the count tries of a meld state and of its
/// mirror image.
#[derive(Debug, Clone, Copy)]
enum Task {
    Symmetric(usize),
    Pair(usize, usize),
}

struct TaskOutput {
    /// Minimized tries keyed by meld state, results index into `sets`.
    tries: Vec<(usize, Dfa)>,
    sets: Vec<ArrangementSet>,
    words: usize,
}

fn run_task(task: Task, states: &[MeldState]) -> Result<TaskOutput> {
    let mut analyzer = Analyzer::new(GroupKind::Suit);
    let mut sets = vec![];
    let mut local = AHashMap::new();
    let mut intern = |set: ArrangementSet| {
        *local.entry(set).or_insert_with(|| {
            sets.push(set);
            (sets.len() - 1) as i32
        })
    };
    let mut words = 0;

    let tries = match task {
        Task::Symmetric(i) => {
            let state = states[i];
            let mut trie = TrieBuilder::new(COUNT_SYMBOLS);
            let combinations = CombinationEnumerator::new(SUIT_LEN, state.max_concealed())
                .with_melded(&state.melded)
                .canonical()
                .enumerate();
            for c in combinations {
                let id = intern(analyzer.analyze(&c, &state.melded, state.melds));
                trie.insert(&c, id)
                    .with_context(|| format!("{state:?} {c:?}"))?;
                let m = mirrored(&c);
                if m != c {
                    trie.insert(&m, id)
                        .with_context(|| format!("{state:?} {m:?}"))?;
                }
            }
            words += trie.words();
            vec![(i, minimize(&trie.finish()))]
        }
        Task::Pair(i, j) => {
            let state = states[i];
            let mut trie = TrieBuilder::new(COUNT_SYMBOLS);
            let mut mirror = TrieBuilder::new(COUNT_SYMBOLS);
            let combinations = CombinationEnumerator::new(SUIT_LEN, state.max_concealed())
                .with_melded(&state.melded)
                .enumerate();
            for c in combinations {
                let id = intern(analyzer.analyze(&c, &state.melded, state.melds));
                trie.insert(&c, id)
                    .with_context(|| format!("{state:?} {c:?}"))?;
                mirror.insert(&mirrored(&c), id)
                    .with_context(|| format!("{:?} {c:?} mirrored", states[j]))?;
            }
            words += trie.words() + mirror.words();
            vec![
                (i, minimize(&trie.finish())),
                (j, minimize(&mirror.finish())),
            ]
        }
    };
    Ok(TaskOutput { tries, sets, words })
}

/// Builds both phases. The arrangement sets of the count phase are interned
/// into `registry` in meld state order.
pub fn build(registry: &mut Registry, config: &BuildConfig) -> Result<(SuitTables, BuildStats)> {
    let (states, mut melds_dfa) = meld_phase();
    log::info!("suit melds: {} meld states", states.len());

    let index: AHashMap<_, _> = states.iter().enumerate().map(|(i, s)| (*s, i)).collect();
    let mut tasks = vec![];
    for (i, state) in states.iter().enumerate() {
        let mirror = state.mirrored();
        if mirror == *state {
            tasks.push(Task::Symmetric(i));
        } else if state.melded < mirror.melded {
            let j = *index
                .get(&mirror)
                .with_context(|| format!("mirror of {state:?} is unreachable"))?;
            tasks.push(Task::Pair(i, j));
        }
    }

    let bar = progress_bar(config, tasks.len() as u64, "suit counts")?;
    let outputs = tasks
        .par_iter()
        .progress_with(bar.clone())
        .map(|&task| run_task(task, &states))
        .collect::<Result<Vec<_>>>()?;
    bar.finish_and_clear();

    let mut ids = vec![];
    let mut tries: Vec<Option<Dfa>> = vec![None; states.len()];
    let mut words = 0;
    let mut trie_states = 0;
    for output in outputs {
        let global: Vec<_> = output.sets.iter().map(|&s| registry.intern(s) as i32).collect();
        ids.extend(global.iter().map(|&g| g as u32));
        words += output.words;
        for (i, mut dfa) in output.tries {
            dfa.map_results(|r| global[r as usize]);
            trie_states += dfa.len();
            tries[i] = Some(dfa);
        }
    }
    ids.sort_unstable();
    ids.dedup();

    let mut union = Dfa::new(COUNT_SYMBOLS);
    for (i, dfa) in tries.iter().enumerate() {
        let dfa = dfa
            .as_ref()
            .with_context(|| format!("no count trie for {:?}", states[i]))?;
        union.append(dfa);
    }
    let min = minimize(&union);
    let counts = compact(&min);
    log::info!(
        "suit counts: {words} words, {trie_states} trie states, {} minimized, {} cells",
        min.len(),
        counts.data.len(),
    );

    for (s, &entry) in counts.entries.iter().enumerate() {
        melds_dfa.set_result(s as u32, entry as i32)?;
    }
    let melds_min = minimize(&melds_dfa);
    let melds = compact(&melds_min);
    ensure!(
        melds.walk(0, &[]) == Some(counts.entries[0] as i32),
        "meld phase root does not lead to the meld-free entry",
    );
    log::info!(
        "suit melds: {} minimized, {} cells",
        melds_min.len(),
        melds.data.len(),
    );

    let stats = BuildStats {
        words,
        states: trie_states + melds_dfa.len(),
        minimized: min.len() + melds_min.len(),
        cells: counts.data.len() + melds.data.len(),
    };
    let tables = SuitTables { melds, counts, ids };
    if config.self_check {
        self_check(&tables, &states, registry)?;
    }
    Ok((tables, stats))
}

/// Replays random words of random meld states through the compacted tables
/// and compares with a fresh analysis.
fn self_check(tables: &SuitTables, states: &[MeldState], registry: &Registry) -> Result<()> {
    const SAMPLES: usize = 4096;
    let mut rng = ChaCha8Rng::seed_from_u64(0x5017);
    let mut analyzer = Analyzer::new(GroupKind::Suit);
    let paths = meld_paths(states);

    for _ in 0..SAMPLES {
        let i = rng.random_range(0..states.len());
        let state = states[i];
        let entry = tables
            .melds
            .walk(0, &paths[i])
            .with_context(|| format!("meld phase rejects {state:?}"))?;

        let mut counts = [0; SUIT_LEN];
        let mut left = rng.random_range(0..=state.max_concealed());
        let mut order: Vec<_> = (0..SUIT_LEN).collect();
        order.shuffle(&mut rng);
        for p in order {
            let n = left.min(4 - state.melded[p]).min(rng.random_range(0..=4));
            counts[p] = n;
            left -= n;
        }

        let found = tables
            .counts
            .walk(entry as u32, &counts)
            .with_context(|| format!("count phase rejects {counts:?} after {state:?}"))?;
        let expected = analyzer.analyze(&counts, &state.melded, state.melds);
        ensure!(
            registry.get(found as u32) == expected,
            "{counts:?} after {state:?}: table gives {}, analysis gives {expected}",
            registry.get(found as u32),
        );
    }
    log::debug!("suit self check passed on {SAMPLES} words");
    Ok(())
}

/// One meld id sequence reaching each meld state.
fn meld_paths(states: &[MeldState]) -> Vec<Vec<u8>> {
    let index: AHashMap<_, _> = states.iter().enumerate().map(|(i, s)| (*s, i)).collect();
    let mut paths = vec![vec![]; states.len()];
    for (i, state) in states.iter().enumerate() {
        for id in 0..SUIT_MELD_IDS as u8 {
            let Some(next) = SuitMeld::from_id(id).and_then(|m| state.with(m)) else {
                continue;
            };
            let j = index[&next];
            if j > i && paths[j].is_empty() {
                let mut path = paths[i].clone();
                path.push(id);
                paths[j] = path;
            }
        }
    }
    paths
}

#[cfg(test)]
pub mod test {
    use super::*;
    use crate::algo::analyzer::analyze;

    #[test]
    pub fn meld_states() {
        let (states, dfa) = meld_phase();
        assert_eq!(states.len(), 9262);
        assert_eq!(dfa.len(), states.len());
        assert_eq!(states[0], MeldState::EMPTY);
        let all: AHashMap<_, _> = states.iter().map(|s| (*s, ())).collect();
        assert!(states.iter().all(|s| all.contains_key(&s.mirrored())));

        // four kans of 1m would need 16 copies
        let kan = SuitMeld::Kan { index: 0 };
        let one = MeldState::EMPTY.with(kan).unwrap();
        assert_eq!(one.with(kan), None);

        let paths = meld_paths(&states);
        for (i, path) in paths.iter().enumerate().skip(1) {
            assert_eq!(path.len(), states[i].melds as usize);
        }
    }

    #[test]
    pub fn mirror_symmetry() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let (states, _) = meld_phase();
        for _ in 0..500 {
            let state = states[rng.random_range(0..states.len())];
            let all = CombinationEnumerator::new(SUIT_LEN, state.max_concealed())
                .with_melded(&state.melded)
                .enumerate();
            let c = &all[rng.random_range(0..all.len())];
            let mirror = state.mirrored();
            assert_eq!(
                analyze(GroupKind::Suit, c, &state.melded, state.melds),
                analyze(GroupKind::Suit, &mirrored(c), &mirror.melded, mirror.melds),
                "{c:?} {state:?}",
            );
        }
    }
}
