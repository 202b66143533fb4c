//! Deterministic automata under construction, before minimization and
//! compaction.

use anyhow::{Result, ensure};

/// Marks both a missing transition and a missing result.
pub const NULL: i32 = -1;

/// A partial DFA over the alphabet `0..alphabet`. Each state may carry a
/// result, which is what a word ending in that state maps to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dfa {
    pub alphabet: usize,
    /// `states * alphabet` targets.
    pub transitions: Vec<i32>,
    pub results: Vec<i32>,
    /// States where words start. A DFA may serve several languages at once.
    pub entries: Vec<u32>,
}

impl Dfa {
    #[must_use]
    pub const fn new(alphabet: usize) -> Self {
        Self {
            alphabet,
            transitions: vec![],
            results: vec![],
            entries: vec![],
        }
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.results.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn add_state(&mut self) -> u32 {
        self.transitions.resize(self.transitions.len() + self.alphabet, NULL);
        self.results.push(NULL);
        (self.results.len() - 1) as u32
    }

    #[inline]
    #[must_use]
    pub fn transition(&self, state: u32, symbol: usize) -> Option<u32> {
        let t = self.transitions[state as usize * self.alphabet + symbol];
        (t != NULL).then_some(t as u32)
    }

    #[inline]
    pub fn set_transition(&mut self, state: u32, symbol: usize, target: u32) {
        self.transitions[state as usize * self.alphabet + symbol] = target as i32;
    }

    #[inline]
    #[must_use]
    pub fn result(&self, state: u32) -> Option<i32> {
        let r = self.results[state as usize];
        (r != NULL).then_some(r)
    }

    /// Results must be non-negative and a state can only ever map to one.
    pub fn set_result(&mut self, state: u32, value: i32) -> Result<()> {
        ensure!(value >= 0, "result {value} of state {state} is negative");
        let slot = &mut self.results[state as usize];
        ensure!(
            *slot == NULL || *slot == value,
            "state {state} maps to both {} and {value}",
            *slot,
        );
        *slot = value;
        Ok(())
    }

    /// Result of `word` read from `entry`, `None` if the word falls off the
    /// automaton or ends in a state without result.
    #[must_use]
    pub fn walk(&self, entry: u32, word: &[u8]) -> Option<i32> {
        let mut state = entry;
        for &symbol in word {
            state = self.transition(state, symbol as usize)?;
        }
        self.result(state)
    }

    /// Copy all states of `other` into `self`, keeping them disjoint. Returns
    /// the offset added to the state numbers of `other`, whose entries are
    /// appended to `self.entries`.
    pub fn append(&mut self, other: &Self) -> u32 {
        assert_eq!(self.alphabet, other.alphabet);
        let offset = self.len() as u32;
        self.transitions.extend(
            other
                .transitions
                .iter()
                .map(|&t| if t == NULL { NULL } else { t + offset as i32 }),
        );
        self.results.extend_from_slice(&other.results);
        self.entries.extend(other.entries.iter().map(|&e| e + offset));
        offset
    }

    /// Replace every result through `f`.
    pub fn map_results(&mut self, mut f: impl FnMut(i32) -> i32) {
        self.results
            .iter_mut()
            .filter(|r| **r != NULL)
            .for_each(|r| *r = f(*r));
    }
}

/// Builds the trie of a finite language, one entry per trie.
#[derive(Debug)]
pub struct TrieBuilder {
    dfa: Dfa,
    words: usize,
}

impl TrieBuilder {
    #[must_use]
    pub fn new(alphabet: usize) -> Self {
        let mut dfa = Dfa::new(alphabet);
        let root = dfa.add_state();
        dfa.entries.push(root);
        Self { dfa, words: 0 }
    }

    /// Conflicting values for one word abort the build.
    pub fn insert(&mut self, word: &[u8], value: i32) -> Result<()> {
        let mut state = self.dfa.entries[0];
        for &symbol in word {
            let symbol = symbol as usize;
            ensure!(symbol < self.dfa.alphabet, "symbol {symbol} out of the alphabet");
            state = match self.dfa.transition(state, symbol) {
                Some(next) => next,
                None => {
                    let next = self.dfa.add_state();
                    self.dfa.set_transition(state, symbol, next);
                    next
                }
            };
        }
        self.dfa.set_result(state, value)?;
        self.words += 1;
        Ok(())
    }

    #[must_use]
    pub const fn words(&self) -> usize {
        self.words
    }

    #[must_use]
    pub fn finish(self) -> Dfa {
        self.dfa
    }
}

#[cfg(test)]
pub mod test {
    use super::*;

    #[test]
    pub fn trie() {
        let mut trie = TrieBuilder::new(3);
        trie.insert(&[0, 1], 5).unwrap();
        trie.insert(&[0, 2], 6).unwrap();
        trie.insert(&[1], 5).unwrap();
        trie.insert(&[0, 1], 5).unwrap();
        trie.insert(&[0, 1], 7).unwrap_err();
        trie.insert(&[3], 7).unwrap_err();
        assert_eq!(trie.words(), 4);

        let dfa = trie.finish();
        assert_eq!(dfa.len(), 5);
        assert_eq!(dfa.walk(0, &[0, 1]), Some(5));
        assert_eq!(dfa.walk(0, &[0, 2]), Some(6));
        assert_eq!(dfa.walk(0, &[1]), Some(5));
        assert_eq!(dfa.walk(0, &[0]), None);
        assert_eq!(dfa.walk(0, &[2, 2]), None);
    }

    #[test]
    pub fn append() {
        let mut a = TrieBuilder::new(2);
        a.insert(&[1], 1).unwrap();
        let mut b = TrieBuilder::new(2);
        b.insert(&[0, 0], 2).unwrap();
        let mut union = a.finish();
        let offset = union.append(&b.finish());
        assert_eq!(offset, 2);
        assert_eq!(union.entries, vec![0, 2]);
        assert_eq!(union.walk(union.entries[0], &[1]), Some(1));
        assert_eq!(union.walk(union.entries[1], &[0, 0]), Some(2));
        assert_eq!(union.walk(union.entries[1], &[1]), None);

        union.map_results(|r| r * 10);
        assert_eq!(union.walk(2, &[0, 0]), Some(20));
    }
}
