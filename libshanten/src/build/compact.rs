//! Flattening of a minimized DFA into a single integer table.
//!
//! Each state becomes a row `[result, target(0), target(1), ...]` whose
//! targets are row starts, so walking a word is one load per symbol. Rows
//! drop their trailing nulls, and `offsets[s]` records how many cells were
//! dropped before row `s`.

use super::dfa::{Dfa, NULL};
use anyhow::{Result, ensure};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compacted {
    pub data: Vec<i32>,
    /// Cells dropped before each row, row `s` starts at
    /// `s * width - offsets[s]`.
    pub offsets: Vec<u32>,
    /// Row starts of the entries.
    pub entries: Vec<u32>,
    /// `alphabet + 1`.
    pub width: usize,
}

impl Compacted {
    #[inline]
    #[must_use]
    pub fn row_start(&self, state: usize) -> u32 {
        (state * self.width) as u32 - self.offsets[state]
    }

    /// Walk `word` from the row starting at `pos`. Words leaving the language
    /// give `None` as long as the missing cell is inside the row.
    #[must_use]
    pub fn walk(&self, mut pos: u32, word: &[u8]) -> Option<i32> {
        for &symbol in word {
            let t = *self.data.get(pos as usize + 1 + symbol as usize)?;
            if t == NULL {
                return None;
            }
            pos = t as u32;
        }
        let r = self.data[pos as usize];
        (r != NULL).then_some(r)
    }

    /// Restore the full table the rows were cut from.
    pub fn decompact(&self) -> Result<Dfa> {
        let states = self.offsets.len();
        let starts: Vec<u32> = (0..states).map(|s| self.row_start(s)).collect();
        let alphabet = self.width - 1;

        let mut dfa = Dfa::new(alphabet);
        for s in 0..states {
            dfa.add_state();
            let start = starts[s] as usize;
            let end = starts.get(s + 1).map_or(self.data.len(), |&e| e as usize);
            ensure!(start < end && end - start <= self.width, "row {s} has a bad extent");

            dfa.results[s] = self.data[start];
            for (a, &t) in self.data[start + 1..end].iter().enumerate() {
                if t == NULL {
                    continue;
                }
                let target = starts
                    .binary_search(&(t as u32))
                    .ok()
                    .ok_or_else(|| anyhow::anyhow!("row {s} points into the middle of a row"))?;
                dfa.set_transition(s as u32, a, target as u32);
            }
        }
        dfa.entries = self
            .entries
            .iter()
            .map(|e| {
                starts
                    .binary_search(e)
                    .map(|s| s as u32)
                    .map_err(|_| anyhow::anyhow!("entry {e} is not a row start"))
            })
            .collect::<Result<_>>()?;
        Ok(dfa)
    }
}

#[must_use]
pub fn compact(dfa: &Dfa) -> Compacted {
    let alphabet = dfa.alphabet;
    let width = alphabet + 1;
    let states = dfa.len();

    let kept: Vec<usize> = (0..states)
        .map(|s| {
            let row = &dfa.transitions[s * alphabet..(s + 1) * alphabet];
            1 + row.iter().rposition(|&t| t != NULL).map_or(0, |i| i + 1)
        })
        .collect();
    let mut offsets = Vec::with_capacity(states);
    let mut dropped = 0;
    for &k in &kept {
        offsets.push(dropped as u32);
        dropped += width - k;
    }
    let start = |s: usize| (s * width - offsets[s] as usize) as i32;

    let mut data = Vec::with_capacity(states * width - dropped);
    for s in 0..states {
        data.push(dfa.results[s]);
        let row = &dfa.transitions[s * alphabet..s * alphabet + kept[s] - 1];
        data.extend(
            row.iter()
                .map(|&t| if t == NULL { NULL } else { start(t as usize) }),
        );
    }

    let entries = dfa.entries.iter().map(|&e| start(e as usize) as u32).collect();
    Compacted {
        data,
        offsets,
        entries,
        width,
    }
}

#[cfg(test)]
pub mod test {
    use super::*;
    use crate::build::dfa::TrieBuilder;
    use crate::build::hopcroft::minimize;
    use crate::build::registry::Registry;
    use crate::build::{honor, kokushi};

    fn sample() -> Dfa {
        let mut trie = TrieBuilder::new(4);
        let words: &[&[u8]] = &[&[0, 0], &[0, 1], &[1, 3], &[2], &[3, 3, 3], &[]];
        for (i, w) in words.iter().enumerate() {
            trie.insert(w, i as i32 % 3).unwrap();
        }
        minimize(&trie.finish())
    }

    #[test]
    pub fn layout() {
        let mut dfa = Dfa::new(3);
        let a = dfa.add_state();
        let b = dfa.add_state();
        dfa.entries.push(a);
        dfa.set_transition(a, 1, b);
        dfa.set_result(b, 7).unwrap();

        let table = compact(&dfa);
        // row a keeps its result and two cells, row b only its result
        assert_eq!(table.data, vec![NULL, NULL, 3, 7]);
        assert_eq!(table.offsets, vec![0, 1]);
        assert_eq!(table.row_start(1), 3);
        assert_eq!(table.walk(0, &[1]), Some(7));
        assert_eq!(table.walk(0, &[0]), None);
        assert_eq!(table.walk(0, &[]), None);
    }

    #[test]
    pub fn round_trip() {
        let dfa = sample();
        let table = compact(&dfa);
        assert!(table.data.len() < dfa.len() * table.width);
        assert_eq!(table.decompact().unwrap(), dfa);

        // every state agrees on every word up to length 3
        let mut words = vec![vec![]];
        for len in 1..=3 {
            let prev: Vec<_> = words.iter().filter(|w: &&Vec<u8>| w.len() == len - 1).cloned().collect();
            for w in prev {
                for a in 0..4 {
                    let mut next = w.clone();
                    next.push(a);
                    words.push(next);
                }
            }
        }
        for s in 0..dfa.len() {
            for w in &words {
                // only words the original can follow stay within a row
                if let Some(r) = dfa.walk(s as u32, w) {
                    assert_eq!(table.walk(table.row_start(s), w), Some(r));
                }
            }
        }
    }

    #[test]
    pub fn built_tables_round_trip() {
        let test_one = |name: &str, table: &Compacted| {
            let dfa = table.decompact().unwrap();
            assert_eq!(dfa.len(), table.offsets.len(), "{name}");
            assert_eq!(&compact(&dfa), table, "{name}");

            // every row keeps its result and its targets
            for s in 0..dfa.len() {
                let start = table.row_start(s) as usize;
                let end = if s + 1 < dfa.len() {
                    table.row_start(s + 1) as usize
                } else {
                    table.data.len()
                };
                let row = &table.data[start..end];
                assert_eq!(row[0], dfa.results[s], "{name} row {s}");
                for a in 0..dfa.alphabet {
                    let expected = dfa.transition(s as u32, a).map(|t| table.row_start(t as usize) as i32);
                    let found = row.get(1 + a).copied().filter(|&t| t != NULL);
                    assert_eq!(found, expected, "{name} row {s} symbol {a}");
                }
            }
        };

        let mut registry = Registry::new();
        let (honors, _) = honor::build(&mut registry).unwrap();
        test_one("honors", &honors);
        let (kokushi, _) = kokushi::build().unwrap();
        test_one("kokushi", &kokushi);
    }
}
