//! Hopcroft partition refinement.

use super::dfa::{Dfa, NULL};
use std::collections::VecDeque;

/// Blocks of a partition of `0..n`, each stored as a contiguous range of
/// `elems`. Marked elements of a block are kept at the front of its range.
struct Partition {
    elems: Vec<u32>,
    loc: Vec<u32>,
    block_of: Vec<u32>,
    first: Vec<u32>,
    end: Vec<u32>,
    marked: Vec<u32>,
    touched: Vec<u32>,
}

impl Partition {
    /// `keys` decides the initial blocks, equal keys share a block.
    fn new(keys: &[i32]) -> Self {
        let n = keys.len();
        let mut elems: Vec<u32> = (0..n as u32).collect();
        elems.sort_by_key(|&s| (keys[s as usize], s));

        let mut loc = vec![0; n];
        let mut block_of = vec![0; n];
        let mut first = vec![];
        let mut end = vec![];
        for (pos, &s) in elems.iter().enumerate() {
            if pos == 0 || keys[elems[pos - 1] as usize] != keys[s as usize] {
                if pos > 0 {
                    end.push(pos as u32);
                }
                first.push(pos as u32);
            }
            loc[s as usize] = pos as u32;
            block_of[s as usize] = (first.len() - 1) as u32;
        }
        if n > 0 {
            end.push(n as u32);
        }
        let marked = vec![0; first.len()];

        Self {
            elems,
            loc,
            block_of,
            first,
            end,
            marked,
            touched: vec![],
        }
    }

    #[inline]
    fn blocks(&self) -> usize {
        self.first.len()
    }

    #[inline]
    fn size(&self, b: u32) -> u32 {
        self.end[b as usize] - self.first[b as usize]
    }

    fn members(&self, b: u32) -> &[u32] {
        &self.elems[self.first[b as usize] as usize..self.end[b as usize] as usize]
    }

    fn mark(&mut self, s: u32) {
        let b = self.block_of[s as usize] as usize;
        let boundary = self.first[b] + self.marked[b];
        let pos = self.loc[s as usize];
        if pos < boundary {
            return;
        }
        if self.marked[b] == 0 {
            self.touched.push(b as u32);
        }
        let other = self.elems[boundary as usize];
        self.elems.swap(pos as usize, boundary as usize);
        self.loc[other as usize] = pos;
        self.loc[s as usize] = boundary;
        self.marked[b] += 1;
    }

    /// Split every touched block into its marked and unmarked part. Returns
    /// `(old, new)` for each split, `new` being the marked part.
    fn split(&mut self, out: &mut Vec<(u32, u32)>) {
        out.clear();
        while let Some(b) = self.touched.pop() {
            let bi = b as usize;
            let marked = self.marked[bi];
            self.marked[bi] = 0;
            if marked == self.end[bi] - self.first[bi] {
                continue;
            }
            let new = self.first.len() as u32;
            let start = self.first[bi];
            self.first.push(start);
            self.end.push(start + marked);
            self.marked.push(0);
            self.first[bi] = start + marked;
            for pos in start..start + marked {
                let s = self.elems[pos as usize];
                self.block_of[s as usize] = new;
            }
            out.push((b, new));
        }
    }
}

/// Predecessors per symbol and target, in CSR layout.
struct Inverse {
    states: usize,
    start: Vec<u32>,
    preds: Vec<u32>,
}

impl Inverse {
    fn new(alphabet: usize, states: usize, target: impl Fn(usize, usize) -> usize) -> Self {
        let mut start = vec![0_u32; alphabet * states + 1];
        for s in 0..states {
            for a in 0..alphabet {
                start[a * states + target(s, a) + 1] += 1;
            }
        }
        for i in 1..start.len() {
            start[i] += start[i - 1];
        }
        let mut fill = start.clone();
        let mut preds = vec![0; alphabet * states];
        for s in 0..states {
            for a in 0..alphabet {
                let slot = &mut fill[a * states + target(s, a)];
                preds[*slot as usize] = s as u32;
                *slot += 1;
            }
        }
        Self { states, start, preds }
    }

    #[inline]
    fn of(&self, symbol: usize, target: u32) -> &[u32] {
        let i = symbol * self.states + target as usize;
        &self.preds[self.start[i] as usize..self.start[i + 1] as usize]
    }
}

/// Minimal DFA accepting the same language with the same results from every
/// entry.
///
/// Dead states, from which no result can be reached, disappear and
/// transitions into them become null. States are renumbered in breadth first
/// order from the entries, so the first entry is always state 0.
#[must_use]
pub fn minimize(dfa: &Dfa) -> Dfa {
    let n = dfa.len();
    let alphabet = dfa.alphabet;
    let sink = n;
    let total = n + 1;

    let target = |s: usize, a: usize| {
        if s == sink {
            return sink;
        }
        let t = dfa.transitions[s * alphabet + a];
        if t == NULL { sink } else { t as usize }
    };
    let inverse = Inverse::new(alphabet, total, target);

    let keys: Vec<_> = dfa.results.iter().copied().chain([NULL]).collect();
    let mut partition = Partition::new(&keys);

    let mut in_worklist = vec![true; partition.blocks()];
    let mut worklist: Vec<u32> = (0..partition.blocks() as u32).collect();
    let mut splitter = vec![];
    let mut splits = vec![];

    while let Some(b) = worklist.pop() {
        in_worklist[b as usize] = false;
        splitter.clear();
        splitter.extend_from_slice(partition.members(b));

        for a in 0..alphabet {
            for &s in &splitter {
                for &p in inverse.of(a, s) {
                    partition.mark(p);
                }
            }
            partition.split(&mut splits);
            for &(old, new) in &splits {
                in_worklist.push(false);
                if in_worklist[old as usize] || partition.size(new) <= partition.size(old) {
                    worklist.push(new);
                    in_worklist[new as usize] = true;
                } else {
                    worklist.push(old);
                    in_worklist[old as usize] = true;
                }
            }
        }
    }

    let sink_block = partition.block_of[sink];
    let mut ids = vec![NULL; partition.blocks()];
    let mut order = vec![];
    let mut queue = VecDeque::new();
    let mut entries = Vec::with_capacity(dfa.entries.len());
    let mut discover = |b: u32, ids: &mut Vec<i32>, queue: &mut VecDeque<u32>| {
        if ids[b as usize] == NULL {
            ids[b as usize] = order.len() as i32;
            order.push(b);
            queue.push_back(b);
        }
        ids[b as usize] as u32
    };
    for &e in &dfa.entries {
        let b = partition.block_of[e as usize];
        entries.push(discover(b, &mut ids, &mut queue));
        while let Some(b) = queue.pop_front() {
            let rep = partition.members(b)[0] as usize;
            for a in 0..alphabet {
                let t = partition.block_of[target(rep, a)];
                if t != sink_block {
                    discover(t, &mut ids, &mut queue);
                }
            }
        }
    }

    let mut ret = Dfa::new(alphabet);
    ret.entries = entries;
    for &b in &order {
        let rep = partition.members(b)[0] as usize;
        let s = ret.add_state();
        for a in 0..alphabet {
            let t = partition.block_of[target(rep, a)];
            if t != sink_block {
                ret.set_transition(s, a, ids[t as usize] as u32);
            }
        }
        ret.results[s as usize] = keys[rep];
    }
    ret
}

#[cfg(test)]
pub mod test {
    use super::*;
    use crate::build::dfa::TrieBuilder;
    use rand::prelude::*;
    use rand_chacha::ChaCha8Rng;

    #[test]
    pub fn suffix_sharing() {
        // every word of length 3 over {0, 1} with its parity as the result
        let mut trie = TrieBuilder::new(2);
        for w in 0..8_u8 {
            let word = [w >> 2 & 1, w >> 1 & 1, w & 1];
            trie.insert(&word, (w.count_ones() % 2) as i32).unwrap();
        }
        let dfa = trie.finish();
        assert_eq!(dfa.len(), 15);

        let min = minimize(&dfa);
        // 1 root, 2 parities after each of the next two levels, 2 results
        assert_eq!(min.len(), 7);
        assert_eq!(min.entries, vec![0]);
        for w in 0..8_u8 {
            let word = [w >> 2 & 1, w >> 1 & 1, w & 1];
            assert_eq!(min.walk(0, &word), Some((w.count_ones() % 2) as i32));
        }
        assert_eq!(min.walk(0, &[1, 1]), None);
    }

    #[test]
    pub fn dead_states() {
        let mut dfa = Dfa::new(2);
        let a = dfa.add_state();
        let b = dfa.add_state();
        let c = dfa.add_state();
        dfa.entries.push(a);
        dfa.set_transition(a, 0, b);
        dfa.set_transition(a, 1, c);
        dfa.set_transition(c, 1, c);
        dfa.set_result(b, 3).unwrap();

        let min = minimize(&dfa);
        assert_eq!(min.len(), 2);
        assert_eq!(min.transition(0, 1), None);
        assert_eq!(min.walk(0, &[0]), Some(3));
    }

    #[test]
    pub fn random_tries() {
        let mut rng = ChaCha8Rng::seed_from_u64(0x5eed);
        for _ in 0..20 {
            let alphabet = rng.random_range(2..5);
            let mut words = vec![];
            let mut trie = TrieBuilder::new(alphabet);
            for _ in 0..200 {
                let len = rng.random_range(0..7);
                let word: Vec<u8> = (0..len).map(|_| rng.random_range(0..alphabet) as u8).collect();
                // results decided by the word itself keep insertions consistent
                let value = word.iter().map(|&x| x as i32).sum::<i32>() % 3;
                trie.insert(&word, value).unwrap();
                words.push((word, value));
            }
            let dfa = trie.finish();
            let min = minimize(&dfa);
            assert!(min.len() <= dfa.len());
            for (word, value) in &words {
                assert_eq!(min.walk(0, word), Some(*value));
            }
            // minimizing twice changes nothing
            assert_eq!(minimize(&min), min);

            let probe: Vec<u8> = (0..4).map(|_| rng.random_range(0..alphabet) as u8).collect();
            assert_eq!(min.walk(0, &probe), dfa.walk(0, &probe));
        }
    }

    #[test]
    pub fn shared_entries() {
        let mut a = TrieBuilder::new(2);
        a.insert(&[0, 1], 1).unwrap();
        let mut b = TrieBuilder::new(2);
        b.insert(&[1], 1).unwrap();
        let mut union = a.finish();
        union.append(&b.finish());

        let min = minimize(&union);
        assert_eq!(min.entries.len(), 2);
        assert_eq!(min.entries[0], 0);
        // the second entry is the suffix state of the first
        assert_eq!(min.transition(0, 0), Some(min.entries[1]));
        assert_eq!(min.len(), 3);
    }
}
