//! Arrangement analysis of a single group.
//!
//! Shapes are always anchored at the leftmost tile still unassigned, so every
//! decomposition is produced exactly once up to the order of shapes sharing an
//! anchor. The recursion is memoized on the local state around the anchor,
//! which is small because shapes reach at most two positions ahead and one
//! behind.

use super::arrangement::ArrangementSet;
use ahash::AHashMap;

/// Which shapes a group allows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKind {
    /// Numbered suit, sequences allowed.
    Suit,
    /// Honors, only pairs and triplets.
    Honor,
}

/// Reusable analyzer, the memo keeps its allocation between calls.
#[derive(Debug)]
pub struct Analyzer {
    kind: GroupKind,
    concealed: [u8; 9],
    melded: [u8; 9],
    len: usize,
    memo: AHashMap<u32, ArrangementSet>,
}

impl Analyzer {
    #[must_use]
    pub fn new(kind: GroupKind) -> Self {
        Self {
            kind,
            concealed: [0; 9],
            melded: [0; 9],
            len: 0,
            memo: AHashMap::with_capacity(1024),
        }
    }

    /// Canonical arrangement set of a group.
    ///
    /// `melded` holds the copies per tile type locked in the `meld_count`
    /// declared melds of this group. They are never part of a shape but make
    /// the corresponding tiles unavailable to wait on.
    pub fn analyze(&mut self, concealed: &[u8], melded: &[u8], meld_count: u8) -> ArrangementSet {
        assert_eq!(concealed.len(), melded.len());
        assert!(concealed.len() <= 9);
        self.len = concealed.len();
        self.concealed[..self.len].copy_from_slice(concealed);
        self.melded[..self.len].copy_from_slice(melded);
        for i in 0..self.len {
            assert!(
                self.concealed[i] + self.melded[i] <= 4,
                "more than 4 copies at position {i}",
            );
        }
        self.memo.clear();

        let at = |i: usize| if i < self.len { self.concealed[i] } else { 0 };
        let (x0, x1, x2) = (at(0), at(1), at(2));
        let found = self.solve(0, [x0, x1, x2], [0; 4]);
        found.with_melds(meld_count).pruned()
    }

    /// Copies of position `i` nobody holds or waits on yet.
    #[inline]
    fn free(&self, i: usize, reserved: u8) -> u8 {
        4 - self.concealed[i] - self.melded[i] - reserved
    }

    /// `x` holds the unassigned counts at `i..i + 3`, `r` the copies reserved
    /// as waits at `i - 1..i + 3`.
    fn solve(&mut self, i: usize, x: [u8; 3], r: [u8; 4]) -> ArrangementSet {
        if i == self.len {
            return ArrangementSet::UNIT;
        }
        let key = (i as u32)
            | (x[0] as u32) << 4
            | (x[1] as u32) << 7
            | (x[2] as u32) << 10
            | (r[0] as u32) << 13
            | (r[1] as u32) << 16
            | (r[2] as u32) << 19
            | (r[3] as u32) << 22;
        if let Some(&found) = self.memo.get(&key) {
            return found;
        }

        let next = if i + 3 < self.len { self.concealed[i + 3] } else { 0 };
        // leave whatever is left at `i` unused
        let mut ret = self.solve(i + 1, [x[1], x[2], next], [r[1], r[2], r[3], 0]);

        if x[0] > 0 {
            let [x0, x1, x2] = x;
            let [rm1, r0, r1, r2] = r;
            let free0 = self.free(i, r0);

            // jantou: complete, or a single tile waiting for its partner
            if x0 >= 2 {
                ret = ret.union(self.solve(i, [x0 - 2, x1, x2], r).with_pair(2));
            }
            if free0 >= 1 {
                ret = ret.union(self.solve(i, [x0 - 1, x1, x2], [rm1, r0 + 1, r1, r2]).with_pair(1));
            }

            // koutsu, complete or missing one or two tiles
            if x0 >= 3 {
                ret = ret.union(self.solve(i, [x0 - 3, x1, x2], r).with_mentsu(3));
            }
            if x0 >= 2 && free0 >= 1 {
                ret = ret.union(self.solve(i, [x0 - 2, x1, x2], [rm1, r0 + 1, r1, r2]).with_mentsu(2));
            }
            if free0 >= 2 {
                ret = ret.union(self.solve(i, [x0 - 1, x1, x2], [rm1, r0 + 2, r1, r2]).with_mentsu(1));
            }

            if self.kind == GroupKind::Suit {
                if i + 2 < self.len && x1 >= 1 && x2 >= 1 {
                    ret = ret.union(self.solve(i, [x0 - 1, x1 - 1, x2 - 1], r).with_mentsu(3));
                }
                // ryanmen or penchan, waiting on either side
                if i + 1 < self.len && x1 >= 1 {
                    if i + 2 < self.len && self.free(i + 2, r2) >= 1 {
                        ret = ret.union(
                            self.solve(i, [x0 - 1, x1 - 1, x2], [rm1, r0, r1, r2 + 1])
                                .with_mentsu(2),
                        );
                    }
                    if i >= 1 && self.free(i - 1, rm1) >= 1 {
                        ret = ret.union(
                            self.solve(i, [x0 - 1, x1 - 1, x2], [rm1 + 1, r0, r1, r2])
                                .with_mentsu(2),
                        );
                    }
                }
                // kanchan
                if i + 2 < self.len && x2 >= 1 && self.free(i + 1, r1) >= 1 {
                    ret = ret.union(
                        self.solve(i, [x0 - 1, x1, x2 - 1], [rm1, r0, r1 + 1, r2]).with_mentsu(2),
                    );
                }
            }
        }

        self.memo.insert(key, ret);
        ret
    }
}

/// Canonical arrangement set of a group without reusing an analyzer.
pub fn analyze(kind: GroupKind, concealed: &[u8], melded: &[u8], meld_count: u8) -> ArrangementSet {
    Analyzer::new(kind).analyze(concealed, melded, meld_count)
}
