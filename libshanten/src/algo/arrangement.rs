//! Arrangements are the scored pair + mentsu decompositions of one group.
//!
//! An arrangement `(pair, mentsu, value)` says that the group can commit
//! `value` tiles to `mentsu` (complete or partial) mentsu and `pair` tiles to
//! the jantou. A group is summarized by the set of its non-dominated
//! arrangements, stored as a 256 bit set indexed by [`Arrangement::id`].

use std::fmt;

pub const MAX_MENTSU: u8 = 4;
const MENTSU_STRIDE: u32 = 13;
const PAIR_STRIDE: u32 = 5 * MENTSU_STRIDE;

/// Dense id of an arrangement, `pair * 65 + mentsu * 13 + value`.
pub type Id = u8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Arrangement {
    /// Tiles committed to the jantou, 0 to 2.
    pub pair: u8,
    /// Number of mentsu, 0 to 4.
    pub mentsu: u8,
    /// Tiles committed to the mentsu, `mentsu..=3 * mentsu`.
    pub value: u8,
}

impl Arrangement {
    #[inline]
    #[must_use]
    pub const fn new(pair: u8, mentsu: u8, value: u8) -> Self {
        Self {
            pair,
            mentsu,
            value,
        }
    }

    #[inline]
    #[must_use]
    pub const fn id(self) -> Id {
        (self.pair as u32 * PAIR_STRIDE + self.mentsu as u32 * MENTSU_STRIDE + self.value as u32)
            as Id
    }

    #[inline]
    #[must_use]
    pub const fn from_id(id: Id) -> Self {
        let id = id as u32;
        Self {
            pair: (id / PAIR_STRIDE) as u8,
            mentsu: (id % PAIR_STRIDE / MENTSU_STRIDE) as u8,
            value: (id % MENTSU_STRIDE) as u8,
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.pair <= 2
            && self.mentsu <= MAX_MENTSU
            && self.value >= self.mentsu
            && self.value <= 3 * self.mentsu
    }

    /// `self` is never worse than `other` in any combination with other
    /// groups: at least as much jantou, no more mentsu slots used, at least
    /// as many committed tiles.
    #[inline]
    #[must_use]
    pub const fn dominates(self, other: Self) -> bool {
        self.pair >= other.pair && self.mentsu <= other.mentsu && self.value >= other.value
    }

    /// Useful tiles of a whole hand summarized by this arrangement.
    #[inline]
    #[must_use]
    pub const fn total(self) -> u8 {
        self.pair + self.value
    }
}

impl fmt::Display for Arrangement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{},{})", self.pair, self.mentsu, self.value)
    }
}

const fn build_mask(max_pair: u8, max_mentsu: u8) -> [u64; 4] {
    let mut mask = [0; 4];
    let mut pair = 0;
    while pair <= max_pair {
        let mut mentsu = 0;
        while mentsu <= max_mentsu {
            let mut value = 0;
            while value < MENTSU_STRIDE as u8 {
                let id = Arrangement::new(pair, mentsu, value).id() as usize;
                mask[id / 64] |= 1 << (id % 64);
                value += 1;
            }
            mentsu += 1;
        }
        pair += 1;
    }
    mask
}

/// Arrangements that can still take another mentsu.
const MASK_MENTSU_FREE: [u64; 4] = build_mask(2, MAX_MENTSU - 1);
/// Arrangements without any jantou tiles.
const MASK_PAIR_FREE: [u64; 4] = build_mask(0, MAX_MENTSU);

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ArrangementSet([u64; 4]);

impl ArrangementSet {
    pub const EMPTY: Self = Self([0; 4]);
    /// The set containing only `(0, 0, 0)`, i.e. nothing committed yet.
    pub const UNIT: Self = Self([1, 0, 0, 0]);

    #[inline]
    #[must_use]
    pub const fn from_words(words: [u64; 4]) -> Self {
        Self(words)
    }
    #[inline]
    #[must_use]
    pub const fn words(self) -> [u64; 4] {
        self.0
    }

    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0[0] | self.0[1] | self.0[2] | self.0[3] == 0
    }

    #[inline]
    pub fn insert(&mut self, a: Arrangement) {
        let id = a.id() as usize;
        self.0[id / 64] |= 1 << (id % 64);
    }

    #[inline]
    #[must_use]
    pub const fn contains(self, a: Arrangement) -> bool {
        let id = a.id() as usize;
        (self.0[id / 64] >> (id % 64)) & 1 == 1
    }

    #[inline]
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self([
            self.0[0] | other.0[0],
            self.0[1] | other.0[1],
            self.0[2] | other.0[2],
            self.0[3] | other.0[3],
        ])
    }

    #[inline]
    const fn masked(self, mask: [u64; 4]) -> Self {
        Self([
            self.0[0] & mask[0],
            self.0[1] & mask[1],
            self.0[2] & mask[2],
            self.0[3] & mask[3],
        ])
    }

    /// Shift all ids up by `n` bits, dropping what falls off the top.
    #[inline]
    const fn shl(self, n: u32) -> Self {
        let words = (n / 64) as usize;
        let bits = n % 64;
        let mut out = [0; 4];
        let mut i = 3;
        while i >= words {
            let src = i - words;
            let mut v = self.0[src] << bits;
            if bits > 0 && src > 0 {
                v |= self.0[src - 1] >> (64 - bits);
            }
            out[i] = v;
            if i == 0 {
                break;
            }
            i -= 1;
        }
        Self(out)
    }

    /// Add one mentsu worth `value` tiles to every arrangement that still has
    /// a free mentsu slot.
    #[inline]
    #[must_use]
    pub const fn with_mentsu(self, value: u8) -> Self {
        self.masked(MASK_MENTSU_FREE).shl(MENTSU_STRIDE + value as u32)
    }

    /// Add a jantou worth `value` tiles to every arrangement without one.
    #[inline]
    #[must_use]
    pub const fn with_pair(self, value: u8) -> Self {
        self.masked(MASK_PAIR_FREE).shl(PAIR_STRIDE * value as u32)
    }

    /// Account for `count` declared melds, each a complete mentsu.
    #[must_use]
    pub const fn with_melds(self, count: u8) -> Self {
        let mut ret = self;
        let mut i = 0;
        while i < count {
            ret = ret.with_mentsu(3);
            i += 1;
        }
        ret
    }

    pub fn iter(self) -> impl Iterator<Item = Arrangement> {
        self.0.into_iter().enumerate().flat_map(|(w, mut bits)| {
            std::iter::from_fn(move || {
                if bits == 0 {
                    return None;
                }
                let tz = bits.trailing_zeros();
                bits &= bits - 1;
                Some(Arrangement::from_id((w as u32 * 64 + tz) as Id))
            })
        })
    }

    #[must_use]
    pub fn len(self) -> usize {
        self.0.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Remove every arrangement dominated by another one of the set. The
    /// result is the canonical form of the set.
    #[must_use]
    pub fn pruned(self) -> Self {
        let all: Vec<_> = self.iter().collect();
        let mut ret = Self::EMPTY;
        for &a in &all {
            if !all.iter().any(|&b| b != a && b.dominates(a)) {
                ret.insert(a);
            }
        }
        ret
    }

    /// Arrangements of two groups taken together. At most one of them
    /// provides the jantou and the mentsu slots are shared.
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        let mut ret = Self::EMPTY;
        for a in self.iter() {
            for b in other.iter() {
                if a.mentsu + b.mentsu <= MAX_MENTSU {
                    ret.insert(Arrangement::new(
                        a.pair.max(b.pair),
                        a.mentsu + b.mentsu,
                        a.value + b.value,
                    ));
                }
            }
        }
        ret.pruned()
    }

    /// Most useful tiles over all arrangements.
    #[must_use]
    pub fn best_total(self) -> u8 {
        self.iter().map(Arrangement::total).max().unwrap_or(0)
    }

    /// Shanten of a whole hand whose four groups have been merged into `self`.
    #[must_use]
    pub fn shanten(self) -> i8 {
        13 - self.best_total() as i8
    }
}

impl fmt::Debug for ArrangementSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self, f)
    }
}

impl fmt::Display for ArrangementSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, a) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            fmt::Display::fmt(&a, f)?;
        }
        f.write_str("}")
    }
}

impl FromIterator<Arrangement> for ArrangementSet {
    fn from_iter<I: IntoIterator<Item = Arrangement>>(iter: I) -> Self {
        let mut ret = Self::EMPTY;
        iter.into_iter().for_each(|a| ret.insert(a));
        ret
    }
}

#[cfg(test)]
pub mod test {
    use super::*;

    fn set(items: &[(u8, u8, u8)]) -> ArrangementSet {
        items.iter().map(|&(p, c, v)| Arrangement::new(p, c, v)).collect()
    }

    #[test]
    pub fn ids() {
        let mut seen = [false; 256];
        for pair in 0..=2 {
            for mentsu in 0..=MAX_MENTSU {
                for value in mentsu..=3 * mentsu {
                    let a = Arrangement::new(pair, mentsu, value);
                    assert!(a.is_valid());
                    assert_eq!(Arrangement::from_id(a.id()), a);
                    assert!(!seen[a.id() as usize]);
                    seen[a.id() as usize] = true;
                }
            }
        }
        assert!(Arrangement::new(2, 4, 12).id() < 195);
        assert!(!Arrangement::new(0, 1, 4).is_valid());
    }

    #[test]
    pub fn shifts() {
        let s = set(&[(0, 0, 0), (1, 3, 9), (0, 4, 12)]);
        assert_eq!(s.with_mentsu(2), set(&[(0, 1, 2), (1, 4, 11)]));
        assert_eq!(s.with_pair(2), set(&[(2, 0, 0), (2, 4, 12)]));
        assert_eq!(s.with_pair(1), set(&[(1, 0, 0), (1, 4, 12)]));
        assert_eq!(ArrangementSet::UNIT.with_melds(4), set(&[(0, 4, 12)]));
        assert_eq!(ArrangementSet::UNIT.with_melds(5), ArrangementSet::EMPTY);
        // crossing word boundaries
        assert_eq!(set(&[(0, 4, 12)]).with_pair(1), set(&[(1, 4, 12)]));
        assert_eq!(set(&[(1, 4, 12)]).with_pair(1), ArrangementSet::EMPTY);
        assert_eq!(set(&[(0, 4, 12)]).with_pair(2), set(&[(2, 4, 12)]));
    }

    #[test]
    pub fn prune_and_merge() {
        let s = set(&[(0, 1, 3), (0, 2, 3), (1, 1, 2), (0, 1, 2)]);
        assert_eq!(s.pruned(), set(&[(0, 1, 3), (1, 1, 2)]));

        let a = set(&[(0, 2, 6), (2, 1, 3)]);
        let b = set(&[(0, 3, 9), (1, 2, 6)]);
        let merged = a.merge(b);
        assert_eq!(merged, set(&[(2, 3, 9), (2, 4, 12)]));
        assert_eq!(merged.shanten(), -1);
        assert_eq!(set(&[(0, 0, 0)]).shanten(), 13);
        assert_eq!(ArrangementSet::UNIT.merge(a), a);
    }
}
