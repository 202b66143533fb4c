//! Tile count distributions of a single group (one suit or the honors).

use tinyvec::ArrayVec;

/// Per tile type counts of one group, 9 entries for a suit and 7 for honors.
pub type Combination = ArrayVec<[u8; 9]>;

pub const SUIT_LEN: usize = 9;
pub const HONOR_LEN: usize = 7;

/// Positional base-5 encoding, position 0 being the least significant digit.
#[inline]
#[must_use]
pub fn base5_hash(counts: &[u8]) -> u32 {
    counts.iter().rev().fold(0, |acc, &c| acc * 5 + c as u32)
}

/// Inverse of [`base5_hash`].
#[must_use]
pub fn from_base5_hash(mut hash: u32, len: usize) -> Combination {
    (0..len)
        .map(|_| {
            let c = (hash % 5) as u8;
            hash /= 5;
            c
        })
        .collect()
}

/// Sum of counts weighted by the distance from the middle position. A
/// combination and its mirror have weights of opposite signs.
#[inline]
#[must_use]
pub fn mirror_weight(counts: &[u8]) -> i32 {
    let n = counts.len() as i32;
    counts
        .iter()
        .enumerate()
        .map(|(i, &c)| c as i32 * (2 * i as i32 + 1 - n))
        .sum()
}

#[inline]
#[must_use]
pub fn mirrored(counts: &[u8]) -> Combination {
    counts.iter().rev().copied().collect()
}

/// Generates concealed combinations in lexicographic order, position 0 being
/// the most significant.
#[derive(Debug, Clone)]
pub struct CombinationEnumerator {
    len: usize,
    max_total: u8,
    exact: bool,
    /// Copies per position already consumed by declared melds.
    melded: Combination,
    /// Keep only combinations with a non-negative mirror weight.
    canonical: bool,
}

impl CombinationEnumerator {
    #[must_use]
    pub fn new(len: usize, max_total: u8) -> Self {
        let mut melded = Combination::new();
        melded.resize(len, 0);
        Self {
            len,
            max_total,
            exact: false,
            melded,
            canonical: false,
        }
    }

    /// Only yield combinations with exactly `max_total` tiles.
    #[must_use]
    pub fn exact(mut self) -> Self {
        self.exact = true;
        self
    }

    #[must_use]
    pub fn with_melded(mut self, melded: &[u8]) -> Self {
        assert_eq!(melded.len(), self.len, "melded combination length");
        self.melded = melded.iter().copied().collect();
        self
    }

    #[must_use]
    pub fn canonical(mut self) -> Self {
        self.canonical = true;
        self
    }

    /// Impossible totals simply produce nothing.
    #[must_use]
    pub fn enumerate(&self) -> Vec<Combination> {
        let mut ret = vec![];
        let mut cur = Combination::new();
        self.recurse(&mut cur, self.max_total, &mut ret);
        ret
    }

    fn recurse(&self, cur: &mut Combination, left: u8, out: &mut Vec<Combination>) {
        let pos = cur.len();
        if pos == self.len {
            if (!self.exact || left == 0) && (!self.canonical || mirror_weight(cur) >= 0) {
                out.push(cur.clone());
            }
            return;
        }
        let cap = (4 - self.melded[pos]).min(left);
        for c in 0..=cap {
            cur.push(c);
            self.recurse(cur, left - c, out);
            cur.pop();
        }
    }
}

#[cfg(test)]
pub mod test {
    use super::*;

    #[test]
    pub fn hash() {
        let c: Combination = [1, 0, 0, 0, 0, 0, 0, 0, 4].into_iter().collect();
        assert_eq!(base5_hash(&c), 1 + 4 * 5_u32.pow(8));
        assert_eq!(from_base5_hash(base5_hash(&c), SUIT_LEN), c);
        assert_eq!(base5_hash(&[0; 7]), 0);
    }

    #[test]
    pub fn weight() {
        let c = [3, 0, 0, 0, 0, 0, 0, 0, 1];
        assert!(mirror_weight(&c) < 0);
        assert_eq!(mirror_weight(&mirrored(&c)), -mirror_weight(&c));
        assert_eq!(mirror_weight(&[0, 0, 0, 0, 4, 0, 0, 0, 0]), 0);
    }

    #[test]
    pub fn enumerate() {
        let test_one = |e: CombinationEnumerator, expected: usize| {
            let all = e.enumerate();
            assert_eq!(all.len(), expected, "{e:?}");
            assert!(all.windows(2).all(|w| w[0] < w[1]));
        };
        test_one(CombinationEnumerator::new(SUIT_LEN, 14), 405_350);
        test_one(CombinationEnumerator::new(SUIT_LEN, 1), 10);
        test_one(CombinationEnumerator::new(SUIT_LEN, 1).exact(), 9);
        test_one(CombinationEnumerator::new(HONOR_LEN, 2).exact(), 28);
        test_one(CombinationEnumerator::new(SUIT_LEN, 0), 1);

        let melded = [4, 4, 4, 4, 4, 4, 4, 4, 4];
        test_one(CombinationEnumerator::new(SUIT_LEN, 3).with_melded(&melded), 1);
        test_one(CombinationEnumerator::new(SUIT_LEN, 3).with_melded(&melded).exact(), 0);

        let all = CombinationEnumerator::new(SUIT_LEN, 14).enumerate();
        let canonical = CombinationEnumerator::new(SUIT_LEN, 14).canonical().enumerate();
        let symmetric = all.iter().filter(|c| mirror_weight(c) == 0).count();
        assert_eq!(canonical.len() * 2 - symmetric, all.len());
    }
}
