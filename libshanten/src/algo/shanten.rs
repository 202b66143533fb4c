//! Classic, non-incremental shanten calculation.
//!
//! The regular form is evaluated by a direct search over all 34 tile types
//! with the same shape and availability rules as the arrangement analysis, but
//! without any tables. It is slow compared to the incremental engine and only
//! meant for cross validation.

use crate::tile::{TILE_TYPES, YAOCHUU};
use crate::tu8;
use super::arrangement::MAX_MENTSU;

struct Search<'a> {
    concealed: &'a [u8; TILE_TYPES],
    melded: &'a [u8; TILE_TYPES],
    left: [u8; TILE_TYPES],
    reserved: [u8; TILE_TYPES],
    max_mentsu: u8,
    best: u8,
}

impl Search<'_> {
    #[inline]
    fn free(&self, i: usize) -> u8 {
        4 - self.concealed[i] - self.melded[i] - self.reserved[i]
    }

    /// Apply a shape at anchor `i` taking `take` tiles from `i`, `i + 1`,
    /// `i + 2` and waiting on `wait` tiles at `i - 1..=i + 2`, then continue.
    fn with_shape(
        &mut self,
        i: usize,
        take: [u8; 3],
        wait: (usize, u8),
        mentsu: u8,
        pair: u8,
        value: u8,
    ) {
        for (d, &n) in take.iter().enumerate().filter(|&(_, &n)| n > 0) {
            self.left[i + d] -= n;
        }
        self.reserved[wait.0] += wait.1;
        self.dfs(i, mentsu, pair, value);
        self.reserved[wait.0] -= wait.1;
        for (d, &n) in take.iter().enumerate().filter(|&(_, &n)| n > 0) {
            self.left[i + d] += n;
        }
    }

    fn dfs(&mut self, mut i: usize, mentsu: u8, pair: u8, value: u8) {
        while i < TILE_TYPES && self.left[i] == 0 {
            i += 1;
        }
        if i == TILE_TYPES {
            self.best = self.best.max(value + pair);
            return;
        }
        let remaining: u8 = self.left[i..].iter().sum();
        if value + pair + remaining <= self.best {
            return;
        }

        let count = self.left[i];
        self.left[i] = 0;
        self.dfs(i + 1, mentsu, pair, value);
        self.left[i] = count;

        if pair == 0 {
            if count >= 2 {
                self.with_shape(i, [2, 0, 0], (i, 0), mentsu, 2, value);
            }
            if self.free(i) >= 1 {
                self.with_shape(i, [1, 0, 0], (i, 1), mentsu, 1, value);
            }
        }
        if mentsu >= self.max_mentsu {
            return;
        }
        if count >= 3 {
            self.with_shape(i, [3, 0, 0], (i, 0), mentsu + 1, pair, value + 3);
        }
        if count >= 2 && self.free(i) >= 1 {
            self.with_shape(i, [2, 0, 0], (i, 1), mentsu + 1, pair, value + 2);
        }
        if self.free(i) >= 2 {
            self.with_shape(i, [1, 0, 0], (i, 2), mentsu + 1, pair, value + 1);
        }
        if i >= tu8!(E) as usize {
            return;
        }
        let num = i % 9;
        if num <= 6 && self.left[i + 1] >= 1 && self.left[i + 2] >= 1 {
            self.with_shape(i, [1, 1, 1], (i, 0), mentsu + 1, pair, value + 3);
        }
        if num <= 7 && self.left[i + 1] >= 1 {
            if num <= 6 && self.free(i + 2) >= 1 {
                self.with_shape(i, [1, 1, 0], (i + 2, 1), mentsu + 1, pair, value + 2);
            }
            if num >= 1 && self.free(i - 1) >= 1 {
                self.with_shape(i, [1, 1, 0], (i - 1, 1), mentsu + 1, pair, value + 2);
            }
        }
        if num <= 6 && self.left[i + 2] >= 1 && self.free(i + 1) >= 1 {
            self.with_shape(i, [1, 0, 1], (i + 1, 1), mentsu + 1, pair, value + 2);
        }
    }
}

/// Regular form shanten. `melded` holds the tiles of the `meld_count`
/// declared melds, which count as complete mentsu.
#[must_use]
pub fn calc_normal(concealed: &[u8; TILE_TYPES], melded: &[u8; TILE_TYPES], meld_count: u8) -> i8 {
    assert!(meld_count <= MAX_MENTSU);
    let mut search = Search {
        concealed,
        melded,
        left: *concealed,
        reserved: [0; TILE_TYPES],
        max_mentsu: MAX_MENTSU - meld_count,
        best: 0,
    };
    search.dfs(0, 0, 0, 0);
    13 - (search.best + 3 * meld_count) as i8
}

#[must_use]
pub fn calc_chiitoi(concealed: &[u8; TILE_TYPES]) -> i8 {
    let pairs = concealed.iter().filter(|&&c| c >= 2).count() as i8;
    let kinds = concealed.iter().filter(|&&c| c >= 1).count() as i8;
    6 - pairs + (7 - kinds).max(0)
}

#[must_use]
pub fn calc_kokushi(concealed: &[u8; TILE_TYPES]) -> i8 {
    let kinds = YAOCHUU.iter().filter(|t| concealed[t.as_usize()] >= 1).count() as i8;
    let has_pair = YAOCHUU.iter().any(|t| concealed[t.as_usize()] >= 2);
    13 - kinds - has_pair as i8
}

/// Best of all three forms. Declared melds rule out the irregular ones.
#[must_use]
pub fn calc_all(concealed: &[u8; TILE_TYPES], melded: &[u8; TILE_TYPES], meld_count: u8) -> i8 {
    let normal = calc_normal(concealed, melded, meld_count);
    if meld_count > 0 {
        normal
    } else {
        normal.min(calc_chiitoi(concealed)).min(calc_kokushi(concealed))
    }
}

#[cfg(test)]
pub mod test {
    use super::*;
    use crate::hand::hand;
    use crate::tuz;

    #[test]
    pub fn closed_hands() {
        let test_one = |tehai: &str, normal: i8, chiitoi: i8, kokushi: i8, all: i8| {
            let tiles = hand(tehai).unwrap();
            assert_eq!(calc_normal(&tiles, &[0; 34], 0), normal, "normal {tehai}");
            assert_eq!(calc_chiitoi(&tiles), chiitoi, "chiitoi {tehai}");
            assert_eq!(calc_kokushi(&tiles), kokushi, "kokushi {tehai}");
            assert_eq!(calc_all(&tiles, &[0; 34], 0), all, "all {tehai}");
        };
        test_one("123456789m 12344p", -1, 5, 10, -1);
        test_one("123456789m 1234p", 0, 6, 10, 0);
        test_one("13579m 13579p 135s", 4, 6, 8, 4);
        test_one("19m 19p 19s 1234567z", 8, 6, 0, 0);
        test_one("114477m 114477p 11s", 3, -1, 9, -1);
        test_one("1112345678999m", 0, 4, 10, 0);
        test_one("1122334455667z", 3, 0, 5, 0);
    }

    #[test]
    pub fn exhausted_waits() {
        // 1111m: no fifth copy to wait on as a pair
        let tiles = hand("1111m 234p 567p 789s").unwrap();
        assert_eq!(calc_normal(&tiles, &[0; 34], 0), 1);

        let tiles = hand("123m 456m 789m 46p 11s").unwrap();
        assert_eq!(calc_normal(&tiles, &[0; 34], 0), 0);

        // with every 5p in a kan the 46p kanchan is dead
        let tiles = hand("123m 456m 46p 11s").unwrap();
        let mut melded = [0; 34];
        melded[tuz!(7m)] = 1;
        melded[tuz!(8m)] = 1;
        melded[tuz!(9m)] = 1;
        assert_eq!(calc_normal(&tiles, &melded, 1), 0);
        let mut melded = [0; 34];
        melded[tuz!(5p)] = 4;
        assert_eq!(calc_normal(&tiles, &melded, 1), 1);
    }
}
