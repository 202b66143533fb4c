use super::table_step;

pub const KOKUSHI_ACTIONS: usize = 6;

/// A change to one terminal or honor type, by the concealed copies held right
/// before it. Copies beyond the second never matter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KokushiAction {
    Draw { prior: u8 },
    Discard { prior: u8 },
}

impl KokushiAction {
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Draw { prior } => if prior >= 2 { 2 } else { prior },
            Self::Discard { prior } => {
                assert!(prior >= 1);
                if prior >= 3 { 5 } else { 2 + prior }
            }
        }
    }
}

/// Progressive thirteen orphans classifier. The table value is the number of
/// useful tiles, the distinct terminal and honor kinds plus one for a pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KokushiClassifier {
    pos: u32,
}

impl KokushiClassifier {
    #[inline]
    pub fn apply(&mut self, table: &[i32], action: KokushiAction) {
        self.pos = table_step(table, self.pos, action.code() as usize);
    }

    #[inline]
    #[must_use]
    pub fn shanten(self, table: &[i32]) -> i8 {
        13 - table[self.pos as usize] as i8
    }
}

#[cfg(test)]
pub mod test {
    use super::*;
    use crate::algo::shanten::calc_kokushi;
    use crate::classifier::test_tables;
    use crate::tile::YAOCHUU;
    use rand::prelude::*;
    use rand_chacha::ChaCha8Rng;

    #[test]
    pub fn codes() {
        let test_one = |action, code| assert_eq!(KokushiAction::code(action), code);
        test_one(KokushiAction::Draw { prior: 0 }, 0);
        test_one(KokushiAction::Draw { prior: 1 }, 1);
        test_one(KokushiAction::Draw { prior: 3 }, 2);
        test_one(KokushiAction::Discard { prior: 1 }, 3);
        test_one(KokushiAction::Discard { prior: 2 }, 4);
        test_one(KokushiAction::Discard { prior: 4 }, 5);
    }

    #[test]
    pub fn random_walk() {
        let tables = test_tables();
        let table = &tables.kokushi;
        let mut rng = ChaCha8Rng::seed_from_u64(13);

        let mut tiles = [0_u8; 34];
        let mut c = KokushiClassifier::default();
        assert_eq!(c.shanten(table), 13);
        for _ in 0..2000 {
            let held: u8 = YAOCHUU.iter().map(|t| tiles[t.as_usize()]).sum();
            let t = YAOCHUU[rng.random_range(0..YAOCHUU.len())].as_usize();
            if (held < 14 && rng.random_bool(0.5)) || held == 0 {
                if tiles[t] == 4 {
                    continue;
                }
                c.apply(table, KokushiAction::Draw { prior: tiles[t] });
                tiles[t] += 1;
            } else {
                if tiles[t] == 0 {
                    continue;
                }
                c.apply(table, KokushiAction::Discard { prior: tiles[t] });
                tiles[t] -= 1;
            }
            assert_eq!(c.shanten(table), calc_kokushi(&tiles), "{tiles:?}");
        }
    }
}
