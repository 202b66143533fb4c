/// Progressive seven pairs classifier. Needs no table, the shanten only
/// depends on how many types are held at all and how many at least twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChiitoitsuClassifier {
    pairs: u8,
    kinds: u8,
}

impl ChiitoitsuClassifier {
    /// `prior` concealed copies of the drawn type.
    #[inline]
    pub const fn draw(&mut self, prior: u8) {
        match prior {
            0 => self.kinds += 1,
            1 => self.pairs += 1,
            _ => (),
        }
    }

    #[inline]
    pub const fn discard(&mut self, prior: u8) {
        match prior {
            1 => self.kinds -= 1,
            2 => self.pairs -= 1,
            _ => (),
        }
    }

    #[inline]
    #[must_use]
    pub const fn shanten(self) -> i8 {
        let missing_kinds = if self.kinds < 7 { 7 - self.kinds } else { 0 };
        6 - self.pairs as i8 + missing_kinds as i8
    }
}

#[cfg(test)]
pub mod test {
    use super::*;
    use crate::algo::shanten::calc_chiitoi;
    use crate::hand::hand;

    #[test]
    pub fn incremental() {
        let test_one = |tehai: &str| {
            let tiles = hand(tehai).unwrap();
            let mut c = ChiitoitsuClassifier::default();
            let mut held = [0; 34];
            for (t, &n) in tiles.iter().enumerate() {
                for _ in 0..n {
                    c.draw(held[t]);
                    held[t] += 1;
                }
            }
            assert_eq!(c.shanten(), calc_chiitoi(&tiles), "{tehai}");
            for (t, &n) in tiles.iter().enumerate() {
                for _ in 0..n {
                    c.discard(held[t]);
                    held[t] -= 1;
                }
            }
            assert_eq!(c, ChiitoitsuClassifier::default());
        };
        test_one("114477m 114477p 11s");
        test_one("1111m 2222p 3333s 7z");
        test_one("19m 19p 19s 1234567z");
        test_one("1122m 3344p 556s 77z");
    }
}
