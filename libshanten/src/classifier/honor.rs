use super::table_step;

/// Number of distinct honor actions, the alphabet of the honor table.
pub const HONOR_ACTIONS: usize = 15;

/// A change to one honor type, described only by what the hand held of that
/// type right before it. Honors are interchangeable, so this is all the honor
/// table needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HonorAction {
    /// `prior` concealed copies, 0 to 3, no meld of this type.
    Draw { prior: u8 },
    /// `prior` concealed copies, 1 to 4, no meld of this type.
    Discard { prior: u8 },
    /// Draw the last copy of a ponned type.
    DrawOnPon,
    /// Discard the concealed copy of a ponned type.
    DiscardOnPon,
    /// Pon with 2 or 3 concealed copies.
    Pon { prior: u8 },
    Daiminkan,
    Shouminkan,
    Ankan,
}

impl HonorAction {
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Draw { prior } => {
                assert!(prior <= 3);
                prior
            }
            Self::Discard { prior } => {
                assert!(prior >= 1 && prior <= 4);
                3 + prior
            }
            Self::DrawOnPon => 8,
            Self::DiscardOnPon => 9,
            Self::Pon { prior } => {
                assert!(prior == 2 || prior == 3);
                8 + prior
            }
            Self::Daiminkan => 12,
            Self::Shouminkan => 13,
            Self::Ankan => 14,
        }
    }

    #[must_use]
    pub const fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            0..=3 => Self::Draw { prior: code },
            4..=7 => Self::Discard { prior: code - 3 },
            8 => Self::DrawOnPon,
            9 => Self::DiscardOnPon,
            10 | 11 => Self::Pon { prior: code - 8 },
            12 => Self::Daiminkan,
            13 => Self::Shouminkan,
            14 => Self::Ankan,
            _ => return None,
        })
    }
}

/// Progressive classifier of the honor group. Its value is the id of the
/// group's arrangement set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HonorClassifier {
    pos: u32,
}

impl HonorClassifier {
    #[inline]
    pub fn apply(&mut self, table: &[i32], action: HonorAction) {
        self.pos = table_step(table, self.pos, action.code() as usize);
    }

    #[inline]
    #[must_use]
    pub fn value(self, table: &[i32]) -> u32 {
        table[self.pos as usize] as u32
    }
}

#[cfg(test)]
pub mod test {
    use super::*;
    use crate::algo::analyzer::{GroupKind, analyze};
    use crate::classifier::test_tables;

    #[test]
    pub fn codes() {
        for code in 0..HONOR_ACTIONS as u8 {
            let action = HonorAction::from_code(code).unwrap();
            assert_eq!(action.code(), code);
        }
        assert_eq!(HonorAction::from_code(HONOR_ACTIONS as u8), None);
    }

    #[test]
    pub fn progressive() {
        let tables = test_tables();
        let table = &tables.honors;
        let value = |c: &HonorClassifier| tables.registry_set(c.value(table));

        let mut c = HonorClassifier::default();
        assert_eq!(value(&c), analyze(GroupKind::Honor, &[0; 7], &[0; 7], 0));

        // E E E S then pon of the E with a spare
        c.apply(table, HonorAction::Draw { prior: 0 });
        c.apply(table, HonorAction::Draw { prior: 1 });
        c.apply(table, HonorAction::Draw { prior: 2 });
        c.apply(table, HonorAction::Draw { prior: 0 });
        assert_eq!(value(&c), analyze(GroupKind::Honor, &[3, 1, 0, 0, 0, 0, 0], &[0; 7], 0));

        c.apply(table, HonorAction::Discard { prior: 3 });
        c.apply(table, HonorAction::Pon { prior: 2 });
        assert_eq!(value(&c), analyze(GroupKind::Honor, &[0, 1, 0, 0, 0, 0, 0], &[3, 0, 0, 0, 0, 0, 0], 1));

        c.apply(table, HonorAction::DrawOnPon);
        c.apply(table, HonorAction::Shouminkan);
        assert_eq!(value(&c), analyze(GroupKind::Honor, &[0, 1, 0, 0, 0, 0, 0], &[4, 0, 0, 0, 0, 0, 0], 1));
    }
}
