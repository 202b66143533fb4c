use super::table_step;
use tinyvec::ArrayVec;

/// Alphabet of the meld phase: 7 chii starts, 9 pons, 9 kans.
pub const SUIT_MELD_IDS: usize = 25;
pub const MAX_SUIT_MELDS: usize = 4;
const KEY_BASE: u32 = SUIT_MELD_IDS as u32 + 1;

/// A declared meld as seen from inside its suit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SuitMeld {
    /// Sequence starting at `start`, 0 to 6.
    Chii { start: u8 },
    Pon { index: u8 },
    /// Any kind of kan.
    Kan { index: u8 },
}

impl SuitMeld {
    #[must_use]
    pub const fn id(self) -> u8 {
        match self {
            Self::Chii { start } => start,
            Self::Pon { index } => 7 + index,
            Self::Kan { index } => 16 + index,
        }
    }

    #[must_use]
    pub const fn from_id(id: u8) -> Option<Self> {
        Some(match id {
            0..=6 => Self::Chii { start: id },
            7..=15 => Self::Pon { index: id - 7 },
            16..=24 => Self::Kan { index: id - 16 },
            _ => return None,
        })
    }

    /// Copies per suit position the meld locks away.
    pub fn add_to(self, melded: &mut [u8]) {
        match self {
            Self::Chii { start } => {
                melded[start as usize..start as usize + 3].iter_mut().for_each(|c| *c += 1);
            }
            Self::Pon { index } => melded[index as usize] += 3,
            Self::Kan { index } => melded[index as usize] += 4,
        }
    }
}

/// Packs meld ids given oldest first into one integer, the newest meld in
/// the lowest digit. The empty history packs to 0.
#[must_use]
pub fn pack_melds(ids: &[u8]) -> u32 {
    ids.iter().fold(0, |key, &id| key * KEY_BASE + id as u32 + 1)
}

/// Meld ids of a packed key, oldest first.
#[must_use]
pub fn unpack_melds(mut key: u32) -> ArrayVec<[u8; MAX_SUIT_MELDS]> {
    let mut ret = ArrayVec::new();
    while key > 0 {
        ret.push((key % KEY_BASE) as u8 - 1);
        key /= KEY_BASE;
    }
    ret.reverse();
    ret
}

/// Classifier of one numbered suit.
///
/// The declared melds select an entry of the count table, walking the nine
/// concealed counts from there gives the id of the suit's arrangement set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SuitClassifier {
    entry: u32,
    value: u32,
}

impl SuitClassifier {
    /// Select the entry for the melds packed in `key`.
    pub fn set_melds(&mut self, melds_table: &[i32], key: u32) {
        let pos = unpack_melds(key)
            .into_iter()
            .fold(0, |pos, id| table_step(melds_table, pos, id as usize));
        self.entry = melds_table[pos as usize] as u32;
    }

    pub fn update(&mut self, counts_table: &[i32], counts: &[u8]) {
        debug_assert_eq!(counts.len(), 9);
        let pos = counts
            .iter()
            .fold(self.entry, |pos, &c| table_step(counts_table, pos, c as usize));
        self.value = counts_table[pos as usize] as u32;
    }

    #[inline]
    #[must_use]
    pub const fn value(self) -> u32 {
        self.value
    }
}
