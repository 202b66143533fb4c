use super::meld::{Meld, MeldKind};
use crate::algo::combination::{Combination, HONOR_LEN, SUIT_LEN, base5_hash, from_base5_hash};
use crate::classifier::suit::pack_melds;
use crate::tile::{GROUPS, SUITS};
use tinyvec::ArrayVec;

/// Per group digest of the hand for yaku and fu evaluation, kept in step
/// with every calculator mutation so scoring never recounts tiles.
///
/// Group 3 is the honors. Bit fields have one bit per index inside the
/// group, so two identical chii share a bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScoringData {
    /// Base-5 hash of the concealed counts, index 0 least significant.
    pub hashes: [u32; GROUPS],
    /// Packed meld ids in meld order.
    pub meld_keys: [u32; GROUPS],
    /// Chii by lowest index.
    pub chii: [u16; GROUPS],
    pub pon: [u16; GROUPS],
    /// Daiminkan and shouminkan.
    pub open_kan: [u16; GROUPS],
    pub closed_kan: [u16; GROUPS],
}

const fn group_len(group: usize) -> usize {
    if group < SUITS { SUIT_LEN } else { HONOR_LEN }
}

impl ScoringData {
    #[inline]
    pub fn update_counts(&mut self, group: usize, counts: &[u8]) {
        self.hashes[group] = base5_hash(counts);
    }

    /// Recomputes the meld key and bit fields of `group` from the hand's
    /// melds.
    pub fn update_melds(&mut self, group: usize, melds: &[Meld]) {
        let in_group = melds.iter().filter(|m| m.group() == group);
        let ids: ArrayVec<[u8; 4]> = in_group.clone().map(|m| m.group_meld().id()).collect();
        self.meld_keys[group] = pack_melds(&ids);

        self.chii[group] = 0;
        self.pon[group] = 0;
        self.open_kan[group] = 0;
        self.closed_kan[group] = 0;
        for meld in in_group {
            let bit = 1 << meld.tile.index();
            let field = match meld.kind {
                MeldKind::Chii => &mut self.chii[group],
                MeldKind::Pon => &mut self.pon[group],
                MeldKind::Daiminkan | MeldKind::Shouminkan => &mut self.open_kan[group],
                MeldKind::Ankan => &mut self.closed_kan[group],
            };
            *field |= bit;
        }
    }

    /// Concealed counts of `group` decoded from its hash.
    #[must_use]
    pub fn counts(&self, group: usize) -> Combination {
        from_base5_hash(self.hashes[group], group_len(group))
    }

    /// No open meld in any group.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.chii.iter().chain(&self.pon).chain(&self.open_kan).all(|&b| b == 0)
    }

    #[must_use]
    pub fn kans(&self) -> u32 {
        self.open_kan
            .iter()
            .chain(&self.closed_kan)
            .map(|b| b.count_ones())
            .sum()
    }
}

#[cfg(test)]
pub mod test {
    use super::*;
    use crate::t;

    #[test]
    pub fn melds() {
        let melds = [
            Meld::new(MeldKind::Chii, t!(3m)),
            Meld::new(MeldKind::Ankan, t!(E)),
            Meld::new(MeldKind::Pon, t!(9m)),
            Meld::new(MeldKind::Shouminkan, t!(C)),
        ];
        let mut data = ScoringData::default();
        (0..GROUPS).for_each(|g| data.update_melds(g, &melds));

        assert_eq!(data.chii, [0b100, 0, 0, 0]);
        assert_eq!(data.pon, [1 << 8, 0, 0, 0]);
        assert_eq!(data.open_kan, [0, 0, 0, 1 << 6]);
        assert_eq!(data.closed_kan, [0, 0, 0, 1]);
        assert_eq!(data.meld_keys[0], pack_melds(&[2, 7 + 8]));
        assert_eq!(data.meld_keys[3], pack_melds(&[16, 16 + 6]));
        assert_eq!(data.meld_keys[1], 0);
        assert!(!data.is_closed());
        assert_eq!(data.kans(), 2);

        data.update_counts(2, &[0, 1, 2, 3, 4, 0, 0, 0, 1]);
        assert_eq!(data.counts(2).as_slice(), &[0, 1, 2, 3, 4, 0, 0, 0, 1]);
    }
}
