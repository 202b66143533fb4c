use crate::classifier::suit::SuitMeld;
use crate::tile::{TILE_TYPES, TileType};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MeldKind {
    #[default]
    Chii,
    Pon,
    Daiminkan,
    /// A pon upgraded with the fourth copy.
    Shouminkan,
    Ankan,
}

/// A declared meld.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Meld {
    pub kind: MeldKind,
    /// The lowest tile of a chii, the called type otherwise.
    pub tile: TileType,
}

impl Meld {
    #[must_use]
    pub const fn new(kind: MeldKind, tile: TileType) -> Self {
        Self { kind, tile }
    }

    /// Whether the meld is well formed, only chii has restrictions.
    #[must_use]
    pub const fn is_valid(self) -> bool {
        match self.kind {
            MeldKind::Chii => !self.tile.is_honor() && self.tile.index() <= 6,
            _ => true,
        }
    }

    #[must_use]
    pub const fn group(self) -> usize {
        self.tile.suit()
    }

    /// The meld in the coordinates of its group. Honor melds use the same
    /// pon and kan ids as the suits.
    #[must_use]
    pub const fn group_meld(self) -> SuitMeld {
        let index = self.tile.index() as u8;
        match self.kind {
            MeldKind::Chii => SuitMeld::Chii { start: index },
            MeldKind::Pon => SuitMeld::Pon { index },
            _ => SuitMeld::Kan { index },
        }
    }

    /// Locks the meld's copies away in `melded`.
    pub fn add_to(self, melded: &mut [u8; TILE_TYPES]) {
        let base = self.group() * 9;
        self.group_meld().add_to(&mut melded[base..]);
    }
}

impl fmt::Display for Meld {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            MeldKind::Chii => "chii",
            MeldKind::Pon => "pon",
            MeldKind::Daiminkan => "daiminkan",
            MeldKind::Shouminkan => "shouminkan",
            MeldKind::Ankan => "ankan",
        };
        write!(f, "{kind}({})", self.tile)
    }
}
