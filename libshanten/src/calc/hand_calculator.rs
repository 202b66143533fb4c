use super::meld::{Meld, MeldKind};
use super::scoring::ScoringData;
use crate::classifier::Tables;
use crate::classifier::chiitoitsu::ChiitoitsuClassifier;
use crate::classifier::honor::{HonorAction, HonorClassifier};
use crate::classifier::kokushi::{KokushiAction, KokushiClassifier};
use crate::classifier::suit::SuitClassifier;
use crate::tile::{GROUPS, SUITS, TILE_TYPES, TileType};
use std::ops::Range;
use std::sync::Arc;

use derivative::Derivative;
use tinyvec::ArrayVec;

const fn group_range(group: usize) -> Range<usize> {
    let start = group * 9;
    if group < SUITS { start..start + 9 } else { start..TILE_TYPES }
}

/// Everything about the hand a calculator tracks. Two calculators on the
/// same tables with equal states answer every query the same way.
#[derive(Debug, Clone, PartialEq, Eq, Derivative)]
#[derivative(Default)]
pub struct HandState {
    #[derivative(Default(value = "[0; 34]"))]
    concealed: [u8; TILE_TYPES],
    /// Copies locked in the hand's own melds.
    #[derivative(Default(value = "[0; 34]"))]
    melded: [u8; TILE_TYPES],
    melds: ArrayVec<[Meld; 4]>,
    /// Concealed tiles plus 3 per meld, 13 or 14 between operations.
    len: u8,

    suits: [SuitClassifier; SUITS],
    honors: HonorClassifier,
    kokushi: KokushiClassifier,
    chiitoitsu: ChiitoitsuClassifier,
    scoring: ScoringData,
}

/// Incremental shanten and ukeire of one hand.
///
/// Every operation keeps the hand's position in the compiled tables up to
/// date, so `shanten` is a few table reads no matter how the hand got
/// there. Operations called on a hand of the wrong size, or with tiles the
/// hand does not hold, panic.
#[derive(Debug, Clone)]
pub struct HandCalculator {
    tables: Arc<Tables>,
    state: HandState,
}

impl HandCalculator {
    /// An empty hand, ready for [`Self::init`].
    #[must_use]
    pub fn new(tables: Arc<Tables>) -> Self {
        let mut ret = Self {
            tables,
            state: HandState::default(),
        };
        (0..GROUPS).for_each(|g| ret.refresh_melds(g));
        ret
    }

    /// A closed hand of 13 or 14 tiles.
    #[must_use]
    pub fn from_tiles(tables: Arc<Tables>, tiles: &[TileType]) -> Self {
        let mut ret = Self::new(tables);
        ret.init(tiles);
        ret
    }

    /// Resets to a closed hand of 13 or 14 tiles.
    pub fn init(&mut self, tiles: &[TileType]) {
        self.init_with_melds(tiles, &[]);
    }

    /// Resets to a hand with declared melds, where the concealed tiles and
    /// 3 per meld add up to 13 or 14.
    pub fn init_with_melds(&mut self, tiles: &[TileType], melds: &[Meld]) {
        let len = tiles.len() + 3 * melds.len();
        assert!(
            melds.len() <= 4 && (len == 13 || len == 14),
            "init: {} tiles and {} melds do not make a hand",
            tiles.len(),
            melds.len(),
        );
        self.state = HandState::default();

        for &meld in melds {
            assert!(meld.is_valid(), "init: invalid meld {meld}");
            meld.add_to(&mut self.state.melded);
            self.state.melds.push(meld);
        }
        for t in TileType::all() {
            let i = t.as_usize();
            assert!(self.state.melded[i] <= 4, "init: more than 4 of {t} in melds");
        }
        for meld in melds.iter().filter(|m| m.tile.is_honor()) {
            for &action in honor_meld_path(meld.kind) {
                self.state.honors.apply(&self.tables.honors, action);
            }
        }
        (0..GROUPS).for_each(|g| self.refresh_melds(g));

        for &t in tiles {
            self.push(t);
        }
        self.state.len = len as u8;
    }

    #[must_use]
    pub fn tables(&self) -> &Arc<Tables> {
        &self.tables
    }

    #[must_use]
    pub const fn state(&self) -> &HandState {
        &self.state
    }

    #[must_use]
    pub const fn concealed(&self) -> &[u8; TILE_TYPES] {
        &self.state.concealed
    }

    #[must_use]
    pub const fn melded(&self) -> &[u8; TILE_TYPES] {
        &self.state.melded
    }

    #[must_use]
    pub fn melds(&self) -> &[Meld] {
        &self.state.melds
    }

    /// Concealed tiles plus 3 per meld.
    #[must_use]
    pub const fn len(&self) -> u8 {
        self.state.len
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.state.len == 0
    }

    #[must_use]
    pub const fn scoring(&self) -> &ScoringData {
        &self.state.scoring
    }

    /// Copies of `tile` in the concealed tiles and the hand's melds.
    #[inline]
    #[must_use]
    pub const fn held(&self, tile: TileType) -> u8 {
        self.state.concealed[tile.as_usize()] + self.state.melded[tile.as_usize()]
    }

    pub fn draw(&mut self, tile: TileType) {
        self.check_len("draw", 13);
        self.push(tile);
        self.state.len = 14;
    }

    pub fn discard(&mut self, tile: TileType) {
        self.check_len("discard", 14);
        self.pop(tile);
        self.state.len = 13;
    }

    /// Calls `called` into the sequence starting at `lowest`. The other two
    /// tiles of the sequence leave the concealed tiles.
    pub fn chii(&mut self, lowest: TileType, called: TileType) {
        self.check_len("chii", 13);
        let meld = Meld::new(MeldKind::Chii, lowest);
        assert!(meld.is_valid(), "chii: no sequence starts at {lowest}");
        let start = lowest.as_usize();
        assert!(
            (start..start + 3).contains(&called.as_usize()),
            "chii: {called} is not part of the sequence from {lowest}",
        );
        assert!(self.held(called) < 4, "chii: fifth copy of {called}");
        for i in start..start + 3 {
            if i != called.as_usize() {
                self.remove_concealed(TileType::new_unchecked(i as u8), "chii");
            }
        }
        self.push_meld(meld);
        self.state.len = 14;
    }

    pub fn pon(&mut self, tile: TileType) {
        self.check_len("pon", 13);
        let prior = self.state.concealed[tile.as_usize()];
        assert!(prior >= 2 && self.held(tile) < 4, "pon: cannot pon {tile} holding {prior}");
        if tile.is_honor() {
            self.state.honors.apply(&self.tables.honors, HonorAction::Pon { prior });
        }
        self.remove_concealed(tile, "pon");
        self.remove_concealed(tile, "pon");
        self.push_meld(Meld::new(MeldKind::Pon, tile));
        self.state.len = 14;
    }

    pub fn daiminkan(&mut self, tile: TileType) {
        self.check_len("daiminkan", 13);
        let prior = self.state.concealed[tile.as_usize()];
        assert!(prior == 3, "daiminkan: cannot kan {tile} holding {prior}");
        if tile.is_honor() {
            self.state.honors.apply(&self.tables.honors, HonorAction::Daiminkan);
        }
        for _ in 0..3 {
            self.remove_concealed(tile, "daiminkan");
        }
        self.push_meld(Meld::new(MeldKind::Daiminkan, tile));
    }

    /// Upgrades the pon of `tile` in place.
    pub fn shouminkan(&mut self, tile: TileType) {
        self.check_len("shouminkan", 14);
        let pos = self
            .state
            .melds
            .iter()
            .position(|m| m.kind == MeldKind::Pon && m.tile == tile);
        let Some(pos) = pos else {
            panic!("shouminkan: no pon of {tile}");
        };
        if tile.is_honor() {
            self.state.honors.apply(&self.tables.honors, HonorAction::Shouminkan);
        }
        self.remove_concealed(tile, "shouminkan");
        self.state.melds[pos].kind = MeldKind::Shouminkan;
        self.state.melded[tile.as_usize()] += 1;
        self.refresh_melds(tile.suit());
        self.state.len = 13;
    }

    pub fn ankan(&mut self, tile: TileType) {
        self.check_len("ankan", 14);
        let prior = self.state.concealed[tile.as_usize()];
        assert!(prior == 4, "ankan: cannot kan {tile} holding {prior}");
        if tile.is_honor() {
            self.state.honors.apply(&self.tables.honors, HonorAction::Ankan);
        }
        for _ in 0..4 {
            self.remove_concealed(tile, "ankan");
        }
        self.push_meld(Meld::new(MeldKind::Ankan, tile));
        self.state.len = 13;
    }

    /// Shanten number, -1 for a complete hand. Seven pairs and thirteen
    /// orphans count only while the hand has no melds.
    #[must_use]
    pub fn shanten(&self) -> i8 {
        let s = &self.state;
        let suits = [s.suits[0].value(), s.suits[1].value(), s.suits[2].value()];
        let honors = s.honors.value(&self.tables.honors);
        let regular = 13 - self.tables.combine(suits, honors) as i8;
        if s.melds.is_empty() {
            regular
                .min(s.kokushi.shanten(&self.tables.kokushi))
                .min(s.chiitoitsu.shanten())
        } else {
            regular
        }
    }

    /// For every tile type, the copies left outside the hand if drawing it
    /// lowers the shanten, -1 otherwise.
    pub fn ukeire_for_13(&mut self) -> [i8; TILE_TYPES] {
        self.check_len("ukeire", 13);
        let before = self.shanten();
        let mut ret = [-1; TILE_TYPES];
        for t in TileType::all() {
            let held = self.held(t);
            if held >= 4 {
                continue;
            }
            self.push(t);
            let after = self.shanten();
            self.pop(t);
            debug_assert!(after == before || after == before - 1, "{t}: {before} -> {after}");
            if after < before {
                ret[t.as_usize()] = (4 - held) as i8;
            }
        }
        ret
    }

    /// The tiles a tenpai hand waits on.
    pub fn furiten_tile_types(&mut self) -> Vec<TileType> {
        self.check_len("furiten", 13);
        assert!(self.shanten() == 0, "furiten: hand is not tenpai");
        let ukeire = self.ukeire_for_13();
        TileType::all()
            .filter(|t| ukeire[t.as_usize()] > 0)
            .collect()
    }

    pub fn shanten_after_discard(&mut self, tile: TileType) -> i8 {
        self.check_len("shanten_after_discard", 14);
        self.pop(tile);
        let ret = self.shanten();
        self.push(tile);
        ret
    }

    pub fn shanten_with_tile(&mut self, tile: TileType) -> i8 {
        self.check_len("shanten_with_tile", 13);
        self.push(tile);
        let ret = self.shanten();
        self.pop(tile);
        ret
    }

    /// Whether declaring an ankan of `tile` waits on different tiles than
    /// discarding it, the test for an ankan after riichi.
    #[must_use]
    pub fn is_ukeire_changed_by_ankan(&self, tile: TileType) -> bool {
        self.check_len("is_ukeire_changed_by_ankan", 14);
        let waits = |mut calc: Self| calc.ukeire_for_13().map(|u| u > 0);

        let mut discarded = self.clone();
        discarded.discard(tile);
        let mut kanned = self.clone();
        kanned.ankan(tile);
        waits(discarded) != waits(kanned)
    }

    #[inline]
    fn check_len(&self, op: &str, expected: u8) {
        assert!(
            self.state.len == expected,
            "{op}: needs a hand of {expected}, has {}",
            self.state.len,
        );
    }

    /// Adds a concealed copy, updating every classifier.
    fn push(&mut self, tile: TileType) {
        assert!(self.held(tile) < 4, "fifth copy of {tile}");
        if tile.is_honor() {
            let action = if self.is_ponned(tile) {
                HonorAction::DrawOnPon
            } else {
                HonorAction::Draw {
                    prior: self.state.concealed[tile.as_usize()],
                }
            };
            self.state.honors.apply(&self.tables.honors, action);
        }
        self.add_concealed(tile);
        self.refresh_counts(tile.suit());
    }

    /// Removes a concealed copy, updating every classifier.
    fn pop(&mut self, tile: TileType) {
        if tile.is_honor() {
            let prior = self.state.concealed[tile.as_usize()];
            assert!(prior > 0, "{tile} is not in the hand");
            let action = if self.is_ponned(tile) {
                HonorAction::DiscardOnPon
            } else {
                HonorAction::Discard { prior }
            };
            self.state.honors.apply(&self.tables.honors, action);
        }
        self.remove_concealed(tile, "discard");
        self.refresh_counts(tile.suit());
    }

    /// Count change seen by the irregular hand classifiers. Groups are
    /// refreshed by the caller.
    fn add_concealed(&mut self, tile: TileType) {
        let count = &mut self.state.concealed[tile.as_usize()];
        let prior = *count;
        if tile.is_yaochuu() {
            self.state
                .kokushi
                .apply(&self.tables.kokushi, KokushiAction::Draw { prior });
        }
        self.state.chiitoitsu.draw(prior);
        *count += 1;
    }

    fn remove_concealed(&mut self, tile: TileType, op: &str) {
        let count = &mut self.state.concealed[tile.as_usize()];
        let prior = *count;
        assert!(prior > 0, "{op}: {tile} is not in the hand");
        if tile.is_yaochuu() {
            self.state
                .kokushi
                .apply(&self.tables.kokushi, KokushiAction::Discard { prior });
        }
        self.state.chiitoitsu.discard(prior);
        *count -= 1;
    }

    fn is_ponned(&self, tile: TileType) -> bool {
        self.state
            .melds
            .iter()
            .any(|m| m.kind == MeldKind::Pon && m.tile == tile)
    }

    fn push_meld(&mut self, meld: Meld) {
        assert!(self.state.melds.len() < 4, "{meld}: the hand already has 4 melds");
        meld.add_to(&mut self.state.melded);
        self.state.melds.push(meld);
        self.refresh_melds(meld.group());
    }

    /// Re-derives the meld key and entry of `group`, then its counts.
    fn refresh_melds(&mut self, group: usize) {
        let s = &mut self.state;
        s.scoring.update_melds(group, &s.melds);
        if group < SUITS {
            s.suits[group].set_melds(&self.tables.suit_melds, s.scoring.meld_keys[group]);
        }
        self.refresh_counts(group);
    }

    fn refresh_counts(&mut self, group: usize) {
        let s = &mut self.state;
        let counts = &s.concealed[group_range(group)];
        s.scoring.update_counts(group, counts);
        if group < SUITS {
            s.suits[group].update(&self.tables.suit_counts, counts);
        }
    }
}

/// Honor actions that build a meld of `kind` on a type not held yet.
fn honor_meld_path(kind: MeldKind) -> &'static [HonorAction] {
    use HonorAction::{Ankan, Daiminkan, Draw, DrawOnPon, Pon, Shouminkan};
    match kind {
        MeldKind::Chii => &[],
        MeldKind::Pon => &[Draw { prior: 0 }, Draw { prior: 1 }, Pon { prior: 2 }],
        MeldKind::Daiminkan => &[
            Draw { prior: 0 },
            Draw { prior: 1 },
            Draw { prior: 2 },
            Daiminkan,
        ],
        MeldKind::Shouminkan => &[
            Draw { prior: 0 },
            Draw { prior: 1 },
            Pon { prior: 2 },
            DrawOnPon,
            Shouminkan,
        ],
        MeldKind::Ankan => &[
            Draw { prior: 0 },
            Draw { prior: 1 },
            Draw { prior: 2 },
            Draw { prior: 3 },
            Ankan,
        ],
    }
}
