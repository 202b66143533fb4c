//! Interning of arrangement sets.
//!
//! The group automata map words to set ids instead of sets, and the combiner
//! reads those ids as its alphabet.

use crate::algo::arrangement::ArrangementSet;
use ahash::AHashMap;

#[derive(Debug, Clone, Default)]
pub struct Registry {
    sets: Vec<ArrangementSet>,
    ids: AHashMap<ArrangementSet, u32>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ids are handed out in first-seen order.
    pub fn intern(&mut self, set: ArrangementSet) -> u32 {
        *self.ids.entry(set).or_insert_with(|| {
            self.sets.push(set);
            (self.sets.len() - 1) as u32
        })
    }

    #[inline]
    #[must_use]
    pub fn get(&self, id: u32) -> ArrangementSet {
        self.sets[id as usize]
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    #[must_use]
    pub fn sets(&self) -> &[ArrangementSet] {
        &self.sets
    }
}

#[cfg(test)]
pub mod test {
    use super::*;
    use crate::algo::arrangement::Arrangement;

    #[test]
    pub fn intern() {
        let a: ArrangementSet = [Arrangement::new(0, 1, 3)].into_iter().collect();
        let b = ArrangementSet::UNIT;

        let mut registry = Registry::new();
        assert_eq!(registry.intern(a), 0);
        assert_eq!(registry.intern(b), 1);
        assert_eq!(registry.intern(a), 0);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get(1), b);
        assert_eq!(registry.intern(b), 1);
        assert_eq!(registry.len(), 2);
    }
}
