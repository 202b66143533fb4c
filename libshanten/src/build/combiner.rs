//! Arrangement combiner table.
//!
//! Reads the three suit set ids and then the honor set id of a hand and ends
//! in the number of useful tiles of the whole hand. States of each layer are
//! the distinct merged sets of the groups read so far, the last layer only
//! keeps the useful tile count.

use super::compact::{Compacted, compact};
use super::dfa::Dfa;
use super::hopcroft::minimize;
use super::registry::Registry;
use super::{BuildConfig, BuildStats, progress_bar};
use crate::algo::arrangement::ArrangementSet;
use ahash::AHashMap;
use anyhow::{Result, ensure};
use indicatif::ParallelProgressIterator;
use rayon::prelude::*;

/// Set ids accepted by each layer.
pub struct Layers<'a> {
    pub suits: &'a [u32],
    pub honors: &'a [u32],
}

pub fn build(registry: &Registry, layers: &Layers<'_>, config: &BuildConfig) -> Result<(Compacted, BuildStats)> {
    let mut dfa = Dfa::new(registry.len());
    let root = dfa.add_state();
    dfa.entries.push(root);

    let mut current = vec![(root, ArrangementSet::UNIT)];
    for layer in 0..3 {
        let bar = progress_bar(config, current.len() as u64, "combiner")?;
        let merged: Vec<Vec<ArrangementSet>> = current
            .par_iter()
            .progress_with(bar.clone())
            .map(|(_, set)| {
                layers
                    .suits
                    .iter()
                    .map(|&id| set.merge(registry.get(id)))
                    .collect()
            })
            .collect();
        bar.finish_and_clear();

        let mut next = vec![];
        let mut index = AHashMap::new();
        for ((s, _), row) in current.iter().zip(merged) {
            for (&id, set) in layers.suits.iter().zip(row) {
                if set.is_empty() {
                    continue;
                }
                let t = *index.entry(set).or_insert_with(|| {
                    let t = dfa.add_state();
                    next.push((t, set));
                    t
                });
                dfa.set_transition(*s, id as usize, t);
            }
        }
        log::debug!("combiner layer {}: {} sets", layer + 1, next.len());
        current = next;
    }

    let useful: Vec<Vec<Option<u8>>> = current
        .par_iter()
        .map(|(_, set)| {
            layers
                .honors
                .iter()
                .map(|&id| {
                    let merged = set.merge(registry.get(id));
                    (!merged.is_empty()).then(|| merged.best_total())
                })
                .collect()
        })
        .collect();
    let mut finals = AHashMap::new();
    for ((s, _), row) in current.iter().zip(useful) {
        for (&id, value) in layers.honors.iter().zip(row) {
            let Some(value) = value else {
                continue;
            };
            ensure!(value <= 14, "{value} useful tiles");
            let t = *finals.entry(value).or_insert_with(|| dfa.add_state());
            dfa.set_transition(*s, id as usize, t);
            dfa.set_result(t, value as i32)?;
        }
    }

    let min = minimize(&dfa);
    let table = compact(&min);
    let stats = BuildStats {
        words: 0,
        states: dfa.len(),
        minimized: min.len(),
        cells: table.data.len(),
    };
    log::info!(
        "combiner: {} states, {} minimized, {} cells",
        stats.states,
        stats.minimized,
        stats.cells,
    );
    Ok((table, stats))
}
