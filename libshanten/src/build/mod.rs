//! Table compiler.

pub mod combiner;
pub mod compact;
pub mod dfa;
pub mod honor;
pub mod hopcroft;
pub mod kokushi;
pub mod registry;
pub mod suit;

use crate::classifier::Tables;
use anyhow::{Context, Result};
use derive_more::{Add, AddAssign, Sum};
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use std::time::Instant;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Worker threads, 0 for rayon's default.
    pub threads: usize,
    pub progress: bool,
    /// Replay random words through the finished tables.
    pub self_check: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            threads: 0,
            progress: true,
            self_check: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Add, AddAssign, Sum)]
pub struct BuildStats {
    /// Words inserted into tries.
    pub words: usize,
    pub states: usize,
    pub minimized: usize,
    /// Integers in the compacted tables.
    pub cells: usize,
}

pub(crate) fn progress_bar(config: &BuildConfig, len: u64, msg: &'static str) -> Result<ProgressBar> {
    if !config.progress {
        return Ok(ProgressBar::hidden());
    }
    let style = ProgressStyle::with_template("{msg:>12} [{elapsed_precise}] [{wide_bar}] {pos}/{len}")?;
    Ok(ProgressBar::new(len).with_style(style).with_message(msg))
}

/// Compiles every table, on a dedicated thread pool when `config.threads` is
/// set.
pub fn build(config: &BuildConfig) -> Result<(Tables, BuildStats)> {
    if config.threads == 0 {
        return build_all(config);
    }
    rayon::ThreadPoolBuilder::new()
        .num_threads(config.threads)
        .build()
        .context("failed to configure rayon thread pool")?
        .install(|| build_all(config))
}

fn build_all(config: &BuildConfig) -> Result<(Tables, BuildStats)> {
    let start = Instant::now();
    let mut registry = registry::Registry::new();

    let (honors, honor_stats) = honor::build(&mut registry).context("honor table")?;
    let honor_ids: Vec<u32> = (0..registry.len() as u32).collect();
    let (kokushi, kokushi_stats) = kokushi::build().context("kokushi table")?;
    let (suits, suit_stats) = suit::build(&mut registry, config).context("suit tables")?;
    log::info!("registry: {} arrangement sets", registry.len());

    let layers = combiner::Layers {
        suits: &suits.ids,
        honors: &honor_ids,
    };
    let (combiner, combiner_stats) = combiner::build(&registry, &layers, config).context("combiner table")?;

    let stats = [honor_stats, kokushi_stats, suit_stats, combiner_stats].into_iter().sum();
    let tables = Tables {
        suit_melds: suits.melds.data,
        suit_counts: suits.counts.data,
        honors: honors.data,
        kokushi: kokushi.data,
        combiner: combiner.data,
        registry: registry.sets().to_vec(),
    };
    log::info!(
        "built all tables in {:.1?}: {} cells",
        start.elapsed(),
        tables.cells(),
    );
    Ok((tables, stats))
}
