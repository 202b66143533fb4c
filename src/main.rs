//! Command line front end for the shanten tables.
//!
//! Usage:
//!   ukeire build --out tables/ [--format text|bin] [--threads N] [--config build.json]
//!   ukeire shanten [--tables tables/] "123456789m 1234p"
//!   ukeire verify [--tables tables/] [--hands N] [--seed S]

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use anyhow::{Context, Result, ensure};
use clap::{Parser, Subcommand};
use console::style;
use indicatif::{ParallelProgressIterator, ProgressBar, ProgressStyle};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use shanten::algo::shanten::calc_all;
use shanten::build::BuildConfig;
use shanten::classifier::io::Format;
use shanten::hand::{parse_tiles, tiles_to_string};
use shanten::tile::{TILE_TYPES, TileType};
use shanten::{HandCalculator, Tables};

#[cfg(feature = "mimalloc")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

/// Mismatching hands logged in full by `verify`.
const REPORTED_MISMATCHES: usize = 10;

#[derive(Parser, Debug)]
#[command(name = "ukeire", about = "Incremental shanten and ukeire tables for riichi mahjong")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compile every table and write them to a directory.
    Build {
        /// Output directory, created if missing.
        #[arg(long)]
        out: PathBuf,

        #[arg(long, default_value = "bin")]
        format: Format,

        /// Number of rayon threads (0 = auto). Overrides the config file.
        #[arg(long)]
        threads: Option<usize>,

        /// JSON build configuration.
        #[arg(long)]
        config: Option<PathBuf>,

        #[arg(long)]
        no_progress: bool,

        /// Skip replaying random words through the finished tables.
        #[arg(long)]
        no_self_check: bool,
    },
    /// Print shanten, ukeire and waits of a 13 tile hand, or the discards of
    /// a 14 tile hand.
    Shanten {
        /// Table directory. Without it the tables are compiled in process.
        #[arg(long)]
        tables: Option<PathBuf>,

        /// Hand in tenhou notation, like "123m 456p 789s 1122z".
        hand: String,
    },
    /// Cross validate the incremental calculator against the classic one on
    /// random hands.
    Verify {
        #[arg(long)]
        tables: Option<PathBuf>,

        #[arg(long, default_value = "10000")]
        hands: usize,

        /// Draws and discards played from each starting hand.
        #[arg(long, default_value = "16")]
        turns: usize,

        #[arg(long, default_value = "0")]
        seed: u64,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    match args.command {
        Command::Build {
            out,
            format,
            threads,
            config,
            no_progress,
            no_self_check,
        } => {
            let mut config = read_config(config.as_deref())?;
            if let Some(threads) = threads {
                config.threads = threads;
            }
            config.progress &= !no_progress;
            config.self_check &= !no_self_check;
            build(&out, format, &config)
        }
        Command::Shanten { tables, hand } => {
            let tables = tables_from(tables.as_deref())?;
            shanten(tables, &hand)
        }
        Command::Verify {
            tables,
            hands,
            turns,
            seed,
        } => {
            let tables = tables_from(tables.as_deref())?;
            verify(tables, hands, turns, seed)
        }
    }
}

fn read_config(path: Option<&Path>) -> Result<BuildConfig> {
    let Some(path) = path else {
        return Ok(BuildConfig::default());
    };
    let inner = || -> Result<BuildConfig> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    };
    inner().with_context(|| format!("error when reading {}", path.display()))
}

fn tables_from(dir: Option<&Path>) -> Result<Arc<Tables>> {
    let tables = match dir {
        Some(dir) => Tables::load(dir)?,
        None => Tables::build(&BuildConfig::default())?,
    };
    Ok(Arc::new(tables))
}

fn build(out: &Path, format: Format, config: &BuildConfig) -> Result<()> {
    let start = Instant::now();
    let (tables, stats) = Tables::build_with_stats(config)?;
    let manifest = tables.save(out, format)?;

    eprintln!("{}", style("=== Tables ===").bold());
    for entry in &manifest.tables {
        eprintln!("{:>12}  {:>10}  {}", entry.name, entry.len, style(&entry.file).dim());
    }
    eprintln!(
        "words {}, states {}, minimized {}, cells {}",
        stats.words, stats.states, stats.minimized, stats.cells,
    );
    eprintln!("{} in {:.1?}", style("done").green(), start.elapsed());
    Ok(())
}

fn shanten(tables: Arc<Tables>, hand: &str) -> Result<()> {
    let tiles = parse_tiles(hand)?;
    ensure!(
        tiles.len() == 13 || tiles.len() == 14,
        "hand {hand} has {} tiles, expected 13 or 14",
        tiles.len(),
    );
    let mut counts = [0_u8; TILE_TYPES];
    for t in &tiles {
        let count = &mut counts[t.as_usize()];
        ensure!(*count < 4, "hand {hand} has more than 4 of {t}");
        *count += 1;
    }

    let mut calc = HandCalculator::from_tiles(tables, &tiles);
    println!("{}  shanten {}", tiles_to_string(&counts), style(calc.shanten()).bold());

    if tiles.len() == 13 {
        print_ukeire(&mut calc);
        return Ok(());
    }

    let mut discards = vec![];
    for t in TileType::all().filter(|t| counts[t.as_usize()] > 0) {
        let mut after = calc.clone();
        after.discard(t);
        let total: i32 = after.ukeire_for_13().iter().filter(|&&u| u > 0).map(|&u| u as i32).sum();
        discards.push((t, after.shanten(), total));
    }
    discards.sort_by_key(|&(t, shanten, total)| (shanten, -total, t));
    for (t, shanten, total) in discards {
        println!("  discard {t}  shanten {shanten}  ukeire {total}");
    }
    Ok(())
}

fn print_ukeire(calc: &mut HandCalculator) {
    let ukeire = calc.ukeire_for_13();
    let useful: Vec<_> = TileType::all()
        .filter(|t| ukeire[t.as_usize()] > 0)
        .map(|t| format!("{t}x{}", ukeire[t.as_usize()]))
        .collect();
    let total: i32 = ukeire.iter().filter(|&&u| u > 0).map(|&u| u as i32).sum();
    println!("  ukeire {total}: {}", useful.join(" "));

    if calc.shanten() == 0 {
        let waits: Vec<_> = calc
            .furiten_tile_types()
            .iter()
            .map(ToString::to_string)
            .collect();
        println!("  waits {}", style(waits.join(" ")).green());
    }
}

fn verify(tables: Arc<Tables>, hands: usize, turns: usize, seed: u64) -> Result<()> {
    let start = Instant::now();
    let bar = ProgressBar::new(hands as u64).with_style(ProgressStyle::with_template(
        "{msg:>12} [{elapsed_precise}] [{wide_bar}] {pos}/{len}",
    )?);
    bar.set_message("verify");

    let reported = AtomicUsize::new(0);
    let (checked, mismatches) = (0..hands as u64)
        .into_par_iter()
        .progress_with(bar)
        .map(|i| {
            let mut rng = ChaCha8Rng::seed_from_u64(seed.wrapping_add(i));
            let mut wall: Vec<_> = TileType::all().flat_map(|t| [t; 4]).collect();
            wall.shuffle(&mut rng);

            let mut calc = HandCalculator::from_tiles(Arc::clone(&tables), &wall[..13]);
            let mut checked = 0;
            let mut mismatches = 0;
            let mut check = |calc: &HandCalculator| {
                checked += 1;
                let expected = calc_all(calc.concealed(), calc.melded(), 0);
                let found = calc.shanten();
                if found != expected {
                    mismatches += 1;
                    if reported.fetch_add(1, Ordering::Relaxed) < REPORTED_MISMATCHES {
                        log::warn!(
                            "{}: classic {expected}, incremental {found}",
                            tiles_to_string(calc.concealed()),
                        );
                    }
                }
            };

            check(&calc);
            for &t in wall[13..].iter().take(turns) {
                calc.draw(t);
                check(&calc);
                let held: Vec<_> = TileType::all()
                    .filter(|d| calc.concealed()[d.as_usize()] > 0)
                    .collect();
                if let Some(&d) = held.choose(&mut rng) {
                    calc.discard(d);
                    check(&calc);
                }
            }
            (checked, mismatches)
        })
        .reduce(|| (0, 0), |a, b| (a.0 + b.0, a.1 + b.1));

    log::info!("checked {checked} hands in {:.1?}", start.elapsed());
    if mismatches == 0 {
        eprintln!("{} {checked} hands agree", style("ok").green());
    } else {
        eprintln!("{} {mismatches} of {checked} hands disagree", style("mismatch").red());
    }
    ensure!(mismatches == 0, "{mismatches} shanten mismatches");
    Ok(())
}
