//! Table files.
//!
//! One file per table, either one integer per line or a gzipped little endian
//! dump (`u32` length, then the `i32` values). `manifest.json` lists every
//! file with its length and the SHA3-256 of its values, so a load can tell a
//! stale or truncated table apart from a good one.

use super::Tables;
use crate::algo::arrangement::ArrangementSet;
use anyhow::{Context, Result, bail, ensure};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use serde::{Deserialize, Serialize};
use sha3::{Digest, Sha3_256};
use std::borrow::Cow;
use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

pub const MANIFEST: &str = "manifest.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Text,
    #[default]
    Bin,
}

impl Format {
    const fn extension(self) -> &'static str {
        match self {
            Self::Text => "txt",
            Self::Bin => "bin.gz",
        }
    }
}

impl FromStr for Format {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "text" | "txt" => Ok(Self::Text),
            "bin" => Ok(Self::Bin),
            _ => bail!("unknown table format {s:?}, expected text or bin"),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Text => "text",
            Self::Bin => "bin",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub format: Format,
    pub tables: Vec<ManifestEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub name: String,
    pub file: String,
    pub len: usize,
    pub sha3_256: String,
}

const NAMES: [&str; 6] = [
    "suit_melds",
    "suit_counts",
    "honors",
    "kokushi",
    "combiner",
    "registry",
];

#[must_use]
pub fn digest(values: &[i32]) -> String {
    let mut hasher = Sha3_256::new();
    for v in values {
        hasher.update(v.to_le_bytes());
    }
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

fn registry_to_values(sets: &[ArrangementSet]) -> Vec<i32> {
    sets.iter()
        .flat_map(|s| s.words())
        .flat_map(|w| [w as u32 as i32, (w >> 32) as u32 as i32])
        .collect()
}

fn registry_from_values(values: &[i32]) -> Result<Vec<ArrangementSet>> {
    ensure!(values.len() % 8 == 0, "registry length {} is not a multiple of 8", values.len());
    Ok(values
        .chunks_exact(8)
        .map(|c| {
            let word = |i: usize| c[2 * i] as u32 as u64 | (c[2 * i + 1] as u32 as u64) << 32;
            ArrangementSet::from_words([word(0), word(1), word(2), word(3)])
        })
        .collect())
}

fn write_values(path: &Path, format: Format, values: &[i32]) -> Result<()> {
    let file = File::create(path)?;
    match format {
        Format::Text => {
            let mut w = BufWriter::new(file);
            for v in values {
                writeln!(w, "{v}")?;
            }
            w.flush()?;
        }
        Format::Bin => {
            let mut w = GzEncoder::new(BufWriter::new(file), Compression::default());
            w.write_u32::<LittleEndian>(values.len() as u32)?;
            for &v in values {
                w.write_i32::<LittleEndian>(v)?;
            }
            w.finish()?.flush()?;
        }
    }
    Ok(())
}

fn read_values(path: &Path, format: Format) -> Result<Vec<i32>> {
    let file = File::open(path)?;
    match format {
        Format::Text => BufReader::new(file)
            .lines()
            .enumerate()
            .map(|(i, line)| {
                let line = line?;
                line.trim()
                    .parse()
                    .with_context(|| format!("line {}: {line:?}", i + 1))
            })
            .collect(),
        Format::Bin => {
            let mut r = GzDecoder::new(BufReader::new(file));
            let len = r.read_u32::<LittleEndian>()? as usize;
            let values = (0..len)
                .map(|_| r.read_i32::<LittleEndian>())
                .collect::<io::Result<Vec<_>>>()?;
            ensure!(r.read_u8().is_err(), "trailing data after {len} values");
            Ok(values)
        }
    }
}

impl Tables {
    fn named(&self) -> [(&'static str, Cow<'_, [i32]>); 6] {
        [
            (NAMES[0], Cow::Borrowed(&self.suit_melds[..])),
            (NAMES[1], Cow::Borrowed(&self.suit_counts[..])),
            (NAMES[2], Cow::Borrowed(&self.honors[..])),
            (NAMES[3], Cow::Borrowed(&self.kokushi[..])),
            (NAMES[4], Cow::Borrowed(&self.combiner[..])),
            (NAMES[5], Cow::Owned(registry_to_values(&self.registry))),
        ]
    }

    /// Writes every table and the manifest into `dir`, creating it if needed.
    pub fn save(&self, dir: impl AsRef<Path>, format: Format) -> Result<Manifest> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir).with_context(|| format!("error when creating {}", dir.display()))?;

        let mut tables = vec![];
        for (name, values) in self.named() {
            let file = format!("{name}.{}", format.extension());
            let path = dir.join(&file);
            write_values(&path, format, &values)
                .with_context(|| format!("error when writing {}", path.display()))?;
            tables.push(ManifestEntry {
                name: name.to_owned(),
                file,
                len: values.len(),
                sha3_256: digest(&values),
            });
        }

        let manifest = Manifest { format, tables };
        let path = dir.join(MANIFEST);
        let inner = || -> Result<()> {
            let mut w = BufWriter::new(File::create(&path)?);
            serde_json::to_writer_pretty(&mut w, &manifest)?;
            w.flush()?;
            Ok(())
        };
        inner().with_context(|| format!("error when writing {}", path.display()))?;
        log::info!("saved {} tables to {}", manifest.tables.len(), dir.display());
        Ok(manifest)
    }

    /// Reads the tables listed in `dir/manifest.json`, checking length and
    /// digest of each.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let path = dir.join(MANIFEST);
        let inner = || -> Result<Manifest> {
            let file = File::open(&path)?;
            Ok(serde_json::from_reader(BufReader::new(file))?)
        };
        let manifest = inner().with_context(|| format!("error when reading {}", path.display()))?;

        let mut loaded: [Option<Vec<i32>>; 6] = Default::default();
        for entry in &manifest.tables {
            let Some(slot) = NAMES.iter().position(|&n| n == entry.name) else {
                log::warn!("ignoring unknown table {}", entry.name);
                continue;
            };
            let path = dir.join(&entry.file);
            let values = read_values(&path, manifest.format)
                .with_context(|| format!("error when reading {}", path.display()))?;
            ensure!(
                values.len() == entry.len,
                "{}: expected {} values, found {}",
                entry.file,
                entry.len,
                values.len(),
            );
            let found = digest(&values);
            ensure!(
                found == entry.sha3_256,
                "{}: digest mismatch, manifest has {}, file has {found}",
                entry.file,
                entry.sha3_256,
            );
            loaded[slot] = Some(values);
        }

        let [suit_melds, suit_counts, honors, kokushi, combiner, registry] = loaded;
        let take = |v: Option<Vec<i32>>, name: &str| v.with_context(|| format!("manifest lacks table {name}"));
        let tables = Self {
            suit_melds: take(suit_melds, NAMES[0])?,
            suit_counts: take(suit_counts, NAMES[1])?,
            honors: take(honors, NAMES[2])?,
            kokushi: take(kokushi, NAMES[3])?,
            combiner: take(combiner, NAMES[4])?,
            registry: registry_from_values(&take(registry, NAMES[5])?)?,
        };
        log::info!("loaded {} cells from {}", tables.cells(), dir.display());
        Ok(tables)
    }
}

#[cfg(test)]
pub mod test {
    use super::*;
    use crate::classifier::test_tables;

    fn scratch(name: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("shanten-io-{}-{name}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    pub fn round_trip() {
        let tables = test_tables();
        for format in [Format::Text, Format::Bin] {
            let dir = scratch(&format.to_string());
            let manifest = tables.save(&dir, format).unwrap();
            assert_eq!(manifest.tables.len(), 6);
            let loaded = Tables::load(&dir).unwrap();
            assert_eq!(&loaded, tables.as_ref());
            std::fs::remove_dir_all(&dir).unwrap();
        }
    }

    #[test]
    pub fn corrupted() {
        let tables = test_tables();
        let dir = scratch("corrupted");
        tables.save(&dir, Format::Text).unwrap();
        let path = dir.join("kokushi.txt");
        let mut text = std::fs::read_to_string(&path).unwrap();
        text.push_str("0\n");
        std::fs::write(&path, text).unwrap();
        let err = Tables::load(&dir).unwrap_err();
        assert!(format!("{err:#}").contains("kokushi"));
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    pub fn formats() {
        assert_eq!("text".parse::<Format>().unwrap(), Format::Text);
        assert_eq!("bin".parse::<Format>().unwrap(), Format::Bin);
        "csv".parse::<Format>().unwrap_err();
        assert_eq!(digest(&[]).len(), 64);
        assert_ne!(digest(&[1]), digest(&[-1]));
    }
}
