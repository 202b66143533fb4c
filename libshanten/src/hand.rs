//! Hand format conversions, mostly useful for testing, debugging and the
//! command line.
//!
//! Strings are in tenhou.net/2 format (like `123m 456p 77z`). Red fives are not
//! distinguished, so `0` is rejected.

use crate::must_tile;
use crate::tile::{TILE_TYPES, TileType};

use anyhow::{Context, Result, bail, ensure};

/// Parse a tenhou representation of tiles into a list of ordered tile types.
pub fn parse_tiles(s: &str) -> Result<Vec<TileType>> {
    ensure!(s.is_ascii(), "hand {s} contains non-ascii content");

    let mut tiles = vec![];
    let mut stack = vec![];

    for &b in s.as_bytes() {
        match b {
            b'1'..=b'9' => stack.push(b - b'1'),
            b'm' | b'p' | b's' | b'z' => {
                let kind = match b {
                    b'm' => 0,
                    b'p' => 1,
                    b's' => 2,
                    _ => 3,
                };
                for num in stack.drain(..) {
                    ensure!(kind < 3 || num < 7, "honor {}z does not exist", num + 1);
                    tiles.push(must_tile!(kind * 9 + num));
                }
            }
            _ if b.is_ascii_whitespace() => (),
            _ => bail!("unexpected byte {b} in hand {s}"),
        };
    }
    ensure!(stack.is_empty(), "hand {s} ends with digits but no suit");

    Ok(tiles)
}

/// Parse a single tile type like `5p` or `3z`.
pub fn parse_tile(s: &str) -> Result<TileType> {
    let tiles = parse_tiles(s)?;
    ensure!(tiles.len() == 1, "too many tiles");
    tiles.into_iter().next().context("missing tile")
}

/// Spaces are allowed.
pub fn hand(s: &str) -> Result<[u8; 34]> {
    let mut ret = [0; TILE_TYPES];
    for tile in parse_tiles(s)? {
        let count = &mut ret[tile.as_usize()];
        ensure!(*count < 4, "hand {s} has more than 4 of {tile}");
        *count += 1;
    }
    Ok(ret)
}

#[must_use]
pub fn tile34_to_vec(tiles: &[u8; 34]) -> Vec<TileType> {
    let mut ret = vec![];
    tiles
        .iter()
        .enumerate()
        .filter(|&(_, &count)| count > 0)
        .for_each(|(tid, &count)| {
            ret.resize(ret.len() + count as usize, must_tile!(tid));
        });
    ret
}

#[must_use]
pub fn tiles_to_string(tiles: &[u8; 34]) -> String {
    tiles
        .chunks(9)
        .zip(['m', 'p', 's', 'z'])
        .filter_map(|(chunk, suffix)| {
            let mut partial: String = chunk
                .iter()
                .enumerate()
                .map(|(num, &count)| (num + 1).to_string().repeat(count as usize))
                .collect();
            if partial.is_empty() {
                None
            } else {
                partial.push(suffix);
                Some(partial)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
