use crate::{t, tu8};
use std::error::Error;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub const TILE_TYPES: usize = 34;
pub const SUITS: usize = 3;
/// Three suits and the honors.
pub const GROUPS: usize = 4;

const TILE_TYPE_STRINGS: [&str; TILE_TYPES] = [
    "1m", "2m", "3m", "4m", "5m", "6m", "7m", "8m", "9m", // m
    "1p", "2p", "3p", "4p", "5p", "6p", "7p", "8p", "9p", // p
    "1s", "2s", "3s", "4s", "5s", "6s", "7s", "8s", "9s", // s
    "E", "S", "W", "N", "P", "F", "C", // z
];

/// One of the 34 kinds of tiles, ignoring red fives.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct TileType(u8);

#[derive(Debug)]
pub enum InvalidTileType {
    Number(usize),
    String(String),
}

impl TileType {
    #[inline]
    #[must_use]
    pub const fn new_unchecked(id: u8) -> Self {
        Self(id)
    }

    #[inline]
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self.0
    }
    #[inline]
    #[must_use]
    pub const fn as_usize(self) -> usize {
        self.0 as usize
    }

    /// 0 for man, 1 for pin, 2 for sou and 3 for honors.
    #[inline]
    #[must_use]
    pub const fn suit(self) -> usize {
        self.0 as usize / 9
    }

    /// Index within the suit (0..9) or within the honors (0..7).
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize % 9
    }

    #[inline]
    #[must_use]
    pub const fn is_honor(self) -> bool {
        self.0 >= tu8!(E)
    }

    /// Terminal or honor.
    #[inline]
    #[must_use]
    pub const fn is_yaochuu(self) -> bool {
        self.is_honor() || matches!(self.0 % 9, 0 | 8)
    }

    pub fn all() -> impl Iterator<Item = Self> {
        (0..TILE_TYPES as u8).map(Self)
    }
}

pub const YAOCHUU: [TileType; 13] = t![1m, 9m, 1p, 9p, 1s, 9s, E, S, W, N, P, F, C];

impl TryFrom<u8> for TileType {
    type Error = InvalidTileType;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        Self::try_from(v as usize)
    }
}

impl TryFrom<usize> for TileType {
    type Error = InvalidTileType;

    fn try_from(v: usize) -> Result<Self, Self::Error> {
        if v >= TILE_TYPES {
            Err(InvalidTileType::Number(v))
        } else {
            Ok(Self(v as u8))
        }
    }
}

impl FromStr for TileType {
    type Err = InvalidTileType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(id) = TILE_TYPE_STRINGS.iter().position(|&x| x == s) {
            return Ok(Self(id as u8));
        }
        // tenhou style honors, 1z..=7z
        match s.as_bytes() {
            &[n @ b'1'..=b'7', b'z'] => Ok(Self(tu8!(E) + n - b'1')),
            _ => Err(InvalidTileType::String(s.to_owned())),
        }
    }
}

impl fmt::Debug for TileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self, f)
    }
}

impl fmt::Display for TileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(TILE_TYPE_STRINGS[self.0 as usize])
    }
}

impl<'de> Deserialize<'de> for TileType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let tile = String::deserialize(deserializer)?
            .parse()
            .map_err(serde::de::Error::custom)?;
        Ok(tile)
    }
}

impl Serialize for TileType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl fmt::Display for InvalidTileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "not a valid tile type: {n}"),
            Self::String(s) => write!(f, "not a valid tile type: \"{s}\""),
        }
    }
}

impl Error for InvalidTileType {}

#[cfg(test)]
pub mod test {
    use super::*;

    #[test]
    pub fn convert() {
        assert_eq!("E".parse::<TileType>().unwrap(), t!(E));
        assert_eq!("1z".parse::<TileType>().unwrap(), t!(E));
        assert_eq!("7z".parse::<TileType>().unwrap(), t!(C));
        assert_eq!("9s".parse::<TileType>().unwrap(), t!(9s));
        TileType::try_from(33_u8).unwrap();

        "".parse::<TileType>().unwrap_err();
        "0m".parse::<TileType>().unwrap_err();
        "8z".parse::<TileType>().unwrap_err();
        "5mr".parse::<TileType>().unwrap_err();
        TileType::try_from(34_u8).unwrap_err();
    }

    #[test]
    pub fn groups() {
        assert_eq!(t!(1m).suit(), 0);
        assert_eq!(t!(9p).suit(), 1);
        assert_eq!(t!(9p).index(), 8);
        assert_eq!(t!(5s).index(), 4);
        assert_eq!(t!(N).suit(), 3);
        assert_eq!(t!(N).index(), 3);
        assert_eq!(TileType::all().filter(|t| t.is_yaochuu()).count(), 13);
        assert!(YAOCHUU.iter().all(|t| t.is_yaochuu()));
        assert!(!t!(2m).is_yaochuu());
        assert!(t!(P).is_honor());
    }

    #[test]
    pub fn serde() {
        let json = serde_json::to_string(&t![1m, W]).unwrap();
        assert_eq!(json, r#"["1m","W"]"#);
        let back: Vec<TileType> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, vec![t!(1m), t!(W)]);
    }
}
