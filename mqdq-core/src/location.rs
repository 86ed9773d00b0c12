//! Tile coordinates and locations

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use smallvec::SmallVec;

use crate::error::{Error, Result};

/// A 1-based `(row, column)` position within a text unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coordinate {
    pub row: u32,
    pub column: u32,
}

impl Coordinate {
    pub fn new(row: u32, column: u32) -> Self {
        Self { row, column }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.row, self.column)
    }
}

impl FromStr for Coordinate {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidLocation(s.to_string());
        let (row, column) = s.trim().split_once('.').ok_or_else(invalid)?;
        let row: u32 = row.parse().map_err(|_| invalid())?;
        let column: u32 = column.parse().map_err(|_| invalid())?;
        if row == 0 || column == 0 {
            return Err(invalid());
        }
        Ok(Self { row, column })
    }
}

/// Where a fragment sits in a text unit.
///
/// Serialized in its text form (`y.x`, `y.x-y.x` or space separated points).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// A single tile
    Point(Coordinate),
    /// An inclusive run of tiles, `start <= end`
    Range { start: Coordinate, end: Coordinate },
    /// Independent tiles
    List(SmallVec<[Coordinate; 4]>),
}

impl Location {
    /// Build a point or, when the endpoints differ, an ordered range
    pub fn span(a: Coordinate, b: Coordinate) -> Self {
        match a.cmp(&b) {
            std::cmp::Ordering::Equal => Location::Point(a),
            std::cmp::Ordering::Less => Location::Range { start: a, end: b },
            std::cmp::Ordering::Greater => Location::Range { start: b, end: a },
        }
    }

    /// First coordinate in document order
    pub fn start(&self) -> Option<Coordinate> {
        match self {
            Location::Point(c) => Some(*c),
            Location::Range { start, .. } => Some(*start),
            Location::List(items) => items.iter().min().copied(),
        }
    }

    /// Last coordinate in document order
    pub fn end(&self) -> Option<Coordinate> {
        match self {
            Location::Point(c) => Some(*c),
            Location::Range { end, .. } => Some(*end),
            Location::List(items) => items.iter().max().copied(),
        }
    }

    /// Check whether a coordinate is covered
    pub fn contains(&self, c: &Coordinate) -> bool {
        match self {
            Location::Point(p) => p == c,
            Location::Range { start, end } => start <= c && c <= end,
            Location::List(items) => items.contains(c),
        }
    }

    /// Check whether two locations of the same unit share any tile
    pub fn overlaps(&self, other: &Location) -> bool {
        match (self, other) {
            (Location::List(items), _) => items
                .iter()
                .any(|c| other.overlaps(&Location::Point(*c))),
            (_, Location::List(_)) => other.overlaps(self),
            (Location::Point(a), _) => other.contains(a),
            (_, Location::Point(b)) => self.contains(b),
            (Location::Range { start: s1, end: e1 }, Location::Range { start: s2, end: e2 }) => {
                s1 <= e2 && s2 <= e1
            }
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Point(c) => write!(f, "{c}"),
            Location::Range { start, end } => write!(f, "{start}-{end}"),
            Location::List(items) => {
                for (i, c) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{c}")?;
                }
                Ok(())
            }
        }
    }
}

impl FromStr for Location {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.contains(char::is_whitespace) {
            let items = s
                .split_whitespace()
                .map(Coordinate::from_str)
                .collect::<Result<SmallVec<[Coordinate; 4]>>>()?;
            return Ok(Location::List(items));
        }
        match s.split_once('-') {
            Some((a, b)) => {
                let start: Coordinate = a.parse()?;
                let end: Coordinate = b.parse()?;
                if start > end {
                    return Err(Error::InvalidLocation(s.to_string()));
                }
                Ok(Location::span(start, end))
            }
            None => Ok(Location::Point(s.parse()?)),
        }
    }
}

impl Serialize for Location {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Location {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}
