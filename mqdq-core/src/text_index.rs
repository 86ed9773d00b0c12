//! Word key to tile coordinate index

use std::collections::HashMap;
use std::fmt;
use std::io::Read;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::location::Coordinate;
use crate::tiles::TextPartition;

/// Where a word key sits: the partition (unit) id plus row and column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextIndexEntry {
    pub unit_id: String,
    pub row: u32,
    pub column: u32,
}

impl TextIndexEntry {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.row, self.column)
    }
}

impl fmt::Display for TextIndexEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}.{}", self.unit_id, self.row, self.column)
    }
}

/// Index of every tile id to its coordinates.
///
/// Several sources can be indexed into the same instance; a later tile with
/// the same id replaces the earlier one.
#[derive(Debug, Clone, Default)]
pub struct TextIndex {
    entries: HashMap<String, TextIndexEntry>,
}

impl TextIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index from parsed partitions
    pub fn from_partitions(partitions: &[TextPartition]) -> Self {
        let mut index = Self::new();
        index.index_partitions(partitions);
        index
    }

    /// Add the tiles of the given partitions.
    ///
    /// Coordinates are positional (1-based), whatever the stored `y`/`x`.
    pub fn index_partitions(&mut self, partitions: &[TextPartition]) {
        for partition in partitions {
            for (y, row) in partition.rows.iter().enumerate() {
                for (x, tile) in row.tiles.iter().enumerate() {
                    if let Some(id) = tile.id() {
                        self.entries.insert(
                            id.to_string(),
                            TextIndexEntry {
                                unit_id: partition.id.clone(),
                                row: y as u32 + 1,
                                column: x as u32 + 1,
                            },
                        );
                    }
                }
            }
        }
    }

    /// Add the tiles of a JSON text dump (an array of partitions)
    pub fn index_json<R: Read>(&mut self, reader: R) -> Result<usize> {
        let partitions: Vec<TextPartition> = serde_json::from_reader(reader)?;
        self.index_partitions(&partitions);
        Ok(partitions.len())
    }

    /// Find the coordinates of a tile id
    pub fn find(&self, id: &str) -> Option<&TextIndexEntry> {
        self.entries.get(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove all the entries
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
