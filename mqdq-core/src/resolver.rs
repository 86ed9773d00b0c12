//! Translation between word keys and tile locations

use crate::location::{Coordinate, Location};
use crate::report::Reporter;
use crate::text_index::{TextIndex, TextIndexEntry};
use crate::tiles::TextPartition;
use crate::word_key::strip_ref;

/// Resolves word keys through a [`TextIndex`], and maps locations back to
/// word keys through a partition's tiles
pub struct LocationResolver<'a> {
    index: &'a TextIndex,
    reporter: &'a dyn Reporter,
}

impl<'a> LocationResolver<'a> {
    pub fn new(index: &'a TextIndex, reporter: &'a dyn Reporter) -> Self {
        Self { index, reporter }
    }

    /// Get the underlying index
    pub fn index(&self) -> &TextIndex {
        self.index
    }

    /// Resolve a key (with or without `#`), reporting it when not found
    pub fn resolve(&self, key: &str) -> Option<&'a TextIndexEntry> {
        let id = strip_ref(key);
        let entry = self.index.find(id);
        if entry.is_none() {
            self.reporter.error(&format!("Word key not found in text index: {id}"));
        }
        entry
    }

    /// Resolve a pair of endpoints into a point or range within one unit.
    ///
    /// Returns the unit id and the location, or `None` (reported) when an
    /// endpoint is missing or the endpoints belong to different units.
    pub fn resolve_span(&self, from: &str, to: &str) -> Option<(String, Location)> {
        let a = self.resolve(from)?;
        if from == to {
            return Some((a.unit_id.clone(), Location::Point(a.coordinate())));
        }
        let b = self.resolve(to)?;
        if a.unit_id != b.unit_id {
            self.reporter.error(&format!(
                "Range {from}-{to} spans units {} and {}",
                a.unit_id, b.unit_id
            ));
            return None;
        }
        Some((a.unit_id.clone(), Location::span(a.coordinate(), b.coordinate())))
    }

    /// Resolve independent keys which must all belong to one unit
    pub fn resolve_list<'k, I>(&self, keys: I) -> Option<(String, Vec<Coordinate>)>
    where
        I: IntoIterator<Item = &'k str>,
    {
        let mut unit: Option<&str> = None;
        let mut coordinates = Vec::new();
        for key in keys {
            let entry = self.resolve(key)?;
            match unit {
                Some(u) if u != entry.unit_id => {
                    self.reporter.error(&format!(
                        "Location list spans units {u} and {} at {key}",
                        entry.unit_id
                    ));
                    return None;
                }
                _ => unit = Some(entry.unit_id.as_str()),
            }
            coordinates.push(entry.coordinate());
        }
        unit.map(|u| (u.to_string(), coordinates))
    }

    fn map_point(&self, point: Coordinate, partition: &TextPartition) -> Option<String> {
        let row_index = (point.row as usize).checked_sub(1);
        let Some(row) = row_index.and_then(|i| partition.rows.get(i)) else {
            self.reporter
                .error(&format!("Location point {point} out of rows of {}", partition.id));
            return None;
        };
        let column_index = (point.column as usize).checked_sub(1);
        let Some(tile) = column_index.and_then(|i| row.tiles.get(i)) else {
            self.reporter.error(&format!(
                "Location point {point} out of row tiles of {}",
                partition.id
            ));
            return None;
        };
        match tile.id() {
            Some(id) => Some(id.to_string()),
            None => {
                self.reporter
                    .error(&format!("Location point {point} maps to tile without id"));
                None
            }
        }
    }

    /// Map a point or range back to one or two word keys
    pub fn map_location(
        &self,
        location: &Location,
        partition: &TextPartition,
    ) -> Option<(String, Option<String>)> {
        match location {
            Location::Point(p) => Some((self.map_point(*p, partition)?, None)),
            Location::Range { start, end } => {
                let a = self.map_point(*start, partition)?;
                let b = self.map_point(*end, partition)?;
                Some((a, Some(b)))
            }
            Location::List(_) => {
                self.reporter
                    .error(&format!("Cannot map location list {location} to word keys"));
                None
            }
        }
    }
}
