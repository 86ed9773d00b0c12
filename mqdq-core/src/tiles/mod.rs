//! Tile-indexed text model
//!
//! A [`TextPartition`] holds the rows of one partition of a division; each
//! [`TileRow`] holds one [`Tile`] per word. Rows and tiles carry open
//! attribute maps copied from the source elements.

mod description;
mod escape;
mod parser;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub use description::description_text;
pub use escape::extract_escape;
pub use parser::TextParser;

/// Tile key holding the visible word text
pub const TEXT_KEY: &str = "text";
/// Tile key holding the word key
pub const ID_KEY: &str = "id";
/// Tile key holding an inline escape removed from the text
pub const ESCAPE_PATCH_KEY: &str = "escape-patch";
/// Row key holding the source element name
pub const NAME_KEY: &str = "_name";
/// Row key flagging rows whose tiles were split from raw text
pub const SPLIT_KEY: &str = "_split";

/// Open attribute map of rows and tiles
pub type DataMap = BTreeMap<String, String>;

/// One word of a row
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    /// 1-based column
    pub x: u32,
    #[serde(default)]
    pub data: DataMap,
}

impl Tile {
    pub fn text(&self) -> Option<&str> {
        self.data.get(TEXT_KEY).map(String::as_str)
    }

    pub fn id(&self) -> Option<&str> {
        self.data.get(ID_KEY).map(String::as_str)
    }
}

/// One line or paragraph
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileRow {
    /// 1-based row number within the partition
    pub y: u32,
    #[serde(default)]
    pub data: DataMap,
    #[serde(default)]
    pub tiles: Vec<Tile>,
}

impl TileRow {
    /// Row kind: `paragraph` for `p` rows, `line` otherwise
    pub fn kind(&self) -> &'static str {
        match self.data.get(NAME_KEY).map(String::as_str) {
            Some("p") => "paragraph",
            _ => "line",
        }
    }

    /// Whether the tiles were synthesized by splitting raw text
    pub fn is_synthesized(&self) -> bool {
        self.data.get(SPLIT_KEY).map(String::as_str) == Some("1")
    }

    /// Row text, with tile texts joined by spaces
    pub fn text(&self) -> String {
        self.tiles
            .iter()
            .filter_map(Tile::text)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// One partition of a division, rendered as rows of tiles
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextPartition {
    /// Unique partition id, `<doc>-<ordinal>`
    pub id: String,
    /// Source document id
    pub doc_id: String,
    /// `xml:id` of the source division
    #[serde(default)]
    pub div_id: String,
    /// 1-based ordinal within the document
    pub ordinal: u32,
    pub citation: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub facet_id: String,
    #[serde(default)]
    pub user_id: String,
    pub rows: Vec<TileRow>,
}

impl TextPartition {
    /// Number of tiles over all the rows
    pub fn tile_count(&self) -> usize {
        self.rows.iter().map(|r| r.tiles.len()).sum()
    }
}
