//! Word keys (`d<unit>w<word>`) identifying a single word across text and
//! apparatus

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

fn word_key_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^#?d(\d+)w(\d+)$").expect("valid word key pattern"))
}

/// A word identifier ordered by unit and then by word
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WordKey {
    /// Ordinal of the text unit (division)
    pub unit: u32,
    /// Ordinal of the word within the document
    pub word: u32,
}

impl WordKey {
    /// Create a key from its ordinals
    pub fn new(unit: u32, word: u32) -> Self {
        Self { unit, word }
    }

    /// Parse a key, accepting an optional leading `#`
    pub fn parse(text: &str) -> Result<Self> {
        let caps = word_key_regex()
            .captures(text.trim())
            .ok_or_else(|| Error::InvalidWordKey(text.to_string()))?;
        let unit = caps[1]
            .parse()
            .map_err(|_| Error::InvalidWordKey(text.to_string()))?;
        let word = caps[2]
            .parse()
            .map_err(|_| Error::InvalidWordKey(text.to_string()))?;
        Ok(Self { unit, word })
    }

    /// Check whether this key falls within the inclusive range `from..=to`
    pub fn is_inside(&self, from: &WordKey, to: &WordKey) -> bool {
        self >= from && self <= to
    }
}

impl FromStr for WordKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for WordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "d{:03}w{}", self.unit, self.word)
    }
}

/// Strip the conventional `#` reference prefix
pub fn strip_ref(text: &str) -> &str {
    text.strip_prefix('#').unwrap_or(text)
}
