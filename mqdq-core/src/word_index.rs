//! Ordered word-key to word-text table with inclusive range slicing

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::report::Reporter;
use crate::xml::{XmlDocument, XML_ID};

/// One word of the index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordEntry {
    /// Word key text, as found in the document
    pub id: String,
    /// Trimmed word text
    pub text: String,
}

/// Word keys in document order
#[derive(Debug, Clone, Default)]
pub struct WordIndex {
    entries: Vec<WordEntry>,
    first_positions: HashMap<String, usize>,
}

impl WordIndex {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index from `(id, text)` pairs in document order
    pub fn from_tokens<I, K, T>(tokens: I) -> Self
    where
        I: IntoIterator<Item = (K, T)>,
        K: Into<String>,
        T: AsRef<str>,
    {
        let mut index = Self::new();
        for (id, text) in tokens {
            index.push(id.into(), text.as_ref().trim().to_string());
        }
        index
    }

    /// Build an index from the `w` elements of a document.
    ///
    /// Tokens lacking an `xml:id` are not indexed.
    pub fn from_document(doc: &XmlDocument) -> Self {
        let mut index = Self::new();
        for w in doc.descendants_named(doc.document(), "w") {
            if let Some(id) = doc.attr(w, XML_ID) {
                index.push(id.to_string(), doc.text_content(w).trim().to_string());
            }
        }
        index
    }

    fn push(&mut self, id: String, text: String) {
        self.first_positions
            .entry(id.clone())
            .or_insert(self.entries.len());
        self.entries.push(WordEntry { id, text });
    }

    /// Number of indexed words
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the index is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over the entries in document order
    pub fn iter(&self) -> impl Iterator<Item = &WordEntry> {
        self.entries.iter()
    }

    /// Get the position of the first entry with the given key
    pub fn position(&self, id: &str) -> Option<usize> {
        self.first_positions.get(id).copied()
    }

    /// Get the text of a word by key
    pub fn text(&self, id: &str) -> Option<&str> {
        self.position(id).map(|i| self.entries[i].text.as_str())
    }

    /// Get the inclusive run of entries from `from` to `to`.
    ///
    /// `to` is searched forward from `from`; when it only occurs earlier the
    /// range is inverted, reported as a warning and swapped. A missing
    /// endpoint is reported as an error and yields `None`.
    pub fn slice(&self, from: &str, to: &str, reporter: &dyn Reporter) -> Option<&[WordEntry]> {
        let Some(start) = self.position(from) else {
            reporter.error(&format!("Word key not found: {from}"));
            return None;
        };

        if from == to {
            return Some(&self.entries[start..=start]);
        }

        if let Some(offset) = self.entries[start..].iter().position(|e| e.id == to) {
            return Some(&self.entries[start..=start + offset]);
        }

        match self.entries[..start].iter().position(|e| e.id == to) {
            Some(end) => {
                reporter.warn(&format!("Inverted range: {from}-{to}"));
                Some(&self.entries[end..=start])
            }
            None => {
                reporter.error(&format!("Word key not found: {to}"));
                None
            }
        }
    }
}
