//! Apparatus layers, fragments and entries

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::location::Location;
use crate::markup::SECTION_SEPARATOR;

/// `app@type` / entry `@type` marking notes by ancient commentators
pub const TYPE_ANCIENT_NOTE: &str = "ancient-note";
/// `app@type` marking marginal notes
pub const TYPE_MARGIN_NOTE: &str = "margin-note";

/// What an entry represents
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// A reading (`lem` or `rdg`)
    #[default]
    Replacement,
    /// A free note
    Note,
}

/// A witness or author reference, optionally annotated
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotatedValue {
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl AnnotatedValue {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            note: None,
        }
    }
}

/// One reading or note of a fragment
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApparatusEntry {
    pub kind: EntryKind,
    /// Source element `@type`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    /// Set for the preferred reading (`lem`)
    #[serde(default)]
    pub accepted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    /// Normalized identifiers, each `VALUE#n`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub idents: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub witnesses: Vec<AnnotatedValue>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub authors: Vec<AnnotatedValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl ApparatusEntry {
    /// Identifiers joined with the note section separator
    pub fn norm_value(&self) -> Option<String> {
        if self.idents.is_empty() {
            return None;
        }
        let separator = SECTION_SEPARATOR.to_string();
        Some(self.idents.join(&separator))
    }

    /// Whether the entry carries a value
    pub fn has_value(&self) -> bool {
        self.value.is_some()
    }
}

impl fmt::Display for ApparatusEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            EntryKind::Replacement => {
                f.write_str(if self.accepted { "lem" } else { "rdg" })?;
                if let Some(value) = &self.value {
                    write!(f, " \"{value}\"")?;
                }
            }
            EntryKind::Note => f.write_str("note")?,
        }
        let refs: Vec<&str> = self
            .witnesses
            .iter()
            .chain(&self.authors)
            .map(|v| v.value.as_str())
            .collect();
        if !refs.is_empty() {
            write!(f, " ({})", refs.join(" "))?;
        }
        Ok(())
    }
}

/// One `app` block resolved to a location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApparatusFragment {
    pub location: Location,
    /// Division id, followed by the block type when present
    #[serde(default)]
    pub tag: String,
    #[serde(default)]
    pub entries: Vec<ApparatusEntry>,
}

impl ApparatusFragment {
    pub fn new(location: Location, tag: impl Into<String>) -> Self {
        Self {
            location,
            tag: tag.into(),
            entries: Vec::new(),
        }
    }

    /// Second token of the tag: the source block type
    pub fn block_type(&self) -> Option<&str> {
        self.tag.split_once(' ').map(|(_, t)| t)
    }

    /// Whether the fragment comes from a marginal note block
    pub fn is_margin(&self) -> bool {
        self.tag.contains(TYPE_MARGIN_NOTE)
    }
}

impl fmt::Display for ApparatusFragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]: ", self.location, self.entries.len())?;
        for (i, entry) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{entry}")?;
        }
        Ok(())
    }
}

/// Which layer of a unit the fragments belong to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerRole {
    #[default]
    Main,
    Margin,
}

/// The apparatus fragments attached to one text unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApparatusLayer {
    /// Text partition the locations refer to
    pub unit_id: String,
    /// Lowercased source document id
    pub scope: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub role: LayerRole,
    pub fragments: Vec<ApparatusFragment>,
}

impl ApparatusLayer {
    pub fn new(unit_id: impl Into<String>, doc_id: &str, user_id: impl Into<String>) -> Self {
        Self {
            unit_id: unit_id.into(),
            scope: doc_id.to_lowercase(),
            user_id: user_id.into(),
            role: LayerRole::Main,
            fragments: Vec::new(),
        }
    }

    /// Locations of all the fragments, comma separated
    pub fn locations_dump(&self) -> String {
        self.fragments
            .iter()
            .map(|f| f.location.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Whether any two fragments overlap
    pub fn has_overlaps(&self) -> bool {
        let frs = &self.fragments;
        (0..frs.len()).any(|i| {
            frs[i + 1..]
                .iter()
                .any(|other| frs[i].location.overlaps(&other.location))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(accepted: bool, value: &str) -> ApparatusEntry {
        ApparatusEntry {
            accepted,
            value: Some(value.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_norm_value() {
        let mut e = entry(true, "arma");
        assert_eq!(e.norm_value(), None);
        e.idents = vec!["arma#1".to_string(), "virum#2".to_string()];
        assert_eq!(e.norm_value().as_deref(), Some("arma#1`virum#2"));
    }

    #[test]
    fn test_fragment_block_type_and_margin() {
        let fr = ApparatusFragment::new("1.1".parse().unwrap(), "d001 margin-note");
        assert_eq!(fr.block_type(), Some("margin-note"));
        assert!(fr.is_margin());
        let fr = ApparatusFragment::new("1.1".parse().unwrap(), "d001");
        assert_eq!(fr.block_type(), None);
        assert!(!fr.is_margin());
    }

    #[test]
    fn test_layer_overlaps() {
        let mut layer = ApparatusLayer::new("ov-00001", "OV", "zeus");
        assert_eq!(layer.scope, "ov");
        layer
            .fragments
            .push(ApparatusFragment::new("1.1-1.3".parse().unwrap(), "d001"));
        layer
            .fragments
            .push(ApparatusFragment::new("2.1".parse().unwrap(), "d001"));
        assert!(!layer.has_overlaps());
        layer
            .fragments
            .push(ApparatusFragment::new("1.2".parse().unwrap(), "d001"));
        assert!(layer.has_overlaps());
        assert_eq!(layer.locations_dump(), "1.1-1.3, 2.1, 1.2");
    }

    #[test]
    fn test_entry_serialization() {
        let mut fr = ApparatusFragment::new("3.2".parse().unwrap(), "d001");
        let mut e = entry(false, "virum");
        e.witnesses.push(AnnotatedValue::new("A"));
        fr.entries.push(e);
        let json = serde_json::to_string(&fr).unwrap();
        assert!(json.contains("\"location\":\"3.2\""));
        assert!(json.contains("\"kind\":\"replacement\""));
        assert!(!json.contains("groupId"));
        let back: ApparatusFragment = serde_json::from_str(&json).unwrap();
        assert_eq!(back, fr);
        assert_eq!(back.to_string(), "3.2 [1]: rdg \"virum\" (A)");
    }
}
