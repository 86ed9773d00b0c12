//! Witness and author thesauri from TEI headers
//!
//! Apparatus documents list their witnesses in
//! `teiHeader/fileDesc/sourceDesc/listWit/listWit/witness` and their
//! authors in `.../listBibl/listBibl/bibl`. Apparatus entries refer to them
//! by `xml:id` (`#X`); each list becomes a [`Thesaurus`] mapping those ids
//! to short labels.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::report::Reporter;
use crate::xml::{NodeId, XmlDocument, XML_ID};

/// Labels longer than this are shortened
pub const MAX_LABEL_LENGTH: usize = 30;

/// Characters a label cut may move around [`MAX_LABEL_LENGTH`] to end at a
/// space
const CUT_SLACK: usize = 5;

const ELLIPSIS: char = '\u{2026}';

fn tail_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\s*(\([^)]+\)|\[[^\]]+\])\s*$").expect("valid label tail pattern")
    })
}

/// One id-label pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThesaurusEntry {
    pub id: String,
    pub value: String,
}

/// A named list of entries, e.g. `apparatus-witnesses.verg@en`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thesaurus {
    pub id: String,
    #[serde(default)]
    pub entries: Vec<ThesaurusEntry>,
}

impl Thesaurus {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            entries: Vec::new(),
        }
    }

    /// Label of an entry
    pub fn label(&self, id: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.id == id)
            .map(|e| e.value.as_str())
    }
}

/// Which source list a thesaurus is built from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SourceKind {
    Witnesses,
    Authors,
}

impl SourceKind {
    fn thesaurus_id(self, doc_id: &str) -> String {
        let kind = match self {
            Self::Witnesses => "witnesses",
            Self::Authors => "authors",
        };
        format!("apparatus-{kind}.{doc_id}@en")
    }

    /// List element, its nested list, and the item element
    fn path(self) -> (&'static str, &'static str) {
        match self {
            Self::Witnesses => ("listWit", "witness"),
            Self::Authors => ("listBibl", "bibl"),
        }
    }
}

/// Cut `text` to about `max` characters at a space, appending `…`.
/// The cut looks back up to [`CUT_SLACK`] characters for a space, then
/// forward; without one it falls on `max`.
pub fn cut_text(text: &str, max: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= max {
        return text.to_string();
    }

    let backward = (max.saturating_sub(CUT_SLACK)..=max)
        .rev()
        .find(|&i| chars[i].is_whitespace());
    let forward = || {
        (max + 1..=(max + CUT_SLACK).min(chars.len() - 1)).find(|&i| chars[i].is_whitespace())
    };
    let end = backward.or_else(forward).unwrap_or(max);

    let head: String = chars[..end].iter().collect();
    format!("{}{ELLIPSIS}", head.trim_end())
}

/// Shorten a long label, keeping a trailing `(…)` or `[…]` part after the
/// cut head
pub fn reduce_label(label: &str) -> String {
    if label.chars().count() <= MAX_LABEL_LENGTH {
        return label.to_string();
    }

    let Some(captures) = tail_regex().captures(label) else {
        return cut_text(label, MAX_LABEL_LENGTH);
    };
    let (Some(whole), Some(tail)) = (captures.get(0), captures.get(1)) else {
        return cut_text(label, MAX_LABEL_LENGTH);
    };

    let tail = tail.as_str();
    let mut short_tail = cut_text(tail, MAX_LABEL_LENGTH);
    if short_tail != tail {
        short_tail.push(if tail.starts_with('[') { ']' } else { ')' });
    }

    let head = cut_text(&label[..whole.start()], MAX_LABEL_LENGTH);
    if head.is_empty() {
        short_tail
    } else {
        format!("{head} {short_tail}")
    }
}

/// Builds the witness and author thesauri of apparatus documents
pub struct ThesaurusParser<'a> {
    reporter: &'a dyn Reporter,
}

impl<'a> ThesaurusParser<'a> {
    pub fn new(reporter: &'a dyn Reporter) -> Self {
        Self { reporter }
    }

    /// Parse the witnesses and authors thesauri, in this order. The id is
    /// lowercased into the thesauri ids.
    ///
    /// A document without a `sourceDesc` holding a `listWit` is an error;
    /// a missing author list yields an empty thesaurus.
    pub fn parse(&self, doc: &XmlDocument, doc_id: &str) -> Result<Vec<Thesaurus>> {
        let doc_id = doc_id.to_lowercase();
        let source_desc = find_source_desc(doc).ok_or_else(|| {
            Error::MissingElement("teiHeader/fileDesc/sourceDesc/listWit".to_string())
        })?;

        Ok([SourceKind::Witnesses, SourceKind::Authors]
            .into_iter()
            .map(|kind| self.parse_source(doc, source_desc, &doc_id, kind))
            .collect())
    }

    fn parse_source(
        &self,
        doc: &XmlDocument,
        source_desc: NodeId,
        doc_id: &str,
        kind: SourceKind,
    ) -> Thesaurus {
        let mut thesaurus = Thesaurus::new(kind.thesaurus_id(doc_id));
        let (list, item) = kind.path();
        let Some(inner) = doc
            .first_child_named(source_desc, list)
            .and_then(|outer| doc.first_child_named(outer, list))
        else {
            self.reporter
                .warn(&format!("{doc_id}: no {list}/{list} in sourceDesc"));
            return thesaurus;
        };

        for child in doc.child_elements_named(inner, item) {
            let Some(id) = doc.attr(child, XML_ID) else {
                self.reporter.error(&format!(
                    "{doc_id}: {item} without xml:id {}",
                    doc.position_info(child)
                ));
                continue;
            };

            let mut value = doc
                .text_content(child)
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ");
            if doc.attr(child, "ref").is_some() {
                if let Some(n) = doc.attr(child, "n") {
                    value.insert_str(0, n);
                }
            }

            thesaurus.entries.push(ThesaurusEntry {
                id: id.to_string(),
                value: reduce_label(&value),
            });
        }
        self.reporter.debug(&format!(
            "{}: {} entries",
            thesaurus.id,
            thesaurus.entries.len()
        ));
        thesaurus
    }
}

/// The first `sourceDesc` of the header holding a `listWit`
fn find_source_desc(doc: &XmlDocument) -> Option<NodeId> {
    let root = doc.root()?;
    let header = doc.first_child_named(root, "teiHeader")?;
    let file_desc = doc.first_child_named(header, "fileDesc")?;
    doc.child_elements_named(file_desc, "sourceDesc")
        .into_iter()
        .find(|&s| doc.first_child_named(s, "listWit").is_some())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::CollectingReporter;
    use log::Level;

    const HEADER: &str = r#"<TEI><teiHeader><fileDesc><titleStmt/>
<sourceDesc><bibl>edition</bibl></sourceDesc>
<sourceDesc>
  <listWit><listWit>
    <witness xml:id="M">Mediceus</witness>
    <witness xml:id="P">Codex   Vaticanus
      Palatinus</witness>
    <witness xml:id="V">Codex Vaticanus Latinus 3225 saec. IV-V (Schedae Vaticanae)</witness>
    <witness>anonymous</witness>
  </listWit></listWit>
  <listBibl><listBibl>
    <bibl xml:id="Serv" ref="x" n="Serv. ">ad Aen. I 1</bibl>
    <bibl xml:id="Non">Nonius</bibl>
  </listBibl></listBibl>
</sourceDesc></fileDesc></teiHeader><text><body/></text></TEI>"#;

    #[test]
    fn test_parse_witnesses_and_authors() {
        let doc = XmlDocument::parse(HEADER).unwrap();
        let reporter = CollectingReporter::new();
        let thesauri = ThesaurusParser::new(&reporter).parse(&doc, "VERG-Aen").unwrap();
        assert_eq!(thesauri.len(), 2);

        let witnesses = &thesauri[0];
        assert_eq!(witnesses.id, "apparatus-witnesses.verg-aen@en");
        assert_eq!(witnesses.entries.len(), 3);
        assert_eq!(witnesses.label("M"), Some("Mediceus"));
        assert_eq!(witnesses.label("P"), Some("Codex Vaticanus Palatinus"));
        assert_eq!(
            witnesses.label("V"),
            Some("Codex Vaticanus Latinus 3225\u{2026} (Schedae Vaticanae)")
        );
        assert!(reporter.contains(Level::Error, "witness without xml:id"));

        let authors = &thesauri[1];
        assert_eq!(authors.id, "apparatus-authors.verg-aen@en");
        assert_eq!(authors.label("Serv"), Some("Serv. ad Aen. I 1"));
        assert_eq!(authors.label("Non"), Some("Nonius"));
    }

    #[test]
    fn test_missing_lists() {
        let doc = XmlDocument::parse(
            r#"<TEI><teiHeader><fileDesc><sourceDesc><listWit><listWit><witness xml:id="A">a</witness></listWit></listWit></sourceDesc></fileDesc></teiHeader></TEI>"#,
        )
        .unwrap();
        let reporter = CollectingReporter::new();
        let thesauri = ThesaurusParser::new(&reporter).parse(&doc, "ov").unwrap();
        assert_eq!(thesauri[0].entries.len(), 1);
        assert!(thesauri[1].entries.is_empty());
        assert!(reporter.contains(Level::Warn, "no listBibl/listBibl"));

        let bare = XmlDocument::parse("<TEI><teiHeader><fileDesc/></teiHeader></TEI>").unwrap();
        assert!(matches!(
            ThesaurusParser::new(&reporter).parse(&bare, "ov"),
            Err(Error::MissingElement(_))
        ));
    }

    #[test]
    fn test_cut_text() {
        assert_eq!(cut_text("short", 30), "short");
        assert_eq!(
            cut_text("Codex Vaticanus Latinus 3225 saec. IV-V", 30),
            "Codex Vaticanus Latinus 3225\u{2026}"
        );
        // no space near the limit: forward, then a hard cut
        assert_eq!(
            cut_text("Abcdefghijklmnopqrstuvwxyzabcde fg", 30),
            "Abcdefghijklmnopqrstuvwxyzabcde\u{2026}"
        );
        assert_eq!(cut_text(&"x".repeat(40), 30), format!("{}\u{2026}", "x".repeat(30)));
    }

    #[test]
    fn test_reduce_label_tails() {
        assert_eq!(reduce_label("Mediceus (M)"), "Mediceus (M)");
        assert_eq!(
            reduce_label("Codex Bernensis 172 saeculi noni [Bernensis olim Floriacensis secundus et tertius]"),
            "Codex Bernensis 172 saeculi\u{2026} [Bernensis olim Floriacensis\u{2026}]"
        );
        assert_eq!(
            reduce_label("Fragmenta Augustea et alia multa vetera"),
            "Fragmenta Augustea et alia\u{2026}"
        );
    }
}
