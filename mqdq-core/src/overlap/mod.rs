//! Overlapping apparatus blocks
//!
//! Each `app` block of an apparatus document is reduced to the word keys it
//! covers ([`CoveredKeys`]). Two blocks overlap when they share a word, or
//! when their key forms intersect: a list key equal to another list key, a
//! list key inside a span, or a span endpoint inside the other span.
//! [`report_overlaps`] lists the overlapping pairs; [`OverlapRemover`] merges
//! them.

mod merge;

use crate::apparatus::{TYPE_ANCIENT_NOTE, TYPE_MARGIN_NOTE};
use crate::error::Result;
use crate::report::Reporter;
use crate::word_index::{WordEntry, WordIndex};
use crate::word_key::{strip_ref, WordKey};
use crate::xml::{NodeId, XmlDocument};

pub use merge::{MergeOutcome, OverlapRemover};

/// Parsed form of a block's location attributes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeySet {
    /// `@from`/`@to`
    Span { from: WordKey, to: WordKey },
    /// `@loc`
    List(Vec<WordKey>),
}

impl KeySet {
    /// Check whether two key sets intersect
    pub fn overlaps(&self, other: &KeySet) -> bool {
        match (self, other) {
            (KeySet::List(a), KeySet::List(b)) => a.iter().any(|k| b.contains(k)),
            (KeySet::List(keys), KeySet::Span { from, to })
            | (KeySet::Span { from, to }, KeySet::List(keys)) => {
                keys.iter().any(|k| k.is_inside(from, to))
            }
            (KeySet::Span { from: f1, to: t1 }, KeySet::Span { from: f2, to: t2 }) => {
                f1.is_inside(f2, t2)
                    || t1.is_inside(f2, t2)
                    || f2.is_inside(f1, t1)
                    || t2.is_inside(f1, t1)
            }
        }
    }

    /// The keys defining the set: the endpoints or the listed keys
    pub fn keys(&self) -> Vec<WordKey> {
        match self {
            KeySet::Span { from, to } => vec![*from, *to],
            KeySet::List(keys) => keys.clone(),
        }
    }
}

/// The words covered by an `app` block
#[derive(Debug, Clone)]
pub struct CoveredKeys {
    /// The `app` element
    pub app: NodeId,
    /// Covered words in document order
    pub words: Vec<WordEntry>,
    /// Parsed location attributes, when every key is well formed
    pub set: Option<KeySet>,
    /// Location attribute keys without `#`, space separated
    pub origin: String,
}

impl CoveredKeys {
    /// Check whether two blocks overlap; the relation is symmetric
    pub fn overlaps(&self, other: &CoveredKeys) -> bool {
        let shared = self
            .words
            .iter()
            .any(|w| other.words.iter().any(|o| o.id == w.id));
        if shared {
            return true;
        }
        match (&self.set, &other.set) {
            (Some(a), Some(b)) => a.overlaps(b),
            _ => false,
        }
    }

    /// Number of covered words
    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// A detected overlap between two blocks
#[derive(Debug, Clone)]
pub struct OverlapPair {
    /// Position of the first block among the collected ones
    pub first: usize,
    /// Position of the second block
    pub second: usize,
    pub first_app: NodeId,
    pub second_app: NodeId,
    /// Words covered by the first block
    pub words: Vec<WordEntry>,
}

/// Whether a block takes part in overlap detection: margin notes live in
/// another layer, and blocks made only of ancient notes never overlap
pub fn is_overlappable(doc: &XmlDocument, app: NodeId) -> bool {
    if doc.attr(app, "type") == Some(TYPE_MARGIN_NOTE) {
        return false;
    }
    doc.elements(app)
        .filter(|&e| doc.is_named(e, "lem") || doc.is_named(e, "rdg"))
        .any(|e| doc.attr(e, "type") != Some(TYPE_ANCIENT_NOTE))
}

fn parse_keys<'k>(keys: impl IntoIterator<Item = &'k str>) -> Option<Vec<WordKey>> {
    keys.into_iter().map(|k| WordKey::parse(k).ok()).collect()
}

fn covered_keys(
    doc: &XmlDocument,
    app: NodeId,
    index: &WordIndex,
    reporter: &dyn Reporter,
) -> Option<CoveredKeys> {
    if let Some(loc) = doc.attr(app, "loc") {
        let ids: Vec<&str> = loc.split_whitespace().map(strip_ref).collect();
        let mut words = Vec::with_capacity(ids.len());
        for id in &ids {
            match index.position(id) {
                Some(_) => words.push(WordEntry {
                    id: id.to_string(),
                    text: index.text(id).unwrap_or_default().to_string(),
                }),
                None => reporter.warn(&format!(
                    "Word key not found: {id} in app {}",
                    doc.position_info(app)
                )),
            }
        }
        // unresolved keys never take part in key comparisons
        let set = parse_keys(words.iter().map(|w| w.id.as_str()))
            .filter(|keys| !keys.is_empty())
            .map(KeySet::List);
        return Some(CoveredKeys {
            app,
            words,
            set,
            origin: ids.join(" "),
        });
    }

    let Some(from) = doc.attr(app, "from").map(strip_ref) else {
        reporter.warn(&format!("No location for app {}", doc.position_info(app)));
        return None;
    };
    let to = doc.attr(app, "to").map_or(from, strip_ref);
    let words = index.slice(from, to, reporter)?.to_vec();
    let set = match (WordKey::parse(from), WordKey::parse(to)) {
        (Ok(from), Ok(to)) => Some(KeySet::Span { from, to }),
        _ => None,
    };
    Some(CoveredKeys {
        app,
        words,
        set,
        origin: format!("{from} {to}"),
    })
}

/// Collect the covered keys of every overlappable `app` block, in document
/// order. Blocks covering no indexed word are skipped.
pub fn collect(
    doc: &XmlDocument,
    index: &WordIndex,
    reporter: &dyn Reporter,
) -> Result<Vec<CoveredKeys>> {
    let body = doc.tei_body()?;
    let mut sets = Vec::new();
    for app in doc.descendants_named(body, "app") {
        if !is_overlappable(doc, app) {
            continue;
        }
        match covered_keys(doc, app, index, reporter) {
            Some(keys) if !keys.is_empty() => sets.push(keys),
            _ => reporter.debug(&format!(
                "No covered words for app {}",
                doc.position_info(app)
            )),
        }
    }
    Ok(sets)
}

/// List every overlapping pair of blocks without touching the document
pub fn report_overlaps(
    doc: &XmlDocument,
    index: &WordIndex,
    reporter: &dyn Reporter,
) -> Result<Vec<OverlapPair>> {
    let sets = collect(doc, index, reporter)?;
    let mut pairs = Vec::new();
    for (i, a) in sets.iter().enumerate() {
        for (j, b) in sets.iter().enumerate().skip(i + 1) {
            if a.overlaps(b) {
                pairs.push(OverlapPair {
                    first: i,
                    second: j,
                    first_app: a.app,
                    second_app: b.app,
                    words: a.words.clone(),
                });
            }
        }
    }
    Ok(pairs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{CollectingReporter, NullReporter};

    fn key(text: &str) -> WordKey {
        WordKey::parse(text).unwrap()
    }

    fn span(from: &str, to: &str) -> KeySet {
        KeySet::Span {
            from: key(from),
            to: key(to),
        }
    }

    #[test]
    fn test_key_set_overlaps() {
        let a = span("d1w1", "d1w5");
        let b = span("d1w5", "d1w9");
        let c = span("d1w6", "d1w9");
        let list = KeySet::List(vec![key("d1w3"), key("d1w12")]);

        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
        assert!(list.overlaps(&a));
        assert!(a.overlaps(&list));
        assert!(!list.overlaps(&c));
        assert!(list.overlaps(&KeySet::List(vec![key("d1w12")])));
    }

    #[test]
    fn test_overlappable_filter() {
        let doc = XmlDocument::parse(
            r#"<r><app type="margin-note"><lem>a</lem></app><app><rdg type="ancient-note">b</rdg></app><app><rdg type="ancient-note">c</rdg><lem>d</lem></app></r>"#,
        )
        .unwrap();
        let apps = doc.descendants_named(doc.document(), "app");
        let flags: Vec<bool> = apps.iter().map(|&a| is_overlappable(&doc, a)).collect();
        assert_eq!(flags, vec![false, false, true]);
    }

    #[test]
    fn test_report_overlaps() {
        let index = WordIndex::from_tokens((1..=6).map(|i| (format!("d1w{i}"), format!("w{i}"))));
        let doc = XmlDocument::parse(
            r##"<TEI><text><body><div1 xml:id="d1">
<app from="#d1w1" to="#d1w3"><lem>w1 w2 w3</lem></app>
<app loc="#d1w3 #d1w6"><lem>w3</lem></app>
<app from="#d1w5" to="#d1w5"><lem>w5</lem></app>
</div1></body></text></TEI>"##,
        )
        .unwrap();
        let pairs = report_overlaps(&doc, &index, &NullReporter).unwrap();
        assert_eq!(pairs.len(), 1);
        assert_eq!((pairs[0].first, pairs[0].second), (0, 1));
        let words: Vec<&str> = pairs[0].words.iter().map(|w| w.text.as_str()).collect();
        assert_eq!(words, vec!["w1", "w2", "w3"]);
    }

    #[test]
    fn test_unknown_loc_key_is_not_compared() {
        let index = WordIndex::from_tokens((1..=4).map(|i| (format!("d1w{i}"), format!("w{i}"))));
        let doc = XmlDocument::parse(
            r##"<TEI><text><body><div1 xml:id="d1">
<app loc="#d1w1 #d1w9"><lem>w1</lem></app>
<app loc="#d1w2 #d1w9"><lem>w2</lem></app>
<app from="#d1w3" to="#d1w4"><lem>w3 w4</lem></app>
</div1></body></text></TEI>"##,
        )
        .unwrap();
        let reporter = CollectingReporter::new();
        let sets = collect(&doc, &index, &reporter).unwrap();
        assert_eq!(sets[0].set, Some(KeySet::List(vec![key("d1w1")])));
        assert_eq!(sets[0].origin, "d1w1 d1w9");
        assert!(reporter.contains(log::Level::Warn, "Word key not found: d1w9"));

        let pairs = report_overlaps(&doc, &index, &NullReporter).unwrap();
        assert!(pairs.is_empty());
    }

    #[test]
    fn test_unparsable_keys_fall_back_to_shared_words() {
        let index = WordIndex::from_tokens([("x1", "a"), ("x2", "b"), ("x3", "c")]);
        let doc = XmlDocument::parse(
            r##"<TEI><text><body><div1>
<app from="#x1" to="#x2"><lem>a b</lem></app>
<app from="#x2" to="#x3"><lem>b c</lem></app>
</div1></body></text></TEI>"##,
        )
        .unwrap();
        let sets = collect(&doc, &index, &NullReporter).unwrap();
        assert!(sets[0].set.is_none());
        assert!(sets[0].overlaps(&sets[1]));
        assert_eq!(sets[1].origin, "x2 x3");
    }
}
