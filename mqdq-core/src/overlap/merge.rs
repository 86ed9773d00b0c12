//! Merging overlapping apparatus blocks

use std::collections::{BTreeSet, HashSet};

use super::{collect, CoveredKeys};
use crate::error::Result;
use crate::report::Reporter;
use crate::word_index::WordIndex;
use crate::xml::{NodeId, XmlDocument, XML_ID};

/// Result of merging the overlaps of one document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Number of blocks merged into another one
    pub merged: usize,
    /// `(document id, div1 id)` of every merge losing witnesses or sources
    pub lossy_divs: BTreeSet<(String, String)>,
}

/// Merges overlapping `app` blocks in place.
///
/// Of two overlapping blocks, the one covering more words is the target;
/// on a tie, the one with more children; then the first one. All the
/// source's children but `lem` move into the target, each marked with an
/// `@n` holding the source's location keys, and the source is removed.
pub struct OverlapRemover<'a> {
    reporter: &'a dyn Reporter,
}

impl<'a> OverlapRemover<'a> {
    pub fn new(reporter: &'a dyn Reporter) -> Self {
        Self { reporter }
    }

    /// Merge every overlap of the document, rescanning after each merge
    pub fn remove_overlaps(
        &self,
        doc: &mut XmlDocument,
        doc_id: &str,
        index: &WordIndex,
    ) -> Result<MergeOutcome> {
        let mut sets = collect(doc, index, self.reporter)?;
        let mut outcome = MergeOutcome::default();
        let mut relocated: HashSet<NodeId> = HashSet::new();

        let mut i = 0;
        while i + 1 < sets.len() {
            let Some(j) = (i + 1..sets.len()).find(|&j| sets[i].overlaps(&sets[j])) else {
                i += 1;
                continue;
            };

            let (target, source) = if is_first_target(doc, &sets[i], &sets[j]) {
                (i, j)
            } else {
                (j, i)
            };
            self.merge(doc, doc_id, &sets[source], &sets[target], &mut relocated, &mut outcome);
            sets.remove(source);
            outcome.merged += 1;

            // the pair's first block may overlap further blocks now
            i = source.min(target);
        }

        if outcome.merged > 0 {
            self.reporter
                .info(&format!("{doc_id}: {} overlapping app(s) merged", outcome.merged));
        }
        Ok(outcome)
    }

    fn merge(
        &self,
        doc: &mut XmlDocument,
        doc_id: &str,
        source: &CoveredKeys,
        target: &CoveredKeys,
        relocated: &mut HashSet<NodeId>,
        outcome: &mut MergeOutcome,
    ) {
        self.reporter.info(&format!(
            "Merging overlapping app {} into {}",
            attributes_dump(doc, source.app),
            attributes_dump(doc, target.app)
        ));

        let source_lem = doc.first_child_named(source.app, "lem");
        let target_lem = doc.first_child_named(target.app, "lem");
        if lem_has_lost_attributes(doc, source_lem, target_lem) {
            let div_id = doc
                .ancestor_named(source.app, "div1")
                .and_then(|div| doc.attr(div, XML_ID))
                .unwrap_or_default()
                .to_string();
            self.reporter.warn(&format!(
                "Removed overlapping app lost sources at div {div_id}: {}",
                attributes_dump(doc, source.app)
            ));
            outcome.lossy_divs.insert((doc_id.to_string(), div_id));
        }

        let moving: Vec<NodeId> = doc
            .elements(source.app)
            .filter(|&e| !doc.is_named(e, "lem"))
            .collect();
        for child in moving {
            // children moved by an earlier merge keep their first origin
            if relocated.insert(child) {
                doc.set_attr(child, "n", source.origin.as_str());
            }
            doc.append(target.app, child);
        }
        doc.detach(source.app);
    }
}

fn is_first_target(doc: &XmlDocument, a: &CoveredKeys, b: &CoveredKeys) -> bool {
    if a.len() != b.len() {
        return a.len() > b.len();
    }
    let a_children = doc.elements(a.app).count();
    let b_children = doc.elements(b.app).count();
    if a_children != b_children {
        return a_children > b_children;
    }
    true
}

fn attributes_dump(doc: &XmlDocument, id: NodeId) -> String {
    doc.attributes(id)
        .iter()
        .map(|a| format!("{}=\"{}\"", a.name, a.value))
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_token_subset(a: &str, b: &str) -> bool {
    let b: HashSet<&str> = b.split_whitespace().collect();
    a.split_whitespace().all(|t| b.contains(t))
}

/// Whether merging would drop the witnesses or sources of the source `lem`:
/// the target has no `lem`, lacks one of the attributes, or does not list
/// every source token
fn lem_has_lost_attributes(
    doc: &XmlDocument,
    source_lem: Option<NodeId>,
    target_lem: Option<NodeId>,
) -> bool {
    let Some(source_lem) = source_lem else {
        return false;
    };
    let source_wit = doc.attr(source_lem, "wit");
    let source_src = doc.attr(source_lem, "source");
    if source_wit.is_none() && source_src.is_none() {
        return false;
    }
    let Some(target_lem) = target_lem else {
        return true;
    };

    let lost = |source: Option<&str>, target: Option<&str>| match (source, target) {
        (None, _) => false,
        (Some(_), None) => true,
        (Some(s), Some(t)) => !is_token_subset(s, t),
    };
    lost(source_wit, doc.attr(target_lem, "wit"))
        || lost(source_src, doc.attr(target_lem, "source"))
}
