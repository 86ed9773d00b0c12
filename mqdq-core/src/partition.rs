//! Splitting long divisions into bounded partitions
//!
//! Rows of an eligible `div1` are scanned window by window. A window closes
//! at the first sentence end reached once `min_rows` rows have been seen, or
//! at `max_rows` when no such sentence end comes. In the latter case an
//! earlier sentence end below the minimum, when present, is preferred. Each
//! boundary is a `pb` element inserted after the closing row, whose `n`
//! attribute holds the partition citation.

use std::sync::OnceLock;

use regex::Regex;

use crate::config::PartitionerConfig;
use crate::error::Result;
use crate::report::Reporter;
use crate::tei::{self, PB};
use crate::xml::{NodeId, XmlDocument};

fn terminator_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[\u{037e}.?!][^\p{L}]*$").expect("valid terminator pattern"))
}

/// Check whether a row's text ends a sentence
pub fn ends_sentence(text: &str) -> bool {
    terminator_regex().is_match(text)
}

/// Where the scan of one window stopped
#[derive(Debug, Default)]
struct WindowScan {
    /// Row index at which the scan stopped, if before the division end
    stop: Option<usize>,
    /// Most recent sentence end seen in the window
    last_candidate: Option<usize>,
    /// The window reached `max_rows` without an accepted sentence end
    exceeded: bool,
}

/// Inserts partition boundaries into TEI documents
pub struct Partitioner<'a> {
    config: PartitionerConfig,
    reporter: &'a dyn Reporter,
}

impl<'a> Partitioner<'a> {
    /// Create a partitioner, validating its thresholds
    pub fn new(config: PartitionerConfig, reporter: &'a dyn Reporter) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, reporter })
    }

    /// Get the configuration
    pub fn config(&self) -> &PartitionerConfig {
        &self.config
    }

    fn is_eligible_div(&self, doc: &XmlDocument, div: NodeId) -> bool {
        let applicable = doc
            .attr(div, "type")
            .map(|t| self.config.applicable_types.iter().any(|a| a == t))
            .unwrap_or(false);
        applicable && tei::rows(doc, div).len() > self.config.max_rows
    }

    /// Check whether a document needs partitioning: it has no `div2` and at
    /// least one eligible `div1` longer than `max_rows`
    pub fn is_applicable(&self, doc: &XmlDocument) -> Result<bool> {
        let body = doc.tei_body()?;
        if !doc.descendants_named(body, "div2").is_empty() {
            return Ok(false);
        }
        Ok(doc
            .child_elements_named(body, "div1")
            .into_iter()
            .any(|div| self.is_eligible_div(doc, div)))
    }

    /// Partition a document, returning whether any boundary was inserted
    pub fn partition(&self, doc: &mut XmlDocument, doc_id: &str) -> Result<bool> {
        if !self.is_applicable(doc)? {
            self.reporter
                .info(&format!("{doc_id}: partitioning not applicable"));
            return Ok(false);
        }

        let body = doc.tei_body()?;
        let divs: Vec<NodeId> = doc
            .descendants_named(body, "div1")
            .into_iter()
            .filter(|&div| self.is_eligible_div(doc, div))
            .collect();

        let mut ordinal = 0usize;
        let mut touched = false;
        for div in divs {
            touched |= self.partition_div(doc, div, doc_id, &mut ordinal);
        }
        Ok(touched)
    }

    fn scan_window(&self, doc: &XmlDocument, rows: &[NodeId], first: usize) -> WindowScan {
        let mut scan = WindowScan::default();
        for (j, &row) in rows.iter().enumerate().skip(first + 1) {
            let ordinal = j - first + 1;
            if ends_sentence(&doc.text_content(row)) {
                scan.last_candidate = Some(j);
                if ordinal >= self.config.min_rows {
                    scan.stop = Some(j);
                    break;
                }
            }
            if ordinal >= self.config.max_rows {
                scan.exceeded = true;
                scan.stop = Some(j);
                break;
            }
        }
        scan
    }

    fn partition_div(
        &self,
        doc: &mut XmlDocument,
        div: NodeId,
        doc_id: &str,
        ordinal: &mut usize,
    ) -> bool {
        let rows = tei::rows(doc, div);
        let mut touched = false;
        let mut first = 0;

        while first < rows.len() {
            let scan = self.scan_window(doc, &rows, first);

            // a lone trailing row joins the previous partition
            if scan.stop.is_none() && first + 1 == rows.len() {
                let previous_pb = doc
                    .preceding_elements(rows[first])
                    .into_iter()
                    .find(|&e| doc.is_named(e, PB));
                if let Some(pb) = previous_pb {
                    doc.insert_before(pb, rows[first]);
                    self.reporter.debug(&format!(
                        "{doc_id}: row {} moved into previous partition",
                        tei::row_identifier(doc, rows[first])
                    ));
                    touched = true;
                }
                break;
            }

            let closing = match (scan.exceeded, scan.last_candidate, scan.stop) {
                (true, Some(candidate), _) => candidate,
                (_, _, Some(stop)) => stop,
                (_, _, None) => rows.len() - 1,
            };

            *ordinal += 1;
            self.insert_break_after(doc, rows[closing], rows[first], doc_id, *ordinal);
            touched = true;
            first = closing + 1;
        }

        touched
    }

    fn insert_break_after(
        &self,
        doc: &mut XmlDocument,
        closing: NodeId,
        opening: NodeId,
        doc_id: &str,
        ordinal: usize,
    ) {
        let citation = format!(
            "{doc_id} {ordinal:05} #{}",
            tei::row_identifier(doc, opening)
        );

        // skip empty filler elements so the break sits before the next row
        let mut anchor = closing;
        for next in doc.following_elements(closing) {
            if tei::is_row(doc, next)
                || doc.is_named(next, PB)
                || !doc.text_content(next).trim().is_empty()
            {
                break;
            }
            anchor = next;
        }

        let pb = doc.create_element(PB);
        doc.set_attr(pb, "n", citation);
        doc.insert_after(anchor, pb);
    }
}
