//! Writing text partitions back into TEI divisions

use super::{clear_div_contents, find_div};
use crate::error::Result;
use crate::report::Reporter;
use crate::tei::W;
use crate::tiles::{TextPartition, TileRow, ESCAPE_PATCH_KEY, ID_KEY, NAME_KEY, SPLIT_KEY, TEXT_KEY};
use crate::xml::{NodeId, XmlDocument, XML_ID};

/// Map a data key back to an attribute name; reserved keys map to nothing
fn attribute_name(key: &str) -> Option<String> {
    match key {
        NAME_KEY | SPLIT_KEY | TEXT_KEY | ESCAPE_PATCH_KEY => None,
        ID_KEY => Some(XML_ID.to_string()),
        _ => match key.strip_prefix("xml_") {
            Some(local) => Some(format!("xml:{local}")),
            None => Some(key.to_string()),
        },
    }
}

/// Rebuilds the rows of TEI text documents from their partitions
pub struct TextExporter<'a> {
    reporter: &'a dyn Reporter,
    include_comments: bool,
}

impl<'a> TextExporter<'a> {
    pub fn new(reporter: &'a dyn Reporter) -> Self {
        Self {
            reporter,
            include_comments: false,
        }
    }

    /// Precede each partition with a comment holding its id
    pub fn with_comments(mut self, include: bool) -> Self {
        self.include_comments = include;
        self
    }

    /// Whether rows must be written with `w` children: the document already
    /// had words, or apparatus layers refer to them
    pub fn has_word_granularity(doc: &XmlDocument, has_layers: bool) -> Result<bool> {
        let body = doc.tei_body()?;
        Ok(has_layers || !doc.descendants_named(body, W).is_empty())
    }

    /// Replace the rows of every division with those of the partitions
    /// targeting it, returning the number of partitions written
    pub fn export(
        &self,
        doc: &mut XmlDocument,
        partitions: &[TextPartition],
        has_layers: bool,
    ) -> Result<usize> {
        let body = doc.tei_body()?;
        let words = Self::has_word_granularity(doc, has_layers)?;

        for name in ["div2", "div1"] {
            for div in doc.descendants_named(body, name) {
                clear_div_contents(doc, div, self.reporter);
            }
        }

        let mut written = 0;
        for partition in partitions {
            let Some(div) = find_div(doc, body, &partition.div_id) else {
                self.reporter.error(&format!(
                    "Target div #{} for partition {} not found",
                    partition.div_id, partition.id
                ));
                continue;
            };
            self.append_partition(doc, div, partition, words);
            written += 1;
        }
        Ok(written)
    }

    fn append_partition(
        &self,
        doc: &mut XmlDocument,
        div: NodeId,
        partition: &TextPartition,
        words: bool,
    ) {
        if self.include_comments {
            let comment = doc.create_comment(format!("partition {}", partition.id));
            doc.append(div, comment);
        }
        for row in &partition.rows {
            let element = self.build_row(doc, row, words);
            doc.append(div, element);
        }
    }

    fn build_row(&self, doc: &mut XmlDocument, row: &TileRow, words: bool) -> NodeId {
        let name = row.data.get(NAME_KEY).map_or("l", String::as_str);
        let element = doc.create_element(name);
        for (key, value) in &row.data {
            if let Some(attr) = attribute_name(key) {
                doc.set_attr(element, &attr, value.as_str());
            }
        }

        if !words {
            doc.append_text(element, &row.text());
            return element;
        }

        for (i, tile) in row.tiles.iter().enumerate() {
            if i > 0 {
                doc.append_text(element, " ");
            }
            let w = doc.create_element(W);
            for (key, value) in &tile.data {
                if let Some(attr) = attribute_name(key) {
                    doc.set_attr(w, &attr, value.as_str());
                }
            }
            let mut text = tile.text().unwrap_or_default().to_string();
            if let Some(patch) = tile.data.get(ESCAPE_PATCH_KEY) {
                text.push_str(&format!("(({patch}))"));
            }
            doc.append_text(w, &text);
            doc.append(element, w);
        }
        element
    }
}
