//! Building text partitions from TEI documents

use std::sync::OnceLock;

use regex::Regex;

use super::{
    description_text, extract_escape, DataMap, TextPartition, Tile, TileRow, ESCAPE_PATCH_KEY,
    ID_KEY, NAME_KEY, SPLIT_KEY, TEXT_KEY,
};
use crate::config::TextConfig;
use crate::error::Result;
use crate::report::Reporter;
use crate::tei::{self, PB, W};
use crate::word_key::WordKey;
use crate::xml::{Attribute, NodeId, XmlDocument, XML_ID};

fn div_id_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^d(\d+)$").expect("valid division id pattern"))
}

/// Map a source attribute name to a data key: `xml:id` becomes `id`, other
/// `xml:` attributes become `xml_<name>`, prefixes are dropped otherwise.
fn data_key(attr: &Attribute) -> String {
    match attr.name.split_once(':') {
        Some(("xml", "id")) => ID_KEY.to_string(),
        Some(("xml", local)) => format!("xml_{local}"),
        Some((_, local)) => local.to_string(),
        None => attr.name.clone(),
    }
}

fn copy_attributes(doc: &XmlDocument, element: NodeId, data: &mut DataMap) {
    for attr in doc.attributes(element) {
        data.insert(data_key(attr), attr.value.clone());
    }
}

/// Per-document parsing state
struct ParseState<'d> {
    doc: &'d XmlDocument,
    doc_id: &'d str,
    ordinal: u32,
    word_nr: u32,
    partitions: Vec<TextPartition>,
}

/// Parses TEI text documents into [`TextPartition`]s
pub struct TextParser<'a> {
    config: TextConfig,
    reporter: &'a dyn Reporter,
}

impl<'a> TextParser<'a> {
    pub fn new(config: TextConfig, reporter: &'a dyn Reporter) -> Self {
        Self { config, reporter }
    }

    /// Parse a document into partitions.
    ///
    /// Documents containing `pb` breaks yield one partition per break
    /// segment of each `div1`; other documents yield one partition per
    /// `div2`, or per `div1` when there are no `div2`.
    pub fn parse(&self, doc: &XmlDocument, doc_id: &str) -> Result<Vec<TextPartition>> {
        let body = doc.tei_body()?;
        let mut state = ParseState {
            doc,
            doc_id,
            ordinal: 0,
            word_nr: 1,
            partitions: Vec::new(),
        };

        let partitioned = doc
            .root()
            .map(|root| !doc.descendants_named(root, PB).is_empty())
            .unwrap_or(false);

        if partitioned {
            for div in doc.child_elements_named(body, "div1") {
                let mut segment = Vec::new();
                for child in doc.elements(div) {
                    if doc.is_named(child, PB) {
                        self.import_segment(&mut state, div, &segment);
                        segment.clear();
                    } else if tei::is_row(doc, child) {
                        segment.push(child);
                    }
                }
                self.import_segment(&mut state, div, &segment);
            }
        } else {
            let div_name = if doc.descendants_named(body, "div2").is_empty() {
                "div1"
            } else {
                "div2"
            };
            for div in doc.descendants_named(body, div_name) {
                let rows = tei::rows(doc, div);
                self.import_segment(&mut state, div, &rows);
            }
        }

        self.reporter.info(&format!(
            "{doc_id}: {} partition(s), {} word(s) synthesized",
            state.partitions.len(),
            state.word_nr - 1
        ));
        Ok(state.partitions)
    }

    fn import_segment(&self, state: &mut ParseState<'_>, div: NodeId, rows: &[NodeId]) {
        let doc = state.doc;
        let (Some(&first), Some(&last)) = (rows.first(), rows.last()) else {
            self.reporter.debug(&format!(
                "{}: empty segment in division {}",
                state.doc_id,
                doc.position_info(div)
            ));
            return;
        };

        state.ordinal += 1;
        let unit = unit_number(doc, div);
        let mut partition = TextPartition {
            id: format!("{}-{:05}", state.doc_id, state.ordinal),
            doc_id: state.doc_id.to_string(),
            div_id: doc.attr(div, XML_ID).unwrap_or_default().to_string(),
            ordinal: state.ordinal,
            citation: citation(doc, state.doc_id, div, first, last),
            description: String::new(),
            facet_id: self.config.facet_id.clone(),
            user_id: self.config.user_id.clone(),
            rows: Vec::with_capacity(rows.len()),
        };

        let mut text = String::new();
        for (i, &element) in rows.iter().enumerate() {
            let row_text = doc.text_content(element);
            text.push_str(&row_text);
            text.push(' ');

            let mut row = TileRow {
                y: i as u32 + 1,
                ..Default::default()
            };
            row.data.insert(
                NAME_KEY.to_string(),
                doc.local_name(element).unwrap_or("l").to_string(),
            );
            copy_attributes(doc, element, &mut row.data);

            let words = doc.child_elements_named(element, W);
            if words.is_empty() {
                row.data.insert(SPLIT_KEY.to_string(), "1".to_string());
                for (x, word) in row_text.split_whitespace().enumerate() {
                    let key = WordKey::new(unit, state.word_nr);
                    state.word_nr += 1;
                    let mut tile = Tile {
                        x: x as u32 + 1,
                        ..Default::default()
                    };
                    tile.data.insert(TEXT_KEY.to_string(), word.to_string());
                    tile.data.insert(ID_KEY.to_string(), key.to_string());
                    row.tiles.push(tile);
                }
            } else {
                for (x, &w) in words.iter().enumerate() {
                    let mut tile = Tile {
                        x: x as u32 + 1,
                        ..Default::default()
                    };
                    copy_attributes(doc, w, &mut tile.data);
                    let (visible, patch) = extract_escape(&doc.text_content(w));
                    tile.data.insert(TEXT_KEY.to_string(), visible);
                    if let Some(patch) = patch {
                        tile.data.insert(ESCAPE_PATCH_KEY.to_string(), patch);
                    }
                    if !tile.data.contains_key(ID_KEY) {
                        self.reporter.warn(&format!(
                            "{}: word without id at {}",
                            state.doc_id,
                            doc.position_info(w)
                        ));
                    }
                    row.tiles.push(tile);
                }
            }
            partition.rows.push(row);
        }

        partition.description = description_text(&text);
        state.partitions.push(partition);
    }
}

/// Unit number for synthesized word keys: the digits of a `d<digits>`
/// division id, else the 1-based ordinal among same-named siblings
fn unit_number(doc: &XmlDocument, div: NodeId) -> u32 {
    if let Some(caps) = doc.attr(div, XML_ID).and_then(|id| div_id_regex().captures(id)) {
        if let Ok(n) = caps[1].parse() {
            return n;
        }
    }
    let name = doc.local_name(div).unwrap_or_default();
    doc.preceding_elements(div)
        .into_iter()
        .filter(|&e| doc.is_named(e, name))
        .count() as u32
        + 1
}

/// `<doc> <div1 attributes> [<div2 attributes>] <first n>[-<last n>]`
fn citation(doc: &XmlDocument, doc_id: &str, div: NodeId, first: NodeId, last: NodeId) -> String {
    let mut parts = vec![doc_id.to_string()];
    if !doc.is_named(div, "div1") {
        if let Some(div1) = doc.ancestor_named(div, "div1") {
            parts.push(tei::concat_attributes(doc, div1));
        }
    }
    parts.push(tei::concat_attributes(doc, div));

    let first_n = doc.attr(first, "n").unwrap_or_default();
    let last_n = doc.attr(last, "n").unwrap_or_default();
    if first_n == last_n {
        parts.push(first_n.to_string());
    } else {
        parts.push(format!("{first_n}-{last_n}"));
    }
    parts.retain(|p| !p.is_empty());
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::NullReporter;

    fn parse(xml: &str) -> Vec<TextPartition> {
        let doc = XmlDocument::parse(xml).unwrap();
        TextParser::new(TextConfig::default(), &NullReporter)
            .parse(&doc, "ov")
            .unwrap()
    }

    #[test]
    fn test_word_tokens_become_tiles() {
        let partitions = parse(
            r#"<TEI><text><body><div1 xml:id="d001" type="work"><l n="1" xml:id="l1"><w xml:id="d001w1">Arma</w> <w xml:id="d001w2" lemma="vir">uirum((virum))</w></l></div1></body></text></TEI>"#,
        );
        assert_eq!(partitions.len(), 1);
        let row = &partitions[0].rows[0];
        assert_eq!(row.data["_name"], "l");
        assert_eq!(row.data["id"], "l1");
        assert!(!row.is_synthesized());
        assert_eq!(row.tiles[1].x, 2);
        assert_eq!(row.tiles[1].id(), Some("d001w2"));
        assert_eq!(row.tiles[1].data["lemma"], "vir");
        assert_eq!(row.tiles[1].text(), Some("uirum"));
        assert_eq!(row.tiles[1].data[ESCAPE_PATCH_KEY], "virum");
    }

    #[test]
    fn test_raw_text_is_split_with_synthesized_keys() {
        let partitions = parse(
            r#"<TEI><text><body><div1 type="work"><l n="1">arma virumque</l><l n="2">cano</l></div1><div1 xml:id="d007"><p n="1">Troiae qui</p></div1></body></text></TEI>"#,
        );
        assert_eq!(partitions.len(), 2);
        let first = &partitions[0];
        assert!(first.rows[0].is_synthesized());
        let ids: Vec<_> = first
            .rows
            .iter()
            .flat_map(|r| r.tiles.iter().map(|t| t.id().unwrap().to_string()))
            .collect();
        assert_eq!(ids, vec!["d001w1", "d001w2", "d001w3"]);
        assert_eq!(first.citation, "ov type=work 1-2");

        // the word counter runs over the whole document
        let second = &partitions[1];
        assert_eq!(second.rows[0].kind(), "paragraph");
        assert_eq!(second.rows[0].tiles[0].id(), Some("d007w4"));
        assert_eq!(second.div_id, "d007");
        assert_eq!(second.id, "ov-00002");
    }

    #[test]
    fn test_partitioned_division_walks_every_break() {
        let partitions = parse(
            r#"<TEI><text><body><div1 type="work"><l n="1">a.</l><l n="2">b</l><pb n="x"/><l n="3">c</l><pb n="y"/><l n="4">d</l><pb n="z"/></div1></body></text></TEI>"#,
        );
        let citations: Vec<_> = partitions.iter().map(|p| p.citation.as_str()).collect();
        assert_eq!(citations, vec!["ov type=work 1-2", "ov type=work 3", "ov type=work 4"]);
        assert_eq!(partitions[2].rows[0].y, 1);
    }

    #[test]
    fn test_div2_units_preferred() {
        let partitions = parse(
            r#"<TEI><text><body><div1 n="I"><div2 n="a"><l n="1">x</l></div2><div2 n="b"><l n="2">y</l></div2></div1></body></text></TEI>"#,
        );
        assert_eq!(partitions.len(), 2);
        assert_eq!(partitions[1].citation, "ov n=I n=b 2");
        assert_eq!(partitions[1].rows[0].tiles[0].id(), Some("d002w2"));
    }

    #[test]
    fn test_description_without_digits() {
        let partitions = parse(
            r#"<TEI><text><body><div1><l n="1">arma 12</l><l n="2">cano</l></div1></body></text></TEI>"#,
        );
        assert_eq!(partitions[0].description, "arma cano");
    }

    #[test]
    fn test_data_key_mapping() {
        let attr = |name: &str| Attribute {
            name: name.to_string(),
            value: String::new(),
        };
        assert_eq!(data_key(&attr("xml:id")), "id");
        assert_eq!(data_key(&attr("xml:lang")), "xml_lang");
        assert_eq!(data_key(&attr("rend")), "rend");
    }
}
