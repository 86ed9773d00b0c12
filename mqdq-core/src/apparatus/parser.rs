//! Parsing TEI apparatus documents into layers of fragments

use std::collections::HashMap;

use smallvec::SmallVec;

use super::model::{
    AnnotatedValue, ApparatusEntry, ApparatusFragment, ApparatusLayer, EntryKind, LayerRole,
};
use crate::config::ApparatusConfig;
use crate::error::Result;
use crate::location::{Coordinate, Location};
use crate::markup::{apply_markdown, join_sections, NoteSection};
use crate::report::Reporter;
use crate::resolver::LocationResolver;
use crate::text_index::TextIndex;
use crate::word_key::strip_ref;
use crate::xml::{NodeId, XmlDocument, XML_ID};

/// Where an `app` block sits once its word keys are resolved
enum BlockLocation {
    Single(Location),
    /// `@loc`: one fragment clone per coordinate
    Many(SmallVec<[Coordinate; 4]>),
}

/// Content of a `lem`, `rdg` or `note` element
#[derive(Debug, Default)]
struct VariantContent {
    value: Option<String>,
    idents: Vec<String>,
    sections: Vec<NoteSection>,
}

/// Parses apparatus documents, resolving word keys through a [`TextIndex`]
pub struct ApparatusParser<'a> {
    config: ApparatusConfig,
    resolver: LocationResolver<'a>,
    reporter: &'a dyn Reporter,
}

impl<'a> ApparatusParser<'a> {
    pub fn new(config: ApparatusConfig, index: &'a TextIndex, reporter: &'a dyn Reporter) -> Self {
        Self {
            config,
            resolver: LocationResolver::new(index, reporter),
            reporter,
        }
    }

    /// Parse the `app` blocks of every `div1` into layers.
    ///
    /// Layers are created per text unit, in order of first appearance;
    /// each is followed by its margin layer when it has margin notes.
    /// Blocks whose location cannot be resolved are reported and skipped.
    pub fn parse(&self, doc: &XmlDocument, doc_id: &str) -> Result<Vec<ApparatusLayer>> {
        let body = doc.tei_body()?;
        let mut layers: Vec<ApparatusLayer> = Vec::new();
        let mut layer_of_unit: HashMap<String, usize> = HashMap::new();

        for div in doc.child_elements_named(body, "div1") {
            let div_id = doc.attr(div, XML_ID).unwrap_or_default();
            self.reporter
                .debug(&format!("Parsing div1 #{div_id} {}", doc.position_info(div)));

            for app in doc.child_elements_named(div, "app") {
                let Some((unit_id, location, original)) = self.block_location(doc, app) else {
                    self.reporter
                        .error(&format!("Skipped app {}", doc.position_info(app)));
                    continue;
                };

                let mut tag = div_id.to_string();
                if let Some(t) = doc.attr(app, "type") {
                    tag.push(' ');
                    tag.push_str(t);
                }

                let mut entries = Vec::new();
                for child in doc.elements(app) {
                    if let Some(entry) = self.parse_entry(doc, child) {
                        entries.push(entry);
                    }
                }

                let index = *layer_of_unit.entry(unit_id.clone()).or_insert_with(|| {
                    layers.push(ApparatusLayer::new(
                        unit_id.as_str(),
                        doc_id,
                        self.config.user_id.as_str(),
                    ));
                    layers.len() - 1
                });
                let layer = &mut layers[index];

                match location {
                    BlockLocation::Single(location) => {
                        let mut fragment = ApparatusFragment::new(location, tag);
                        fragment.entries = entries;
                        self.add_fragment(layer, fragment, &original);
                    }
                    BlockLocation::Many(coordinates) => {
                        // the group counter restarts with each block
                        let group_id = build_group_id(&entries, 1);
                        for entry in entries.iter_mut().filter(|e| e.has_value()) {
                            entry.group_id = Some(group_id.clone());
                        }
                        let template = ApparatusFragment {
                            location: Location::List(coordinates.clone()),
                            tag,
                            entries,
                        };
                        for coordinate in coordinates {
                            let mut clone = template.clone();
                            clone.location = Location::Point(coordinate);
                            self.add_fragment(layer, clone, &original);
                        }
                    }
                }
            }
        }

        let mut result = Vec::with_capacity(layers.len());
        for layer in layers {
            result.extend(self.split_layer(layer));
        }
        self.reporter
            .info(&format!("{doc_id}: {} apparatus layer(s)", result.len()));
        Ok(result)
    }

    /// Resolve `@from`/`@to` or `@loc`, returning the unit id, the location
    /// and the original attribute text
    fn block_location(
        &self,
        doc: &XmlDocument,
        app: NodeId,
    ) -> Option<(String, BlockLocation, String)> {
        if let Some(from) = doc.attr(app, "from") {
            let to = doc.attr(app, "to").unwrap_or(from);
            let (unit, location) = self.resolver.resolve_span(from, to)?;
            self.reporter
                .debug(&format!("Fragment location: {location} {from}-{to}"));
            return Some((unit, BlockLocation::Single(location), format!("{from}-{to}")));
        }

        let Some(loc) = doc.attr(app, "loc") else {
            self.reporter.error(&format!(
                "No location for app element {}",
                doc.position_info(app)
            ));
            return None;
        };
        let (unit, coordinates) = self.resolver.resolve_list(loc.split_whitespace())?;
        if coordinates.is_empty() {
            self.reporter.error("Empty app@loc");
            return None;
        }
        Some((
            unit,
            BlockLocation::Many(coordinates.into_iter().collect()),
            loc.to_string(),
        ))
    }

    fn parse_entry(&self, doc: &XmlDocument, child: NodeId) -> Option<ApparatusEntry> {
        let name = doc.local_name(child).unwrap_or_default();
        let mut entry = ApparatusEntry {
            tag: doc.attr(child, "type").map(str::to_string),
            ..Default::default()
        };

        match name {
            "lem" | "rdg" => {
                entry.accepted = name == "lem";
                entry.witnesses = parse_refs(doc.attr(child, "wit"));
                entry.authors = parse_refs(doc.attr(child, "source"));
                let mut content = self.variant_content(doc, child);
                if let Some(n) = doc.attr(child, "n") {
                    content
                        .idents
                        .push(format!("{}#{n}", doc.direct_text(child).trim()));
                }
                self.add_content(content, &mut entry);
            }
            "note" => {
                entry.kind = EntryKind::Note;
                let content = self.variant_content(doc, child);
                self.add_content(content, &mut entry);
            }
            _ => {
                self.reporter.error(&format!(
                    "Unexpected element {name} in app {}",
                    doc.position_info(child)
                ));
                return None;
            }
        }
        Some(entry)
    }

    fn variant_content(&self, doc: &XmlDocument, variant: NodeId) -> VariantContent {
        let mut content = VariantContent::default();
        for child in doc.elements(variant) {
            match doc.local_name(child).unwrap_or_default() {
                "ident" => {
                    let text = doc.text_content(child);
                    let ident = match doc.attr(child, "n") {
                        Some(n) => format!("{}#{n}", text.trim()),
                        None => text.trim().to_string(),
                    };
                    content.idents.push(ident);
                }
                "add" | "note" => {
                    if let Some(section) = NoteSection::from_element(doc, child, self.reporter) {
                        content.sections.push(section);
                    }
                }
                other => self.reporter.error(&format!(
                    "Unexpected element in variant content: {other} {}",
                    doc.position_info(child)
                )),
            }
        }

        let text = doc.direct_text(variant);
        if !text.trim().is_empty() {
            content.value = Some(text.trim().to_string());
        }
        content
    }

    fn add_content(&self, content: VariantContent, entry: &mut ApparatusEntry) {
        entry.value = content.value;
        entry.idents = content.idents;

        let sections = content.sections;
        if sections.is_empty() {
            return;
        }
        if let [only] = sections.as_slice() {
            if only.id == 1 && only.target.is_none() {
                entry.note = Some(apply_markdown(&only.text, self.reporter));
                return;
            }
        }

        // targeted notes annotate a witness or author
        let mut targets: Vec<(&str, Vec<NoteSection>)> = Vec::new();
        for section in &sections {
            let Some(target) = section.target.as_deref() else {
                continue;
            };
            match targets.iter_mut().find(|(t, _)| *t == target) {
                Some((_, group)) => group.push(section.clone()),
                None => targets.push((target, vec![section.clone()])),
            }
        }
        for (target, group) in targets {
            let annotated = entry
                .witnesses
                .iter_mut()
                .chain(entry.authors.iter_mut())
                .find(|v| v.value == target);
            match annotated {
                Some(annotated) => {
                    let text = join_sections(&group, &format!("notes targeting {target}"), self.reporter);
                    annotated.note = Some(apply_markdown(&text, self.reporter));
                }
                None => self.reporter.error(&format!("Target \"{target}\" not found")),
            }
        }

        let untargeted: Vec<NoteSection> = sections
            .into_iter()
            .filter(|s| s.target.is_none())
            .collect();
        let text = join_sections(&untargeted, "entry note", self.reporter);
        if !text.is_empty() {
            entry.note = Some(apply_markdown(&text, self.reporter));
        }
    }

    fn add_fragment(&self, layer: &mut ApparatusLayer, fragment: ApparatusFragment, original: &str) {
        if layer
            .fragments
            .iter()
            .any(|f| f.location.overlaps(&fragment.location))
        {
            self.reporter.info(&format!(
                "Overlap for new fragment at {} (original {original}): {fragment}",
                fragment.location
            ));
        }
        self.reporter.debug(&format!("Completed fragment {fragment}"));
        layer.fragments.push(fragment);
    }

    /// Move margin note fragments into their own layer
    fn split_layer(&self, mut layer: ApparatusLayer) -> Vec<ApparatusLayer> {
        let (margin, main): (Vec<_>, Vec<_>) =
            layer.fragments.drain(..).partition(ApparatusFragment::is_margin);
        layer.fragments = main;

        let mut margin_layer = ApparatusLayer {
            role: LayerRole::Margin,
            fragments: margin,
            ..layer.clone()
        };

        let mut layers = Vec::with_capacity(2);
        if layer.has_overlaps() {
            self.reporter.error(&format!(
                "Layer {} has overlaps: {}",
                layer.unit_id,
                layer.locations_dump()
            ));
        }
        if !layer.fragments.is_empty() {
            layers.push(layer);
        }

        if !margin_layer.fragments.is_empty() {
            self.adjust_margin_entries(&mut margin_layer);
            if margin_layer.has_overlaps() {
                self.reporter.error(&format!(
                    "Margin layer {} has overlaps: {}",
                    margin_layer.unit_id,
                    margin_layer.locations_dump()
                ));
            }
            layers.push(margin_layer);
        }
        layers
    }

    /// Margin entries without a value are notes
    fn adjust_margin_entries(&self, layer: &mut ApparatusLayer) {
        for fragment in &mut layer.fragments {
            for entry in fragment.entries.iter_mut().filter(|e| !e.has_value()) {
                if entry.witnesses.is_empty() && entry.authors.is_empty() {
                    entry.kind = EntryKind::Note;
                } else {
                    self.reporter.warn(&format!(
                        "Margin entry without value keeps its sources at {}",
                        fragment.location
                    ));
                }
            }
        }
    }
}

/// Parse a space separated list of `#`-prefixed references
fn parse_refs(refs: Option<&str>) -> Vec<AnnotatedValue> {
    refs.map(|r| {
        r.split_whitespace()
            .map(|token| AnnotatedValue::new(strip_ref(token)))
            .collect()
    })
    .unwrap_or_default()
}

/// Build a group id from the accepted reading (else the first value):
/// lowercase letters and digits, whitespace runs as `-`, plus `-<nr>`
fn build_group_id(entries: &[ApparatusEntry], nr: u32) -> String {
    let source = entries
        .iter()
        .find(|e| e.accepted && e.has_value())
        .or_else(|| entries.iter().find(|e| e.has_value()))
        .and_then(|e| e.value.as_deref())
        .unwrap_or("g");

    let mut id = String::with_capacity(source.len() + 3);
    for c in source.chars() {
        if c.is_alphanumeric() {
            id.extend(c.to_lowercase());
        } else if c.is_whitespace() && !id.is_empty() && !id.ends_with('-') {
            id.push('-');
        }
    }
    id.push('-');
    id.push_str(&nr.to_string());
    id
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TextConfig;
    use crate::report::{CollectingReporter, NullReporter};
    use crate::tiles::TextParser;
    use log::Level;

    const TEXT: &str = r#"<TEI><text><body>
<div1 type="section" xml:id="d001">
<l n="1"><w xml:id="d001w1">arma</w> <w xml:id="d001w2">virumque</w> <w xml:id="d001w3">cano</w></l>
<l n="2"><w xml:id="d001w4">Troiae</w> <w xml:id="d001w5">qui</w></l>
</div1>
<div1 type="section" xml:id="d002">
<l n="3"><w xml:id="d002w1">Italiam</w></l>
</div1>
</body></text></TEI>"#;

    fn text_index() -> TextIndex {
        let doc = XmlDocument::parse(TEXT).unwrap();
        let partitions = TextParser::new(TextConfig::default(), &NullReporter)
            .parse(&doc, "verg")
            .unwrap();
        TextIndex::from_partitions(&partitions)
    }

    fn parse_app(body: &str, reporter: &CollectingReporter) -> Vec<ApparatusLayer> {
        let xml = format!("<TEI><text><body>{body}</body></text></TEI>");
        let doc = XmlDocument::parse(&xml).unwrap();
        let index = text_index();
        ApparatusParser::new(ApparatusConfig::default(), &index, reporter)
            .parse(&doc, "VERG")
            .unwrap()
    }

    #[test]
    fn test_parse_from_to() {
        let reporter = CollectingReporter::new();
        let layers = parse_app(
            r##"<div1 xml:id="d001">
<app from="#d001w2" to="#d001w4" type="conj">
<lem wit="#A #B">virumque cano<ident n="3">cano</ident></lem>
<rdg wit="#C" source="#Serv">virosque canam</rdg>
</app>
</div1>"##,
            &reporter,
        );
        assert_eq!(layers.len(), 1);
        let layer = &layers[0];
        assert_eq!(layer.unit_id, "verg-00001");
        assert_eq!(layer.scope, "verg");
        assert_eq!(layer.role, LayerRole::Main);

        let fr = &layer.fragments[0];
        assert_eq!(fr.location.to_string(), "1.2-2.1");
        assert_eq!(fr.tag, "d001 conj");
        assert_eq!(fr.entries.len(), 2);

        let lem = &fr.entries[0];
        assert!(lem.accepted);
        assert_eq!(lem.value.as_deref(), Some("virumque cano"));
        assert_eq!(lem.idents, vec!["cano#3"]);
        let wits: Vec<&str> = lem.witnesses.iter().map(|w| w.value.as_str()).collect();
        assert_eq!(wits, vec!["A", "B"]);

        let rdg = &fr.entries[1];
        assert!(!rdg.accepted);
        assert_eq!(rdg.authors[0].value, "Serv");
        assert_eq!(reporter.count(Level::Error), 0);
    }

    #[test]
    fn test_parse_loc_clones_fragment() {
        let reporter = CollectingReporter::new();
        let layers = parse_app(
            r##"<div1 xml:id="d001">
<app loc="#d001w1 #d001w3"><lem>Arma Virum</lem><rdg wit="#A">arma</rdg></app>
</div1>"##,
            &reporter,
        );
        let frs = &layers[0].fragments;
        assert_eq!(frs.len(), 2);
        assert_eq!(frs[0].location.to_string(), "1.1");
        assert_eq!(frs[1].location.to_string(), "1.3");
        for fr in frs {
            assert_eq!(fr.entries[0].group_id.as_deref(), Some("arma-virum-1"));
            assert_eq!(fr.entries[1].group_id.as_deref(), Some("arma-virum-1"));
        }
    }

    #[test]
    fn test_cross_unit_block_is_skipped() {
        let reporter = CollectingReporter::new();
        let layers = parse_app(
            r##"<div1 xml:id="d001">
<app from="#d001w5" to="#d002w1"><lem>qui Italiam</lem></app>
<app from="#d002w1" to="#d002w1"><lem>Italiam</lem></app>
<app from="#d009w1" to="#d009w1"><lem>x</lem></app>
</div1>"##,
            &reporter,
        );
        assert_eq!(layers.len(), 1);
        assert_eq!(layers[0].unit_id, "verg-00002");
        assert!(reporter.contains(Level::Error, "spans units"));
        assert!(reporter.contains(Level::Error, "not found"));
    }

    #[test]
    fn test_notes_targeted_and_untargeted() {
        let reporter = CollectingReporter::new();
        let layers = parse_app(
            r##"<div1 xml:id="d001">
<app from="#d001w1" to="#d001w1">
<lem wit="#A">arma<add type="abstract">see <emph style="font-style:italic">Serv.</emph></add><note type="details">long</note><note type="operation" target="#A">corr.</note><add type="abstract" target="#Z">lost</add></lem>
<note><add type="abstract">only one</add></note>
</app>
</div1>"##,
            &reporter,
        );
        let entries = &layers[0].fragments[0].entries;
        let lem = &entries[0];
        assert_eq!(lem.note.as_deref(), Some("see _Serv._``long"));
        assert_eq!(lem.witnesses[0].note.as_deref(), Some("`corr."));
        assert!(reporter.contains(Level::Error, "Target \"Z\" not found"));

        let note = &entries[1];
        assert_eq!(note.kind, EntryKind::Note);
        assert_eq!(note.note.as_deref(), Some("only one"));
        assert!(note.witnesses.is_empty());
    }

    #[test]
    fn test_margin_layer_split() {
        let reporter = CollectingReporter::new();
        let layers = parse_app(
            r##"<div1 xml:id="d001">
<app from="#d001w1" to="#d001w1"><lem>arma</lem></app>
<app from="#d001w2" to="#d001w2" type="margin-note"><rdg><add type="abstract">nota</add></rdg></app>
</div1>"##,
            &reporter,
        );
        assert_eq!(layers.len(), 2);
        assert_eq!(layers[1].role, LayerRole::Margin);
        assert_eq!(layers[1].unit_id, layers[0].unit_id);
        let entry = &layers[1].fragments[0].entries[0];
        assert_eq!(entry.kind, EntryKind::Note);
        assert_eq!(entry.note.as_deref(), Some("nota"));
    }

    #[test]
    fn test_unexpected_child_is_dropped() {
        let reporter = CollectingReporter::new();
        let layers = parse_app(
            r##"<div1 xml:id="d001"><app from="#d001w1" to="#d001w1"><lem>arma</lem><foo/></app></div1>"##,
            &reporter,
        );
        assert_eq!(layers[0].fragments[0].entries.len(), 1);
        assert!(reporter.contains(Level::Error, "Unexpected element foo"));
    }

    #[test]
    fn test_overlap_reported_on_insert() {
        let reporter = CollectingReporter::new();
        let layers = parse_app(
            r##"<div1 xml:id="d001">
<app from="#d001w1" to="#d001w3"><lem>arma virumque cano</lem></app>
<app from="#d001w2" to="#d001w2"><lem>virumque</lem></app>
</div1>"##,
            &reporter,
        );
        assert_eq!(layers[0].fragments.len(), 2);
        assert!(reporter.contains(Level::Info, "Overlap for new fragment at 1.2"));
        assert!(reporter.contains(Level::Error, "has overlaps"));
    }

    #[test]
    fn test_build_group_id() {
        let entries = vec![
            ApparatusEntry {
                value: Some("Alia".to_string()),
                ..Default::default()
            },
            ApparatusEntry {
                accepted: true,
                value: Some("Arma,  virum!".to_string()),
                ..Default::default()
            },
        ];
        assert_eq!(build_group_id(&entries, 1), "arma-virum-1");
        assert_eq!(build_group_id(&[], 2), "g-2");
    }
}
