//! Writing apparatus layers back into TEI `app` elements

use super::{clear_div_contents, find_div};
use crate::apparatus::{AnnotatedValue, ApparatusEntry, ApparatusFragment, ApparatusLayer, EntryKind};
use crate::error::Result;
use crate::markup::NoteRenderer;
use crate::report::Reporter;
use crate::resolver::LocationResolver;
use crate::text_index::TextIndex;
use crate::tiles::TextPartition;
use crate::xml::{NodeId, XmlDocument};

/// Rebuilds the `app` elements of TEI apparatus documents from layers
pub struct ApparatusExporter<'a> {
    resolver: LocationResolver<'a>,
    notes: NoteRenderer<'a>,
    reporter: &'a dyn Reporter,
    include_comments: bool,
}

impl<'a> ApparatusExporter<'a> {
    pub fn new(index: &'a TextIndex, reporter: &'a dyn Reporter) -> Self {
        Self {
            resolver: LocationResolver::new(index, reporter),
            notes: NoteRenderer::new(reporter),
            reporter,
            include_comments: false,
        }
    }

    /// Precede layers and fragments with descriptive comments
    pub fn with_comments(mut self, include: bool) -> Self {
        self.include_comments = include;
        self
    }

    /// Replace the content of each `div1` with the `app` elements of the
    /// layers targeting it. Locations are mapped back to word keys through
    /// the layer's text partition.
    ///
    /// Returns whether any layer was written; when not, the document was
    /// only cleared and should not be saved.
    pub fn export(
        &self,
        doc: &mut XmlDocument,
        layers: &[ApparatusLayer],
        partitions: &[TextPartition],
    ) -> Result<bool> {
        let body = doc.tei_body()?;
        for div in doc.descendants_named(body, "div1") {
            clear_div_contents(doc, div, self.reporter);
        }

        let mut any = false;
        for layer in layers {
            let Some(partition) = partitions.iter().find(|p| p.id == layer.unit_id) else {
                self.reporter
                    .error(&format!("Text partition {} not found", layer.unit_id));
                continue;
            };
            let Some(div) = find_div(doc, body, &partition.div_id) else {
                self.reporter.error(&format!(
                    "Target div #{} for layer {} not found",
                    partition.div_id, layer.unit_id
                ));
                continue;
            };
            self.append_layer(doc, div, layer, partition);
            any = true;
        }
        Ok(any)
    }

    fn append_layer(
        &self,
        doc: &mut XmlDocument,
        div: NodeId,
        layer: &ApparatusLayer,
        partition: &TextPartition,
    ) {
        if self.include_comments {
            let comment = doc.create_comment(format!(
                "apparatus {:?} ({} in {})",
                layer.role,
                layer.fragments.len(),
                layer.unit_id
            ));
            doc.append(div, comment);
        }
        for fragment in layer.fragments.iter().filter(|f| !f.entries.is_empty()) {
            if self.include_comments {
                let comment = doc.create_comment(format!("fr {}", fragment.location));
                doc.append(div, comment);
            }
            let app = self.build_app(doc, fragment, partition);
            doc.append(div, app);
        }
    }

    fn build_app(
        &self,
        doc: &mut XmlDocument,
        fragment: &ApparatusFragment,
        partition: &TextPartition,
    ) -> NodeId {
        let app = doc.create_element("app");
        if let Some((from, to)) = self.resolver.map_location(&fragment.location, partition) {
            let to = to.as_deref().unwrap_or(&from);
            doc.set_attr(app, "from", format!("#{from}"));
            doc.set_attr(app, "to", format!("#{to}"));
        }
        if let Some(block_type) = fragment.block_type() {
            doc.set_attr(app, "type", block_type);
        }
        for entry in &fragment.entries {
            self.append_entry(doc, app, entry);
        }
        app
    }

    fn append_entry(&self, doc: &mut XmlDocument, app: NodeId, entry: &ApparatusEntry) {
        let target = match entry.kind {
            EntryKind::Replacement => {
                let reading = doc.create_element(if entry.accepted { "lem" } else { "rdg" });
                if let Some(value) = &entry.value {
                    doc.append_text(reading, value);
                }
                if let Some(group_id) = &entry.group_id {
                    doc.set_attr(reading, "n", group_id.as_str());
                }
                self.append_note(doc, reading, entry.note.as_deref());
                doc.append(app, reading);
                Some(reading)
            }
            EntryKind::Note => {
                self.append_note(doc, app, entry.note.as_deref());
                None
            }
        };

        let host = target.unwrap_or(app);
        if !entry.witnesses.is_empty() {
            let ids = self.render_sources(doc, &entry.witnesses, host);
            doc.set_attr(host, "wit", ids);
        }
        if !entry.authors.is_empty() {
            let ids = self.render_sources(doc, &entry.authors, host);
            doc.set_attr(host, "source", ids);
        }

        if entry.idents.is_empty() {
            return;
        }
        let Some(reading) = target else {
            self.reporter.error(&format!(
                "Normalized identifiers in non-replacement entry: {}",
                entry.idents.join(" ")
            ));
            return;
        };
        for ident in &entry.idents {
            let element = doc.create_element("ident");
            match ident.split_once('#') {
                Some((value, n)) => {
                    doc.append_text(element, value);
                    doc.set_attr(element, "n", n);
                }
                None => doc.append_text(element, ident),
            }
            doc.append(reading, element);
        }
    }

    fn append_note(&self, doc: &mut XmlDocument, host: NodeId, note: Option<&str>) {
        if let Some(note) = note {
            for element in self.notes.render(doc, note, None) {
                doc.append(host, element);
            }
        }
    }

    /// Render `#`-prefixed references, appending the note of each annotated
    /// one to `host` with a `@target`
    fn render_sources(&self, doc: &mut XmlDocument, sources: &[AnnotatedValue], host: NodeId) -> String {
        let mut ids = Vec::with_capacity(sources.len());
        for source in sources {
            let reference = format!("#{}", source.value);
            if let Some(note) = source.note.as_deref().filter(|n| !n.is_empty()) {
                for element in self.notes.render(doc, note, Some(reference.as_str())) {
                    doc.append(host, element);
                }
            }
            ids.push(reference);
        }
        ids.join(" ")
    }
}
