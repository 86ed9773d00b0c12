//! Multi-section notes

use std::collections::HashSet;

use crate::report::Reporter;
use crate::word_key::strip_ref;
use crate::xml::{NodeId, XmlDocument};

use super::decode::remove_formatting;

/// Separator between note sections
pub const SECTION_SEPARATOR: char = '`';

const MAX_SECTION: u8 = 4;

/// One section of a note: 1 abstract, 2 operation, 3 details, 4 intertext
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteSection {
    pub id: u8,
    pub target: Option<String>,
    pub text: String,
}

impl NoteSection {
    /// TEI element name (`add` or `note`)
    pub fn element_name(&self) -> &'static str {
        match self.id {
            2 | 3 => "note",
            _ => "add",
        }
    }

    /// Value of the element's `@type`
    pub fn type_name(&self) -> &'static str {
        match self.id {
            1 => "abstract",
            2 => "operation",
            3 => "details",
            _ => "intertext",
        }
    }

    /// Map an element name and `@type` to a section id
    pub fn section_id(name: &str, type_name: Option<&str>) -> Option<u8> {
        match (name, type_name) {
            ("add", Some("abstract")) => Some(1),
            ("note", Some("operation")) => Some(2),
            ("note", Some("details")) => Some(3),
            ("add", Some("intertext")) => Some(4),
            _ => None,
        }
    }

    /// Read a section from an `add`/`note` element.
    ///
    /// The text keeps formatting as brace escapes; `@target` loses its `#`.
    /// Elements of another type yield `None` (reported).
    pub fn from_element(doc: &XmlDocument, element: NodeId, reporter: &dyn Reporter) -> Option<Self> {
        let name = doc.local_name(element).unwrap_or_default();
        let type_name = doc.attr(element, "type");
        let Some(id) = Self::section_id(name, type_name) else {
            reporter.warn(&format!(
                "Unexpected note element {name}@type={} {}",
                type_name.unwrap_or_default(),
                doc.position_info(element)
            ));
            return None;
        };
        Some(Self {
            id,
            target: doc.attr(element, "target").map(|t| strip_ref(t).to_string()),
            text: remove_formatting(doc, element, reporter).trim().to_string(),
        })
    }
}

/// Split note text into its non-empty sections.
///
/// Sections past the fourth are reported and dropped.
pub fn split_sections(text: &str, reporter: &dyn Reporter) -> Vec<NoteSection> {
    let mut sections = Vec::new();
    for (i, part) in text.split(SECTION_SEPARATOR).enumerate() {
        if part.is_empty() {
            continue;
        }
        let id = i + 1;
        if id > MAX_SECTION as usize {
            reporter.error(&format!("Unexpected note section #{id}: {part}"));
            continue;
        }
        sections.push(NoteSection {
            id: id as u8,
            target: None,
            text: part.to_string(),
        });
    }
    sections
}

/// Join sections into note text, ordered by id, padding missing sections
/// with separators. Repeated ids are reported and appended.
pub fn join_sections(sections: &[NoteSection], context: &str, reporter: &dyn Reporter) -> String {
    let mut ordered: Vec<&NoteSection> = sections.iter().collect();
    ordered.sort_by_key(|s| s.id);

    let mut text = String::new();
    let mut seen = HashSet::new();
    let mut current = 1;
    for section in ordered {
        if !seen.insert(section.id) {
            reporter.error(&format!(
                "Duplicate note section {} in {context}: \"{}\"",
                section.id, section.text
            ));
        }
        while current < section.id {
            text.push(SECTION_SEPARATOR);
            current += 1;
        }
        text.push_str(&section.text);
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{CollectingReporter, NullReporter};
    use log::Level;

    fn section(id: u8, text: &str) -> NoteSection {
        NoteSection {
            id,
            target: None,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_split_sections() {
        let sections = split_sections("A`B`C`D", &NullReporter);
        let ids: Vec<_> = sections.iter().map(|s| (s.id, s.type_name())).collect();
        assert_eq!(
            ids,
            vec![(1, "abstract"), (2, "operation"), (3, "details"), (4, "intertext")]
        );
        assert_eq!(sections[3].element_name(), "add");
    }

    #[test]
    fn test_split_sections_drops_fifth() {
        let reporter = CollectingReporter::new();
        let sections = split_sections("``C```F", &reporter);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].id, 3);
        assert!(reporter.contains(Level::Error, "#6"));
    }

    #[test]
    fn test_join_pads_gaps() {
        let text = join_sections(&[section(3, "C"), section(1, "A")], "test", &NullReporter);
        assert_eq!(text, "A``C");
    }

    #[test]
    fn test_join_reports_duplicates() {
        let reporter = CollectingReporter::new();
        let text = join_sections(&[section(2, "B"), section(2, "b")], "LV", &reporter);
        assert_eq!(text, "`Bb");
        assert!(reporter.contains(Level::Error, "Duplicate note section 2 in LV"));
    }

    #[test]
    fn test_from_element() {
        let doc = XmlDocument::parse(
            "<note type=\"details\" target=\"#LV\">  see <emph style=\"font-style:italic\">ad loc.</emph>\n </note>",
        )
        .unwrap();
        let section = NoteSection::from_element(&doc, doc.root().unwrap(), &NullReporter).unwrap();
        assert_eq!(section.id, 3);
        assert_eq!(section.target.as_deref(), Some("LV"));
        assert_eq!(section.text, "see {f=i}ad loc.{/f}");
    }
}
