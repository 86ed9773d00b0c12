//! TEI vocabulary shared by the text and apparatus modules

use crate::xml::{NodeId, XmlDocument, XML_ID};

/// Page break marking a partition boundary
pub const PB: &str = "pb";

/// Word token
pub const W: &str = "w";

/// Separator for division attributes in citations
pub const ATTR_SEPARATOR: char = '\u{2016}';

/// Check if an element is a text row (`l` or `p`)
pub fn is_row(doc: &XmlDocument, id: NodeId) -> bool {
    matches!(doc.local_name(id), Some("l") | Some("p"))
}

/// Collect the row children of an element
pub fn rows(doc: &XmlDocument, parent: NodeId) -> Vec<NodeId> {
    doc.elements(parent).filter(|&e| is_row(doc, e)).collect()
}

/// Row identifier used in citations: `xml:id`, else `n`, else empty
pub fn row_identifier(doc: &XmlDocument, row: NodeId) -> &str {
    doc.attr(row, XML_ID)
        .or_else(|| doc.attr(row, "n"))
        .unwrap_or_default()
}

/// Render an element's attributes as `name=value` pairs joined by `‖`
pub fn concat_attributes(doc: &XmlDocument, id: NodeId) -> String {
    doc.attributes(id)
        .iter()
        .map(|a| format!("{}={}", a.name, a.value))
        .collect::<Vec<_>>()
        .join(&ATTR_SEPARATOR.to_string())
}
