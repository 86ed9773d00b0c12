//! Injecting partitions and apparatus layers back into TEI documents
//!
//! Exporters clear the content of the target divisions, keeping any leading
//! `head` and nested divisions, and append the rebuilt elements.

mod apparatus;
mod text;

pub use apparatus::ApparatusExporter;
pub use text::TextExporter;

use crate::report::Reporter;
use crate::xml::{NodeId, XmlDocument, XML_ID};

/// Remove the content elements of a division, keeping its `head` and any
/// nested division. Elements before `head` are reported and kept.
pub fn clear_div_contents(doc: &mut XmlDocument, div: NodeId, reporter: &dyn Reporter) {
    let removable: Vec<NodeId> = match doc.first_child_named(div, "head") {
        Some(head) => {
            if !doc.preceding_elements(head).is_empty() {
                reporter.error(&format!(
                    "Unexpected elements before head in {} {}",
                    doc.name(div).unwrap_or_default(),
                    doc.position_info(div)
                ));
            }
            doc.following_elements(head)
        }
        None => doc.elements(div).collect(),
    };
    for element in removable {
        let is_div = doc
            .local_name(element)
            .is_some_and(|name| name.starts_with("div"));
        if !is_div {
            doc.detach(element);
        }
    }
}

/// Find the `div1` or `div2` with the given `xml:id`
pub fn find_div(doc: &XmlDocument, body: NodeId, id: &str) -> Option<NodeId> {
    doc.descendants(body).into_iter().find(|&e| {
        matches!(doc.local_name(e), Some("div1") | Some("div2"))
            && doc.attr(e, XML_ID) == Some(id)
    })
}
