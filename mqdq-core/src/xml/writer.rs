//! Serializing an [`XmlDocument`] back to text

use quick_xml::escape::{escape, partial_escape};

use super::{NodeData, NodeId, XmlDocument};

impl XmlDocument {
    /// Serialize the whole document.
    ///
    /// Elements without children are written as empty tags; whitespace nodes
    /// are written as they were parsed.
    pub fn to_xml_string(&self) -> String {
        let mut out = String::new();
        if self.has_declaration {
            out.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
        }
        for child in self.children(self.document) {
            self.write_node(child, &mut out);
        }
        out
    }

    /// Serialize a single node and its subtree.
    pub fn node_to_string(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_node(id, &mut out);
        out
    }

    fn write_node(&self, id: NodeId, out: &mut String) {
        match &self.node(id).data {
            NodeData::Document => {
                for child in self.children(id) {
                    self.write_node(child, out);
                }
            }
            NodeData::Element { name, attrs, .. } => {
                out.push('<');
                out.push_str(name);
                for attr in attrs {
                    out.push(' ');
                    out.push_str(&attr.name);
                    out.push_str("=\"");
                    out.push_str(&escape(attr.value.as_str()));
                    out.push('"');
                }
                if self.node(id).first_child.is_none() {
                    out.push_str("/>");
                    return;
                }
                out.push('>');
                for child in self.children(id) {
                    self.write_node(child, out);
                }
                out.push_str("</");
                out.push_str(name);
                out.push('>');
            }
            NodeData::Text(text) => out.push_str(&partial_escape(text.as_str())),
            NodeData::Comment(text) => {
                out.push_str("<!--");
                out.push_str(text);
                out.push_str("-->");
            }
            NodeData::ProcessingInstruction(text) => {
                out.push_str("<?");
                out.push_str(text);
                out.push_str("?>");
            }
            NodeData::DocType(text) => {
                out.push_str("<!DOCTYPE ");
                out.push_str(text.trim_start());
                out.push('>');
            }
        }
    }
}
