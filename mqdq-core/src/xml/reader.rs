//! Parsing XML text into an [`XmlDocument`]

use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::{Attribute, NodeData, NodeId, XmlDocument};
use crate::error::Result;

impl XmlDocument {
    /// Parse XML text, preserving whitespace, comments and processing
    /// instructions so that the document can be written back faithfully.
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let mut doc = XmlDocument::new();
        let mut reader = Reader::from_str(text);
        reader.config_mut().trim_text(false);

        let mut stack: Vec<NodeId> = vec![doc.document()];

        loop {
            let offset = reader.buffer_position() as u64;
            let parent = stack.last().copied().unwrap_or(doc.document());
            match reader.read_event()? {
                Event::Decl(_) => doc.has_declaration = true,
                Event::Start(e) => {
                    let element = doc.element_from_tag(&e, offset)?;
                    doc.append(parent, element);
                    stack.push(element);
                }
                Event::Empty(e) => {
                    let element = doc.element_from_tag(&e, offset)?;
                    doc.append(parent, element);
                }
                Event::End(_) => {
                    stack.pop();
                }
                Event::Text(e) => {
                    doc.append_text(parent, &String::from_utf8_lossy(e.as_ref()));
                }
                Event::GeneralRef(e) => {
                    let entity = String::from_utf8_lossy(e.as_ref());
                    match resolve_entity(&entity) {
                        Some(resolved) => doc.append_text(parent, &resolved),
                        None => doc.append_text(parent, &format!("&{entity};")),
                    }
                }
                Event::CData(e) => {
                    doc.append_text(parent, &String::from_utf8_lossy(&e));
                }
                Event::Comment(e) => {
                    let node = doc.create_comment(String::from_utf8_lossy(&e));
                    doc.append(parent, node);
                }
                Event::PI(e) => {
                    let node = doc.alloc(NodeData::ProcessingInstruction(
                        String::from_utf8_lossy(&e).into_owned(),
                    ));
                    doc.append(parent, node);
                }
                Event::DocType(e) => {
                    let node = doc.alloc(NodeData::DocType(
                        String::from_utf8_lossy(&e).into_owned(),
                    ));
                    doc.append(parent, node);
                }
                Event::Eof => break,
            }
        }

        Ok(doc)
    }

    fn element_from_tag(&mut self, tag: &BytesStart<'_>, offset: u64) -> Result<NodeId> {
        let name = String::from_utf8_lossy(tag.name().as_ref()).into_owned();
        let mut attrs = Vec::new();
        for attr in tag.attributes() {
            let attr = attr.map_err(quick_xml::Error::from)?;
            let raw = String::from_utf8_lossy(&attr.value);
            attrs.push(Attribute {
                name: String::from_utf8_lossy(attr.key.as_ref()).into_owned(),
                value: unescape(&raw)?.into_owned(),
            });
        }
        Ok(self.alloc(NodeData::Element {
            name,
            attrs,
            offset: Some(offset),
        }))
    }
}

/// Resolve predefined and numeric character references.
fn resolve_entity(entity: &str) -> Option<String> {
    match entity {
        "apos" => return Some("'".to_string()),
        "quot" => return Some("\"".to_string()),
        "lt" => return Some("<".to_string()),
        "gt" => return Some(">".to_string()),
        "amp" => return Some("&".to_string()),
        _ => {}
    }

    let code = if let Some(hex) = entity.strip_prefix("#x") {
        u32::from_str_radix(hex, 16).ok()?
    } else if let Some(dec) = entity.strip_prefix('#') {
        dec.parse::<u32>().ok()?
    } else {
        return None;
    };
    char::from_u32(code).map(|c| c.to_string())
}
