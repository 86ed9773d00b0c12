//! Arena-based XML document model
//!
//! TEI documents are loaded into a mutable tree whose nodes live in a single
//! vector and link to each other by [`NodeId`]. Nodes detached from the tree
//! stay in the arena but are no longer reachable from the document node.

mod reader;
mod writer;

use crate::error::{Error, Result};

/// Conventional name of the TEI `xml:id` attribute
pub const XML_ID: &str = "xml:id";

/// Unique identifier for a node in the arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Element attribute, with its name as written in the source (e.g. `xml:id`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

/// Node payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    /// The document node, parent of the root element
    Document,
    /// Element with its qualified name and attributes
    Element {
        name: String,
        attrs: Vec<Attribute>,
        /// Byte offset of the start tag in the source, if parsed
        offset: Option<u64>,
    },
    /// Character data (entities already resolved)
    Text(String),
    /// Comment content
    Comment(String),
    /// Processing instruction content
    ProcessingInstruction(String),
    /// Document type declaration content
    DocType(String),
}

/// A node in the arena
#[derive(Debug, Clone)]
pub struct XmlNode {
    pub data: NodeData,
    parent: Option<NodeId>,
    first_child: Option<NodeId>,
    last_child: Option<NodeId>,
    prev_sibling: Option<NodeId>,
    next_sibling: Option<NodeId>,
}

impl XmlNode {
    fn new(data: NodeData) -> Self {
        Self {
            data,
            parent: None,
            first_child: None,
            last_child: None,
            prev_sibling: None,
            next_sibling: None,
        }
    }
}

/// Mutable XML document
#[derive(Debug, Clone)]
pub struct XmlDocument {
    nodes: Vec<XmlNode>,
    document: NodeId,
    has_declaration: bool,
}

impl Default for XmlDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl XmlDocument {
    /// Create an empty document holding just the document node
    pub fn new() -> Self {
        let mut doc = Self {
            nodes: Vec::new(),
            document: NodeId(0),
            has_declaration: false,
        };
        doc.document = doc.alloc(NodeData::Document);
        doc
    }

    fn alloc(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(XmlNode::new(data));
        id
    }

    fn node(&self, id: NodeId) -> &XmlNode {
        &self.nodes[id.index()]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut XmlNode {
        &mut self.nodes[id.index()]
    }

    /// Get the document node
    pub fn document(&self) -> NodeId {
        self.document
    }

    /// Get the root element, if any
    pub fn root(&self) -> Option<NodeId> {
        self.elements(self.document).next()
    }

    /// Whether the source had an XML declaration
    pub fn has_declaration(&self) -> bool {
        self.has_declaration
    }

    /// Get the payload of a node
    pub fn data(&self, id: NodeId) -> &NodeData {
        &self.node(id).data
    }

    /// Get the parent of a node
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    /// Get the next sibling of a node
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).next_sibling
    }

    /// Get the previous sibling of a node
    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).prev_sibling
    }

    /// Check if a node is an element
    pub fn is_element(&self, id: NodeId) -> bool {
        matches!(self.node(id).data, NodeData::Element { .. })
    }

    /// Get the qualified name of an element
    pub fn name(&self, id: NodeId) -> Option<&str> {
        match &self.node(id).data {
            NodeData::Element { name, .. } => Some(name.as_str()),
            _ => None,
        }
    }

    /// Get the local name of an element (prefix stripped)
    pub fn local_name(&self, id: NodeId) -> Option<&str> {
        self.name(id).map(strip_prefix)
    }

    /// Check if a node is an element with the given local name
    pub fn is_named(&self, id: NodeId, local: &str) -> bool {
        self.local_name(id) == Some(local)
    }

    /// Get the source byte offset of an element, if known
    pub fn offset(&self, id: NodeId) -> Option<u64> {
        match &self.node(id).data {
            NodeData::Element { offset, .. } => *offset,
            _ => None,
        }
    }

    /// Get the attributes of an element (empty for other nodes)
    pub fn attributes(&self, id: NodeId) -> &[Attribute] {
        match &self.node(id).data {
            NodeData::Element { attrs, .. } => attrs,
            _ => &[],
        }
    }

    /// Get an attribute value by its qualified name
    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.attributes(id)
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Set an attribute value, replacing any previous value
    pub fn set_attr(&mut self, id: NodeId, name: &str, value: impl Into<String>) {
        if let NodeData::Element { attrs, .. } = &mut self.node_mut(id).data {
            let value = value.into();
            match attrs.iter_mut().find(|a| a.name == name) {
                Some(attr) => attr.value = value,
                None => attrs.push(Attribute {
                    name: name.to_string(),
                    value,
                }),
            }
        }
    }

    /// Remove an attribute, returning its value
    pub fn remove_attr(&mut self, id: NodeId, name: &str) -> Option<String> {
        if let NodeData::Element { attrs, .. } = &mut self.node_mut(id).data {
            if let Some(i) = attrs.iter().position(|a| a.name == name) {
                return Some(attrs.remove(i).value);
            }
        }
        None
    }

    /// Iterate over the children of a node
    pub fn children(&self, parent: NodeId) -> Children<'_> {
        Children {
            doc: self,
            current: self.node(parent).first_child,
        }
    }

    /// Iterate over the child elements of a node
    pub fn elements(&self, parent: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(parent).filter(move |&c| self.is_element(c))
    }

    /// Collect the child elements having the given local name
    pub fn child_elements_named(&self, parent: NodeId, local: &str) -> Vec<NodeId> {
        self.elements(parent)
            .filter(|&c| self.is_named(c, local))
            .collect()
    }

    /// Get the first child element with the given local name
    pub fn first_child_named(&self, parent: NodeId, local: &str) -> Option<NodeId> {
        self.elements(parent).find(|&c| self.is_named(c, local))
    }

    /// Check if a node has any child element
    pub fn has_child_elements(&self, id: NodeId) -> bool {
        self.elements(id).next().is_some()
    }

    /// Collect the sibling elements following a node, in document order
    pub fn following_elements(&self, id: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut current = self.node(id).next_sibling;
        while let Some(c) = current {
            if self.is_element(c) {
                result.push(c);
            }
            current = self.node(c).next_sibling;
        }
        result
    }

    /// Collect the sibling elements preceding a node, nearest first
    pub fn preceding_elements(&self, id: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut current = self.node(id).prev_sibling;
        while let Some(c) = current {
            if self.is_element(c) {
                result.push(c);
            }
            current = self.node(c).prev_sibling;
        }
        result
    }

    /// Collect all the descendants of a node in document order
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).collect();
        stack.reverse();
        while let Some(n) = stack.pop() {
            result.push(n);
            let mark = stack.len();
            stack.extend(self.children(n));
            stack[mark..].reverse();
        }
        result
    }

    /// Collect the descendant elements with the given local name
    pub fn descendants_named(&self, id: NodeId, local: &str) -> Vec<NodeId> {
        self.descendants(id)
            .into_iter()
            .filter(|&n| self.is_named(n, local))
            .collect()
    }

    /// Find the nearest ancestor element with the given local name
    pub fn ancestor_named(&self, id: NodeId, local: &str) -> Option<NodeId> {
        let mut current = self.node(id).parent;
        while let Some(p) = current {
            if self.is_named(p, local) {
                return Some(p);
            }
            current = self.node(p).parent;
        }
        None
    }

    /// Concatenated text of all the descendant text nodes
    pub fn text_content(&self, id: NodeId) -> String {
        let mut text = String::new();
        if let NodeData::Text(t) = &self.node(id).data {
            text.push_str(t);
        }
        for n in self.descendants(id) {
            if let NodeData::Text(t) = &self.node(n).data {
                text.push_str(t);
            }
        }
        text
    }

    /// Concatenated text of the direct text children only
    pub fn direct_text(&self, id: NodeId) -> String {
        self.children(id)
            .filter_map(|c| match &self.node(c).data {
                NodeData::Text(t) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Create a detached element
    pub fn create_element(&mut self, name: impl Into<String>) -> NodeId {
        self.alloc(NodeData::Element {
            name: name.into(),
            attrs: Vec::new(),
            offset: None,
        })
    }

    /// Create a detached text node
    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.alloc(NodeData::Text(text.into()))
    }

    /// Create a detached comment node
    pub fn create_comment(&mut self, text: impl Into<String>) -> NodeId {
        self.alloc(NodeData::Comment(text.into()))
    }

    /// Append a child as the last child of a parent, detaching it first
    pub fn append(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        let last = self.node(parent).last_child;
        {
            let c = self.node_mut(child);
            c.parent = Some(parent);
            c.prev_sibling = last;
        }
        match last {
            Some(l) => self.node_mut(l).next_sibling = Some(child),
            None => self.node_mut(parent).first_child = Some(child),
        }
        self.node_mut(parent).last_child = Some(child);
    }

    /// Append text to a parent, merging with a trailing text node
    pub fn append_text(&mut self, parent: NodeId, text: &str) {
        if let Some(last) = self.node(parent).last_child {
            if let NodeData::Text(existing) = &mut self.node_mut(last).data {
                existing.push_str(text);
                return;
            }
        }
        let node = self.create_text(text);
        self.append(parent, node);
    }

    /// Insert a node right after a sibling, detaching it first
    pub fn insert_after(&mut self, sibling: NodeId, node: NodeId) {
        self.detach(node);
        let parent = self.node(sibling).parent;
        let next = self.node(sibling).next_sibling;
        {
            let n = self.node_mut(node);
            n.parent = parent;
            n.prev_sibling = Some(sibling);
            n.next_sibling = next;
        }
        self.node_mut(sibling).next_sibling = Some(node);
        match next {
            Some(nx) => self.node_mut(nx).prev_sibling = Some(node),
            None => {
                if let Some(p) = parent {
                    self.node_mut(p).last_child = Some(node);
                }
            }
        }
    }

    /// Insert a node right before a sibling, detaching it first
    pub fn insert_before(&mut self, sibling: NodeId, node: NodeId) {
        self.detach(node);
        let parent = self.node(sibling).parent;
        let prev = self.node(sibling).prev_sibling;
        {
            let n = self.node_mut(node);
            n.parent = parent;
            n.prev_sibling = prev;
            n.next_sibling = Some(sibling);
        }
        self.node_mut(sibling).prev_sibling = Some(node);
        match prev {
            Some(pv) => self.node_mut(pv).next_sibling = Some(node),
            None => {
                if let Some(p) = parent {
                    self.node_mut(p).first_child = Some(node);
                }
            }
        }
    }

    /// Detach a node from its parent; its subtree stays intact
    pub fn detach(&mut self, id: NodeId) {
        let (parent, prev, next) = {
            let n = self.node(id);
            (n.parent, n.prev_sibling, n.next_sibling)
        };
        match prev {
            Some(p) => self.node_mut(p).next_sibling = next,
            None => {
                if let Some(par) = parent {
                    self.node_mut(par).first_child = next;
                }
            }
        }
        match next {
            Some(nx) => self.node_mut(nx).prev_sibling = prev,
            None => {
                if let Some(par) = parent {
                    self.node_mut(par).last_child = prev;
                }
            }
        }
        let n = self.node_mut(id);
        n.parent = None;
        n.prev_sibling = None;
        n.next_sibling = None;
    }

    /// Copy a subtree into new detached nodes, returning the copy's root
    pub fn deep_clone(&mut self, id: NodeId) -> NodeId {
        let data = self.node(id).data.clone();
        let copy = self.alloc(data);
        let children: Vec<NodeId> = self.children(id).collect();
        for child in children {
            let child_copy = self.deep_clone(child);
            self.append(copy, child_copy);
        }
        copy
    }

    /// Get the TEI `text/body` element
    pub fn tei_body(&self) -> Result<NodeId> {
        let root = self
            .root()
            .ok_or_else(|| Error::MissingElement("root element".to_string()))?;
        let text = self
            .first_child_named(root, "text")
            .ok_or_else(|| Error::MissingElement("text".to_string()))?;
        self.first_child_named(text, "body")
            .ok_or_else(|| Error::MissingElement("body".to_string()))
    }

    /// Describe an element's position for diagnostics
    pub fn position_info(&self, id: NodeId) -> String {
        match self.offset(id) {
            Some(offset) => format!("@{offset}"),
            None => "@?".to_string(),
        }
    }
}

/// Iterator over the children of a node
pub struct Children<'a> {
    doc: &'a XmlDocument,
    current: Option<NodeId>,
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.doc.node(id).next_sibling;
        Some(id)
    }
}

fn strip_prefix(name: &str) -> &str {
    match name.rfind(':') {
        Some(i) => &name[i + 1..],
        None => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> XmlDocument {
        XmlDocument::parse(
            r#"<TEI xmlns="http://www.tei-c.org/ns/1.0"><text><body><div1 xml:id="d001"><l n="1">arma <w>virum</w></l><l n="2">cano</l></div1></body></text></TEI>"#,
        )
        .unwrap()
    }

    #[test]
    fn test_navigation() {
        let doc = sample();
        let body = doc.tei_body().unwrap();
        let div = doc.first_child_named(body, "div1").unwrap();
        assert_eq!(doc.attr(div, XML_ID), Some("d001"));

        let lines = doc.child_elements_named(div, "l");
        assert_eq!(lines.len(), 2);
        assert_eq!(doc.text_content(lines[0]), "arma virum");
        assert_eq!(doc.direct_text(lines[0]), "arma ");
        assert_eq!(doc.following_elements(lines[0]), vec![lines[1]]);
        assert_eq!(doc.preceding_elements(lines[1]), vec![lines[0]]);
        assert_eq!(doc.ancestor_named(lines[0], "div1"), Some(div));
        assert_eq!(doc.descendants_named(body, "w").len(), 1);
    }

    #[test]
    fn test_insert_and_detach() {
        let mut doc = sample();
        let body = doc.tei_body().unwrap();
        let div = doc.first_child_named(body, "div1").unwrap();
        let lines = doc.child_elements_named(div, "l");

        let pb = doc.create_element("pb");
        doc.insert_after(lines[0], pb);
        let names: Vec<_> = doc
            .elements(div)
            .map(|e| doc.local_name(e).unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["l", "pb", "l"]);

        // move the second line before the break
        doc.insert_before(pb, lines[1]);
        let names: Vec<_> = doc
            .elements(div)
            .map(|e| doc.local_name(e).unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["l", "l", "pb"]);

        doc.detach(pb);
        assert_eq!(doc.elements(div).count(), 2);
        assert_eq!(doc.parent(pb), None);
    }

    #[test]
    fn test_attributes() {
        let mut doc = sample();
        let body = doc.tei_body().unwrap();
        doc.set_attr(body, "n", "x");
        doc.set_attr(body, "n", "y");
        assert_eq!(doc.attr(body, "n"), Some("y"));
        assert_eq!(doc.remove_attr(body, "n"), Some("y".to_string()));
        assert_eq!(doc.attr(body, "n"), None);
    }

    #[test]
    fn test_deep_clone_is_independent() {
        let mut doc = sample();
        let body = doc.tei_body().unwrap();
        let div = doc.first_child_named(body, "div1").unwrap();
        let copy = doc.deep_clone(div);
        doc.set_attr(copy, XML_ID, "d002");
        assert_eq!(doc.attr(div, XML_ID), Some("d001"));
        assert_eq!(doc.text_content(copy), doc.text_content(div));
        assert_eq!(doc.parent(copy), None);
    }

    #[test]
    fn test_missing_body() {
        let doc = XmlDocument::parse("<TEI><teiHeader/></TEI>").unwrap();
        assert!(matches!(doc.tei_body(), Err(Error::MissingElement(_))));
    }
}
