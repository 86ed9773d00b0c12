//! Span tree built while reading note markup

use crate::xml::{NodeId, XmlDocument};

use super::{EMPH, LB};

/// Span formatting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpanKind {
    Root,
    Bold,
    Italic,
    Superscript,
    Subscript,
}

impl SpanKind {
    /// Value of the `emph@style` attribute
    pub fn style(self) -> Option<&'static str> {
        match self {
            SpanKind::Root => None,
            SpanKind::Bold => Some("font-weight:bold"),
            SpanKind::Italic => Some("font-style:italic"),
            SpanKind::Superscript => Some("vertical-align:super;font-size:smaller"),
            SpanKind::Subscript => Some("vertical-align:sub;font-size:smaller"),
        }
    }

    /// Look up a kind from an `emph@style` value
    pub fn from_style(style: &str) -> Option<Self> {
        [
            SpanKind::Bold,
            SpanKind::Italic,
            SpanKind::Superscript,
            SpanKind::Subscript,
        ]
        .into_iter()
        .find(|k| k.style() == Some(style.trim()))
    }

    /// Letter of the `{f=x}` brace escape
    pub fn code(self) -> Option<char> {
        match self {
            SpanKind::Root => None,
            SpanKind::Bold => Some('b'),
            SpanKind::Italic => Some('i'),
            SpanKind::Superscript => Some('u'),
            SpanKind::Subscript => Some('d'),
        }
    }

    /// Look up a kind from a brace escape letter
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "b" => Some(SpanKind::Bold),
            "i" => Some(SpanKind::Italic),
            "u" => Some(SpanKind::Superscript),
            "d" => Some(SpanKind::Subscript),
            _ => None,
        }
    }

    /// Opening and closing delimiters in note text
    pub fn delimiters(self) -> (&'static str, &'static str) {
        match self {
            SpanKind::Root => ("", ""),
            SpanKind::Bold => ("__", "__"),
            SpanKind::Italic => ("_", "_"),
            SpanKind::Superscript => ("<sup>", "</sup>"),
            SpanKind::Subscript => ("<sub>", "</sub>"),
        }
    }
}

/// Index of a span in a [`MarkupTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpanId(usize);

/// Content of a span
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    Text(String),
    LineBreak,
    Span(SpanId),
}

/// A formatted span and its content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub kind: SpanKind,
    pub children: Vec<Inline>,
}

/// Spans stored in a flat arena; children refer to nested spans by index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkupTree {
    spans: Vec<Span>,
}

impl Default for MarkupTree {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkupTree {
    pub fn new() -> Self {
        Self {
            spans: vec![Span {
                kind: SpanKind::Root,
                children: Vec::new(),
            }],
        }
    }

    pub fn root(&self) -> SpanId {
        SpanId(0)
    }

    pub fn span(&self, id: SpanId) -> &Span {
        &self.spans[id.0]
    }

    /// Append text, merging with a trailing text run
    pub fn push_text(&mut self, parent: SpanId, text: &str) {
        if text.is_empty() {
            return;
        }
        let children = &mut self.spans[parent.0].children;
        if let Some(Inline::Text(last)) = children.last_mut() {
            last.push_str(text);
        } else {
            children.push(Inline::Text(text.to_string()));
        }
    }

    pub fn push_break(&mut self, parent: SpanId) {
        self.spans[parent.0].children.push(Inline::LineBreak);
    }

    /// Open a new span as the last child of `parent`
    pub fn open(&mut self, parent: SpanId, kind: SpanKind) -> SpanId {
        let id = SpanId(self.spans.len());
        self.spans.push(Span {
            kind,
            children: Vec::new(),
        });
        self.spans[parent.0].children.push(Inline::Span(id));
        id
    }

    /// Check if the tree holds no text
    pub fn is_blank(&self) -> bool {
        self.spans.iter().all(|s| {
            s.children.iter().all(|c| match c {
                Inline::Text(t) => t.is_empty(),
                _ => true,
            })
        })
    }

    /// Render the tree content as children of an XML element
    pub fn write_into(&self, doc: &mut XmlDocument, element: NodeId) {
        let mut stack = vec![(self.root(), element)];
        while let Some((span, target)) = stack.pop() {
            for child in &self.span(span).children {
                match child {
                    Inline::Text(text) => doc.append_text(target, text),
                    Inline::LineBreak => {
                        let lb = doc.create_element(LB);
                        doc.append(target, lb);
                    }
                    Inline::Span(id) => {
                        let emph = doc.create_element(EMPH);
                        if let Some(style) = self.span(*id).kind.style() {
                            doc.set_attr(emph, "style", style);
                        }
                        doc.append(target, emph);
                        stack.push((*id, emph));
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_style_lookup() {
        assert_eq!(SpanKind::from_style("font-weight:bold"), Some(SpanKind::Bold));
        assert_eq!(
            SpanKind::from_style("vertical-align:sub;font-size:smaller"),
            Some(SpanKind::Subscript)
        );
        assert_eq!(SpanKind::from_style("color:red"), None);
        assert_eq!(SpanKind::from_code("u"), Some(SpanKind::Superscript));
    }

    #[test]
    fn test_write_into() {
        let mut tree = MarkupTree::new();
        let root = tree.root();
        tree.push_text(root, "a ");
        let bold = tree.open(root, SpanKind::Bold);
        tree.push_text(bold, "b");
        let italic = tree.open(bold, SpanKind::Italic);
        tree.push_text(italic, "c");
        tree.push_break(root);
        tree.push_text(root, "d");

        let mut doc = XmlDocument::new();
        let add = doc.create_element("add");
        tree.write_into(&mut doc, add);
        assert_eq!(
            doc.node_to_string(add),
            r#"<add>a <emph style="font-weight:bold">b<emph style="font-style:italic">c</emph></emph><lb/>d</add>"#
        );
    }
}
