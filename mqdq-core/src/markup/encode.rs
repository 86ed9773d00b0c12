//! Note text to TEI elements

use crate::report::Reporter;
use crate::xml::{NodeId, XmlDocument};

use super::sections::split_sections;
use super::tree::{MarkupTree, SpanId, SpanKind};

/// Token recognized while scanning note text
enum Token {
    Toggle(SpanKind),
    Open(SpanKind),
    Close(SpanKind),
    LineBreak,
}

/// Match a token at the start of `text`, returning it with its byte length
fn match_token(text: &str) -> Option<(Token, usize)> {
    const TAGS: [(&str, Token); 4] = [
        ("<sup>", Token::Open(SpanKind::Superscript)),
        ("</sup>", Token::Close(SpanKind::Superscript)),
        ("<sub>", Token::Open(SpanKind::Subscript)),
        ("</sub>", Token::Close(SpanKind::Subscript)),
    ];

    if text.starts_with("__") {
        return Some((Token::Toggle(SpanKind::Bold), 2));
    }
    if text.starts_with('_') {
        return Some((Token::Toggle(SpanKind::Italic), 1));
    }
    if text.starts_with("\r\n") {
        return Some((Token::LineBreak, 2));
    }
    if text.starts_with('\r') || text.starts_with('\n') {
        return Some((Token::LineBreak, 1));
    }
    if text.starts_with('<') {
        for (tag, token) in TAGS {
            if text.starts_with(tag) {
                return Some((token, tag.len()));
            }
        }
    }
    None
}

/// Parse note text into a span tree.
///
/// Open spans are kept on an explicit stack; a line break closes all of
/// them. Spans left open at the end are reported and keep their content.
///
/// Underscores are read greedily, two at a time: in `__a _b___` the final
/// run toggles bold then italic instead of closing both spans, which leaves
/// four spans open.
pub fn parse_markup(text: &str, reporter: &dyn Reporter) -> MarkupTree {
    let mut tree = MarkupTree::new();
    let mut stack: Vec<(SpanKind, SpanId)> = Vec::new();
    let mut plain_start = 0;
    let mut i = 0;

    while i < text.len() {
        let Some((token, len)) = match_token(&text[i..]) else {
            i += text[i..].chars().next().map_or(1, char::len_utf8);
            continue;
        };

        let current = stack.last().map_or(tree.root(), |&(_, id)| id);
        tree.push_text(current, &text[plain_start..i]);

        match token {
            Token::Toggle(kind) if stack.last().map(|&(k, _)| k) == Some(kind) => {
                stack.pop();
            }
            Token::Toggle(kind) | Token::Open(kind) => {
                let span = tree.open(current, kind);
                stack.push((kind, span));
            }
            Token::Close(kind) => {
                if stack.last().map(|&(k, _)| k) == Some(kind) {
                    stack.pop();
                } else {
                    reporter.error(&format!(
                        "Unmatched closing {} in note text",
                        kind.delimiters().1
                    ));
                    tree.push_text(current, &text[i..i + len]);
                }
            }
            Token::LineBreak => {
                if !stack.is_empty() {
                    reporter.debug("Open spans closed by line break");
                    stack.clear();
                }
                tree.push_break(tree.root());
            }
        }

        i += len;
        plain_start = i;
    }

    let current = stack.last().map_or(tree.root(), |&(_, id)| id);
    tree.push_text(current, &text[plain_start..]);

    if !stack.is_empty() {
        let open: Vec<&str> = stack.iter().map(|(k, _)| k.delimiters().0).collect();
        reporter.error(&format!(
            "Unclosed span(s) {} at end of note text: {text}",
            open.join(" ")
        ));
    }

    tree
}

/// Renders multi-section note text into TEI `add`/`note` elements
pub struct NoteRenderer<'a> {
    reporter: &'a dyn Reporter,
}

impl<'a> NoteRenderer<'a> {
    pub fn new(reporter: &'a dyn Reporter) -> Self {
        Self { reporter }
    }

    /// Render note text into detached elements, one per non-empty section,
    /// each with `@target` when given
    pub fn render(&self, doc: &mut XmlDocument, text: &str, target: Option<&str>) -> Vec<NodeId> {
        let mut elements = Vec::new();
        for section in split_sections(text, self.reporter) {
            let tree = parse_markup(&section.text, self.reporter);
            if tree.is_blank() {
                continue;
            }
            let element = doc.create_element(section.element_name());
            doc.set_attr(element, "type", section.type_name());
            if let Some(target) = target {
                doc.set_attr(element, "target", target);
            }
            tree.write_into(doc, element);
            elements.push(element);
        }
        elements
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{CollectingReporter, NullReporter};
    use log::Level;

    fn render(text: &str, target: Option<&str>) -> Vec<String> {
        let mut doc = XmlDocument::new();
        NoteRenderer::new(&NullReporter)
            .render(&mut doc, text, target)
            .into_iter()
            .map(|e| doc.node_to_string(e))
            .collect()
    }

    #[test]
    fn test_render_empty() {
        assert!(render("", None).is_empty());
    }

    #[test]
    fn test_render_bold() {
        assert_eq!(
            render("hello __world__!", None),
            vec![r#"<add type="abstract">hello <emph style="font-weight:bold">world</emph>!</add>"#]
        );
    }

    #[test]
    fn test_render_four_sections() {
        let rendered = render("A`B`C`D", None);
        assert_eq!(
            rendered,
            vec![
                r#"<add type="abstract">A</add>"#,
                r#"<note type="operation">B</note>"#,
                r#"<note type="details">C</note>"#,
                r#"<add type="intertext">D</add>"#,
            ]
        );
    }

    #[test]
    fn test_render_initial_separator_with_target() {
        assert_eq!(
            render("`section 2", Some("#lb1-50")),
            vec![r##"<note type="operation" target="#lb1-50">section 2</note>"##]
        );
    }

    #[test]
    fn test_render_line_breaks_and_nesting() {
        assert_eq!(
            render("__a _b_ c__\r\nd\re<sup>2</sup>", None),
            vec![concat!(
                r#"<add type="abstract"><emph style="font-weight:bold">a "#,
                r#"<emph style="font-style:italic">b</emph> c</emph><lb/>d<lb/>e"#,
                r#"<emph style="vertical-align:super;font-size:smaller">2</emph></add>"#
            )]
        );
    }

    #[test]
    fn test_unclosed_span_reported_and_kept() {
        let reporter = CollectingReporter::new();
        let tree = parse_markup("a _b", &reporter);
        assert!(reporter.contains(Level::Error, "Unclosed"));
        let mut doc = XmlDocument::new();
        let add = doc.create_element("add");
        tree.write_into(&mut doc, add);
        assert_eq!(doc.text_content(add), "a b");
    }

    #[test]
    fn test_unmatched_closer_kept_as_text() {
        let reporter = CollectingReporter::new();
        let tree = parse_markup("x</sub>", &reporter);
        assert!(reporter.contains(Level::Error, "Unmatched"));
        let mut doc = XmlDocument::new();
        let add = doc.create_element("add");
        tree.write_into(&mut doc, add);
        assert_eq!(doc.text_content(add), "x</sub>");
    }

    #[test]
    fn test_non_ascii_text() {
        let mut doc = XmlDocument::new();
        let add = doc.create_element("add");
        parse_markup("φῶς _ἄρα_", &NullReporter).write_into(&mut doc, add);
        assert_eq!(
            doc.node_to_string(add),
            r#"<add>φῶς <emph style="font-style:italic">ἄρα</emph></add>"#
        );
    }
}
