//! TEI elements back to note text

use std::sync::OnceLock;

use regex::{Captures, Regex};

use crate::report::Reporter;
use crate::xml::{NodeData, NodeId, XmlDocument};

use super::tree::SpanKind;
use super::{EMPH, LB};

/// Brace escape standing for a line break
pub const LINE_BREAK_CODE: &str = "{lb}";

const CLOSE_CODE: &str = "{/f}";

fn whitespace_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("valid whitespace pattern"))
}

fn braces_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{([^}]+)\}").expect("valid brace escape pattern"))
}

/// Flatten an element's content into text with brace escapes: `{f=i}`,
/// `{f=b}`, `{f=u}`, `{f=d}` open spans, `{/f}` closes them and `{lb}`
/// marks line breaks. Whitespace runs are collapsed to single spaces.
///
/// Emphasis with an unknown style, and any other child element, is reported
/// and contributes its text only.
pub fn remove_formatting(doc: &XmlDocument, element: NodeId, reporter: &dyn Reporter) -> String {
    let mut out = String::new();
    write_escaped(doc, element, &mut out, reporter);
    whitespace_regex().replace_all(&out, " ").into_owned()
}

fn write_escaped(doc: &XmlDocument, parent: NodeId, out: &mut String, reporter: &dyn Reporter) {
    for child in doc.children(parent) {
        match doc.data(child) {
            NodeData::Text(text) => out.push_str(text),
            NodeData::Element { .. } => {
                let name = doc.local_name(child).unwrap_or_default();
                if name == LB {
                    out.push_str(LINE_BREAK_CODE);
                } else if name == EMPH {
                    let style = doc.attr(child, "style").unwrap_or_default();
                    match SpanKind::from_style(style).and_then(SpanKind::code) {
                        Some(code) => {
                            out.push_str("{f=");
                            out.push(code);
                            out.push('}');
                            write_escaped(doc, child, out, reporter);
                            out.push_str(CLOSE_CODE);
                        }
                        None => {
                            reporter.error(&format!(
                                "Unexpected emph style: \"{style}\" {}",
                                doc.position_info(child)
                            ));
                            write_escaped(doc, child, out, reporter);
                        }
                    }
                } else {
                    reporter.error(&format!(
                        "Unexpected element {name} in note {}",
                        doc.position_info(child)
                    ));
                    write_escaped(doc, child, out, reporter);
                }
            }
            _ => {}
        }
    }
}

/// Turn brace escapes back into note delimiters (`_`, `__`, `<sup>`,
/// `<sub>`, line breaks), matching each `{/f}` with the innermost open span.
/// Unknown escapes are left as they are.
pub fn apply_markdown(text: &str, reporter: &dyn Reporter) -> String {
    let mut stack: Vec<&'static str> = Vec::new();
    let result = braces_regex()
        .replace_all(text, |caps: &Captures<'_>| {
            let code = &caps[1];
            if code == "lb" {
                return "\n".to_string();
            }
            if code == "/f" {
                return match stack.pop() {
                    Some(closer) => closer.to_string(),
                    None => {
                        reporter.error(&format!("Unmatched {CLOSE_CODE} in: {text}"));
                        String::new()
                    }
                };
            }
            match code.strip_prefix("f=").and_then(SpanKind::from_code) {
                Some(kind) => {
                    let (open, close) = kind.delimiters();
                    stack.push(close);
                    open.to_string()
                }
                None => caps[0].to_string(),
            }
        })
        .into_owned();

    if !stack.is_empty() {
        reporter.warn(&format!("Unclosed formatting in: {text}"));
    }
    result
}
