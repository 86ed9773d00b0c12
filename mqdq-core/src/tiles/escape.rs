//! Legacy inline escapes in word text

use std::sync::OnceLock;

use regex::Regex;

fn escape_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)^(?P<text>.*?)\(\((?P<patch>[^()]*)\)\)\s*$").expect("valid escape pattern")
    })
}

/// Split a trailing `((payload))` escape from a word's text.
///
/// Returns the visible text and the payload, if any.
pub fn extract_escape(text: &str) -> (String, Option<String>) {
    match escape_regex().captures(text) {
        Some(caps) => (caps["text"].to_string(), Some(caps["patch"].to_string())),
        None => (text.to_string(), None),
    }
}
