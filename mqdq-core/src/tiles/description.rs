//! Short partition descriptions

use std::sync::OnceLock;

use regex::Regex;

const MAX_LENGTH: usize = 80;
const HEAD_LENGTH: usize = 40;
const TAIL_LENGTH: usize = 39;
const BOUNDARY_SLACK: usize = 8;
const ELLIPSIS: char = '\u{2026}';

fn digits_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d+").expect("valid digits pattern"))
}

/// Build a description from a partition's text: digits are removed, spaces
/// collapsed, and long texts are cut to a head and a tail joined by `…`.
pub fn description_text(text: &str) -> String {
    let text = digits_regex().replace_all(text, "");
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= MAX_LENGTH {
        return text;
    }

    let head = cut_head(&chars, HEAD_LENGTH);
    let tail = cut_tail(&chars, TAIL_LENGTH);
    format!("{}{ELLIPSIS}{}", head.trim_end(), tail.trim_start())
}

fn cut_head(chars: &[char], length: usize) -> String {
    let mut end = length;
    if chars[end] != ' ' {
        if let Some(space) = chars[end - BOUNDARY_SLACK..end].iter().rposition(|&c| c == ' ') {
            end = end - BOUNDARY_SLACK + space;
        }
    }
    chars[..end].iter().collect()
}

fn cut_tail(chars: &[char], length: usize) -> String {
    let mut start = chars.len() - length;
    if chars[start - 1] != ' ' {
        if let Some(space) = chars[start..start + BOUNDARY_SLACK].iter().position(|&c| c == ' ') {
            start += space + 1;
        }
    }
    chars[start..].iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_kept() {
        assert_eq!(description_text(" 12 arma  virumque 3 cano "), "arma virumque cano");
    }

    #[test]
    fn test_long_text_cut_at_words() {
        let text = "Arma virumque cano, Troiae qui primus ab oris Italiam, fato profugus, Laviniaque venit litora, multum ille et terris iactatus et alto";
        let description = description_text(text);
        assert!(description.chars().count() <= 80);
        assert!(description.starts_with("Arma virumque cano, Troiae qui primus"));
        assert!(description.ends_with("terris iactatus et alto"));
        assert!(description.contains('\u{2026}'));
        for part in description.split('\u{2026}') {
            assert!(!part.starts_with(' ') && !part.ends_with(' '));
        }
    }
}
