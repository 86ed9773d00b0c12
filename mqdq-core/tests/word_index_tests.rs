//! Integration tests for word keys and the word index

use mqdq_core::word_key::strip_ref;
use mqdq_core::{NullReporter, WordIndex, WordKey, XmlDocument};
use proptest::prelude::*;

fn sequential(count: u32) -> WordIndex {
    WordIndex::from_tokens((1..=count).map(|i| (format!("d001w{i}"), format!("word{i}"))))
}

#[test]
fn test_slice_returns_document_order() {
    let index = sequential(10);
    let words = index.slice("d001w1", "d001w5", &NullReporter).unwrap();
    assert_eq!(words.len(), 5);
    let texts: Vec<&str> = words.iter().map(|w| w.text.as_str()).collect();
    assert_eq!(texts, vec!["word1", "word2", "word3", "word4", "word5"]);
}

#[test]
fn test_index_from_text_document() {
    let doc = XmlDocument::parse(
        r#"<TEI><text><body>
<div1 xml:id="d001"><l n="1"><w xml:id="d001w1">Arma</w> <w xml:id="d001w2">virumque</w></l></div1>
<div1 xml:id="d002"><l n="2"><w xml:id="d002w3">cano</w></l></div1>
</body></text></TEI>"#,
    )
    .unwrap();
    let index = WordIndex::from_document(&doc);
    let words = index
        .slice(strip_ref("#d001w2"), strip_ref("#d002w3"), &NullReporter)
        .unwrap();
    assert_eq!(words.len(), 2);
    assert_eq!(words[1].text, "cano");
}

#[test]
fn test_word_key_display_and_parse() {
    let key: WordKey = "#d001w12".parse().unwrap();
    assert_eq!(key, WordKey::new(1, 12));
    assert_eq!(key.to_string(), "d001w12");
    assert!(WordKey::parse("w12").is_err());
    assert!(WordKey::parse("d1x2").is_err());
}

proptest! {
    #[test]
    fn prop_inverted_slice_matches_forward(
        count in 2u32..60,
        a in 1u32..60,
        b in 1u32..60,
    ) {
        let a = a.min(count);
        let b = b.min(count);
        let index = sequential(count);
        let from = format!("d001w{a}");
        let to = format!("d001w{b}");
        let forward = index.slice(&from, &to, &NullReporter).unwrap().to_vec();
        let backward = index.slice(&to, &from, &NullReporter).unwrap().to_vec();
        prop_assert_eq!(&forward, &backward);
        prop_assert_eq!(forward.len() as u32, a.max(b) - a.min(b) + 1);
    }

    #[test]
    fn prop_word_key_order_follows_unit_then_word(
        u1 in 0u32..1000, w1 in 0u32..100_000,
        u2 in 0u32..1000, w2 in 0u32..100_000,
    ) {
        let k1 = WordKey::parse(&format!("d{u1:03}w{w1}")).unwrap();
        let k2 = WordKey::parse(&format!("d{u2:03}w{w2}")).unwrap();
        prop_assert_eq!(k1.cmp(&k2), (u1, w1).cmp(&(u2, w2)));
        prop_assert_eq!(k1.is_inside(&k1.min(k2), &k1.max(k2)), true);
    }
}
