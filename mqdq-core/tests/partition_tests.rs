//! Integration tests for partition boundary insertion

use mqdq_core::tei::{self, PB};
use mqdq_core::{NullReporter, Partitioner, PartitionerConfig, TextParser, XmlDocument};
use proptest::prelude::*;

fn document(texts: &[String]) -> XmlDocument {
    let rows: String = texts
        .iter()
        .enumerate()
        .map(|(i, t)| format!(r#"<l n="{}">{t}</l>"#, i + 1))
        .collect();
    XmlDocument::parse(&format!(
        r#"<TEI><teiHeader/><text><body><div1 type="work" xml:id="d001"><head>I</head>{rows}</div1></body></text></TEI>"#
    ))
    .unwrap()
}

fn partitioner(min: usize, max: usize) -> Partitioner<'static> {
    let config = PartitionerConfig::builder()
        .min_rows(min)
        .max_rows(max)
        .build()
        .unwrap();
    Partitioner::new(config, &NullReporter).unwrap()
}

/// Sizes of the row runs closed by each break, plus the trailing run
fn run_sizes(doc: &XmlDocument) -> Vec<usize> {
    let body = doc.tei_body().unwrap();
    let div = doc.first_child_named(body, "div1").unwrap();
    let mut sizes = vec![0];
    for e in doc.elements(div).collect::<Vec<_>>() {
        if doc.is_named(e, PB) {
            sizes.push(0);
        } else if tei::is_row(doc, e) {
            *sizes.last_mut().unwrap() += 1;
        }
    }
    sizes
}

#[test]
fn test_single_sentence_end_then_overflow() {
    // 43 rows, only row 13 ends a sentence
    let texts: Vec<String> = (1..=43)
        .map(|i| if i == 13 { "finis.".to_string() } else { format!("versus {i}") })
        .collect();
    let mut doc = document(&texts);
    assert!(partitioner(10, 25).partition(&mut doc, "verg").unwrap());
    assert_eq!(run_sizes(&doc), vec![13, 25, 5, 0]);
}

#[test]
fn test_partitioned_document_parses_into_segments() {
    let texts: Vec<String> = (1..=30)
        .map(|i| if i % 10 == 0 { "a.".to_string() } else { "b".to_string() })
        .collect();
    let mut doc = document(&texts);
    partitioner(5, 12).partition(&mut doc, "verg").unwrap();

    let partitions = TextParser::new(Default::default(), &NullReporter)
        .parse(&doc, "verg")
        .unwrap();
    let sizes: Vec<usize> = partitions.iter().map(|p| p.rows.len()).collect();
    assert_eq!(sizes, vec![10, 10, 10]);
    assert_eq!(partitions[1].citation, "verg type=work\u{2016}xml:id=d001 11-20");
    assert!(partitions.iter().all(|p| p.div_id == "d001"));
}

#[test]
fn test_already_divided_document_is_left_alone() {
    let rows: String = (1..=60).map(|i| format!("<l n=\"{i}\">x</l>")).collect();
    let mut doc = XmlDocument::parse(&format!(
        r#"<TEI><text><body><div1 type="work"><div2>{rows}</div2></div1></body></text></TEI>"#
    ))
    .unwrap();
    let before = doc.to_xml_string();
    assert!(!partitioner(10, 20).partition(&mut doc, "verg").unwrap());
    assert_eq!(doc.to_xml_string(), before);
}

proptest! {
    #[test]
    fn prop_partitions_are_bounded_and_keep_rows(
        ends in prop::collection::vec(any::<bool>(), 30..200),
        min in 2usize..10,
        extra in 0usize..20,
    ) {
        let max = min + extra;
        let texts: Vec<String> = ends
            .iter()
            .map(|&end| if end { "dixit.".to_string() } else { "dixit".to_string() })
            .collect();
        let mut doc = document(&texts);
        partitioner(min, max).partition(&mut doc, "p").unwrap();

        let sizes = run_sizes(&doc);
        prop_assert_eq!(sizes.iter().sum::<usize>(), texts.len());
        // a lone trailing row may join the last partition
        prop_assert!(sizes.iter().all(|&s| s <= max + 1), "{:?}", sizes);
    }
}
