//! Remodeling of MQDQ TEI documents into tiled text and apparatus layers
//!
//! This crate holds the algorithms behind the migration of the MQDQ Latin
//! poetry corpus: TEI documents are partitioned into bounded runs of rows,
//! turned into rows of word tiles, and their critical apparatus is parsed
//! into fragments located by tile coordinates. The way back rebuilds TEI
//! from those models.
//!
//! # Architecture
//!
//! - **xml**: a mutable arena DOM read and written with `quick-xml`
//! - **word_index / text_index / resolver**: word keys, their order in a
//!   document, and their tile coordinates
//! - **partition**: inserts `pb` breaks into long divisions
//! - **tiles**: builds [`TextPartition`]s from text documents
//! - **markup**: the inline note grammar and its TEI rendering
//! - **apparatus**: builds [`ApparatusLayer`]s from apparatus documents
//! - **overlap**: detects and merges overlapping `app` blocks
//! - **export**: injects partitions and layers back into TEI
//! - **thesaurus / credit**: witness and author labels from TEI headers,
//!   and responsibility credits added to them
//!
//! Diagnostics go through an injected [`Reporter`]; only configuration and
//! structural failures are returned as [`Error`].
//!
//! # Example
//!
//! ```rust
//! use mqdq_core::markup::NoteRenderer;
//! use mqdq_core::xml::XmlDocument;
//! use mqdq_core::{NullReporter, WordIndex};
//!
//! let index = WordIndex::from_tokens([("d001w1", "arma"), ("d001w2", "virumque"), ("d001w3", "cano")]);
//! let words = index.slice("d001w1", "d001w3", &NullReporter).unwrap();
//! assert_eq!(words.len(), 3);
//!
//! let mut doc = XmlDocument::new();
//! let notes = NoteRenderer::new(&NullReporter).render(&mut doc, "hello __world__!", None);
//! assert_eq!(
//!     doc.node_to_string(notes[0]),
//!     r#"<add type="abstract">hello <emph style="font-weight:bold">world</emph>!</add>"#
//! );
//! ```

pub mod apparatus;
pub mod batch;
pub mod config;
pub mod credit;
pub mod error;
pub mod export;
pub mod location;
pub mod markup;
pub mod overlap;
pub mod partition;
pub mod report;
pub mod resolver;
pub mod tei;
pub mod text_index;
pub mod thesaurus;
pub mod tiles;
pub mod word_index;
pub mod word_key;
pub mod xml;

pub use apparatus::{
    AnnotatedValue, ApparatusEntry, ApparatusFragment, ApparatusLayer, ApparatusParser, EntryKind,
    LayerRole,
};
pub use batch::{process_batch, BatchStats, BatchSummary, DocumentOutcome};
pub use config::{MqdqConfig, PartitionerConfig, PartitionerConfigBuilder};
pub use credit::Credit;
pub use error::{Error, Result};
pub use export::{ApparatusExporter, TextExporter};
pub use location::{Coordinate, Location};
pub use overlap::{report_overlaps, CoveredKeys, MergeOutcome, OverlapPair, OverlapRemover};
pub use partition::Partitioner;
pub use report::{CollectingReporter, LogReporter, NullReporter, Reporter};
pub use resolver::LocationResolver;
pub use text_index::{TextIndex, TextIndexEntry};
pub use thesaurus::{Thesaurus, ThesaurusEntry, ThesaurusParser};
pub use tiles::{TextParser, TextPartition, Tile, TileRow};
pub use word_index::{WordEntry, WordIndex};
pub use word_key::WordKey;
pub use xml::{NodeId, XmlDocument};
