//! Critical apparatus model
//!
//! Each TEI `app` block becomes an [`ApparatusFragment`]: a location in a
//! text unit plus its readings and notes. Fragments are grouped into
//! [`ApparatusLayer`]s, one per text unit and role.

mod model;
mod parser;

pub use model::{
    AnnotatedValue, ApparatusEntry, ApparatusFragment, ApparatusLayer, EntryKind, LayerRole,
    TYPE_ANCIENT_NOTE, TYPE_MARGIN_NOTE,
};
pub use parser::ApparatusParser;
