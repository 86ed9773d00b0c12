//! Inline note markup
//!
//! Notes are stored as plain text with a compact grammar: sections separated
//! by a backtick, `__bold__`, `_italic_`, `<sup>`/`<sub>` spans and line
//! breaks. In TEI they are `add`/`note` elements holding `emph` and `lb`
//! children. [`NoteRenderer`] goes from text to elements; [`remove_formatting`]
//! and [`apply_markdown`] go back.

mod decode;
mod encode;
mod sections;
mod tree;

pub use decode::{apply_markdown, remove_formatting, LINE_BREAK_CODE};
pub use encode::{parse_markup, NoteRenderer};
pub use sections::{join_sections, split_sections, NoteSection, SECTION_SEPARATOR};
pub use tree::{Inline, MarkupTree, Span, SpanId, SpanKind};

/// Element name of an emphasis span
pub const EMPH: &str = "emph";
/// Element name of a line break
pub const LB: &str = "lb";
