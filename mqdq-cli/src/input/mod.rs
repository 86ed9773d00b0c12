//! Input handling module

pub mod file_reader;
pub mod glob_resolver;

pub use file_reader::{doc_id, FileReader};
pub use glob_resolver::{find_dumps, resolve_patterns};
