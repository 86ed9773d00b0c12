//! Output writing module

use anyhow::{Context, Result};
use mqdq_core::XmlDocument;
use std::fs;
use std::path::{Path, PathBuf};

pub mod json;
pub mod markdown;

pub use json::DumpWriter;
pub use markdown::OverlapReport;

/// Write a document into `output_dir` under the name of its source file
pub fn write_document(output_dir: &Path, source: &Path, doc: &XmlDocument) -> Result<PathBuf> {
    let path = output_dir.join(source.file_name().unwrap_or_default());
    fs::write(&path, doc.to_xml_string())
        .with_context(|| format!("Failed to write document: {}", path.display()))?;
    Ok(path)
}

/// Copy an untouched source file into `output_dir`
pub fn copy_document(output_dir: &Path, source: &Path) -> Result<PathBuf> {
    let path = output_dir.join(source.file_name().unwrap_or_default());
    fs::copy(source, &path)
        .with_context(|| format!("Failed to copy {} to {}", source.display(), path.display()))?;
    Ok(path)
}

/// Create an output directory when missing
pub fn ensure_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory: {}", dir.display()))
}
