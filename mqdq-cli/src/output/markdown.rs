//! Markdown overlap report

use anyhow::Result;
use std::io::Write;

/// One overlapping pair, ready for rendering
#[derive(Debug, Clone)]
pub struct OverlapEntry {
    /// `(key, text)` of the words covered by the first block
    pub words: Vec<(String, String)>,
    /// XML of the first block
    pub first: String,
    /// XML of the second block
    pub second: String,
}

/// Overlaps found in one document
#[derive(Debug, Clone)]
struct DocumentOverlaps {
    file_name: String,
    entries: Vec<OverlapEntry>,
}

/// Report listing every overlapping pair of `app` blocks, document by
/// document
#[derive(Debug, Default)]
pub struct OverlapReport {
    documents: Vec<DocumentOverlaps>,
}

impl OverlapReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the overlaps of a document; documents without overlaps are kept
    /// out of the report
    pub fn add_document(&mut self, file_name: impl Into<String>, entries: Vec<OverlapEntry>) {
        if entries.is_empty() {
            return;
        }
        self.documents.push(DocumentOverlaps {
            file_name: file_name.into(),
            entries,
        });
    }

    /// Total number of overlaps
    pub fn overlap_count(&self) -> usize {
        self.documents.iter().map(|d| d.entries.len()).sum()
    }

    /// Render the report, documents sorted by file name
    pub fn write_to<W: Write>(&mut self, writer: &mut W) -> Result<()> {
        self.documents.sort_by(|a, b| a.file_name.cmp(&b.file_name));

        writeln!(writer, "# Overlaps Report")?;
        writeln!(writer)?;
        let mut nr = 0;
        for document in &self.documents {
            for entry in &document.entries {
                nr += 1;
                writeln!(writer, "## Overlap {nr}")?;
                writeln!(writer)?;
                writeln!(writer, "{}", document.file_name)?;
                writeln!(writer)?;
                let words: Vec<String> = entry
                    .words
                    .iter()
                    .map(|(key, text)| format!("`{key}`=`{text}`"))
                    .collect();
                writeln!(writer, "{}", words.join(" "))?;
                writeln!(writer)?;
                writeln!(writer, "```xml")?;
                writeln!(writer, "{}", entry.first)?;
                writeln!(writer, "{}", entry.second)?;
                writeln!(writer, "```")?;
                writeln!(writer)?;
            }
        }
        writeln!(writer, "---")?;
        writeln!(writer, "*Total overlaps: {}*", self.overlap_count())?;
        writer.flush()?;
        Ok(())
    }
}
