//! JSON dump writer

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Writes items as JSON arrays split over numbered files
/// `<stem>_00001.json`, `<stem>_00002.json`, ...
pub struct DumpWriter {
    max_items_per_file: usize,
    pretty: bool,
}

impl DumpWriter {
    /// Create a writer; `max_items_per_file == 0` puts everything in one file
    pub fn new(max_items_per_file: usize, pretty: bool) -> Self {
        Self {
            max_items_per_file,
            pretty,
        }
    }

    /// Write the items of one document, returning the created files.
    /// Nothing is written for an empty list.
    pub fn write<T: Serialize>(&self, dir: &Path, stem: &str, items: &[T]) -> Result<Vec<PathBuf>> {
        let chunk_size = if self.max_items_per_file == 0 {
            items.len().max(1)
        } else {
            self.max_items_per_file
        };

        let mut files = Vec::new();
        for (i, chunk) in items.chunks(chunk_size).enumerate() {
            let path = dir.join(format!("{stem}_{:05}.json", i + 1));
            let file = File::create(&path)
                .with_context(|| format!("Failed to create dump: {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            if self.pretty {
                serde_json::to_writer_pretty(&mut writer, chunk)?;
            } else {
                serde_json::to_writer(&mut writer, chunk)?;
            }
            writeln!(writer)?;
            writer.flush()?;
            files.push(path);
        }
        Ok(files)
    }
}
