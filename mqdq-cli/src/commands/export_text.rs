//! Export-text command implementation

use anyhow::{bail, Result};
use clap::Args;
use mqdq_core::{process_batch, DocumentOutcome, LogReporter, TextExporter, TextPartition};
use std::path::{Path, PathBuf};

use super::{display_name, print_summary, CommonArgs};
use crate::input::{doc_id, find_dumps, FileReader};
use crate::output::{ensure_dir, write_document};
use crate::progress::ProgressReporter;

/// Arguments for the export-text command
#[derive(Debug, Args)]
pub struct ExportTextArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Directory with the text partition dumps
    #[arg(short, long, value_name = "DIR")]
    pub dumps: PathBuf,

    /// Directory with the apparatus layer dumps; documents having layers
    /// are written with word elements
    #[arg(long, value_name = "DIR")]
    pub app_dumps: Option<PathBuf>,

    /// Precede each partition with a comment holding its id
    #[arg(long)]
    pub comments: bool,
}

impl ExportTextArgs {
    /// Whether apparatus layers refer to the words of a document
    fn has_layers(&self, id: &str) -> Result<bool> {
        match &self.app_dumps {
            Some(dir) => Ok(!find_dumps(dir, &format!("{id}-app"))?.is_empty()),
            None => Ok(false),
        }
    }

    /// Execute the export-text command
    pub fn execute(&self) -> Result<()> {
        let setup = self.common.prepare()?;
        let output = &self.common.output;
        ensure_dir(output)?;

        let reporter = LogReporter::new("mqdq::export_text");
        let exporter = TextExporter::new(&reporter).with_comments(self.comments);
        let mut progress = ProgressReporter::new(self.common.quiet);
        progress.init_files(setup.inputs.len() as u64);

        let summary = process_batch(&setup.inputs, &reporter, |path: &PathBuf| -> Result<DocumentOutcome> {
            let id = doc_id(path);
            let partitions = load_partitions(&self.dumps, &id)?;
            let mut doc = FileReader::read_document(path)?;
            let written = exporter.export(&mut doc, &partitions, self.has_layers(&id)?)?;
            if written > 0 {
                write_document(output, path, &doc)?;
            } else {
                log::warn!("{}: no partition written", display_name(path));
            }
            progress.file_completed(&display_name(path));
            Ok(DocumentOutcome::touched(written > 0))
        });
        progress.finish();

        print_summary("export-text", &summary);
        Ok(())
    }
}

/// Read the partitions of a document from its text dumps
pub fn load_partitions(dumps_dir: &Path, doc_id: &str) -> Result<Vec<TextPartition>> {
    let dumps = find_dumps(dumps_dir, doc_id)?;
    if dumps.is_empty() {
        bail!("No text dumps for {doc_id} in {}", dumps_dir.display());
    }
    FileReader::read_dumps(&dumps)
}
