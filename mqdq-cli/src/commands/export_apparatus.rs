//! Export-apparatus command implementation

use anyhow::Result;
use clap::Args;
use mqdq_core::{
    process_batch, ApparatusExporter, ApparatusLayer, DocumentOutcome, LogReporter, TextIndex,
};
use std::path::PathBuf;

use super::export_text::load_partitions;
use super::{display_name, print_summary, CommonArgs};
use crate::input::file_reader::file_stem;
use crate::input::{doc_id, find_dumps, FileReader};
use crate::output::{ensure_dir, write_document};
use crate::progress::ProgressReporter;

/// Arguments for the export-apparatus command
#[derive(Debug, Args)]
pub struct ExportApparatusArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Directory with the apparatus layer dumps
    #[arg(short, long, value_name = "DIR")]
    pub dumps: PathBuf,

    /// Directory with the text partition dumps the layers refer to
    #[arg(long, value_name = "DIR")]
    pub text_dumps: PathBuf,

    /// Precede layers and fragments with descriptive comments
    #[arg(long)]
    pub comments: bool,
}

impl ExportApparatusArgs {
    /// Execute the export-apparatus command
    pub fn execute(&self) -> Result<()> {
        let setup = self.common.prepare()?;
        let output = &self.common.output;
        ensure_dir(output)?;

        let reporter = LogReporter::new("mqdq::export_apparatus");
        let mut progress = ProgressReporter::new(self.common.quiet);
        progress.init_files(setup.inputs.len() as u64);

        let summary = process_batch(&setup.inputs, &reporter, |path: &PathBuf| -> Result<DocumentOutcome> {
            let partitions = load_partitions(&self.text_dumps, &doc_id(path))?;
            let layers: Vec<ApparatusLayer> =
                FileReader::read_dumps(&find_dumps(&self.dumps, &file_stem(path))?)?;
            let index = TextIndex::from_partitions(&partitions);

            let mut doc = FileReader::read_document(path)?;
            let written = ApparatusExporter::new(&index, &reporter)
                .with_comments(self.comments)
                .export(&mut doc, &layers, &partitions)?;
            if written {
                write_document(output, path, &doc)?;
            } else {
                log::warn!("{}: no apparatus layer written", display_name(path));
            }
            progress.file_completed(&display_name(path));
            Ok(DocumentOutcome::touched(written))
        });
        progress.finish();

        print_summary("export-apparatus", &summary);
        Ok(())
    }
}
