//! Parse-text command implementation

use anyhow::Result;
use clap::Args;
use mqdq_core::{process_batch, DocumentOutcome, LogReporter, TextParser};
use std::path::PathBuf;

use super::{display_name, print_summary, CommonArgs};
use crate::input::file_reader::file_stem;
use crate::input::{doc_id, FileReader};
use crate::output::{ensure_dir, DumpWriter};
use crate::progress::ProgressReporter;

/// Arguments for the parse-text command
#[derive(Debug, Args)]
pub struct ParseTextArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Maximum partitions per dump file, 0 for a single file
    /// (overrides the configuration)
    #[arg(short, long, value_name = "COUNT")]
    pub max_items: Option<usize>,
}

impl ParseTextArgs {
    /// Execute the parse-text command
    pub fn execute(&self) -> Result<()> {
        let setup = self.common.prepare()?;
        let output = &self.common.output;
        ensure_dir(output)?;

        let writer = DumpWriter::new(
            self.max_items
                .unwrap_or(setup.config.output.max_items_per_file),
            setup.config.output.pretty_json,
        );
        let reporter = LogReporter::new("mqdq::parse_text");
        let parser = TextParser::new(setup.config.text.clone(), &reporter);
        let mut progress = ProgressReporter::new(self.common.quiet);
        progress.init_files(setup.inputs.len() as u64);

        let summary = process_batch(&setup.inputs, &reporter, |path: &PathBuf| -> Result<DocumentOutcome> {
            let doc = FileReader::read_document(path)?;
            let partitions = parser.parse(&doc, &doc_id(path))?;
            let files = writer.write(output, &file_stem(path), &partitions)?;
            log::info!(
                "{}: {} partition(s) in {} dump(s)",
                display_name(path),
                partitions.len(),
                files.len()
            );
            progress.file_completed(&display_name(path));
            Ok(DocumentOutcome::touched(!partitions.is_empty()))
        });
        progress.finish();

        print_summary("parse-text", &summary);
        Ok(())
    }
}
