//! Parse-thesauri command implementation

use anyhow::Result;
use clap::Args;
use mqdq_core::{process_batch, DocumentOutcome, LogReporter, ThesaurusParser};
use std::path::PathBuf;

use super::{display_name, print_summary, CommonArgs};
use crate::input::file_reader::file_stem;
use crate::input::{doc_id, FileReader};
use crate::output::{ensure_dir, DumpWriter};
use crate::progress::ProgressReporter;

/// Arguments for the parse-thesauri command
#[derive(Debug, Args)]
pub struct ParseThesauriArgs {
    #[command(flatten)]
    pub common: CommonArgs,
}

impl ParseThesauriArgs {
    /// Execute the parse-thesauri command
    pub fn execute(&self) -> Result<()> {
        let setup = self.common.prepare()?;
        let output = &self.common.output;
        ensure_dir(output)?;

        let writer = DumpWriter::new(0, setup.config.output.pretty_json);
        let reporter = LogReporter::new("mqdq::parse_thesauri");
        let parser = ThesaurusParser::new(&reporter);
        let mut progress = ProgressReporter::new(self.common.quiet);
        progress.init_files(setup.inputs.len() as u64);

        let summary = process_batch(&setup.inputs, &reporter, |path: &PathBuf| -> Result<DocumentOutcome> {
            let doc = FileReader::read_document(path)?;
            let thesauri = parser.parse(&doc, &doc_id(path))?;
            let entries: usize = thesauri.iter().map(|t| t.entries.len()).sum();
            writer.write(output, &file_stem(path), &thesauri)?;
            log::info!("{}: {entries} thesaurus entries", display_name(path));
            progress.file_completed(&display_name(path));
            Ok(DocumentOutcome::touched(entries > 0))
        });
        progress.finish();

        print_summary("parse-thesauri", &summary);
        Ok(())
    }
}
