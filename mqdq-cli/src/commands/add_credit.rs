//! Add-credit command implementation

use anyhow::Result;
use clap::Args;
use mqdq_core::{process_batch, Credit, DocumentOutcome, LogReporter, Reporter};
use std::path::PathBuf;

use super::{display_name, print_summary, CommonArgs};
use crate::input::FileReader;
use crate::output::{ensure_dir, write_document};
use crate::progress::ProgressReporter;

/// Arguments for the add-credit command
#[derive(Debug, Args)]
pub struct AddCreditArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Responsibility text (`resp`)
    #[arg(long, value_name = "TEXT")]
    pub resp: String,

    /// Person credited (`persName`)
    #[arg(long, value_name = "NAME")]
    pub person: String,

    /// Check the documents without writing them
    #[arg(long)]
    pub dry_run: bool,
}

impl AddCreditArgs {
    /// Execute the add-credit command
    pub fn execute(&self) -> Result<()> {
        let setup = self.common.prepare()?;
        let output = &self.common.output;
        if !self.dry_run {
            ensure_dir(output)?;
        }

        let credit = Credit::new(self.resp.as_str(), self.person.as_str());
        let reporter = LogReporter::new("mqdq::add_credit");
        let mut progress = ProgressReporter::new(self.common.quiet);
        progress.init_files(setup.inputs.len() as u64);

        let summary = process_batch(&setup.inputs, &reporter, |path: &PathBuf| -> Result<DocumentOutcome> {
            let mut doc = FileReader::read_document(path)?;
            let added = credit.add_to(&mut doc);
            if !added {
                reporter.error(&format!(
                    "Unable to find seriesStmt in header for {}",
                    display_name(path)
                ));
            } else if !self.dry_run {
                write_document(output, path, &doc)?;
            }
            progress.file_completed(&display_name(path));
            Ok(DocumentOutcome::touched(added))
        });
        progress.finish();

        print_summary("add-credit", &summary);
        Ok(())
    }
}
