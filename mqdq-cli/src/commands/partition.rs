//! Partition command implementation

use anyhow::Result;
use clap::Args;
use mqdq_core::{process_batch, DocumentOutcome, LogReporter, Partitioner, PartitionerConfig};
use std::path::PathBuf;

use super::{display_name, print_summary, CommonArgs};
use crate::input::{doc_id, FileReader};
use crate::output::{copy_document, ensure_dir, write_document};
use crate::progress::ProgressReporter;

/// Arguments for the partition command
#[derive(Debug, Args)]
pub struct PartitionArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Minimum rows before a break (overrides the configuration)
    #[arg(short = 'n', long = "min", value_name = "ROWS")]
    pub min_rows: Option<usize>,

    /// Maximum rows per partition (overrides the configuration)
    #[arg(short = 'm', long = "max", value_name = "ROWS")]
    pub max_rows: Option<usize>,
}

impl PartitionArgs {
    /// Thresholds from the configuration, overridden by the flags
    fn partitioner_config(&self, base: PartitionerConfig) -> Result<PartitionerConfig> {
        let config = PartitionerConfig::builder()
            .min_rows(self.min_rows.unwrap_or(base.min_rows))
            .max_rows(self.max_rows.unwrap_or(base.max_rows))
            .applicable_types(base.applicable_types)
            .build()?;
        Ok(config)
    }

    /// Execute the partition command
    pub fn execute(&self) -> Result<()> {
        let setup = self.common.prepare()?;
        let config = self.partitioner_config(setup.config.partition)?;
        let output = &self.common.output;
        ensure_dir(output)?;

        let reporter = LogReporter::new("mqdq::partition");
        let partitioner = Partitioner::new(config, &reporter)?;
        let mut progress = ProgressReporter::new(self.common.quiet);
        progress.init_files(setup.inputs.len() as u64);

        let summary = process_batch(&setup.inputs, &reporter, |path: &PathBuf| -> Result<DocumentOutcome> {
            let mut doc = FileReader::read_document(path)?;
            let touched = partitioner.partition(&mut doc, &doc_id(path))?;
            if touched {
                write_document(output, path, &doc)?;
            } else {
                copy_document(output, path)?;
            }
            progress.file_completed(&display_name(path));
            Ok(DocumentOutcome::touched(touched))
        });
        progress.finish();

        print_summary("partition", &summary);
        Ok(())
    }
}
