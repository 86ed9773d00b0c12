//! Remove-overlaps command implementation

use anyhow::{Context, Result};
use clap::Args;
use mqdq_core::{process_batch, DocumentOutcome, LogReporter, OverlapRemover};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::report_overlaps::load_word_index;
use super::{display_name, print_summary, CommonArgs};
use crate::input::{doc_id, FileReader};
use crate::output::{ensure_dir, write_document};
use crate::progress::ProgressReporter;

/// Name of the list of divisions where merges lost witnesses or sources
pub const DIV_LIST_FILE: &str = "~overlap-err-divs.txt";

/// Arguments for the remove-overlaps command
#[derive(Debug, Args)]
pub struct RemoveOverlapsArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Directory with the text documents (default: next to each apparatus
    /// document)
    #[arg(long, value_name = "DIR")]
    pub text_dir: Option<PathBuf>,

    /// Write the divisions with lossy merges to the output directory
    #[arg(short, long)]
    pub div_list: bool,
}

/// Write one `document division` line per lossy merge
pub fn write_div_list(dir: &Path, divs: &BTreeSet<(String, String)>) -> Result<PathBuf> {
    let path = dir.join(DIV_LIST_FILE);
    let mut text = String::new();
    for (doc, div) in divs {
        text.push_str(doc);
        text.push(' ');
        text.push_str(div);
        text.push('\n');
    }
    fs::write(&path, text).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}

impl RemoveOverlapsArgs {
    /// Execute the remove-overlaps command
    pub fn execute(&self) -> Result<()> {
        let setup = self.common.prepare()?;
        let output = &self.common.output;
        ensure_dir(output)?;

        let reporter = LogReporter::new("mqdq::remove_overlaps");
        let remover = OverlapRemover::new(&reporter);
        let lossy_divs = Mutex::new(BTreeSet::new());
        let mut progress = ProgressReporter::new(self.common.quiet);
        progress.init_files(setup.inputs.len() as u64);

        let summary = process_batch(&setup.inputs, &reporter, |path: &PathBuf| -> Result<DocumentOutcome> {
            let index = load_word_index(path, self.text_dir.as_deref())?;
            let mut doc = FileReader::read_document(path)?;
            let outcome = remover.remove_overlaps(&mut doc, &doc_id(path), &index)?;
            write_document(output, path, &doc)?;
            if let Ok(mut divs) = lossy_divs.lock() {
                divs.extend(outcome.lossy_divs);
            }
            progress.file_completed(&display_name(path));
            Ok(DocumentOutcome {
                touched: outcome.merged > 0,
                merged: outcome.merged,
            })
        });
        progress.finish();

        if self.div_list {
            let divs = lossy_divs
                .into_inner()
                .map_err(|_| anyhow::anyhow!("Division list lock poisoned"))?;
            let path = write_div_list(output, &divs)?;
            log::info!("{} lossy division(s) listed in {}", divs.len(), path.display());
        }

        print_summary("remove-overlaps", &summary);
        Ok(())
    }
}
